// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bridgebot - bridges group chat channels to a conversational-AI persona.
//!
//! This is the binary entry point.

mod serve;

use clap::{Parser, Subcommand};

/// Bridgebot - bridges group chat channels to a conversational-AI persona.
#[derive(Parser, Debug)]
#[command(name = "bridgebot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the bridge: connect to chat, collect context, relay replies.
    Serve,
    /// Print the effective configuration (secrets redacted).
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load and validate configuration at startup.
    let config = match bridgebot_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            bridgebot_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    match cli.command {
        Some(Commands::Serve) => {
            if let Err(e) = serve::run_serve(config).await {
                eprintln!("error: {e}");
                std::process::exit(1);
            }
        }
        Some(Commands::Config) => {
            print_config(config);
        }
        None => {
            println!("bridgebot: use --help for available commands");
        }
    }
}

/// Prints the effective configuration as TOML with secrets redacted.
fn print_config(mut config: bridgebot_config::BridgeConfig) {
    if config.discord.token.is_some() {
        config.discord.token = Some("<redacted>".to_string());
    }
    if config.persona.token.is_some() {
        config.persona.token = Some("<redacted>".to_string());
    }
    match toml::to_string_pretty(&config) {
        Ok(rendered) => println!("{rendered}"),
        Err(e) => eprintln!("error: failed to render config: {e}"),
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        // Verify config loads and validates with defaults (no config file needed).
        let config = bridgebot_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.batching.idle_threshold_secs, 7);
        assert_eq!(config.batching.batch_threshold, 5);
    }
}
