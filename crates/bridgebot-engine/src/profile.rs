// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bot identity synchronization with the persona character.
//!
//! Off the hot path: on demand, reads the persona's display name and
//! avatar and pushes them to the chat platform bot identity. Idempotent;
//! logs but never raises past its own boundary.

use std::sync::Arc;

use bridgebot_config::model::DiscordConfig;
use bridgebot_core::{BridgeError, ChannelAdapter, PersonaAdapter};
use tracing::{debug, error, info};

/// Synchronizes the bot's username/avatar with the persona character.
pub struct ProfileSync {
    channel: Arc<dyn ChannelAdapter>,
    persona: Arc<dyn PersonaAdapter>,
    http: reqwest::Client,
    use_display_name: bool,
    use_avatar: bool,
}

impl ProfileSync {
    pub fn new(
        channel: Arc<dyn ChannelAdapter>,
        persona: Arc<dyn PersonaAdapter>,
        config: &DiscordConfig,
    ) -> Self {
        Self {
            channel,
            persona,
            http: reqwest::Client::new(),
            use_display_name: config.use_persona_display_name,
            use_avatar: config.use_persona_avatar,
        }
    }

    /// Runs one sync pass. Every failure is logged and swallowed here.
    pub async fn sync(&self) {
        if !self.use_display_name && !self.use_avatar {
            debug!("profile sync disabled by configuration");
            return;
        }

        let info = match self.persona.persona_info().await {
            Ok(info) => info,
            Err(e) => {
                error!(error = %e, "failed to fetch persona info, profile not synced");
                return;
            }
        };

        if self.use_display_name {
            match self
                .channel
                .edit_identity(Some(&info.display_name), None)
                .await
            {
                Ok(()) => info!(name = %info.display_name, "bot username updated"),
                Err(e) => error!(error = %e, "failed to update bot username"),
            }
        }

        if self.use_avatar {
            let Some(url) = info.avatar_url.as_deref() else {
                debug!("persona has no avatar, skipping avatar sync");
                return;
            };
            match self.fetch_avatar(url).await {
                Ok(bytes) => match self.channel.edit_identity(None, Some(bytes)).await {
                    Ok(()) => info!("bot avatar updated"),
                    Err(e) => error!(error = %e, "failed to update bot avatar"),
                },
                Err(e) => error!(error = %e, url, "failed to download persona avatar"),
            }
        }
    }

    async fn fetch_avatar(&self, url: &str) -> Result<Vec<u8>, BridgeError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| BridgeError::Persona {
                message: format!("avatar request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BridgeError::persona(format!(
                "avatar download returned HTTP {status}"
            )));
        }

        let bytes = response.bytes().await.map_err(|e| BridgeError::Persona {
            message: format!("avatar body read failed: {e}"),
            source: Some(Box::new(e)),
        })?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridgebot_test_utils::{MockChannel, MockPersona};

    fn config(name: bool, avatar: bool) -> DiscordConfig {
        DiscordConfig {
            token: None,
            watch_channels: vec![],
            use_persona_display_name: name,
            use_persona_avatar: avatar,
        }
    }

    #[tokio::test]
    async fn disabled_sync_does_nothing() {
        let channel = Arc::new(MockChannel::new());
        let persona = Arc::new(MockPersona::new());
        let sync = ProfileSync::new(channel.clone(), persona.clone(), &config(false, false));

        sync.sync().await;
        assert!(channel.identity_edits().await.is_empty());
        assert_eq!(persona.info_calls(), 0);
    }

    #[tokio::test]
    async fn syncs_display_name() {
        let channel = Arc::new(MockChannel::new());
        let persona = Arc::new(MockPersona::new());
        persona.set_info("Mira", None);
        let sync = ProfileSync::new(channel.clone(), persona, &config(true, false));

        sync.sync().await;

        let edits = channel.identity_edits().await;
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0.as_deref(), Some("Mira"));
        assert!(edits[0].1.is_none());
    }

    #[tokio::test]
    async fn syncs_avatar_from_url() {
        let server = wiremock::MockServer::start().await;
        wiremock::Mock::given(wiremock::matchers::method("GET"))
            .and(wiremock::matchers::path("/avatar.png"))
            .respond_with(
                wiremock::ResponseTemplate::new(200).set_body_bytes(vec![1u8, 2, 3, 4]),
            )
            .mount(&server)
            .await;

        let channel = Arc::new(MockChannel::new());
        let persona = Arc::new(MockPersona::new());
        persona.set_info("Mira", Some(format!("{}/avatar.png", server.uri())));
        let sync = ProfileSync::new(channel.clone(), persona, &config(false, true));

        sync.sync().await;

        let edits = channel.identity_edits().await;
        assert_eq!(edits.len(), 1);
        assert!(edits[0].0.is_none());
        assert_eq!(edits[0].1.as_deref(), Some(&[1u8, 2, 3, 4][..]));
    }

    #[tokio::test]
    async fn persona_failure_is_swallowed() {
        let channel = Arc::new(MockChannel::new());
        let persona = Arc::new(MockPersona::new());
        persona.fail_info(true);
        let sync = ProfileSync::new(channel.clone(), persona, &config(true, true));

        sync.sync().await;
        assert!(channel.identity_edits().await.is_empty());
    }
}
