// SPDX-FileCopyrightText: 2026 Bridgebot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AI persona service adapter for bridgebot.
//!
//! Implements [`PersonaAdapter`] over the persona service HTTP API:
//! character metadata for profile sync, and reply generation from an
//! ordered conversation batch.

pub mod client;
pub mod format;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use bridgebot_config::model::{FormattingConfig, PersonaConfig};
use bridgebot_core::{
    Adapter, BridgeError, CachedMessage, HealthStatus, PersonaAdapter, PersonaInfo,
};
use tracing::debug;

use crate::client::PersonaClient;
use crate::format::BatchFormat;

/// Persona service adapter implementing [`PersonaAdapter`].
pub struct PersonaService {
    client: PersonaClient,
    format: BatchFormat,
}

impl PersonaService {
    /// Creates a new persona service adapter.
    ///
    /// Requires `config.token` and `config.character_id` to be set.
    pub fn new(
        config: &PersonaConfig,
        formatting: &FormattingConfig,
    ) -> Result<Self, BridgeError> {
        let token = config.token.as_deref().ok_or_else(|| {
            BridgeError::Config("persona.token is required for the persona adapter".into())
        })?;

        if token.is_empty() {
            return Err(BridgeError::Config("persona.token cannot be empty".into()));
        }
        if config.character_id.is_empty() {
            return Err(BridgeError::Config(
                "persona.character_id is required for the persona adapter".into(),
            ));
        }

        let client = PersonaClient::new(
            token,
            config.base_url.clone(),
            config.character_id.clone(),
            Duration::from_secs(config.request_timeout_secs),
            config.max_retries,
        )?;

        Ok(Self {
            client,
            format: BatchFormat::new(
                formatting.user_template.clone(),
                formatting.reply_template.clone(),
            ),
        })
    }
}

#[async_trait]
impl Adapter for PersonaService {
    fn name(&self) -> &str {
        "persona"
    }

    async fn health_check(&self) -> Result<HealthStatus, BridgeError> {
        match self.client.fetch_character().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "persona service unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}

#[async_trait]
impl PersonaAdapter for PersonaService {
    async fn persona_info(&self) -> Result<PersonaInfo, BridgeError> {
        let character = self.client.fetch_character().await?;
        Ok(PersonaInfo {
            display_name: character.name,
            avatar_url: character.avatar_url,
        })
    }

    async fn generate_reply(&self, batch: &[CachedMessage]) -> Result<String, BridgeError> {
        let rendered = self.format.render(batch);
        debug!(entries = batch.len(), "requesting persona reply");
        self.client.generate(&rendered).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_requires_token() {
        let config = PersonaConfig::default();
        assert!(PersonaService::new(&config, &FormattingConfig::default()).is_err());
    }

    #[test]
    fn new_requires_character_id() {
        let config = PersonaConfig {
            token: Some("tok".into()),
            ..PersonaConfig::default()
        };
        assert!(PersonaService::new(&config, &FormattingConfig::default()).is_err());
    }

    #[test]
    fn new_accepts_complete_config() {
        let config = PersonaConfig {
            token: Some("tok".into()),
            character_id: "char-1".into(),
            ..PersonaConfig::default()
        };
        let service = PersonaService::new(&config, &FormattingConfig::default()).unwrap();
        assert_eq!(service.name(), "persona");
    }
}
