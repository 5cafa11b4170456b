//! JSON-wire translator adapter.
//!
//! The external translation service speaks a JSON wire form; this adapter
//! produces and parses it with `serde_json`. The same codec is reused by the
//! in-memory ordering service, so both sides of a test agree on the bytes.

use crate::domain::delta::ConfigDelta;
use crate::domain::tree::ChannelConfig;
use crate::errors::TranslateError;
use crate::ports::outbound::ConfigTranslator;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::ChannelId;
use std::collections::HashMap;
use tracing::debug;

/// The JSON wire codec shared by translator implementations.
pub mod wire {
    use super::*;

    pub fn encode_delta(delta: &ConfigDelta) -> Result<Vec<u8>, TranslateError> {
        serde_json::to_vec(delta).map_err(|e| TranslateError::Wire(e.to_string()))
    }

    pub fn decode_delta(bytes: &[u8]) -> Result<ConfigDelta, TranslateError> {
        serde_json::from_slice(bytes).map_err(|e| TranslateError::Wire(e.to_string()))
    }

    pub fn encode_config(config: &ChannelConfig) -> Result<Vec<u8>, TranslateError> {
        serde_json::to_vec(config).map_err(|e| TranslateError::Wire(e.to_string()))
    }

    pub fn decode_config(bytes: &[u8]) -> Result<ChannelConfig, TranslateError> {
        serde_json::from_slice(bytes).map_err(|e| TranslateError::Wire(e.to_string()))
    }
}

/// In-memory translator holding config snapshots per channel.
///
/// Stands in for the external translation service in tests and local runs.
#[derive(Default)]
pub struct InMemoryTranslator {
    configs: RwLock<HashMap<ChannelId, ChannelConfig>>,
}

impl InMemoryTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed or replace the snapshot served for a channel.
    pub fn put_config(&self, config: ChannelConfig) {
        self.configs
            .write()
            .insert(config.channel_id.clone(), config);
    }
}

#[async_trait]
impl ConfigTranslator for InMemoryTranslator {
    async fn fetch_current_config(
        &self,
        channel: &ChannelId,
    ) -> Result<ChannelConfig, TranslateError> {
        debug!("[lw-01] fetching config snapshot for {channel}");
        self.configs
            .read()
            .get(channel)
            .cloned()
            .ok_or_else(|| TranslateError::UnknownChannel(channel.to_string()))
    }

    async fn encode_delta(&self, delta: &ConfigDelta) -> Result<Vec<u8>, TranslateError> {
        wire::encode_delta(delta)
    }

    async fn decode_delta(&self, bytes: &[u8]) -> Result<ConfigDelta, TranslateError> {
        wire::decode_delta(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::delta::WriteOp;
    use crate::domain::path::ConfigPath;
    use crate::domain::tree::ConfigValue;

    #[tokio::test]
    async fn test_delta_wire_round_trip() {
        let translator = InMemoryTranslator::new();
        let mut delta = ConfigDelta::new(ChannelId::new("mainchannel"));
        delta.pin(ConfigPath::root(), 4);
        delta.pin(ConfigPath::organizations(), 2);
        delta.write(
            ConfigPath::organization(2),
            WriteOp::new(1, ConfigValue::Group),
        );

        let bytes = translator.encode_delta(&delta).await.unwrap();
        let decoded = translator.decode_delta(&bytes).await.unwrap();
        assert_eq!(decoded, delta);
    }

    #[tokio::test]
    async fn test_fetch_unknown_channel() {
        let translator = InMemoryTranslator::new();
        let err = translator
            .fetch_current_config(&ChannelId::new("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, TranslateError::UnknownChannel(_)));
    }
}
