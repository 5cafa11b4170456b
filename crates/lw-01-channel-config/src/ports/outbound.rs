//! Driven Ports (SPI - Outbound)
//!
//! The channel-config subsystem depends on an external protocol-translation
//! service for fetching the live configuration and for moving deltas between
//! their typed and wire forms. Adapters implement this trait; the mutation
//! engine itself never performs I/O.

use crate::domain::delta::ConfigDelta;
use crate::domain::tree::ChannelConfig;
use crate::errors::TranslateError;
use async_trait::async_trait;
use shared_types::ChannelId;

/// Interface to the protocol-translation service.
///
/// All three calls are blocking network calls to an external collaborator
/// and must be timeout-bounded by the caller.
#[async_trait]
pub trait ConfigTranslator: Send + Sync {
    /// Fetch the current configuration of a channel.
    ///
    /// The returned snapshot may be stale by the time it is used; staleness
    /// is detected at submit time, not here.
    async fn fetch_current_config(&self, channel: &ChannelId)
        -> Result<ChannelConfig, TranslateError>;

    /// Translate a typed delta to its wire form.
    async fn encode_delta(&self, delta: &ConfigDelta) -> Result<Vec<u8>, TranslateError>;

    /// Translate a wire-form delta back to its typed form.
    async fn decode_delta(&self, bytes: &[u8]) -> Result<ConfigDelta, TranslateError>;
}
