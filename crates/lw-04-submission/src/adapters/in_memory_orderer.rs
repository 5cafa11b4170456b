//! In-memory ordering service.
//!
//! Holds the authoritative configuration per channel and performs the
//! submit-time checks a real orderer would: signature quorum against the
//! live modification policy, read-set pins against the live tree, then an
//! atomic apply that cuts the next config block. Also serves as the
//! protocol translator for local runs, so fetches and submissions see the
//! same state.

use crate::errors::SubmitError;
use crate::ports::outbound::{BlockQuery, ConfigBlock, OrderingService};
use async_trait::async_trait;
use lw_01_channel_config::adapters::json_translator::wire;
use lw_01_channel_config::domain::tree::{BlockRef, ChannelConfig};
use lw_01_channel_config::errors::TranslateError;
use lw_01_channel_config::{ConfigDelta, ConfigTranslator};
use lw_02_signature_quorum::MutationEnvelope;
use parking_lot::RwLock;
use shared_types::ChannelId;
use std::collections::HashMap;
use tracing::{debug, info};

struct ChainState {
    config: ChannelConfig,
    blocks: Vec<ConfigBlock>,
}

/// Single-process stand-in for the ordering service.
#[derive(Default)]
pub struct InMemoryOrderer {
    chains: RwLock<HashMap<ChannelId, ChainState>>,
}

impl InMemoryOrderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a channel from its genesis configuration, cutting block 0.
    pub fn create_channel(&self, config: ChannelConfig) {
        let genesis = ConfigBlock {
            reference: BlockRef {
                channel_id: config.channel_id.clone(),
                index: 0,
                config_version: config.version(),
            },
            config: config.clone(),
        };
        info!("[lw-04] Channel '{}' created at config v{}", config.channel_id, config.version());
        self.chains.write().insert(
            config.channel_id.clone(),
            ChainState {
                config,
                blocks: vec![genesis],
            },
        );
    }

    /// The live configuration for a channel, if it exists.
    pub fn current_config(&self, channel_id: &ChannelId) -> Option<ChannelConfig> {
        self.chains.read().get(channel_id).map(|c| c.config.clone())
    }

    /// Chain height of a channel, if it exists.
    pub fn height(&self, channel_id: &ChannelId) -> Option<u64> {
        self.chains
            .read()
            .get(channel_id)
            .map(|c| c.blocks.len() as u64)
    }
}

#[async_trait]
impl OrderingService for InMemoryOrderer {
    async fn submit(&self, envelope: &MutationEnvelope) -> Result<BlockRef, SubmitError> {
        let mut chains = self.chains.write();
        let chain = chains
            .get_mut(&envelope.channel_id)
            .ok_or_else(|| SubmitError::UnknownChannel(envelope.channel_id.to_string()))?;

        let policy = chain.config.modification_policy();
        let signers = envelope.signer_set();
        if !policy.is_satisfied_by(&signers) {
            let have = signers.iter().filter(|msp| policy.covers(msp)).count();
            return Err(SubmitError::QuorumNotMet {
                have,
                required: policy.required(),
            });
        }

        chain
            .config
            .verify_read_set(&envelope.delta)
            .map_err(SubmitError::pin_mismatch)?;

        // Apply against a copy so a structural failure leaves the chain
        // untouched.
        let mut next = chain.config.clone();
        next.apply(&envelope.delta)?;

        let block = ConfigBlock {
            reference: BlockRef {
                channel_id: envelope.channel_id.clone(),
                index: chain.blocks.len() as u64,
                config_version: next.version(),
            },
            config: next.clone(),
        };
        let reference = block.reference.clone();
        chain.config = next;
        chain.blocks.push(block);
        debug!(
            "[lw-04] Cut block {} on '{}' at config v{}",
            reference.index, reference.channel_id, reference.config_version
        );
        Ok(reference)
    }

    async fn fetch_block(
        &self,
        channel_id: &ChannelId,
        query: BlockQuery,
    ) -> Result<ConfigBlock, SubmitError> {
        let chains = self.chains.read();
        let chain = chains
            .get(channel_id)
            .ok_or_else(|| SubmitError::UnknownChannel(channel_id.to_string()))?;
        let block = match query {
            BlockQuery::Genesis => chain.blocks.first(),
            BlockQuery::Latest => chain.blocks.last(),
            BlockQuery::Index(i) => chain.blocks.get(i as usize),
        };
        block.cloned().ok_or_else(|| SubmitError::NoSuchBlock {
            channel: channel_id.to_string(),
            query: query.to_string(),
        })
    }
}

#[async_trait]
impl ConfigTranslator for InMemoryOrderer {
    async fn fetch_current_config(
        &self,
        channel: &ChannelId,
    ) -> Result<ChannelConfig, TranslateError> {
        self.current_config(channel)
            .ok_or_else(|| TranslateError::UnknownChannel(channel.to_string()))
    }

    async fn encode_delta(&self, delta: &ConfigDelta) -> Result<Vec<u8>, TranslateError> {
        wire::encode_delta(delta)
    }

    async fn decode_delta(&self, bytes: &[u8]) -> Result<ConfigDelta, TranslateError> {
        wire::decode_delta(bytes)
    }
}
