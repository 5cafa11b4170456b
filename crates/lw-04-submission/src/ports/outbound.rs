//! Driven Ports (SPI - Outbound)
//!
//! The submission subsystem talks to two collaborators: the ordering
//! service that validates and commits config mutations, and the peer
//! bootstrap surface that joins nodes to a channel from a config block.

use crate::errors::SubmitError;
use async_trait::async_trait;
use lw_01_channel_config::domain::tree::{BlockRef, ChannelConfig};
use lw_02_signature_quorum::MutationEnvelope;
use serde::{Deserialize, Serialize};
use shared_types::{BoundaryError, ChannelId, MspId, PeerNode};
use std::fmt;

/// A config block as served to joining peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigBlock {
    pub reference: BlockRef,
    /// Full configuration snapshot the block carries.
    pub config: ChannelConfig,
}

/// Which block to fetch from a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockQuery {
    /// The genesis block, index zero.
    Genesis,
    /// The most recent config block.
    Latest,
    /// A specific block index.
    Index(u64),
}

impl fmt::Display for BlockQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genesis => f.write_str("genesis"),
            Self::Latest => f.write_str("latest"),
            Self::Index(i) => write!(f, "index {i}"),
        }
    }
}

/// The ordering service: sole writer of the channel's chain.
///
/// `submit` is atomic from the caller's point of view: the quorum check,
/// the read-set check, and the apply happen against one consistent view
/// of the live configuration, and a failure leaves the chain untouched.
#[async_trait]
pub trait OrderingService: Send + Sync {
    /// Validate and commit a signed envelope, producing a config block.
    async fn submit(&self, envelope: &MutationEnvelope) -> Result<BlockRef, SubmitError>;

    /// Fetch a config block from a channel's chain.
    async fn fetch_block(
        &self,
        channel_id: &ChannelId,
        query: BlockQuery,
    ) -> Result<ConfigBlock, SubmitError>;
}

/// Peer bootstrap surface: joining a node to a channel from a block.
#[async_trait]
pub trait Bootstrap: Send + Sync {
    /// Join one of `msp_id`'s nodes to the channel the block belongs to.
    /// Joining a node that is already on the channel is a no-op.
    async fn join_channel(
        &self,
        msp_id: &MspId,
        node: &PeerNode,
        block: &ConfigBlock,
    ) -> Result<(), BoundaryError>;
}
