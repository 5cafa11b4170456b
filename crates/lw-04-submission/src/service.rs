//! Submission Gateway - core business logic.
//!
//! Hands signed envelopes to the ordering service and drives channel joins
//! from the resulting config blocks. All boundary calls are timeout-bounded
//! here; the gateway itself holds no channel state.

use crate::errors::{SubmitError, SubmitResult};
use crate::ports::outbound::{BlockQuery, Bootstrap, ConfigBlock, OrderingService};
use lw_01_channel_config::domain::tree::BlockRef;
use lw_02_signature_quorum::{EnvelopeStatus, MutationEnvelope};
use shared_types::{BoundaryError, ChannelId, Classify, ErrorClass, NetworkTopology, Organization};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Submission and join timeouts.
#[derive(Clone, Debug)]
pub struct SubmissionConfig {
    pub submit_timeout: Duration,
    /// Per-node timeout for channel joins.
    pub join_timeout: Duration,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(10),
            join_timeout: Duration::from_secs(5),
        }
    }
}

/// Result of a landed submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub envelope_id: Uuid,
    pub block: BlockRef,
}

/// Submits signed envelopes and joins peers from config blocks.
pub struct SubmissionGateway<O: OrderingService, B: Bootstrap> {
    config: SubmissionConfig,
    orderer: Arc<O>,
    bootstrap: Arc<B>,
}

impl<O: OrderingService, B: Bootstrap> SubmissionGateway<O, B> {
    pub fn new(config: SubmissionConfig, orderer: Arc<O>, bootstrap: Arc<B>) -> Self {
        Self {
            config,
            orderer,
            bootstrap,
        }
    }

    /// Submit a signed envelope to the ordering service.
    ///
    /// On success the envelope is marked committed. A conflict or a
    /// structural failure marks it rejected: that envelope can never land
    /// and the intent must be re-proposed from a fresh snapshot. A quorum
    /// or boundary failure leaves the envelope's status untouched so the
    /// caller can collect further signatures or retry.
    pub async fn submit(&self, envelope: &mut MutationEnvelope) -> SubmitResult<SubmitOutcome> {
        let prior = envelope.status;
        envelope.status = EnvelopeStatus::Submitted;
        let result = tokio::time::timeout(
            self.config.submit_timeout,
            self.orderer.submit(envelope),
        )
        .await
        .unwrap_or_else(|_| {
            Err(SubmitError::Boundary(BoundaryError::Timeout {
                target: "ordering-service".to_string(),
                millis: self.config.submit_timeout.as_millis() as u64,
            }))
        });

        match result {
            Ok(block) => {
                envelope.status = EnvelopeStatus::Committed;
                info!(
                    "[lw-04] Envelope {} committed on '{}' as block {} (config v{})",
                    envelope.envelope_id, block.channel_id, block.index, block.config_version
                );
                Ok(SubmitOutcome {
                    envelope_id: envelope.envelope_id,
                    block,
                })
            }
            Err(e) => {
                match e.class() {
                    ErrorClass::Conflict | ErrorClass::Invalid => {
                        envelope.status = EnvelopeStatus::Rejected;
                        warn!("[lw-04] Envelope {} rejected: {}", envelope.envelope_id, e);
                    }
                    ErrorClass::PolicyUnmet | ErrorClass::Unreachable => {
                        envelope.status = prior;
                        debug!(
                            "[lw-04] Envelope {} not landed ({}), retry possible",
                            envelope.envelope_id, e
                        );
                    }
                }
                Err(e)
            }
        }
    }

    /// Fetch a config block from the channel's chain.
    pub async fn fetch_block(
        &self,
        channel_id: &ChannelId,
        query: BlockQuery,
    ) -> SubmitResult<ConfigBlock> {
        self.orderer.fetch_block(channel_id, query).await
    }

    /// Join every node of one organization to the channel from its latest
    /// config block. Used after an admission lands.
    ///
    /// Returns the number of nodes joined; fails on the first node that
    /// cannot be reached within its deadline.
    pub async fn join_organization(
        &self,
        channel_id: &ChannelId,
        organization: &Organization,
    ) -> SubmitResult<usize> {
        let block = self.fetch_block(channel_id, BlockQuery::Latest).await?;
        self.join_nodes(organization, &block).await
    }

    /// Bring a whole network onto a channel from its genesis block.
    ///
    /// Every node of every organization in the topology is joined. Used
    /// once, at network bootstrap.
    pub async fn bootstrap_network(&self, topology: &NetworkTopology) -> SubmitResult<usize> {
        let block = self
            .fetch_block(&topology.channel_id, BlockQuery::Genesis)
            .await?;
        let mut joined = 0;
        for org in &topology.organizations {
            joined += self.join_nodes(org, &block).await?;
        }
        info!(
            "[lw-04] Bootstrapped '{}': {} nodes across {} organizations",
            topology.channel_id,
            joined,
            topology.organizations.len()
        );
        Ok(joined)
    }

    async fn join_nodes(
        &self,
        organization: &Organization,
        block: &ConfigBlock,
    ) -> SubmitResult<usize> {
        for node in &organization.nodes {
            let join = self
                .bootstrap
                .join_channel(&organization.id, node, block);
            match tokio::time::timeout(self.config.join_timeout, join).await {
                Ok(Ok(())) => {
                    debug!(
                        "[lw-04] Joined {}/{} to '{}' at block {}",
                        organization.id, node.name, block.reference.channel_id, block.reference.index
                    );
                }
                Ok(Err(e)) => return Err(SubmitError::Boundary(e)),
                Err(_) => {
                    return Err(SubmitError::Boundary(BoundaryError::Timeout {
                        target: format!("{}/{}", organization.id, node.name),
                        millis: self.config.join_timeout.as_millis() as u64,
                    }))
                }
            }
        }
        Ok(organization.nodes.len())
    }
}
