//! End-to-end governance workflows.
//!
//! Each workflow is a bounded loop over the subsystem services with one
//! restart rule: a `Conflict`-class failure means the world moved while the
//! workflow was running, so the whole attempt restarts from a fresh fetch.
//! Everything else resolves to a terminal [`WorkflowOutcome`] or an error.

use crate::config::GovernorConfig;
use anyhow::{anyhow, Result};
use lw_01_channel_config::domain::tree::BlockRef;
use lw_01_channel_config::{ConfigTranslator, MutationEngine, TopologyChange};
use lw_02_signature_quorum::{CollectorService, MutationEnvelope, OrgSigner, QuorumError};
use lw_03_chaincode_lifecycle::{
    ActivationPhase, ChaincodeDefinition, CommitGateway, CommittedDefinition, LifecycleService,
    OrgPeerAdmin,
};
use lw_04_submission::{Bootstrap, OrderingService, SubmissionGateway, SubmitError};
use shared_types::{
    ChannelId, Classify, ErrorClass, MspId, NetworkTopology, Organization, SignaturePolicy,
};
use std::sync::Arc;
use tokio::time::Instant;
use tracing::{info, warn};

/// Terminal state of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowOutcome<T> {
    /// The change landed; `T` carries what was produced.
    Committed(T),
    /// Not enough signatures or approvals yet; nothing was lost and the
    /// workflow can be re-run once more parties respond.
    Pending { have: usize, required: usize },
    /// The intent itself was refused and must be corrected before retrying.
    Rejected { reason: String },
}

/// Drives channel-config mutations: admission and anchor updates.
pub struct ChannelGovernor<T, S, O, B>
where
    T: ConfigTranslator,
    S: OrgSigner,
    O: OrderingService,
    B: Bootstrap,
{
    config: GovernorConfig,
    translator: Arc<T>,
    engine: MutationEngine,
    collector: CollectorService<S>,
    gateway: SubmissionGateway<O, B>,
}

impl<T, S, O, B> ChannelGovernor<T, S, O, B>
where
    T: ConfigTranslator,
    S: OrgSigner,
    O: OrderingService,
    B: Bootstrap,
{
    pub fn new(
        config: GovernorConfig,
        translator: Arc<T>,
        signer: Arc<S>,
        orderer: Arc<O>,
        bootstrap: Arc<B>,
    ) -> Self {
        let collector = CollectorService::new(config.collector.clone(), signer);
        let gateway = SubmissionGateway::new(config.submission.clone(), orderer, bootstrap);
        Self {
            config,
            translator,
            engine: MutationEngine::new(),
            collector,
            gateway,
        }
    }

    /// Bring every organization of a topology onto its channel from the
    /// genesis block. Run once, after channel creation.
    pub async fn bootstrap_network(&self, topology: &NetworkTopology) -> Result<usize> {
        Ok(self.gateway.bootstrap_network(topology).await?)
    }

    /// Admit an organization to the channel and join its peers.
    pub async fn admit_organization(
        &self,
        channel_id: &ChannelId,
        organization: &Organization,
    ) -> Result<WorkflowOutcome<BlockRef>> {
        let intent = TopologyChange::AddOrganization {
            org: organization.clone(),
        };
        let outcome = self.mutate(channel_id, &intent).await?;
        if let WorkflowOutcome::Committed(_) = &outcome {
            let joined = self
                .gateway
                .join_organization(channel_id, organization)
                .await?;
            info!(
                "[lw-runtime] {} admitted to '{}', {} peer(s) joined",
                organization.id, channel_id, joined
            );
        }
        Ok(outcome)
    }

    /// Update an organization's anchor nodes on the channel.
    pub async fn update_anchor_nodes(
        &self,
        channel_id: &ChannelId,
        organization: &Organization,
        anchor_nodes: Vec<String>,
    ) -> Result<WorkflowOutcome<BlockRef>> {
        let intent = TopologyChange::UpdateAnchorNodes {
            org: organization.clone(),
            anchor_nodes,
        };
        self.mutate(channel_id, &intent).await
    }

    /// One full mutation round: fetch, propose, collect, submit. Restarts
    /// from a fresh fetch on conflicts, up to the configured budget.
    async fn mutate(
        &self,
        channel_id: &ChannelId,
        intent: &TopologyChange,
    ) -> Result<WorkflowOutcome<BlockRef>> {
        for attempt in 0..=self.config.max_conflict_restarts {
            let current = self.translator.fetch_current_config(channel_id).await?;
            let delta = match self.engine.propose(&current, intent) {
                Ok(delta) => delta,
                Err(e) => {
                    return Ok(WorkflowOutcome::Rejected {
                        reason: e.to_string(),
                    })
                }
            };

            let policy = current.modification_policy();
            let signers: Vec<MspId> = policy.member_msps().into_iter().cloned().collect();
            let mut envelope = MutationEnvelope::new(delta);
            let deadline = Instant::now() + self.config.collect_deadline;
            match self
                .collector
                .collect(&mut envelope, policy, &signers, deadline)
                .await
            {
                Ok(_) => {}
                Err(QuorumError::TimedOut {
                    outstanding,
                    required,
                }) => {
                    return Ok(WorkflowOutcome::Pending {
                        have: required.saturating_sub(outstanding),
                        required,
                    })
                }
                Err(e) => return Err(e.into()),
            }

            match self.gateway.submit(&mut envelope).await {
                Ok(outcome) => return Ok(WorkflowOutcome::Committed(outcome.block)),
                Err(SubmitError::QuorumNotMet { have, required }) => {
                    return Ok(WorkflowOutcome::Pending { have, required })
                }
                Err(e) if e.class() == ErrorClass::Conflict => {
                    warn!(
                        "[lw-runtime] mutation of '{}' conflicted (attempt {}), refetching: {}",
                        channel_id,
                        attempt + 1,
                        e
                    );
                    continue;
                }
                Err(e) if e.class() == ErrorClass::Invalid => {
                    return Ok(WorkflowOutcome::Rejected {
                        reason: e.to_string(),
                    })
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(anyhow!(
            "mutation of '{channel_id}' abandoned after {} conflicting attempts",
            self.config.max_conflict_restarts + 1
        ))
    }
}

/// Drives chaincode activation across the network.
pub struct ActivationCoordinator<P, G>
where
    P: OrgPeerAdmin,
    G: CommitGateway,
{
    config: GovernorConfig,
    lifecycle: LifecycleService<P, G>,
}

impl<P, G> ActivationCoordinator<P, G>
where
    P: OrgPeerAdmin,
    G: CommitGateway,
{
    pub fn new(config: GovernorConfig, peers: Arc<P>, gateway: Arc<G>) -> Self {
        let lifecycle = LifecycleService::new(config.lifecycle.clone(), peers, gateway);
        Self { config, lifecycle }
    }

    /// Activate (or upgrade) a chaincode across `organizations`.
    ///
    /// Installs and approvals are best-effort per organization: an
    /// unreachable organization is skipped and simply contributes no
    /// approval. Upgrades keep the committed endorsement policy;
    /// `endorsement_policy` only shapes the initial definition.
    pub async fn activate(
        &self,
        name: &str,
        content: &[u8],
        endorsement_policy: SignaturePolicy,
        organizations: &[MspId],
    ) -> Result<WorkflowOutcome<CommittedDefinition>> {
        for attempt in 0..=self.config.max_conflict_restarts {
            let committed = self.lifecycle.committed_definition(name).await?;
            let label_version = committed.as_ref().map(|d| d.version + 1).unwrap_or(1);
            let package = self.lifecycle.package(name, label_version, content);
            let definition = match &committed {
                Some(prev) => ChaincodeDefinition::upgrade_from(prev, &package),
                None => {
                    ChaincodeDefinition::initial(name, &package, endorsement_policy.clone())
                }
            };

            let mut conflicted = false;
            for org in organizations {
                if let Err(e) = self.lifecycle.install(org, &package).await {
                    warn!("[lw-runtime] install at {} skipped: {}", org, e);
                    continue;
                }
                match self.lifecycle.approve(org, &definition).await {
                    Ok(()) => {}
                    Err(e) if e.class() == ErrorClass::Conflict => {
                        warn!(
                            "[lw-runtime] approval at {} conflicted (attempt {}): {}",
                            org,
                            attempt + 1,
                            e
                        );
                        conflicted = true;
                        break;
                    }
                    Err(e) => warn!("[lw-runtime] approval at {} skipped: {}", org, e),
                }
            }
            if conflicted {
                continue;
            }

            if let Some(pending) = self.await_readiness(&definition, organizations).await {
                return Ok(pending);
            }

            match self.lifecycle.commit(&definition).await {
                Ok(committed) => {
                    info!(
                        "[lw-runtime] '{}' reached {} at sequence {}",
                        name,
                        ActivationPhase::Committed,
                        committed.definition.sequence
                    );
                    return Ok(WorkflowOutcome::Committed(committed));
                }
                Err(e) if e.class() == ErrorClass::Conflict => {
                    warn!(
                        "[lw-runtime] commit of '{}' conflicted (attempt {}): {}",
                        name,
                        attempt + 1,
                        e
                    );
                    continue;
                }
                Err(e) if e.class() == ErrorClass::PolicyUnmet => {
                    let readiness = self.lifecycle.check_readiness(&definition, organizations).await;
                    return Ok(WorkflowOutcome::Pending {
                        have: readiness.approved_orgs().len(),
                        required: definition.endorsement_policy.required(),
                    });
                }
                Err(e) if e.class() == ErrorClass::Invalid => {
                    return Ok(WorkflowOutcome::Rejected {
                        reason: e.to_string(),
                    })
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(anyhow!(
            "activation of '{name}' abandoned after {} conflicting attempts",
            self.config.max_conflict_restarts + 1
        ))
    }

    /// Poll readiness until the policy is met or attempts run out. Returns
    /// the `Pending` outcome when the budget is exhausted.
    async fn await_readiness(
        &self,
        definition: &ChaincodeDefinition,
        organizations: &[MspId],
    ) -> Option<WorkflowOutcome<CommittedDefinition>> {
        for attempt in 1..=self.config.readiness_attempts {
            let readiness = self
                .lifecycle
                .check_readiness(definition, organizations)
                .await;
            if readiness.satisfied(&definition.endorsement_policy) {
                info!(
                    "[lw-runtime] '{}' is {}: endorsement policy met",
                    definition.name,
                    ActivationPhase::Ready
                );
                return None;
            }
            if attempt == self.config.readiness_attempts {
                return Some(WorkflowOutcome::Pending {
                    have: readiness.approved_orgs().len(),
                    required: definition.endorsement_policy.required(),
                });
            }
            tokio::time::sleep(self.config.readiness_backoff).await;
        }
        None
    }
}
