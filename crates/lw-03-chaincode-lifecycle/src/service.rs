//! Chaincode Lifecycle Service - core business logic.
//!
//! Fans installation and approval out across organizations through the
//! [`OrgPeerAdmin`] port, aggregates tri-state commit readiness, and
//! finalizes definitions through the [`CommitGateway`] port. Readiness
//! queries run in parallel with a per-organization timeout; an organization
//! that cannot be reached is reported as `Unknown`, never as a refusal.

use crate::domain::definition::{ChaincodeDefinition, ChaincodePackage};
use crate::domain::readiness::CommitReadiness;
use crate::errors::{LifecycleError, LifecycleResult};
use crate::ports::outbound::{CommitGateway, CommittedDefinition, OrgPeerAdmin};
use futures::future::join_all;
use shared_types::entities::MspId;
use shared_types::errors::{Approval, BoundaryError};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Lifecycle fan-out configuration.
#[derive(Clone, Debug)]
pub struct LifecycleConfig {
    /// Per-organization timeout for installs and approvals.
    pub admin_timeout: Duration,
    /// Per-organization timeout for readiness queries.
    pub query_timeout: Duration,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            admin_timeout: Duration::from_secs(10),
            query_timeout: Duration::from_secs(3),
        }
    }
}

/// Drives chaincode activation across the network.
pub struct LifecycleService<P: OrgPeerAdmin, G: CommitGateway> {
    config: LifecycleConfig,
    peers: Arc<P>,
    gateway: Arc<G>,
}

impl<P: OrgPeerAdmin, G: CommitGateway> LifecycleService<P, G> {
    pub fn new(config: LifecycleConfig, peers: Arc<P>, gateway: Arc<G>) -> Self {
        Self {
            config,
            peers,
            gateway,
        }
    }

    /// Package chaincode content under `name` at `version`.
    pub fn package(&self, name: &str, version: u64, content: &[u8]) -> ChaincodePackage {
        let package = ChaincodePackage::new(name, version, content);
        info!("[lw-03] Packaged '{}' as {}", package.label, package.package_id);
        package
    }

    /// Install `package` at one organization.
    ///
    /// Installation is idempotent: if the package id is already present at
    /// the organization, no install call is made.
    pub async fn install(
        &self,
        msp_id: &MspId,
        package: &ChaincodePackage,
    ) -> LifecycleResult<()> {
        let installed = self
            .bounded(self.config.admin_timeout, msp_id, self.peers.query_installed(msp_id))
            .await?;
        if installed.contains(&package.package_id) {
            debug!("[lw-03] {} already has {}, skipping install", msp_id, package.package_id);
            return Ok(());
        }

        self.bounded(self.config.admin_timeout, msp_id, self.peers.install(msp_id, package))
            .await?;
        info!("[lw-03] Installed {} at {}", package.label, msp_id);
        Ok(())
    }

    /// Record one organization's approval of `definition`.
    ///
    /// Re-approving an identical definition succeeds without effect; an
    /// attempt against a superseded sequence surfaces as a conflict the
    /// caller must resolve by re-reading the committed definition.
    pub async fn approve(
        &self,
        msp_id: &MspId,
        definition: &ChaincodeDefinition,
    ) -> LifecycleResult<()> {
        let existing = self
            .bounded(
                self.config.admin_timeout,
                msp_id,
                self.peers.query_approval(msp_id, &definition.name),
            )
            .await?;
        if let Some(existing) = existing {
            if existing.matches(definition) {
                debug!(
                    "[lw-03] {} already approved '{}' sequence {}",
                    msp_id, definition.name, definition.sequence
                );
                return Ok(());
            }
        }

        match tokio::time::timeout(
            self.config.admin_timeout,
            self.peers.approve(msp_id, definition),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(LifecycleError::Boundary(BoundaryError::Timeout {
                    target: msp_id.to_string(),
                    millis: self.config.admin_timeout.as_millis() as u64,
                }))
            }
        }
        info!(
            "[lw-03] {} approved '{}' v{} sequence {}",
            msp_id, definition.name, definition.version, definition.sequence
        );
        Ok(())
    }

    /// Query every organization's approval state for `definition` in
    /// parallel and aggregate the tri-state picture.
    pub async fn check_readiness(
        &self,
        definition: &ChaincodeDefinition,
        organizations: &[MspId],
    ) -> CommitReadiness {
        let queries = organizations.iter().map(|msp_id| async move {
            let answer = tokio::time::timeout(
                self.config.query_timeout,
                self.peers.query_approval(msp_id, &definition.name),
            )
            .await;
            let approval = match answer {
                Ok(Ok(record)) => {
                    let approved = record.map(|r| r.matches(definition)).unwrap_or(false);
                    if approved {
                        Approval::Approved
                    } else {
                        Approval::NotApproved
                    }
                }
                Ok(Err(e)) => {
                    warn!("[lw-03] Readiness query to {} failed: {}", msp_id, e);
                    Approval::Unknown
                }
                Err(_) => {
                    warn!(
                        "[lw-03] Readiness query to {} timed out after {}ms",
                        msp_id,
                        self.config.query_timeout.as_millis()
                    );
                    Approval::Unknown
                }
            };
            (msp_id.clone(), approval)
        });

        let approvals: BTreeMap<MspId, Approval> = join_all(queries).await.into_iter().collect();
        let readiness = CommitReadiness::new(approvals);
        debug!(
            "[lw-03] Readiness for '{}' seq {}: {} approved, {} unknown",
            definition.name,
            definition.sequence,
            readiness.approved_orgs().len(),
            readiness.unknown_orgs().len()
        );
        readiness
    }

    /// Commit `definition` on the channel.
    ///
    /// The gateway decides against live approvals; a stale readiness
    /// snapshot held by the caller carries no weight.
    pub async fn commit(
        &self,
        definition: &ChaincodeDefinition,
    ) -> LifecycleResult<CommittedDefinition> {
        let committed = self.gateway.commit(definition).await?;
        info!(
            "[lw-03] Committed '{}' v{} sequence {} with {} endorsers",
            committed.definition.name,
            committed.definition.version,
            committed.definition.sequence,
            committed.endorsers.len()
        );
        Ok(committed)
    }

    /// The definition currently committed for `name`, if any.
    pub async fn committed_definition(
        &self,
        name: &str,
    ) -> LifecycleResult<Option<ChaincodeDefinition>> {
        Ok(self.gateway.query_committed(name).await?)
    }

    async fn bounded<T>(
        &self,
        timeout: Duration,
        msp_id: &MspId,
        call: impl std::future::Future<Output = Result<T, BoundaryError>>,
    ) -> LifecycleResult<T> {
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(LifecycleError::Boundary),
            Err(_) => Err(LifecycleError::Boundary(BoundaryError::Timeout {
                target: msp_id.to_string(),
                millis: timeout.as_millis() as u64,
            })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock_org_node::MockPeerNetwork;
    use crate::domain::approval::ApprovalRecord;
    use crate::domain::definition::PackageId;
    use shared_types::policy::{PolicyRole, SignaturePolicy};

    /// Peer surface whose mutating calls never return.
    struct StalledPeers;

    #[async_trait::async_trait]
    impl OrgPeerAdmin for StalledPeers {
        async fn install(
            &self,
            _msp_id: &MspId,
            _package: &ChaincodePackage,
        ) -> Result<(), BoundaryError> {
            std::future::pending().await
        }

        async fn query_installed(&self, _msp_id: &MspId) -> Result<Vec<PackageId>, BoundaryError> {
            std::future::pending().await
        }

        async fn approve(
            &self,
            _msp_id: &MspId,
            _definition: &ChaincodeDefinition,
        ) -> Result<(), LifecycleError> {
            std::future::pending().await
        }

        async fn query_approval(
            &self,
            _msp_id: &MspId,
            _name: &str,
        ) -> Result<Option<ApprovalRecord>, BoundaryError> {
            Ok(None)
        }
    }

    fn orgs() -> Vec<MspId> {
        vec![MspId::from("org1"), MspId::from("org2"), MspId::from("org3")]
    }

    fn majority_policy() -> SignaturePolicy {
        SignaturePolicy::majority_of(vec![
            PolicyRole::peer(MspId::from("org1")),
            PolicyRole::peer(MspId::from("org2")),
            PolicyRole::peer(MspId::from("org3")),
        ])
    }

    fn service(network: Arc<MockPeerNetwork>) -> LifecycleService<MockPeerNetwork, MockPeerNetwork> {
        LifecycleService::new(
            LifecycleConfig {
                admin_timeout: Duration::from_millis(200),
                query_timeout: Duration::from_millis(200),
            },
            network.clone(),
            network,
        )
    }

    #[tokio::test]
    async fn test_install_is_idempotent() {
        let network = Arc::new(MockPeerNetwork::new(orgs()));
        let svc = service(network.clone());
        let pkg = svc.package("cc", 1, b"v1");

        let org1 = MspId::from("org1");
        svc.install(&org1, &pkg).await.unwrap();
        svc.install(&org1, &pkg).await.unwrap();
        assert_eq!(network.install_count(&org1), 1);
    }

    #[tokio::test]
    async fn test_majority_commits_with_one_org_unreachable() {
        let network = Arc::new(MockPeerNetwork::new(orgs()));
        let svc = service(network.clone());
        let pkg = svc.package("cc", 1, b"v1");
        let def = ChaincodeDefinition::initial("cc", &pkg, majority_policy());

        for msp in ["org1", "org2"] {
            let msp = MspId::from(msp);
            svc.install(&msp, &pkg).await.unwrap();
            svc.approve(&msp, &def).await.unwrap();
        }
        network.set_unreachable(MspId::from("org3"));

        let readiness = svc.check_readiness(&def, &orgs()).await;
        assert_eq!(readiness.unknown_orgs(), vec![MspId::from("org3")]);
        assert!(readiness.satisfied(&def.endorsement_policy));

        let committed = svc.commit(&def).await.unwrap();
        assert_eq!(committed.definition.sequence, 1);
        assert_eq!(committed.endorsers.len(), 2);
    }

    #[tokio::test]
    async fn test_minority_commit_is_refused() {
        let network = Arc::new(MockPeerNetwork::new(orgs()));
        let svc = service(network.clone());
        let pkg = svc.package("cc", 1, b"v1");
        let def = ChaincodeDefinition::initial("cc", &pkg, majority_policy());

        let org1 = MspId::from("org1");
        svc.install(&org1, &pkg).await.unwrap();
        svc.approve(&org1, &def).await.unwrap();

        let err = svc.commit(&def).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::PolicyNotSatisfied { approved: 1, required: 2, .. }
        ));
    }

    #[tokio::test]
    async fn test_approve_superseded_sequence_is_a_conflict() {
        let network = Arc::new(MockPeerNetwork::new(orgs()));
        let svc = service(network.clone());
        let pkg = svc.package("cc", 1, b"v1");
        let def1 = ChaincodeDefinition::initial("cc", &pkg, majority_policy());
        let def2 = ChaincodeDefinition::upgrade_from(&def1, &pkg);

        let org1 = MspId::from("org1");
        svc.approve(&org1, &def2).await.unwrap();

        let err = svc.approve(&org1, &def1).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::StaleSequence { attempted: 1, current: 2, .. }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_approve_times_out_against_a_hung_peer() {
        let svc = LifecycleService::new(
            LifecycleConfig {
                admin_timeout: Duration::from_millis(200),
                query_timeout: Duration::from_millis(200),
            },
            Arc::new(StalledPeers),
            Arc::new(MockPeerNetwork::new(orgs())),
        );
        let pkg = ChaincodePackage::new("cc", 1, b"v1");
        let def = ChaincodeDefinition::initial("cc", &pkg, majority_policy());

        let err = svc.approve(&MspId::from("org1"), &def).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::Boundary(BoundaryError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_reapprove_identical_definition_is_a_noop() {
        let network = Arc::new(MockPeerNetwork::new(orgs()));
        let svc = service(network.clone());
        let pkg = svc.package("cc", 1, b"v1");
        let def = ChaincodeDefinition::initial("cc", &pkg, majority_policy());

        let org1 = MspId::from("org1");
        svc.approve(&org1, &def).await.unwrap();
        svc.approve(&org1, &def).await.unwrap();
        assert_eq!(network.approve_count(&org1), 1);
    }
}
