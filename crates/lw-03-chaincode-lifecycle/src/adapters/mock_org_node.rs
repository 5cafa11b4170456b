//! In-memory peer network for tests.
//!
//! One `MockPeerNetwork` plays every organization's peer admin surface and
//! the channel's commit gateway, so a single instance can stand in for the
//! whole network. Organizations can be flipped unreachable to exercise the
//! tri-state readiness paths.

use crate::domain::approval::ApprovalRecord;
use crate::domain::definition::{ChaincodeDefinition, ChaincodePackage, PackageId};
use crate::errors::LifecycleError;
use crate::ports::outbound::{CommitGateway, CommittedDefinition, OrgPeerAdmin};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::entities::MspId;
use shared_types::errors::BoundaryError;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default)]
struct OrgState {
    installed: BTreeSet<PackageId>,
    /// Latest approval per chaincode name.
    approvals: BTreeMap<String, ApprovalRecord>,
    install_calls: usize,
    approve_calls: usize,
}

#[derive(Debug, Default)]
struct NetworkState {
    orgs: BTreeMap<MspId, OrgState>,
    committed: BTreeMap<String, ChaincodeDefinition>,
    unreachable: BTreeSet<MspId>,
}

/// Whole-network mock implementing both lifecycle ports.
#[derive(Debug, Default)]
pub struct MockPeerNetwork {
    state: RwLock<NetworkState>,
}

impl MockPeerNetwork {
    pub fn new(organizations: Vec<MspId>) -> Self {
        let mut state = NetworkState::default();
        for msp in organizations {
            state.orgs.insert(msp, OrgState::default());
        }
        Self {
            state: RwLock::new(state),
        }
    }

    pub fn set_unreachable(&self, msp_id: MspId) {
        self.state.write().unreachable.insert(msp_id);
    }

    pub fn set_reachable(&self, msp_id: &MspId) {
        self.state.write().unreachable.remove(msp_id);
    }

    pub fn install_count(&self, msp_id: &MspId) -> usize {
        self.state
            .read()
            .orgs
            .get(msp_id)
            .map(|o| o.install_calls)
            .unwrap_or(0)
    }

    pub fn approve_count(&self, msp_id: &MspId) -> usize {
        self.state
            .read()
            .orgs
            .get(msp_id)
            .map(|o| o.approve_calls)
            .unwrap_or(0)
    }

    pub fn committed(&self, name: &str) -> Option<ChaincodeDefinition> {
        self.state.read().committed.get(name).cloned()
    }

    fn check_reachable(state: &NetworkState, msp_id: &MspId) -> Result<(), BoundaryError> {
        if state.unreachable.contains(msp_id) {
            return Err(BoundaryError::Unreachable {
                target: msp_id.to_string(),
                reason: "simulated outage".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl OrgPeerAdmin for MockPeerNetwork {
    async fn install(
        &self,
        msp_id: &MspId,
        package: &ChaincodePackage,
    ) -> Result<(), BoundaryError> {
        let mut state = self.state.write();
        Self::check_reachable(&state, msp_id)?;
        let org = state.orgs.entry(msp_id.clone()).or_default();
        org.install_calls += 1;
        org.installed.insert(package.package_id.clone());
        Ok(())
    }

    async fn query_installed(&self, msp_id: &MspId) -> Result<Vec<PackageId>, BoundaryError> {
        let state = self.state.read();
        Self::check_reachable(&state, msp_id)?;
        Ok(state
            .orgs
            .get(msp_id)
            .map(|o| o.installed.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn approve(
        &self,
        msp_id: &MspId,
        definition: &ChaincodeDefinition,
    ) -> Result<(), LifecycleError> {
        let mut state = self.state.write();
        Self::check_reachable(&state, msp_id)?;
        let org = state.orgs.entry(msp_id.clone()).or_default();

        if let Some(existing) = org.approvals.get(&definition.name) {
            if existing.sequence > definition.sequence {
                return Err(LifecycleError::StaleSequence {
                    name: definition.name.clone(),
                    attempted: definition.sequence,
                    current: existing.sequence,
                });
            }
        }

        org.approve_calls += 1;
        org.approvals.insert(
            definition.name.clone(),
            ApprovalRecord::for_definition(msp_id.clone(), definition),
        );
        Ok(())
    }

    async fn query_approval(
        &self,
        msp_id: &MspId,
        name: &str,
    ) -> Result<Option<ApprovalRecord>, BoundaryError> {
        let state = self.state.read();
        Self::check_reachable(&state, msp_id)?;
        Ok(state
            .orgs
            .get(msp_id)
            .and_then(|o| o.approvals.get(name))
            .cloned())
    }
}

#[async_trait]
impl CommitGateway for MockPeerNetwork {
    async fn commit(
        &self,
        definition: &ChaincodeDefinition,
    ) -> Result<CommittedDefinition, LifecycleError> {
        let mut state = self.state.write();

        let expected = state
            .committed
            .get(&definition.name)
            .map(|d| d.sequence + 1)
            .unwrap_or(1);
        if definition.sequence != expected {
            return Err(LifecycleError::StaleSequence {
                name: definition.name.clone(),
                attempted: definition.sequence,
                current: expected.saturating_sub(1),
            });
        }

        if !state
            .orgs
            .values()
            .any(|o| o.installed.contains(&definition.package_id))
        {
            return Err(LifecycleError::PackageNotInstalled {
                package_id: definition.package_id.to_string(),
            });
        }

        // Endorsements are whatever approvals are visible right now.
        let endorsers: BTreeSet<MspId> = state
            .orgs
            .iter()
            .filter(|(msp, org)| {
                !state.unreachable.contains(msp)
                    && org
                        .approvals
                        .get(&definition.name)
                        .map(|a| a.matches(definition))
                        .unwrap_or(false)
            })
            .map(|(msp, _)| msp.clone())
            .collect();

        if !definition.endorsement_policy.is_satisfied_by(&endorsers) {
            return Err(LifecycleError::PolicyNotSatisfied {
                name: definition.name.clone(),
                approved: endorsers.len(),
                required: definition.endorsement_policy.required(),
            });
        }

        state
            .committed
            .insert(definition.name.clone(), definition.clone());
        Ok(CommittedDefinition {
            definition: definition.clone(),
            endorsers: endorsers.into_iter().collect(),
        })
    }

    async fn query_committed(
        &self,
        name: &str,
    ) -> Result<Option<ChaincodeDefinition>, BoundaryError> {
        Ok(self.state.read().committed.get(name).cloned())
    }
}
