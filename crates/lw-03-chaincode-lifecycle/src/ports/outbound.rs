//! Outbound ports: per-organization peer administration and the
//! network-wide commit gateway.

use crate::domain::approval::ApprovalRecord;
use crate::domain::definition::{ChaincodeDefinition, ChaincodePackage, PackageId};
use crate::errors::LifecycleError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::entities::MspId;
use shared_types::errors::BoundaryError;

/// Administrative surface of one organization's peers.
///
/// Every call is addressed to a single organization and may fail at the
/// transport boundary; callers decide per call whether such a failure is
/// fatal or folds into an `Unknown` readiness entry.
#[async_trait]
pub trait OrgPeerAdmin: Send + Sync {
    /// Install `package` on the organization's peers. Installing an
    /// already-present package is a no-op on the peer side.
    async fn install(
        &self,
        msp_id: &MspId,
        package: &ChaincodePackage,
    ) -> Result<(), BoundaryError>;

    /// Package ids currently installed at the organization.
    async fn query_installed(&self, msp_id: &MspId) -> Result<Vec<PackageId>, BoundaryError>;

    /// Record the organization's approval of `definition`.
    ///
    /// The organization rejects the approval with
    /// [`LifecycleError::StaleSequence`] when it has already approved or
    /// observed a higher sequence for the same name.
    async fn approve(
        &self,
        msp_id: &MspId,
        definition: &ChaincodeDefinition,
    ) -> Result<(), LifecycleError>;

    /// The organization's current approval record for `name`, if any.
    async fn query_approval(
        &self,
        msp_id: &MspId,
        name: &str,
    ) -> Result<Option<ApprovalRecord>, BoundaryError>;
}

/// Outcome of a successful definition commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommittedDefinition {
    pub definition: ChaincodeDefinition,
    /// Organizations whose approvals endorsed the commit.
    pub endorsers: Vec<MspId>,
}

/// Finalizes a definition on the channel.
///
/// The gateway re-validates the endorsement policy against the approvals
/// it can see at commit time; a readiness check that passed earlier is
/// advisory, not binding.
#[async_trait]
pub trait CommitGateway: Send + Sync {
    async fn commit(
        &self,
        definition: &ChaincodeDefinition,
    ) -> Result<CommittedDefinition, LifecycleError>;

    /// The committed definition for `name`, if one exists.
    async fn query_committed(
        &self,
        name: &str,
    ) -> Result<Option<ChaincodeDefinition>, BoundaryError>;
}
