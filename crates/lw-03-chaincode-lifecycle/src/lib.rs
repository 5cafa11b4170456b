//! # lw-03-chaincode-lifecycle
//!
//! Activation state machine for deployed ledger programs ("chaincode").
//! A package moves through the phases
//!
//! ```text
//!   PACKAGED ──> INSTALLED ──> APPROVED ──> READY ──> COMMITTED
//!                                 │
//!                                 └──> REJECTED
//! ```
//!
//! where INSTALLED and APPROVED are tracked *per organization* and READY
//! means the set of approvals satisfies the channel's endorsement policy.
//! Approvals bind the exact `(version, sequence, package_id)` triple; an
//! approval for any other triple does not count toward readiness.
//!
//! The [`LifecycleService`] drives the fan-out across organizations through
//! the [`OrgPeerAdmin`] port and finalizes activation through the
//! [`CommitGateway`] port.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use domain::approval::ApprovalRecord;
pub use domain::definition::{ActivationPhase, ChaincodeDefinition, ChaincodePackage, PackageId};
pub use domain::readiness::CommitReadiness;
pub use errors::{LifecycleError, LifecycleResult};
pub use ports::outbound::{CommitGateway, CommittedDefinition, OrgPeerAdmin};
pub use service::{LifecycleConfig, LifecycleService};
