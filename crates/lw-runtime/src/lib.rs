//! # Runtime Library
//!
//! Wires the governance subsystems together and exposes the two end-to-end
//! workflows operators actually run:
//!
//! - **Organization admission**: fetch the live channel config, propose the
//!   membership delta, collect the signature quorum, submit, and join the
//!   new organization's peers from the resulting config block.
//! - **Chaincode activation**: package, install and approve across
//!   organizations, poll commit readiness, and commit once the endorsement
//!   policy is met.
//!
//! Both workflows speak only through the subsystem ports, so the same code
//! drives the in-memory adapters in tests and real collaborators in
//! production wiring.

pub mod config;
pub mod telemetry;
pub mod workflows;

pub use config::GovernorConfig;
pub use workflows::{ActivationCoordinator, ChannelGovernor, WorkflowOutcome};
