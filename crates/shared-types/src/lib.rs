//! # Shared Types Crate
//!
//! This crate contains the domain entities, the signature-policy grammar, and
//! the error taxonomy shared across all LedgerWeave subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Immutable Topology**: `NetworkTopology` and `Organization` are values
//!   passed by parameter; no process-wide mutable singletons.
//! - **Typed Policies**: quorum rules are structural (`SignaturePolicy`), not
//!   policy-expression strings parsed at evaluation time.

pub mod entities;
pub mod errors;
pub mod policy;

pub use entities::*;
pub use errors::*;
pub use policy::*;
