//! Domain module for the signature-quorum subsystem
//!
//! ## Core Modules
//! - envelope: mutation envelope lifecycle and deterministic signing bytes
//! - collector: collection-round state machine and policy evaluation

pub mod collector;
pub mod envelope;

pub use collector::{CollectionRound, CollectorState, SignerOutcome};
pub use envelope::{EnvelopeStatus, MutationEnvelope};
