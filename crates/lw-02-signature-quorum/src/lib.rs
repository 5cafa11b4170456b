//! # lw-02-signature-quorum
//!
//! Mutation envelopes and the Quorum Signature Collector.
//!
//! ## Overview
//!
//! A `MutationEnvelope` wraps a config delta while signatures are gathered
//! from mutually non-trusting organizations. The collector runs a small
//! state machine:
//!
//! ```text
//! DRAFTED ──first solicit──→ COLLECTING ──policy met──→ SATISFIED
//!                                 │
//!                                 └──deadline passed──→ TIMED_OUT
//! ```
//!
//! Signatures may arrive in any order; evaluation is commutative over
//! arrival order and idempotent, and duplicates from one organization are
//! last-write-wins. A timed-out round is abandoned: its read-set pins are
//! assumed stale and collection must restart from a fresh config fetch.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use domain::collector::{CollectionRound, CollectorState, SignerOutcome};
pub use domain::envelope::{EnvelopeStatus, MutationEnvelope};
pub use errors::{QuorumError, QuorumResult};
pub use ports::outbound::OrgSigner;
pub use service::{CollectorConfig, CollectorService};
