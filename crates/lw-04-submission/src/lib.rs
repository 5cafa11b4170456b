//! # lw-04-submission
//!
//! The last mile of a channel mutation: a signed envelope is handed to the
//! ordering service, which re-verifies the signature quorum and the
//! envelope's read-set pins against the live configuration before applying
//! the write set and cutting a new config block.
//!
//! Staleness is detected here, at submit time, not at proposal time: two
//! envelopes drafted from the same snapshot can both collect their
//! signatures, but only the first to submit lands. The second fails with a
//! conflict and must be rebuilt from a fresh fetch.
//!
//! The crate also carries the bootstrap path: joining peer nodes to a
//! channel from a config block, both for a freshly admitted organization
//! and for a new network coming up from its genesis block.

pub mod adapters;
pub mod errors;
pub mod ports;
pub mod service;

pub use errors::{SubmitError, SubmitResult};
pub use ports::outbound::{BlockQuery, Bootstrap, ConfigBlock, OrderingService};
pub use service::{SubmissionConfig, SubmissionGateway, SubmitOutcome};
