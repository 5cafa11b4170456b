//! # lw-01-channel-config
//!
//! Versioned channel-configuration tree and the Config Mutation Engine.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Typed config tree**: every node carries a `version: u64`; versions are
//!   the sole concurrency-control mechanism.
//! - **Config Mutation Engine**: computes the minimal `ConfigDelta` for a
//!   structured `TopologyChange` intent; pure over its inputs.
//! - **Genesis Builder**: constructs the initial tree for a channel from a
//!   `NetworkTopology`.
//! - **Translator port**: fetch/encode/decode boundary backed by an external
//!   protocol-translation service.
//!
//! ## Concurrency Discipline
//!
//! ```text
//! fetch(config @ vN) ──propose──→ ConfigDelta { read_set pins vN }
//!                                       │
//!                                       ▼
//!                    orderer re-checks every pin at submit time
//! ```
//!
//! A delta is advisory until submitted; staleness is detected at the commit
//! boundary, never prevented at fetch time.

pub mod adapters;
pub mod domain;
pub mod errors;
pub mod ports;
pub mod service;

pub use domain::delta::{ConfigDelta, WriteOp};
pub use domain::genesis::GenesisBuilder;
pub use domain::intent::TopologyChange;
pub use domain::path::{ConfigPath, Segment};
pub use domain::tree::{
    ApplyError, BlockRef, ChannelConfig, ConfigNode, ConfigValue, OrgConfig, OrgPolicies,
    PinMismatch,
};
pub use errors::{ConfigError, ConfigResult, TranslateError};
pub use ports::outbound::ConfigTranslator;
pub use service::MutationEngine;
