//! Domain module for the channel-config subsystem
//!
//! ## Core Modules
//! - path: stable path identifiers into the config tree
//! - tree: versioned config tree and typed node values
//! - delta: read-set/write-set patches under optimistic concurrency
//! - intent: structured topology-change intents
//! - genesis: initial tree construction from a topology

pub mod delta;
pub mod genesis;
pub mod intent;
pub mod path;
pub mod tree;

pub use delta::{ConfigDelta, WriteOp};
pub use genesis::GenesisBuilder;
pub use intent::TopologyChange;
pub use path::{ConfigPath, Segment};
pub use tree::{ChannelConfig, ConfigNode, ConfigValue, OrgConfig, OrgPolicies};
