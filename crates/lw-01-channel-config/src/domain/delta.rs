//! Read-set/write-set patches against the config tree.
//!
//! A delta asserts the versions it observed (`read_set`) and the minimal set
//! of nodes it rewrites (`write_set`). Paths outside the write set are never
//! rewritten; they are pinned at their observed version instead, so any
//! concurrent mutation under a shared ancestor is detected at submit time.

use crate::domain::path::ConfigPath;
use crate::domain::tree::ConfigValue;
use serde::{Deserialize, Serialize};
use shared_types::ChannelId;
use std::collections::BTreeMap;

/// A single write: the version the node will carry and its new value.
///
/// New nodes enter at version 1; rewrites carry observed version + 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteOp {
    pub version: u64,
    pub value: ConfigValue,
}

impl WriteOp {
    pub fn new(version: u64, value: ConfigValue) -> Self {
        Self { version, value }
    }
}

/// A structural patch to one channel's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDelta {
    pub channel_id: ChannelId,
    /// Observed versions; every entry is re-checked at submit time.
    pub read_set: BTreeMap<ConfigPath, u64>,
    /// Nodes this delta rewrites or creates.
    pub write_set: BTreeMap<ConfigPath, WriteOp>,
}

impl ConfigDelta {
    pub fn new(channel_id: ChannelId) -> Self {
        Self {
            channel_id,
            read_set: BTreeMap::new(),
            write_set: BTreeMap::new(),
        }
    }

    /// Pin a path at its observed version.
    pub fn pin(&mut self, path: ConfigPath, version: u64) {
        self.read_set.insert(path, version);
    }

    /// Record a write.
    pub fn write(&mut self, path: ConfigPath, op: WriteOp) {
        self.write_set.insert(path, op);
    }

    /// Whether the read set pins every strict ancestor of every written path.
    ///
    /// Engine-produced deltas always hold this; the orderer rejects deltas
    /// that do not, since unpinned ancestors would allow silent interleaving.
    pub fn read_set_covers_ancestors(&self) -> bool {
        self.write_set.keys().all(|path| {
            path.ancestors()
                .iter()
                .all(|ancestor| self.read_set.contains_key(ancestor))
        })
    }

    /// Whether any written path overlaps (equals or nests under) a path
    /// written by `other`.
    pub fn overlaps(&self, other: &ConfigDelta) -> bool {
        self.write_set.keys().any(|p| {
            other
                .write_set
                .keys()
                .any(|q| p.starts_with(q) || q.starts_with(p))
        })
    }
}
