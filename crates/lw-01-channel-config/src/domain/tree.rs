//! Versioned channel-configuration tree.
//!
//! Every node carries a `version` incremented on each successful mutation to
//! that node. Versions are monotonically non-decreasing and are the sole
//! concurrency-control mechanism: no node may be overwritten unless the
//! mutator's observed version equals the node's current stored version.

use crate::domain::delta::ConfigDelta;
use crate::domain::path::{ConfigPath, Segment};
use serde::{Deserialize, Serialize};
use shared_types::{ChannelId, Endpoint, MspId, PolicyRole, SignaturePolicy};
use std::collections::{BTreeMap, BTreeSet};

/// Per-organization policy set carried in its config entry.
///
/// These are the typed form of the `Readers`/`Writers`/`Admins`/`Endorsement`
/// signature rules every organization declares when it joins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgPolicies {
    pub readers: SignaturePolicy,
    pub writers: SignaturePolicy,
    pub admins: SignaturePolicy,
    pub endorsement: SignaturePolicy,
}

impl OrgPolicies {
    /// Standard policy set for an organization: any identity reads, admins
    /// and clients write, only the admin administrates, only peers endorse.
    pub fn standard(msp_id: &MspId) -> Self {
        Self {
            readers: SignaturePolicy::NOutOf {
                n: 1,
                roles: vec![
                    PolicyRole::admin(msp_id.clone()),
                    PolicyRole::peer(msp_id.clone()),
                    PolicyRole {
                        msp_id: msp_id.clone(),
                        role: shared_types::IdentityRole::Client,
                    },
                ],
            },
            writers: SignaturePolicy::NOutOf {
                n: 1,
                roles: vec![
                    PolicyRole::admin(msp_id.clone()),
                    PolicyRole {
                        msp_id: msp_id.clone(),
                        role: shared_types::IdentityRole::Client,
                    },
                ],
            },
            admins: SignaturePolicy::AllOf(vec![PolicyRole::admin(msp_id.clone())]),
            endorsement: SignaturePolicy::AllOf(vec![PolicyRole::peer(msp_id.clone())]),
        }
    }
}

/// The definition value stored at an `Organizations[i]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgConfig {
    pub msp_id: MspId,
    pub display_name: String,
    pub policies: OrgPolicies,
    /// This organization's own anchor endpoints.
    pub anchors: Vec<Endpoint>,
}

/// Typed value carried by a tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigValue {
    /// Interior grouping node with no value of its own.
    Group,
    /// An organization's definition entry.
    OrgDefinition(OrgConfig),
    /// Aggregated anchor endpoints for cross-organization discovery.
    AnchorList(Vec<Endpoint>),
    /// Ordering-service consenter endpoints.
    ConsenterList(Vec<Endpoint>),
}

/// One node of the config tree: a version, a value, and named children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigNode {
    pub version: u64,
    pub value: ConfigValue,
    pub children: BTreeMap<Segment, ConfigNode>,
}

impl ConfigNode {
    pub fn new(value: ConfigValue) -> Self {
        Self {
            version: 1,
            value,
            children: BTreeMap::new(),
        }
    }

    pub fn group() -> Self {
        Self::new(ConfigValue::Group)
    }

    fn get(&self, segments: &[Segment]) -> Option<&ConfigNode> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(head)?.get(rest),
        }
    }

    fn get_mut(&mut self, segments: &[Segment]) -> Option<&mut ConfigNode> {
        match segments.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get_mut(head)?.get_mut(rest),
        }
    }
}

/// A reference to the config block produced by a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockRef {
    pub channel_id: ChannelId,
    /// Block index in the channel's chain.
    pub index: u64,
    /// Config version the block carries (root version after apply).
    pub config_version: u64,
}

/// The channel configuration as a versioned tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel_id: ChannelId,
    pub root: ConfigNode,
}

impl ChannelConfig {
    /// Config version: the root node's version.
    pub fn version(&self) -> u64 {
        self.root.version
    }

    pub fn node(&self, path: &ConfigPath) -> Option<&ConfigNode> {
        self.root.get(path.segments())
    }

    pub fn version_of(&self, path: &ConfigPath) -> Option<u64> {
        self.node(path).map(|n| n.version)
    }

    /// Organization entries under `Organizations`, in index order.
    pub fn organization_entries(&self) -> Vec<(u64, &OrgConfig)> {
        let mut out = Vec::new();
        if let Some(group) = self.node(&ConfigPath::organizations()) {
            for (seg, node) in &group.children {
                if let (Segment::Index(i), ConfigValue::OrgDefinition(org)) = (seg, &node.value) {
                    out.push((*i, org));
                }
            }
        }
        out
    }

    /// Index of the entry holding `msp_id`, if admitted.
    pub fn organization_index(&self, msp_id: &MspId) -> Option<u64> {
        self.organization_entries()
            .into_iter()
            .find(|(_, org)| &org.msp_id == msp_id)
            .map(|(i, _)| i)
    }

    /// Next free index under `Organizations`.
    pub fn next_organization_index(&self) -> u64 {
        self.organization_entries()
            .into_iter()
            .map(|(i, _)| i + 1)
            .max()
            .unwrap_or(0)
    }

    /// The channel's modification policy: a majority of the admins of the
    /// application organizations currently admitted.
    ///
    /// Computed from the live tree rather than stored, so membership changes
    /// take effect on the next evaluation.
    pub fn modification_policy(&self) -> SignaturePolicy {
        let mut roles = Vec::new();
        if let Some(group) = self.node(&ConfigPath::application_organizations()) {
            for node in group.children.values() {
                if let ConfigValue::OrgDefinition(org) = &node.value {
                    roles.push(PolicyRole::admin(org.msp_id.clone()));
                }
            }
        }
        SignaturePolicy::majority_of(roles)
    }

    /// Check every read-set pin against the live tree.
    ///
    /// Returns the first mismatching path with (pinned, live) versions. A
    /// pin on a path that no longer exists is a mismatch (live = None).
    pub fn verify_read_set(&self, delta: &ConfigDelta) -> Result<(), PinMismatch> {
        for (path, pinned) in &delta.read_set {
            let live = self.version_of(path);
            if live != Some(*pinned) {
                return Err(PinMismatch {
                    path: path.clone(),
                    pinned: *pinned,
                    live,
                });
            }
        }
        Ok(())
    }

    /// Apply a delta's write set, bumping each strict ancestor of every
    /// written path exactly once.
    ///
    /// The caller must have verified the read set first; this method is the
    /// mechanical mutation only. Fails without partial effect if a written
    /// path's parent does not exist or the root itself is written.
    pub fn apply(&mut self, delta: &ConfigDelta) -> Result<(), ApplyError> {
        for path in delta.write_set.keys() {
            let parent = path.parent().ok_or(ApplyError::RootWrite)?;
            // A parent created by the same write set satisfies the check;
            // BTreeMap ordering guarantees it is inserted before its child.
            if self.node(&parent).is_none() && !delta.write_set.contains_key(&parent) {
                return Err(ApplyError::MissingParent { path: path.clone() });
            }
        }
        let mut bumped: BTreeSet<ConfigPath> = BTreeSet::new();
        for (path, write) in &delta.write_set {
            // Both lookups checked above.
            let parent = path.parent().ok_or(ApplyError::RootWrite)?;
            let last = match path.segments().last() {
                Some(seg) => seg.clone(),
                None => return Err(ApplyError::RootWrite),
            };
            let parent_node = self
                .root
                .get_mut(parent.segments())
                .ok_or(ApplyError::MissingParent { path: path.clone() })?;
            match parent_node.children.get_mut(&last) {
                Some(existing) => {
                    existing.version = write.version;
                    existing.value = write.value.clone();
                }
                None => {
                    let mut node = ConfigNode::new(write.value.clone());
                    node.version = write.version;
                    parent_node.children.insert(last, node);
                }
            }
            for ancestor in path.ancestors() {
                // Written ancestors keep their recorded write version.
                if delta.write_set.contains_key(&ancestor) {
                    continue;
                }
                if bumped.insert(ancestor.clone()) {
                    if let Some(node) = self.root.get_mut(ancestor.segments()) {
                        node.version += 1;
                    }
                }
            }
        }
        Ok(())
    }
}

/// A read-set pin that no longer matches the live tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinMismatch {
    pub path: ConfigPath,
    pub pinned: u64,
    pub live: Option<u64>,
}

/// Structural failure applying a write set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApplyError {
    /// The channel root cannot be written directly.
    #[error("Write set may not address the channel root")]
    RootWrite,

    /// A written path's parent is absent from the tree.
    #[error("Missing parent for written path {path}")]
    MissingParent { path: ConfigPath },
}
