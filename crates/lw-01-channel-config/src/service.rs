//! Config Mutation Engine - core business logic.
//!
//! `propose` is a pure function over the caller's last-known config snapshot
//! and a structured intent. The returned delta is not yet authoritative; the
//! ordering service re-validates every read-set pin at submit time.

use crate::domain::delta::{ConfigDelta, WriteOp};
use crate::domain::intent::TopologyChange;
use crate::domain::path::ConfigPath;
use crate::domain::tree::{ChannelConfig, ConfigValue, OrgConfig, OrgPolicies};
use crate::errors::{ConfigError, ConfigResult};
use shared_types::{Endpoint, Organization};
use tracing::debug;

/// Computes config deltas from topology-change intents.
///
/// Stateless; holds no view of the channel between calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MutationEngine;

impl MutationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Compute the minimal delta expressing `intent` against `current`.
    ///
    /// The write set holds only the paths the intent touches; every strict
    /// ancestor of every written path is pinned in the read set at its
    /// observed version, so any concurrent mutation under a shared ancestor
    /// surfaces as a conflict at submit time.
    pub fn propose(
        &self,
        current: &ChannelConfig,
        intent: &TopologyChange,
    ) -> ConfigResult<ConfigDelta> {
        let delta = match intent {
            TopologyChange::AddOrganization { org } => self.propose_add(current, org)?,
            TopologyChange::UpdateAnchorNodes { org, anchor_nodes } => {
                self.propose_anchor_update(current, org, anchor_nodes)?
            }
        };
        debug_assert!(delta.read_set_covers_ancestors());
        debug!(
            "[lw-01] proposed delta for {}: {} writes, {} pins",
            delta.channel_id,
            delta.write_set.len(),
            delta.read_set.len()
        );
        Ok(delta)
    }

    fn propose_add(&self, current: &ChannelConfig, org: &Organization) -> ConfigResult<ConfigDelta> {
        if current.organization_index(&org.id).is_some() {
            return Err(ConfigError::DuplicateOrganization {
                msp_id: org.id.clone(),
            });
        }
        let anchors = resolve_anchors(org, &org.anchor_nodes)?;

        let mut delta = ConfigDelta::new(current.channel_id.clone());
        let index = current.next_organization_index();
        let app_index = next_index_under(current, &ConfigPath::application_organizations());

        let entry = OrgConfig {
            msp_id: org.id.clone(),
            display_name: org.display_name.clone(),
            policies: OrgPolicies::standard(&org.id),
            anchors: anchors.clone(),
        };

        // New entries land in both the channel-level and the application
        // organization groups, mirroring each other.
        delta.write(
            ConfigPath::organization(index),
            WriteOp::new(1, ConfigValue::OrgDefinition(entry.clone())),
        );
        delta.write(
            ConfigPath::application_organization(app_index),
            WriteOp::new(1, ConfigValue::OrgDefinition(entry)),
        );

        // The bootstrap entry's aggregated anchor list gains the new
        // organization's anchors for cross-organization discovery.
        let agg_path = ConfigPath::anchor_peers(0);
        let (agg_version, mut aggregated) = read_anchor_list(current, &agg_path)?;
        aggregated.extend(anchors);
        delta.write(
            agg_path.clone(),
            WriteOp::new(agg_version + 1, ConfigValue::AnchorList(aggregated)),
        );

        self.pin_ancestors(current, &mut delta)?;
        Ok(delta)
    }

    fn propose_anchor_update(
        &self,
        current: &ChannelConfig,
        org: &Organization,
        anchor_nodes: &[String],
    ) -> ConfigResult<ConfigDelta> {
        let index = current
            .organization_index(&org.id)
            .ok_or_else(|| ConfigError::UnknownOrganization {
                msp_id: org.id.clone(),
            })?;
        let anchors = resolve_anchors(org, anchor_nodes)?;

        let mut delta = ConfigDelta::new(current.channel_id.clone());
        self.rewrite_entry_anchors(current, &mut delta, ConfigPath::organization(index), &anchors)?;
        if let Some(app_index) = application_index_of(current, org) {
            self.rewrite_entry_anchors(
                current,
                &mut delta,
                ConfigPath::application_organization(app_index),
                &anchors,
            )?;
        }
        self.pin_ancestors(current, &mut delta)?;
        Ok(delta)
    }

    fn rewrite_entry_anchors(
        &self,
        current: &ChannelConfig,
        delta: &mut ConfigDelta,
        path: ConfigPath,
        anchors: &[Endpoint],
    ) -> ConfigResult<()> {
        let node = current
            .node(&path)
            .ok_or_else(|| ConfigError::MissingPath { path: path.clone() })?;
        let mut entry = match &node.value {
            ConfigValue::OrgDefinition(org) => org.clone(),
            _ => return Err(ConfigError::MissingPath { path }),
        };
        entry.anchors = anchors.to_vec();
        delta.write(
            path,
            WriteOp::new(node.version + 1, ConfigValue::OrgDefinition(entry)),
        );
        Ok(())
    }

    /// Pin every strict ancestor of every written path at its observed
    /// version. Written paths that already exist are pinned too; paths being
    /// created have nothing to pin.
    fn pin_ancestors(&self, current: &ChannelConfig, delta: &mut ConfigDelta) -> ConfigResult<()> {
        let writes: Vec<ConfigPath> = delta.write_set.keys().cloned().collect();
        for path in writes {
            if let Some(version) = current.version_of(&path) {
                delta.pin(path.clone(), version);
            }
            for ancestor in path.ancestors() {
                let version = current.version_of(&ancestor).ok_or_else(|| {
                    ConfigError::MissingPath {
                        path: ancestor.clone(),
                    }
                })?;
                delta.pin(ancestor, version);
            }
        }
        Ok(())
    }
}

fn read_anchor_list(
    current: &ChannelConfig,
    path: &ConfigPath,
) -> ConfigResult<(u64, Vec<Endpoint>)> {
    let node = current
        .node(path)
        .ok_or_else(|| ConfigError::MissingPath { path: path.clone() })?;
    match &node.value {
        ConfigValue::AnchorList(list) => Ok((node.version, list.clone())),
        _ => Err(ConfigError::MissingPath { path: path.clone() }),
    }
}

fn resolve_anchors(org: &Organization, anchor_nodes: &[String]) -> ConfigResult<Vec<Endpoint>> {
    anchor_nodes
        .iter()
        .map(|name| {
            org.node(name)
                .map(|n| n.endpoint.clone())
                .ok_or_else(|| ConfigError::InvalidAnchor {
                    msp_id: org.id.clone(),
                    node: name.clone(),
                })
        })
        .collect()
}

fn next_index_under(current: &ChannelConfig, group: &ConfigPath) -> u64 {
    use crate::domain::path::Segment;
    current
        .node(group)
        .map(|node| {
            node.children
                .keys()
                .filter_map(|seg| match seg {
                    Segment::Index(i) => Some(i + 1),
                    Segment::Name(_) => None,
                })
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0)
}

fn application_index_of(current: &ChannelConfig, org: &Organization) -> Option<u64> {
    use crate::domain::path::Segment;
    let group = current.node(&ConfigPath::application_organizations())?;
    group.children.iter().find_map(|(seg, node)| {
        match (seg, &node.value) {
            (Segment::Index(i), ConfigValue::OrgDefinition(def)) if def.msp_id == org.id => {
                Some(*i)
            }
            _ => None,
        }
    })
}
