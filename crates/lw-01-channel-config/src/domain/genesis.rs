//! Initial channel-config construction from a network topology.
//!
//! Builds the tree an operator would otherwise assemble by hand before the
//! genesis block is produced: the bootstrap (orderer) entry at index 0 with
//! the aggregated anchor list, one entry per application organization in
//! both the channel-level and application groups, and the consenter list.

use crate::domain::path::Segment;
use crate::domain::tree::{ChannelConfig, ConfigNode, ConfigValue, OrgConfig, OrgPolicies};
use crate::errors::{ConfigError, ConfigResult};
use shared_types::{Endpoint, NetworkTopology, Organization, SignaturePolicy};
use std::collections::BTreeSet;
use tracing::info;

/// Builds the initial `ChannelConfig` for a topology.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenesisBuilder;

impl GenesisBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Construct the genesis tree. Every node starts at version 1.
    ///
    /// Fails with `DuplicateOrganization` on MSP-id collisions and with
    /// `InvalidAnchor` when an organization designates an undeclared node.
    pub fn build(&self, topology: &NetworkTopology) -> ConfigResult<ChannelConfig> {
        let mut seen: BTreeSet<&str> = BTreeSet::new();
        for org in &topology.organizations {
            if !seen.insert(org.id.as_str()) {
                return Err(ConfigError::DuplicateOrganization {
                    msp_id: org.id.clone(),
                });
            }
            for anchor in &org.anchor_nodes {
                if !org.declares_node(anchor) {
                    return Err(ConfigError::InvalidAnchor {
                        msp_id: org.id.clone(),
                        node: anchor.clone(),
                    });
                }
            }
        }

        let mut root = ConfigNode::group();

        // Channel-level organization group. Entry 0 is the bootstrap
        // (orderer) entry; it carries the aggregated anchor list of every
        // admitted organization as a child node.
        let mut orgs_group = ConfigNode::group();
        let mut bootstrap = ConfigNode::new(ConfigValue::OrgDefinition(OrgConfig {
            msp_id: topology.orderer_msp.clone(),
            display_name: "orderer".to_string(),
            policies: OrgPolicies::standard(&topology.orderer_msp),
            anchors: Vec::new(),
        }));
        let aggregated: Vec<Endpoint> = topology
            .organizations
            .iter()
            .flat_map(|o| o.anchor_endpoints())
            .collect();
        bootstrap.children.insert(
            Segment::name("AnchorPeers"),
            ConfigNode::new(ConfigValue::AnchorList(aggregated)),
        );
        orgs_group.children.insert(Segment::Index(0), bootstrap);

        let mut app_orgs_group = ConfigNode::group();
        for (i, org) in topology.organizations.iter().enumerate() {
            let entry = org_entry(org);
            orgs_group.children.insert(
                Segment::Index(i as u64 + 1),
                ConfigNode::new(ConfigValue::OrgDefinition(entry.clone())),
            );
            app_orgs_group.children.insert(
                Segment::Index(i as u64),
                ConfigNode::new(ConfigValue::OrgDefinition(entry)),
            );
        }

        let mut application = ConfigNode::group();
        application
            .children
            .insert(Segment::name("Organizations"), app_orgs_group);

        let mut orderer_group = ConfigNode::group();
        let consenters: Vec<Endpoint> =
            topology.orderers.iter().map(|o| o.endpoint.clone()).collect();
        orderer_group.children.insert(
            Segment::name("Consenters"),
            ConfigNode::new(ConfigValue::ConsenterList(consenters)),
        );

        root.children.insert(Segment::name("Organizations"), orgs_group);
        root.children.insert(Segment::name("Application"), application);
        root.children.insert(Segment::name("Orderer"), orderer_group);

        let config = ChannelConfig {
            channel_id: topology.channel_id.clone(),
            root,
        };
        info!(
            "[lw-01] built genesis config for {} with {} organizations (modification policy: {}-of-{})",
            config.channel_id,
            topology.organizations.len(),
            config.modification_policy().required(),
            match config.modification_policy() {
                SignaturePolicy::NOutOf { roles, .. } => roles.len(),
                SignaturePolicy::AllOf(roles) => roles.len(),
            }
        );
        Ok(config)
    }
}

fn org_entry(org: &Organization) -> OrgConfig {
    OrgConfig {
        msp_id: org.id.clone(),
        display_name: org.display_name.clone(),
        policies: OrgPolicies::standard(&org.id),
        anchors: org.anchor_endpoints(),
    }
}
