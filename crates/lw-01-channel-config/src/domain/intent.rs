//! Structured topology-change intents.

use serde::{Deserialize, Serialize};
use shared_types::Organization;

/// What the operator wants to change about the channel's topology.
///
/// An intent names organizations and nodes structurally; the Config Mutation
/// Engine translates it into the minimal `ConfigDelta`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TopologyChange {
    /// Admit a new organization into the channel, with its declared nodes and
    /// anchor list. The bootstrap entry's aggregated anchor list gains the
    /// new organization's anchors so existing members can discover it.
    AddOrganization { org: Organization },

    /// Replace an admitted organization's anchor-node list.
    UpdateAnchorNodes {
        org: Organization,
        anchor_nodes: Vec<String>,
    },
}

impl TopologyChange {
    /// The organization this intent is about.
    pub fn subject(&self) -> &Organization {
        match self {
            Self::AddOrganization { org } => org,
            Self::UpdateAnchorNodes { org, .. } => org,
        }
    }
}
