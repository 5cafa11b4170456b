//! # Core Domain Entities
//!
//! Defines the identity and topology model consumed by every subsystem.
//!
//! ## Clusters
//!
//! - **Identity**: `MspId`, `IdentityRole`, `AdminIdentityRef`
//! - **Topology**: `Organization`, `PeerNode`, `OrdererNode`, `NetworkTopology`
//! - **Addressing**: `ChannelId`, `Endpoint`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: IDENTITY
// =============================================================================

/// MSP identifier for an organization, unique within a channel.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MspId(pub String);

impl MspId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MspId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MspId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Role an identity holds inside its organization's MSP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum IdentityRole {
    /// Organization administrator; signs governance mutations.
    Admin,
    /// Endorsing node identity.
    Peer,
    /// Client application identity.
    Client,
    /// Any enrolled member of the organization.
    Member,
}

/// Reference to an organization's admin identity held by its external
/// credential store. Opaque to the protocol layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminIdentityRef(pub String);

/// An opaque signature produced by an organization's signing authority.
///
/// The protocol layer never inspects signature bytes; verification happens
/// at the ordering service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgSignature {
    /// Organization that produced the signature.
    pub msp_id: MspId,
    /// Raw signature bytes as returned by the signing boundary.
    pub bytes: Vec<u8>,
}

// =============================================================================
// CLUSTER B: TOPOLOGY
// =============================================================================

/// Logical channel identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChannelId(pub String);

impl ChannelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A network endpoint (host + port) for a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// A peer-like node belonging to an organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerNode {
    /// Node name, e.g. `peer1.org3`.
    pub name: String,
    /// Externally reachable endpoint.
    pub endpoint: Endpoint,
}

impl PeerNode {
    pub fn new(name: impl Into<String>, endpoint: Endpoint) -> Self {
        Self {
            name: name.into(),
            endpoint,
        }
    }
}

/// An ordering-service node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdererNode {
    pub name: String,
    /// General (consensus) endpoint.
    pub endpoint: Endpoint,
    /// Admin endpoint used for channel participation.
    pub admin_endpoint: Endpoint,
}

/// An organization participating in a channel.
///
/// Immutable once admitted to a channel except for its anchor-node list,
/// which is mutated only through a channel-config mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    /// MSP identifier, unique within the channel.
    pub id: MspId,
    /// Human-readable name, e.g. `org3`.
    pub display_name: String,
    /// Reference into the external credential store for the org admin.
    pub admin_identity_ref: AdminIdentityRef,
    /// Endorsement rule this organization contributes to chaincode policies.
    pub endorsement_rule: crate::policy::PolicyRole,
    /// All nodes declared by this organization.
    pub nodes: Vec<PeerNode>,
    /// Names of nodes designated as anchors; must be a subset of `nodes`.
    pub anchor_nodes: Vec<String>,
}

impl Organization {
    /// Look up a declared node by name.
    pub fn node(&self, name: &str) -> Option<&PeerNode> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Whether `name` is part of this organization's declared node set.
    pub fn declares_node(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    /// Resolved anchor endpoints, in declaration order.
    pub fn anchor_endpoints(&self) -> Vec<Endpoint> {
        self.anchor_nodes
            .iter()
            .filter_map(|name| self.node(name))
            .map(|n| n.endpoint.clone())
            .collect()
    }
}

/// Immutable description of the network participating in one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkTopology {
    /// Channel governed by this topology.
    pub channel_id: ChannelId,
    /// The orderer organization's MSP id.
    pub orderer_msp: MspId,
    /// Ordering-service nodes.
    pub orderers: Vec<OrdererNode>,
    /// Application organizations, in admission order.
    pub organizations: Vec<Organization>,
}

impl NetworkTopology {
    /// Look up an organization by MSP id.
    pub fn organization(&self, id: &MspId) -> Option<&Organization> {
        self.organizations.iter().find(|o| &o.id == id)
    }

    /// All application MSP ids, in admission order.
    pub fn msp_ids(&self) -> Vec<MspId> {
        self.organizations.iter().map(|o| o.id.clone()).collect()
    }
}
