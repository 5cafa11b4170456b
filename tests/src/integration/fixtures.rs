//! Shared fixtures: topologies, organizations, and fully wired stacks.

use lw_01_channel_config::GenesisBuilder;
use lw_02_signature_quorum::adapters::mock_signer::MockSigner;
use lw_04_submission::adapters::in_memory_orderer::InMemoryOrderer;
use lw_04_submission::adapters::mock_bootstrap::MockBootstrap;
use lw_runtime::workflows::ChannelGovernor;
use lw_runtime::GovernorConfig;
use shared_types::{
    AdminIdentityRef, ChannelId, Endpoint, MspId, NetworkTopology, Organization, PeerNode,
    PolicyRole,
};
use std::sync::Arc;
use std::time::Duration;

pub const CHANNEL: &str = "mainchannel";

/// An organization with one declared peer, which is also its anchor.
pub fn organization(n: u32) -> Organization {
    let id = MspId::from(format!("Org{n}MSP").as_str());
    Organization {
        id: id.clone(),
        display_name: format!("org{n}"),
        admin_identity_ref: AdminIdentityRef(format!("org{n}-admin")),
        endorsement_rule: PolicyRole::peer(id),
        nodes: vec![PeerNode::new(
            format!("peer1.org{n}"),
            Endpoint::new(format!("peer1.org{n}.example.com"), 7051),
        )],
        anchor_nodes: vec![format!("peer1.org{n}")],
    }
}

/// Two-organization bootstrap topology on `mainchannel`.
pub fn two_org_topology() -> NetworkTopology {
    NetworkTopology {
        channel_id: ChannelId::new(CHANNEL),
        orderer_msp: MspId::from("OrdererMSP"),
        orderers: vec![],
        organizations: vec![organization(1), organization(2)],
    }
}

/// Governor config with short deadlines so failure paths resolve quickly.
pub fn fast_config() -> GovernorConfig {
    GovernorConfig {
        collect_deadline: Duration::from_secs(2),
        readiness_attempts: 2,
        readiness_backoff: Duration::from_millis(10),
        ..GovernorConfig::default()
    }
}

/// A channel up and running from the two-organization genesis.
pub struct GovernanceStack {
    pub channel: ChannelId,
    pub orderer: Arc<InMemoryOrderer>,
    pub signer: Arc<MockSigner>,
    pub bootstrap: Arc<MockBootstrap>,
    pub governor: ChannelGovernor<InMemoryOrderer, MockSigner, InMemoryOrderer, MockBootstrap>,
}

impl GovernanceStack {
    pub fn bootstrap() -> Self {
        let topology = two_org_topology();
        let orderer = Arc::new(InMemoryOrderer::new());
        orderer.create_channel(
            GenesisBuilder::new()
                .build(&topology)
                .expect("genesis from a valid topology"),
        );
        let signer = Arc::new(MockSigner::new());
        let bootstrap = Arc::new(MockBootstrap::new());
        let governor = ChannelGovernor::new(
            fast_config(),
            orderer.clone(),
            signer.clone(),
            orderer.clone(),
            bootstrap.clone(),
        );
        Self {
            channel: topology.channel_id,
            orderer,
            signer,
            bootstrap,
            governor,
        }
    }
}
