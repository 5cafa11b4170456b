//! In-memory peer bootstrap for tests.

use crate::ports::outbound::{Bootstrap, ConfigBlock};
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{BoundaryError, MspId, PeerNode};
use std::collections::BTreeSet;

/// Records channel joins; nodes can be flipped unreachable by name.
#[derive(Debug, Default)]
pub struct MockBootstrap {
    joined: RwLock<BTreeSet<(MspId, String)>>,
    unreachable: RwLock<BTreeSet<String>>,
}

impl MockBootstrap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_unreachable(&self, node_name: &str) {
        self.unreachable.write().insert(node_name.to_string());
    }

    pub fn has_joined(&self, msp_id: &MspId, node_name: &str) -> bool {
        self.joined
            .read()
            .contains(&(msp_id.clone(), node_name.to_string()))
    }

    pub fn join_count(&self) -> usize {
        self.joined.read().len()
    }
}

#[async_trait]
impl Bootstrap for MockBootstrap {
    async fn join_channel(
        &self,
        msp_id: &MspId,
        node: &PeerNode,
        _block: &ConfigBlock,
    ) -> Result<(), BoundaryError> {
        if self.unreachable.read().contains(&node.name) {
            return Err(BoundaryError::Unreachable {
                target: node.name.clone(),
                reason: "simulated outage".to_string(),
            });
        }
        self.joined
            .write()
            .insert((msp_id.clone(), node.name.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_01_channel_config::domain::tree::{BlockRef, ChannelConfig, ConfigNode};
    use shared_types::{ChannelId, Endpoint};

    fn block() -> ConfigBlock {
        let config = ChannelConfig {
            channel_id: ChannelId::new("mainchannel"),
            root: ConfigNode::group(),
        };
        ConfigBlock {
            reference: BlockRef {
                channel_id: config.channel_id.clone(),
                index: 0,
                config_version: 1,
            },
            config,
        }
    }

    #[tokio::test]
    async fn test_join_is_idempotent() {
        let bootstrap = MockBootstrap::new();
        let org1 = MspId::from("Org1MSP");
        let node = PeerNode::new("peer1.org1", Endpoint::new("peer1.org1.example.com", 7051));

        bootstrap.join_channel(&org1, &node, &block()).await.unwrap();
        bootstrap.join_channel(&org1, &node, &block()).await.unwrap();
        assert_eq!(bootstrap.join_count(), 1);
        assert!(bootstrap.has_joined(&org1, "peer1.org1"));
    }
}
