//! # Activation Flows
//!
//! Chaincode activation across organizations: install, approve, tri-state
//! readiness, and policy-gated commit (lw-03), orchestrated by lw-runtime.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::fast_config;
    use lw_03_chaincode_lifecycle::adapters::mock_org_node::MockPeerNetwork;
    use lw_03_chaincode_lifecycle::{
        ChaincodeDefinition, ChaincodePackage, LifecycleConfig, LifecycleError, LifecycleService,
        OrgPeerAdmin,
    };
    use lw_runtime::workflows::{ActivationCoordinator, WorkflowOutcome};
    use shared_types::{Approval, MspId, PolicyRole, SignaturePolicy};
    use std::sync::Arc;

    fn members() -> Vec<MspId> {
        vec![
            MspId::from("Org1MSP"),
            MspId::from("Org2MSP"),
            MspId::from("Org3MSP"),
        ]
    }

    fn majority_policy() -> SignaturePolicy {
        SignaturePolicy::majority_of(members().into_iter().map(PolicyRole::peer).collect())
    }

    fn network() -> Arc<MockPeerNetwork> {
        Arc::new(MockPeerNetwork::new(members()))
    }

    fn coordinator(
        network: Arc<MockPeerNetwork>,
    ) -> ActivationCoordinator<MockPeerNetwork, MockPeerNetwork> {
        ActivationCoordinator::new(fast_config(), network.clone(), network)
    }

    // =========================================================================
    // HAPPY PATHS
    // =========================================================================

    #[tokio::test]
    async fn test_full_approval_commits_with_all_endorsers() {
        let network = network();
        let outcome = coordinator(network.clone())
            .activate("asset-transfer", b"contract v1", majority_policy(), &members())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Committed(committed) => {
                assert_eq!(committed.definition.version, 1);
                assert_eq!(committed.definition.sequence, 1);
                assert_eq!(committed.endorsers.len(), 3);
            }
            other => panic!("expected commit, got {other:?}"),
        }
        assert!(network.committed("asset-transfer").is_some());
    }

    /// An unreachable organization reads as `Unknown`, which neither blocks
    /// a majority nor counts toward it.
    #[tokio::test]
    async fn test_majority_commits_while_one_org_is_down() {
        let network = network();
        network.set_unreachable(MspId::from("Org3MSP"));

        let outcome = coordinator(network.clone())
            .activate("asset-transfer", b"contract v1", majority_policy(), &members())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Committed(committed) => {
                assert_eq!(committed.endorsers.len(), 2);
                assert!(!committed.endorsers.contains(&MspId::from("Org3MSP")));
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    // =========================================================================
    // PENDING AND REFUSAL PATHS
    // =========================================================================

    /// With only one organization reachable, a two-of-three policy cannot
    /// be met; the workflow parks as pending, not rejected.
    #[tokio::test]
    async fn test_minority_approval_stays_pending() {
        let network = network();
        network.set_unreachable(MspId::from("Org2MSP"));
        network.set_unreachable(MspId::from("Org3MSP"));

        let outcome = coordinator(network.clone())
            .activate("asset-transfer", b"contract v1", majority_policy(), &members())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WorkflowOutcome::Pending {
                have: 1,
                required: 2
            }
        );
        assert!(network.committed("asset-transfer").is_none());

        // Once the others come back, a re-run completes the activation.
        network.set_reachable(&MspId::from("Org2MSP"));
        network.set_reachable(&MspId::from("Org3MSP"));
        let outcome = coordinator(network.clone())
            .activate("asset-transfer", b"contract v1", majority_policy(), &members())
            .await
            .unwrap();
        assert!(matches!(outcome, WorkflowOutcome::Committed(_)));
    }

    /// Approvals bind the exact package: an approval for different content
    /// is a refusal for the candidate definition, not a weaker yes.
    #[tokio::test]
    async fn test_approval_of_different_content_does_not_count() {
        let network = network();
        let service = LifecycleService::new(
            LifecycleConfig::default(),
            network.clone(),
            network.clone(),
        );

        let wanted = ChaincodePackage::new("cc", 1, b"audited build");
        let rogue = ChaincodePackage::new("cc", 1, b"unaudited build");
        let definition = ChaincodeDefinition::initial("cc", &wanted, majority_policy());
        let mut rogue_def = definition.clone();
        rogue_def.package_id = rogue.package_id.clone();

        service.approve(&MspId::from("Org1MSP"), &definition).await.unwrap();
        service.approve(&MspId::from("Org2MSP"), &rogue_def).await.unwrap();
        service.approve(&MspId::from("Org3MSP"), &rogue_def).await.unwrap();

        let readiness = service.check_readiness(&definition, &members()).await;
        assert_eq!(
            readiness.approvals.get(&MspId::from("Org1MSP")),
            Some(&Approval::Approved)
        );
        assert_eq!(
            readiness.approvals.get(&MspId::from("Org2MSP")),
            Some(&Approval::NotApproved)
        );
        assert!(!readiness.satisfied(&definition.endorsement_policy));

        network.install(&MspId::from("Org1MSP"), &wanted).await.unwrap();
        let err = service.commit(&definition).await.unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::PolicyNotSatisfied {
                approved: 1,
                required: 2,
                ..
            }
        ));
    }

    // =========================================================================
    // SEQUENCES AND UPGRADES
    // =========================================================================

    /// Re-activating with new content bumps both version and sequence; the
    /// chain accepts only the next sequence.
    #[tokio::test]
    async fn test_upgrade_advances_version_and_sequence() {
        let network = network();
        let coordinator = coordinator(network.clone());

        coordinator
            .activate("cc", b"v1", majority_policy(), &members())
            .await
            .unwrap();
        let outcome = coordinator
            .activate("cc", b"v2", majority_policy(), &members())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Committed(committed) => {
                assert_eq!(committed.definition.version, 2);
                assert_eq!(committed.definition.sequence, 2);
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }

    /// Re-activating identical content advances the sequence only.
    #[tokio::test]
    async fn test_recommit_of_same_content_keeps_version() {
        let network = network();
        let coordinator = coordinator(network.clone());

        coordinator
            .activate("cc", b"v1", majority_policy(), &members())
            .await
            .unwrap();
        let outcome = coordinator
            .activate("cc", b"v1", majority_policy(), &members())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Committed(committed) => {
                assert_eq!(committed.definition.version, 1);
                assert_eq!(committed.definition.sequence, 2);
            }
            other => panic!("expected commit, got {other:?}"),
        }
    }
}
