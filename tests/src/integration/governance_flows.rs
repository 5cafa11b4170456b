//! # Governance Flows
//!
//! End-to-end channel-config mutations across the subsystems: the mutation
//! engine (lw-01), the signature collector (lw-02), and the submission
//! gateway with the in-memory orderer (lw-04), orchestrated by lw-runtime.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{organization, GovernanceStack};
    use lw_01_channel_config::{ConfigPath, MutationEngine, TopologyChange};
    use lw_02_signature_quorum::MutationEnvelope;
    use lw_04_submission::{SubmissionGateway, SubmitError};
    use lw_runtime::workflows::WorkflowOutcome;
    use shared_types::{Classify, ErrorClass, MspId, OrgSignature};
    use std::collections::BTreeSet;

    fn sign_all(envelope: &mut MutationEnvelope, msps: &[&str]) {
        for msp in msps {
            envelope.record_signature(OrgSignature {
                msp_id: MspId::from(*msp),
                bytes: format!("sig/{msp}").into_bytes(),
            });
        }
    }

    // =========================================================================
    // ADMISSION
    // =========================================================================

    /// An admission delta touches exactly the entry being added (in both
    /// organization groups) and the aggregated anchor list; every strict
    /// ancestor is pinned.
    #[tokio::test]
    async fn test_admission_delta_touches_minimal_paths() {
        let stack = GovernanceStack::bootstrap();
        let config = stack.orderer.current_config(&stack.channel).unwrap();

        let delta = MutationEngine::new()
            .propose(
                &config,
                &TopologyChange::AddOrganization {
                    org: organization(3),
                },
            )
            .unwrap();

        let written: BTreeSet<String> =
            delta.write_set.keys().map(|p| p.to_string()).collect();
        let expected: BTreeSet<String> = [
            "Organizations[3]",
            "Application.Organizations[2]",
            "Organizations[0].AnchorPeers",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        assert_eq!(written, expected);

        // Ancestors of every written path are pinned at observed versions.
        assert!(delta.read_set_covers_ancestors());
        assert_eq!(
            delta.read_set.get(&ConfigPath::organizations()),
            Some(&config.version_of(&ConfigPath::organizations()).unwrap())
        );
        assert_eq!(
            delta.read_set.get(&ConfigPath::root()),
            Some(&config.version())
        );
    }

    #[tokio::test]
    async fn test_admission_end_to_end_updates_policy_and_joins_peers() {
        let stack = GovernanceStack::bootstrap();

        let before = stack.orderer.current_config(&stack.channel).unwrap();
        assert_eq!(before.modification_policy().required(), 2);

        let outcome = stack
            .governor
            .admit_organization(&stack.channel, &organization(3))
            .await
            .unwrap();
        let block = match outcome {
            WorkflowOutcome::Committed(block) => block,
            other => panic!("expected commit, got {other:?}"),
        };
        assert_eq!(block.index, 1);

        let after = stack.orderer.current_config(&stack.channel).unwrap();
        assert!(after.version() > before.version());
        assert!(after.organization_index(&MspId::from("Org3MSP")).is_some());
        // Majority of three admins is still two.
        assert_eq!(after.modification_policy().required(), 2);
        assert!(stack
            .bootstrap
            .has_joined(&MspId::from("Org3MSP"), "peer1.org3"));
    }

    #[tokio::test]
    async fn test_admission_without_quorum_stays_pending() {
        let stack = GovernanceStack::bootstrap();
        stack.signer.set_unavailable(&MspId::from("Org2MSP"));

        let outcome = stack
            .governor
            .admit_organization(&stack.channel, &organization(3))
            .await
            .unwrap();
        assert_eq!(
            outcome,
            WorkflowOutcome::Pending {
                have: 1,
                required: 2
            }
        );

        // Nothing landed; the channel still has two organizations.
        let config = stack.orderer.current_config(&stack.channel).unwrap();
        assert!(config.organization_index(&MspId::from("Org3MSP")).is_none());
    }

    #[tokio::test]
    async fn test_admitting_an_existing_org_is_rejected() {
        let stack = GovernanceStack::bootstrap();
        let outcome = stack
            .governor
            .admit_organization(&stack.channel, &organization(1))
            .await
            .unwrap();
        assert!(matches!(outcome, WorkflowOutcome::Rejected { .. }));
    }

    // =========================================================================
    // ANCHOR UPDATES
    // =========================================================================

    #[tokio::test]
    async fn test_anchor_update_lands_without_membership_change() {
        let stack = GovernanceStack::bootstrap();
        let mut org1 = organization(1);
        org1.nodes.push(shared_types::PeerNode::new(
            "peer2.org1",
            shared_types::Endpoint::new("peer2.org1.example.com", 7051),
        ));

        let outcome = stack
            .governor
            .update_anchor_nodes(&stack.channel, &org1, vec!["peer2.org1".to_string()])
            .await
            .unwrap();
        assert!(matches!(outcome, WorkflowOutcome::Committed(_)));

        let config = stack.orderer.current_config(&stack.channel).unwrap();
        assert!(config.organization_index(&MspId::from("Org1MSP")).is_some());
        assert_eq!(config.modification_policy().required(), 2);
    }

    // =========================================================================
    // OPTIMISTIC CONCURRENCY
    // =========================================================================

    /// Two mutations drafted from the same snapshot: the intents write
    /// disjoint paths, but they share pinned ancestors, so the second
    /// submission conflicts and must be rebuilt from a fresh fetch.
    #[tokio::test]
    async fn test_second_mutation_from_same_snapshot_conflicts() {
        let stack = GovernanceStack::bootstrap();
        let gateway = SubmissionGateway::new(
            Default::default(),
            stack.orderer.clone(),
            stack.bootstrap.clone(),
        );
        let engine = MutationEngine::new();
        let snapshot = stack.orderer.current_config(&stack.channel).unwrap();

        let intent_a = TopologyChange::AddOrganization {
            org: organization(3),
        };
        let intent_b = TopologyChange::AddOrganization {
            org: organization(4),
        };
        let mut first = MutationEnvelope::new(engine.propose(&snapshot, &intent_a).unwrap());
        let mut second = MutationEnvelope::new(engine.propose(&snapshot, &intent_b).unwrap());
        sign_all(&mut first, &["Org1MSP", "Org2MSP"]);
        sign_all(&mut second, &["Org1MSP", "Org2MSP"]);

        gateway.submit(&mut first).await.unwrap();

        let err = gateway.submit(&mut second).await.unwrap_err();
        assert_eq!(err.class(), ErrorClass::Conflict);

        // Rebuilt from the fresh snapshot, the second intent lands.
        let fresh = stack.orderer.current_config(&stack.channel).unwrap();
        let mut rebuilt = MutationEnvelope::new(engine.propose(&fresh, &intent_b).unwrap());
        sign_all(&mut rebuilt, &["Org1MSP", "Org2MSP"]);
        let outcome = gateway.submit(&mut rebuilt).await.unwrap();
        assert_eq!(outcome.block.index, 2);
    }

    /// The governor resolves such conflicts itself by refetching.
    #[tokio::test]
    async fn test_governor_retries_through_conflicts() {
        let stack = GovernanceStack::bootstrap();

        let a = stack
            .governor
            .admit_organization(&stack.channel, &organization(3))
            .await
            .unwrap();
        let b = stack
            .governor
            .admit_organization(&stack.channel, &organization(4))
            .await
            .unwrap();
        assert!(matches!(a, WorkflowOutcome::Committed(_)));
        assert!(matches!(b, WorkflowOutcome::Committed(_)));

        let config = stack.orderer.current_config(&stack.channel).unwrap();
        assert!(config.organization_index(&MspId::from("Org4MSP")).is_some());
        // Majority of four admins is three.
        assert_eq!(config.modification_policy().required(), 3);
    }

    // =========================================================================
    // QUORUM EVALUATION AT SUBMIT
    // =========================================================================

    /// Signatures from organizations outside the modification policy never
    /// count toward the quorum.
    #[tokio::test]
    async fn test_outside_signatures_never_satisfy_the_quorum() {
        let stack = GovernanceStack::bootstrap();
        let gateway = SubmissionGateway::new(
            Default::default(),
            stack.orderer.clone(),
            stack.bootstrap.clone(),
        );
        let snapshot = stack.orderer.current_config(&stack.channel).unwrap();
        let mut envelope = MutationEnvelope::new(
            MutationEngine::new()
                .propose(
                    &snapshot,
                    &TopologyChange::AddOrganization {
                        org: organization(3),
                    },
                )
                .unwrap(),
        );
        sign_all(&mut envelope, &["Org1MSP", "MalloryMSP", "EveMSP"]);

        let err = gateway.submit(&mut envelope).await.unwrap_err();
        assert!(matches!(
            err,
            SubmitError::QuorumNotMet {
                have: 1,
                required: 2
            }
        ));
    }

    /// Quorum evaluation is order-independent: any signing order over the
    /// same set of organizations produces the same submit outcome.
    #[tokio::test]
    async fn test_signature_order_does_not_matter() {
        for order in [
            ["Org1MSP", "Org2MSP"],
            ["Org2MSP", "Org1MSP"],
        ] {
            let stack = GovernanceStack::bootstrap();
            let gateway = SubmissionGateway::new(
                Default::default(),
                stack.orderer.clone(),
                stack.bootstrap.clone(),
            );
            let snapshot = stack.orderer.current_config(&stack.channel).unwrap();
            let mut envelope = MutationEnvelope::new(
                MutationEngine::new()
                    .propose(
                        &snapshot,
                        &TopologyChange::AddOrganization {
                            org: organization(3),
                        },
                    )
                    .unwrap(),
            );
            sign_all(&mut envelope, &order);
            let outcome = gateway.submit(&mut envelope).await.unwrap();
            assert_eq!(outcome.block.index, 1);
        }
    }
}
