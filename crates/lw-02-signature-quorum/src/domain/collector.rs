//! Collection-round state machine.
//!
//! Tracks which organizations have been solicited and what each returned.
//! Policy evaluation happens after every recorded response, never once; the
//! result depends only on the set of signers, not their arrival order.

use crate::domain::envelope::MutationEnvelope;
use serde::{Deserialize, Serialize};
use shared_types::{MspId, SignaturePolicy};
use std::collections::BTreeMap;

/// Collector states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollectorState {
    /// Round created; nobody solicited yet.
    Drafted,
    /// At least one solicitation issued; policy not yet met.
    Collecting,
    /// The policy is satisfied by the recorded signatures.
    Satisfied,
    /// The caller's deadline passed before the policy was met. The round is
    /// dead; restart from a freshly fetched config.
    TimedOut,
}

/// What one organization's solicitation produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignerOutcome {
    Signed,
    Unavailable,
    Ineligible,
}

/// One signature-collection attempt against a single envelope and policy.
#[derive(Debug, Clone)]
pub struct CollectionRound {
    pub policy: SignaturePolicy,
    pub state: CollectorState,
    /// Last outcome per solicited organization.
    pub responded: BTreeMap<MspId, SignerOutcome>,
}

impl CollectionRound {
    pub fn new(policy: SignaturePolicy) -> Self {
        Self {
            policy,
            state: CollectorState::Drafted,
            responded: BTreeMap::new(),
        }
    }

    /// Record an organization's outcome and re-evaluate.
    ///
    /// Idempotent: recording the same outcome twice leaves the round where
    /// it was. A terminal round (`TimedOut`) never transitions again.
    pub fn record(&mut self, msp_id: MspId, outcome: SignerOutcome, envelope: &MutationEnvelope) {
        if self.state == CollectorState::TimedOut {
            return;
        }
        self.responded.insert(msp_id, outcome);
        if self.state == CollectorState::Drafted {
            self.state = CollectorState::Collecting;
        }
        if self.evaluate(envelope) {
            self.state = CollectorState::Satisfied;
        }
    }

    /// Whether the recorded signatures satisfy the policy.
    ///
    /// Pure over the envelope's current signer set; safe to call any number
    /// of times and after every new signature.
    pub fn evaluate(&self, envelope: &MutationEnvelope) -> bool {
        self.policy.is_satisfied_by(&envelope.signer_set())
    }

    /// Distinct eligible signatures still needed.
    pub fn outstanding(&self, envelope: &MutationEnvelope) -> usize {
        self.policy.outstanding(&envelope.signer_set())
    }

    /// Mark the round dead because the deadline passed.
    pub fn time_out(&mut self) {
        if self.state != CollectorState::Satisfied {
            self.state = CollectorState::TimedOut;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lw_01_channel_config::ConfigDelta;
    use shared_types::{ChannelId, OrgSignature, PolicyRole};

    fn majority_policy() -> SignaturePolicy {
        SignaturePolicy::majority_of(vec![
            PolicyRole::admin(MspId::from("Org1MSP")),
            PolicyRole::admin(MspId::from("Org2MSP")),
            PolicyRole::admin(MspId::from("Org3MSP")),
        ])
    }

    fn signed_envelope(orgs: &[&str]) -> MutationEnvelope {
        let mut env = MutationEnvelope::new(ConfigDelta::new(ChannelId::new("mainchannel")));
        for org in orgs {
            env.record_signature(OrgSignature {
                msp_id: MspId::from(*org),
                bytes: b"sig".to_vec(),
            });
        }
        env
    }

    #[test]
    fn test_round_reaches_satisfied_after_quorum() {
        let mut round = CollectionRound::new(majority_policy());
        let mut env = signed_envelope(&[]);

        env.record_signature(OrgSignature {
            msp_id: MspId::from("Org1MSP"),
            bytes: b"s1".to_vec(),
        });
        round.record(MspId::from("Org1MSP"), SignerOutcome::Signed, &env);
        assert_eq!(round.state, CollectorState::Collecting);
        assert_eq!(round.outstanding(&env), 1);

        env.record_signature(OrgSignature {
            msp_id: MspId::from("Org3MSP"),
            bytes: b"s3".to_vec(),
        });
        round.record(MspId::from("Org3MSP"), SignerOutcome::Signed, &env);
        assert_eq!(round.state, CollectorState::Satisfied);
        assert_eq!(round.outstanding(&env), 0);
    }

    #[test]
    fn test_unavailable_signers_do_not_advance_quorum() {
        let mut round = CollectionRound::new(majority_policy());
        let env = signed_envelope(&["Org1MSP"]);

        round.record(MspId::from("Org2MSP"), SignerOutcome::Unavailable, &env);
        round.record(MspId::from("Org3MSP"), SignerOutcome::Unavailable, &env);
        assert_eq!(round.state, CollectorState::Collecting);
    }

    #[test]
    fn test_timed_out_round_is_terminal() {
        let mut round = CollectionRound::new(majority_policy());
        let env = signed_envelope(&["Org1MSP", "Org2MSP"]);

        round.time_out();
        assert_eq!(round.state, CollectorState::TimedOut);

        // A late signature cannot revive a dead round.
        round.record(MspId::from("Org2MSP"), SignerOutcome::Signed, &env);
        assert_eq!(round.state, CollectorState::TimedOut);
    }

    #[test]
    fn test_satisfied_round_cannot_time_out() {
        let mut round = CollectionRound::new(majority_policy());
        let env = signed_envelope(&["Org1MSP", "Org2MSP"]);
        round.record(MspId::from("Org1MSP"), SignerOutcome::Signed, &env);
        assert_eq!(round.state, CollectorState::Satisfied);

        round.time_out();
        assert_eq!(round.state, CollectorState::Satisfied);
    }

    #[test]
    fn test_evaluate_commutative_over_arrival_order() {
        let orgs = ["Org1MSP", "Org2MSP", "Org3MSP"];
        // All 6 permutations of three signers end in the same verdict.
        let perms: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for perm in perms {
            let mut env = signed_envelope(&[]);
            let round = CollectionRound::new(majority_policy());
            for idx in perm {
                env.record_signature(OrgSignature {
                    msp_id: MspId::from(orgs[idx]),
                    bytes: b"sig".to_vec(),
                });
            }
            assert!(round.evaluate(&env));
        }
    }
}
