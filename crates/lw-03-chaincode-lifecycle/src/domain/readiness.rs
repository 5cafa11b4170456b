//! Commit readiness: the tri-state approval map across organizations.

use serde::{Deserialize, Serialize};
use shared_types::entities::MspId;
use shared_types::errors::Approval;
use shared_types::policy::SignaturePolicy;
use std::collections::{BTreeMap, BTreeSet};

/// The per-organization approval picture for one candidate definition.
///
/// Organizations that could not be queried are held as
/// [`Approval::Unknown`], never folded into a refusal. Only organizations
/// whose state is positively `Approved` count toward the endorsement
/// policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitReadiness {
    pub approvals: BTreeMap<MspId, Approval>,
}

impl CommitReadiness {
    pub fn new(approvals: BTreeMap<MspId, Approval>) -> Self {
        Self { approvals }
    }

    pub fn approved_orgs(&self) -> BTreeSet<MspId> {
        self.approvals
            .iter()
            .filter(|(_, a)| **a == Approval::Approved)
            .map(|(msp, _)| msp.clone())
            .collect()
    }

    pub fn unknown_orgs(&self) -> Vec<MspId> {
        self.approvals
            .iter()
            .filter(|(_, a)| **a == Approval::Unknown)
            .map(|(msp, _)| msp.clone())
            .collect()
    }

    /// Whether the currently known approvals satisfy `policy`.
    ///
    /// Unknown entries contribute nothing either way; readiness can flip
    /// to satisfied once they are re-queried, but a satisfied verdict
    /// never depends on an unqueried organization.
    pub fn satisfied(&self, policy: &SignaturePolicy) -> bool {
        policy.is_satisfied_by(&self.approved_orgs())
    }

    /// Distinct approvals still missing before `policy` would be met.
    pub fn outstanding(&self, policy: &SignaturePolicy) -> usize {
        policy.outstanding(&self.approved_orgs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::policy::PolicyRole;

    fn readiness(entries: &[(&str, Approval)]) -> CommitReadiness {
        CommitReadiness::new(
            entries
                .iter()
                .map(|(msp, a)| (MspId::from(*msp), *a))
                .collect(),
        )
    }

    fn majority_of_three() -> SignaturePolicy {
        SignaturePolicy::majority_of(vec![
            PolicyRole::peer(MspId::from("org1")),
            PolicyRole::peer(MspId::from("org2")),
            PolicyRole::peer(MspId::from("org3")),
        ])
    }

    #[test]
    fn test_unknown_does_not_block_majority() {
        let r = readiness(&[
            ("org1", Approval::Approved),
            ("org2", Approval::Approved),
            ("org3", Approval::Unknown),
        ]);
        assert!(r.satisfied(&majority_of_three()));
        assert_eq!(r.unknown_orgs(), vec![MspId::from("org3")]);
    }

    #[test]
    fn test_unknown_never_counts_as_approved() {
        let r = readiness(&[
            ("org1", Approval::Approved),
            ("org2", Approval::Unknown),
            ("org3", Approval::Unknown),
        ]);
        assert!(!r.satisfied(&majority_of_three()));
        assert_eq!(r.outstanding(&majority_of_three()), 1);
    }

    #[test]
    fn test_not_approved_is_a_refusal_not_unknown() {
        let r = readiness(&[
            ("org1", Approval::Approved),
            ("org2", Approval::NotApproved),
            ("org3", Approval::NotApproved),
        ]);
        assert!(!r.satisfied(&majority_of_three()));
        assert!(r.unknown_orgs().is_empty());
    }
}
