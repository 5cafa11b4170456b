//! # Signature Policy Grammar
//!
//! Quorum rules over organizations. The grammar is deliberately small:
//! AND over named roles, and N-of-M over named roles, with `MAJORITY`
//! expressed as N-of-M sugar. OR clauses and nesting are not supported.
//!
//! Evaluation is a pure set operation over the MSP ids that have signed or
//! approved. It is idempotent and commutative over arrival order by
//! construction: the input is a set, never a sequence.

use crate::entities::MspId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A named signer role inside a policy, e.g. `Org1MSP.admin`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PolicyRole {
    pub msp_id: MspId,
    pub role: crate::entities::IdentityRole,
}

impl PolicyRole {
    pub fn admin(msp_id: MspId) -> Self {
        Self {
            msp_id,
            role: crate::entities::IdentityRole::Admin,
        }
    }

    pub fn peer(msp_id: MspId) -> Self {
        Self {
            msp_id,
            role: crate::entities::IdentityRole::Peer,
        }
    }

    pub fn member(msp_id: MspId) -> Self {
        Self {
            msp_id,
            role: crate::entities::IdentityRole::Member,
        }
    }
}

/// A quorum rule over organizations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignaturePolicy {
    /// Every named role must be matched by a distinct signing organization.
    AllOf(Vec<PolicyRole>),
    /// At least `n` distinct organizations out of the named roles.
    NOutOf { n: usize, roles: Vec<PolicyRole> },
}

impl SignaturePolicy {
    /// `MAJORITY` sugar: strictly more than half of the named roles.
    ///
    /// Three organizations require two; four require three.
    pub fn majority_of(roles: Vec<PolicyRole>) -> Self {
        let n = roles.len() / 2 + 1;
        Self::NOutOf { n, roles }
    }

    /// Organizations with standing to satisfy this policy.
    pub fn member_msps(&self) -> BTreeSet<&MspId> {
        self.roles().iter().map(|r| &r.msp_id).collect()
    }

    /// Whether `msp_id` has any standing under this policy.
    pub fn covers(&self, msp_id: &MspId) -> bool {
        self.roles().iter().any(|r| &r.msp_id == msp_id)
    }

    /// Number of distinct organizations still needed given the set that
    /// already signed. Zero means the policy is satisfied.
    pub fn outstanding(&self, signed: &BTreeSet<MspId>) -> usize {
        let have = self
            .roles()
            .iter()
            .filter(|r| signed.contains(&r.msp_id))
            .map(|r| &r.msp_id)
            .collect::<BTreeSet<_>>()
            .len();
        self.required().saturating_sub(have)
    }

    /// Evaluate the policy against the distinct set of organizations that
    /// have signed. Signers outside the policy's member set never count.
    pub fn is_satisfied_by(&self, signed: &BTreeSet<MspId>) -> bool {
        self.outstanding(signed) == 0
    }

    /// Number of distinct organizations required.
    pub fn required(&self) -> usize {
        match self {
            Self::AllOf(roles) => {
                roles.iter().map(|r| &r.msp_id).collect::<BTreeSet<_>>().len()
            }
            Self::NOutOf { n, .. } => *n,
        }
    }

    fn roles(&self) -> &[PolicyRole] {
        match self {
            Self::AllOf(roles) => roles,
            Self::NOutOf { roles, .. } => roles,
        }
    }
}
