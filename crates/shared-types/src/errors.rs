//! # Error Taxonomy
//!
//! Every subsystem error maps into one of four recovery classes. The class,
//! not the concrete error, decides how the orchestrator reacts:
//!
//! - `Conflict`: re-fetch and restart the operation from scratch; a blind
//!   retry with the same inputs is guaranteed to fail again.
//! - `PolicyUnmet`: ordinary pending state; solicit more signatures or
//!   approvals.
//! - `Unreachable`: fold into readiness reporting as `unknown`, never `false`.
//! - `Invalid`: fatal to the attempt until the intent itself is corrected.

use thiserror::Error;

/// Recovery class for a subsystem error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Optimistic-concurrency conflict; restart from a fresh fetch.
    Conflict,
    /// Quorum or endorsement policy not yet satisfied.
    PolicyUnmet,
    /// A collaborator could not be reached within its deadline.
    Unreachable,
    /// The intent references state that does not or cannot exist.
    Invalid,
}

/// Implemented by every subsystem error enum.
pub trait Classify {
    /// Recovery class the orchestrator should apply.
    fn class(&self) -> ErrorClass;

    /// Whether the operation may be re-attempted without changing the intent
    /// (after whatever recovery the class prescribes).
    fn recoverable(&self) -> bool {
        !matches!(self.class(), ErrorClass::Invalid)
    }
}

/// Tri-state answer from an unreliable per-organization query.
///
/// `Unknown` is distinct from `No`: an unreachable organization has not
/// declined anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Approval {
    Approved,
    NotApproved,
    Unknown,
}

impl Approval {
    pub fn is_approved(self) -> bool {
        self == Self::Approved
    }

    pub fn from_query(result: Result<bool, impl std::error::Error>) -> Self {
        match result {
            Ok(true) => Self::Approved,
            Ok(false) => Self::NotApproved,
            Err(_) => Self::Unknown,
        }
    }
}

/// Error reaching an external collaborator; always class `Unreachable`.
#[derive(Debug, Clone, Error)]
pub enum BoundaryError {
    /// The collaborator did not answer within its deadline.
    #[error("Timed out after {millis}ms waiting for {target}")]
    Timeout { target: String, millis: u64 },

    /// Transport-level failure.
    #[error("Unreachable: {target}: {reason}")]
    Unreachable { target: String, reason: String },
}

impl Classify for BoundaryError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Unreachable
    }
}
