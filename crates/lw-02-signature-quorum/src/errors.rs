//! Error types for the signature-quorum subsystem.

use shared_types::{Classify, ErrorClass, MspId};
use thiserror::Error;

/// Quorum collection errors.
#[derive(Debug, Clone, Error)]
pub enum QuorumError {
    /// The organization's signing authority could not be reached.
    #[error("Signer unavailable for {msp_id}: {reason}")]
    SignerUnavailable { msp_id: MspId, reason: String },

    /// The organization has no standing to sign under the target policy.
    #[error("{msp_id} is not eligible to sign under the target policy")]
    PolicyIneligible { msp_id: MspId },

    /// The caller's deadline passed before the policy was satisfied. The
    /// envelope's read-set pins are assumed stale; restart from a fresh
    /// config fetch.
    #[error("Signature collection timed out: still awaiting {outstanding} of {required} signatures")]
    TimedOut { outstanding: usize, required: usize },

    /// The envelope could not be serialized for signing.
    #[error("Envelope serialization failed: {0}")]
    Serialization(String),
}

impl Classify for QuorumError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::SignerUnavailable { .. } => ErrorClass::Unreachable,
            Self::PolicyIneligible { .. } | Self::Serialization(_) => ErrorClass::Invalid,
            // Recovery is the Conflict discipline: the round is abandoned and
            // restarted from a fresh fetch, never retried with stale pins.
            Self::TimedOut { .. } => ErrorClass::Conflict,
        }
    }
}

/// Result type for quorum operations.
pub type QuorumResult<T> = Result<T, QuorumError>;
