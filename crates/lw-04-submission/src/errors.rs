use lw_01_channel_config::domain::tree::{ApplyError, PinMismatch};
use shared_types::{BoundaryError, Classify, ErrorClass};
use thiserror::Error;

pub type SubmitResult<T> = Result<T, SubmitError>;

#[derive(Debug, Error)]
pub enum SubmitError {
    /// A read-set pin no longer matches the live configuration. The
    /// envelope was drafted from a superseded snapshot and must be rebuilt
    /// from a fresh fetch; resubmitting it unchanged can never succeed.
    #[error("Concurrent modification at {path}: pinned v{pinned}, live {live:?}")]
    ConcurrentModification {
        path: String,
        pinned: u64,
        live: Option<u64>,
    },

    /// The envelope's signatures do not satisfy the channel's modification
    /// policy. More signatures may still arrive; the envelope itself is
    /// not invalidated.
    #[error("Signature quorum not met: {have} of {required} required signatures")]
    QuorumNotMet { have: usize, required: usize },

    /// The write set is structurally unappliable to the live tree.
    #[error("Unappliable write set: {0}")]
    Structural(#[from] ApplyError),

    /// No chain exists for the addressed channel.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// The requested block does not exist on the chain.
    #[error("No such block on '{channel}': {query}")]
    NoSuchBlock { channel: String, query: String },

    /// The ordering service or a joining node could not be reached.
    #[error("Submission boundary failure: {0}")]
    Boundary(#[from] BoundaryError),
}

impl SubmitError {
    pub fn pin_mismatch(mismatch: PinMismatch) -> Self {
        Self::ConcurrentModification {
            path: mismatch.path.to_string(),
            pinned: mismatch.pinned,
            live: mismatch.live,
        }
    }
}

impl Classify for SubmitError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::ConcurrentModification { .. } => ErrorClass::Conflict,
            Self::QuorumNotMet { .. } => ErrorClass::PolicyUnmet,
            Self::Structural(_) | Self::UnknownChannel(_) | Self::NoSuchBlock { .. } => {
                ErrorClass::Invalid
            }
            Self::Boundary(_) => ErrorClass::Unreachable,
        }
    }
}
