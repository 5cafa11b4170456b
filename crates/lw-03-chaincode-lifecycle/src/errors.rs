use shared_types::errors::{BoundaryError, Classify, ErrorClass};
use thiserror::Error;

pub type LifecycleResult<T> = Result<T, LifecycleError>;

#[derive(Debug, Error)]
pub enum LifecycleError {
    /// An approval or commit referenced a sequence the channel has already
    /// moved past. The caller must re-query the committed definition and
    /// rebuild its intent.
    #[error("Stale sequence for '{name}': attempted {attempted}, channel is at {current}")]
    StaleSequence {
        name: String,
        attempted: u64,
        current: u64,
    },

    /// Commit was attempted before the endorsement policy was satisfied.
    #[error("Endorsement policy not satisfied for '{name}': {approved} approved, need {required}")]
    PolicyNotSatisfied {
        name: String,
        approved: usize,
        required: usize,
    },

    /// The package named by the definition is not installed anywhere on
    /// the network.
    #[error("Package {package_id} is not installed on any peer")]
    PackageNotInstalled { package_id: String },

    /// A required collaborator could not be reached.
    #[error("Lifecycle boundary failure: {0}")]
    Boundary(#[from] BoundaryError),
}

impl Classify for LifecycleError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::StaleSequence { .. } => ErrorClass::Conflict,
            Self::PolicyNotSatisfied { .. } => ErrorClass::PolicyUnmet,
            Self::PackageNotInstalled { .. } => ErrorClass::Invalid,
            Self::Boundary(_) => ErrorClass::Unreachable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        let stale = LifecycleError::StaleSequence {
            name: "cc".into(),
            attempted: 1,
            current: 2,
        };
        assert_eq!(stale.class(), ErrorClass::Conflict);
        assert!(stale.recoverable());

        let unmet = LifecycleError::PolicyNotSatisfied {
            name: "cc".into(),
            approved: 1,
            required: 2,
        };
        assert_eq!(unmet.class(), ErrorClass::PolicyUnmet);

        let missing = LifecycleError::PackageNotInstalled {
            package_id: "sha256:00".into(),
        };
        assert!(!missing.recoverable());
    }
}
