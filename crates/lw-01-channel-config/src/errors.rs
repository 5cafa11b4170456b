//! Error types for the channel-config subsystem.

use crate::domain::path::ConfigPath;
use shared_types::{BoundaryError, Classify, ErrorClass, MspId};
use thiserror::Error;

/// Errors from the Config Mutation Engine. All are fatal to the current
/// attempt until the intent itself is corrected.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The intent references an organization the tree does not hold.
    #[error("Unknown organization: {msp_id}")]
    UnknownOrganization { msp_id: MspId },

    /// The organization id is already present in the tree.
    #[error("Duplicate organization: {msp_id} already admitted")]
    DuplicateOrganization { msp_id: MspId },

    /// An anchor node is not part of the organization's declared node set.
    #[error("Invalid anchor: {node} is not declared by {msp_id}")]
    InvalidAnchor { msp_id: MspId, node: String },

    /// A path the engine must read is absent from the tree.
    #[error("Missing config path: {path}")]
    MissingPath { path: ConfigPath },
}

impl Classify for ConfigError {
    fn class(&self) -> ErrorClass {
        ErrorClass::Invalid
    }
}

/// Result type for mutation-engine operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors at the protocol-translation boundary.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The wire form could not be produced or parsed.
    #[error("Wire translation failed: {0}")]
    Wire(String),

    /// No configuration is known for the channel.
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// The translation service could not be reached.
    #[error(transparent)]
    Boundary(#[from] BoundaryError),
}

impl Classify for TranslateError {
    fn class(&self) -> ErrorClass {
        match self {
            Self::Wire(_) | Self::UnknownChannel(_) => ErrorClass::Invalid,
            Self::Boundary(_) => ErrorClass::Unreachable,
        }
    }
}
