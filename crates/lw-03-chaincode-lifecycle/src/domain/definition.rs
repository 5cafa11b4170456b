//! Chaincode packages and definitions.
//!
//! A [`ChaincodePackage`] is the content-addressed artifact installed on
//! peers; a [`ChaincodeDefinition`] is the channel-level agreement about
//! which package is active, at which version, under which endorsement
//! policy.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::policy::SignaturePolicy;
use std::fmt;

/// Content digest of a chaincode package, rendered as `sha256:<hex>`.
///
/// Two packagings of byte-identical content yield the same id, so
/// re-installing the same package on a peer is a detectable no-op.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId(String);

impl PackageId {
    pub fn digest_of(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        Self(format!("sha256:{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A packaged chaincode artifact ready for installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodePackage {
    /// Human-readable label, `<name>_<version>`.
    pub label: String,
    pub package_id: PackageId,
}

impl ChaincodePackage {
    pub fn new(name: &str, version: u64, content: &[u8]) -> Self {
        Self {
            label: format!("{name}_{version}"),
            package_id: PackageId::digest_of(content),
        }
    }
}

/// The channel-level definition an organization approves and the network
/// eventually commits.
///
/// `sequence` counts definition commits for this `name` on the channel and
/// must advance by exactly one per commit. `version` tracks the package
/// contents and only changes when the code changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChaincodeDefinition {
    pub name: String,
    pub version: u64,
    pub sequence: u64,
    pub package_id: PackageId,
    pub endorsement_policy: SignaturePolicy,
    pub init_required: bool,
}

impl ChaincodeDefinition {
    /// First definition for a freshly packaged chaincode.
    pub fn initial(
        name: &str,
        package: &ChaincodePackage,
        endorsement_policy: SignaturePolicy,
    ) -> Self {
        Self {
            name: name.to_owned(),
            version: 1,
            sequence: 1,
            package_id: package.package_id.clone(),
            endorsement_policy,
            init_required: false,
        }
    }

    /// Successor definition after `committed`, activating `package`.
    ///
    /// The sequence advances by one unconditionally; the version advances
    /// only when the package content differs from the committed one.
    pub fn upgrade_from(committed: &Self, package: &ChaincodePackage) -> Self {
        let version = if package.package_id == committed.package_id {
            committed.version
        } else {
            committed.version + 1
        };
        Self {
            name: committed.name.clone(),
            version,
            sequence: committed.sequence + 1,
            package_id: package.package_id.clone(),
            endorsement_policy: committed.endorsement_policy.clone(),
            init_required: committed.init_required,
        }
    }
}

/// Where a definition sits in the activation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationPhase {
    Packaged,
    Installed,
    Approved,
    Ready,
    Committed,
    Rejected,
}

impl fmt::Display for ActivationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Packaged => "PACKAGED",
            Self::Installed => "INSTALLED",
            Self::Approved => "APPROVED",
            Self::Ready => "READY",
            Self::Committed => "COMMITTED",
            Self::Rejected => "REJECTED",
        };
        f.write_str(label)
    }
}
