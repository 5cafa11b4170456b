//! Per-organization approval records.

use super::definition::{ChaincodeDefinition, PackageId};
use serde::{Deserialize, Serialize};
use shared_types::entities::MspId;

/// An organization's recorded approval of a chaincode definition.
///
/// An approval only counts toward commit readiness when its
/// `(version, sequence, package_id)` triple matches the definition being
/// committed exactly. A mismatch on any field is a rejection, not a
/// weaker approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub msp_id: MspId,
    pub name: String,
    pub version: u64,
    pub sequence: u64,
    pub package_id: PackageId,
}

impl ApprovalRecord {
    pub fn for_definition(msp_id: MspId, definition: &ChaincodeDefinition) -> Self {
        Self {
            msp_id,
            name: definition.name.clone(),
            version: definition.version,
            sequence: definition.sequence,
            package_id: definition.package_id.clone(),
        }
    }

    /// Whether this approval endorses exactly `definition`.
    pub fn matches(&self, definition: &ChaincodeDefinition) -> bool {
        self.name == definition.name
            && self.version == definition.version
            && self.sequence == definition.sequence
            && self.package_id == definition.package_id
    }
}
