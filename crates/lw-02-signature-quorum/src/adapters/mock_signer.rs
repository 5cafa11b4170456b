//! In-memory mock signer for testing.
//!
//! Produces deterministic pseudo-signatures and lets tests mark individual
//! organizations as unreachable, mirroring a down signing service.

use crate::ports::outbound::OrgSigner;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{BoundaryError, MspId, OrgSignature};
use std::collections::BTreeSet;

/// Mock signing authority serving every organization by name.
#[derive(Default)]
pub struct MockSigner {
    unavailable: RwLock<BTreeSet<MspId>>,
    sign_count: RwLock<usize>,
}

impl MockSigner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an organization's signer as unreachable.
    pub fn set_unavailable(&self, msp_id: &MspId) {
        self.unavailable.write().insert(msp_id.clone());
    }

    /// Bring an organization's signer back.
    pub fn set_available(&self, msp_id: &MspId) {
        self.unavailable.write().remove(msp_id);
    }

    /// Total successful sign calls served.
    pub fn sign_count(&self) -> usize {
        *self.sign_count.read()
    }
}

#[async_trait]
impl OrgSigner for MockSigner {
    async fn sign(&self, msp_id: &MspId, payload: &[u8]) -> Result<OrgSignature, BoundaryError> {
        if self.unavailable.read().contains(msp_id) {
            return Err(BoundaryError::Unreachable {
                target: msp_id.to_string(),
                reason: "signer offline".to_string(),
            });
        }
        *self.sign_count.write() += 1;
        // Deterministic over (org, payload); good enough for tests that
        // compare signature bytes.
        let bytes = format!("mock-sig/{}/{}", msp_id, payload.len()).into_bytes();
        Ok(OrgSignature {
            msp_id: msp_id.clone(),
            bytes,
        })
    }
}
