//! Driven Ports (SPI - Outbound)
//!
//! Signing is delegated to each organization's identity/credential store.
//! The protocol layer hands over bytes and receives opaque signature bytes;
//! it never sees key material.

use async_trait::async_trait;
use shared_types::{BoundaryError, MspId, OrgSignature};

/// Interface to one organization's signing authority.
///
/// A single implementation may serve many organizations (e.g. a remote
/// signing service); `msp_id` selects whose key signs.
#[async_trait]
pub trait OrgSigner: Send + Sync {
    /// Sign `payload` with the admin identity of `msp_id`.
    ///
    /// Fails with a `BoundaryError` when the signer cannot be reached; the
    /// caller maps that to `SignerUnavailable` and keeps collecting from
    /// other organizations.
    async fn sign(&self, msp_id: &MspId, payload: &[u8]) -> Result<OrgSignature, BoundaryError>;
}
