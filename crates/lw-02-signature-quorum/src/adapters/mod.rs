//! Adapters for the signing boundary.

pub mod mock_signer;

pub use mock_signer::MockSigner;
