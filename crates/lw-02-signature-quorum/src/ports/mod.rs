//! Boundary traits for the signature-quorum subsystem.

pub mod outbound;

pub use outbound::OrgSigner;
