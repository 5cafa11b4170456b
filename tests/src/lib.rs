//! # LedgerWeave Test Suite
//!
//! Unified test crate for cross-subsystem flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── fixtures.rs          # Topologies, organizations, wiring helpers
//!     ├── governance_flows.rs  # Admission, anchors, concurrency conflicts
//!     └── activation_flows.rs  # Chaincode install/approve/commit paths
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p lw-tests
//! cargo test -p lw-tests integration::governance_flows::
//! cargo test -p lw-tests integration::activation_flows::
//! ```

#![allow(dead_code)]

pub mod integration;
