//! Cross-subsystem integration flows.

pub mod activation_flows;
pub mod fixtures;
pub mod governance_flows;
