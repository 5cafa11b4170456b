//! Boundary traits for the channel-config subsystem.

pub mod outbound;

pub use outbound::ConfigTranslator;
