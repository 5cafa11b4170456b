//! Adapters for the channel-config boundary traits.

pub mod json_translator;

pub use json_translator::{wire, InMemoryTranslator};
