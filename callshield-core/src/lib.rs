//! # CallShield Core — shared scaffolding for the call-risk engine
//!
//! Error types, TOML configuration, and the deterministic fuzzy text
//! matcher that the risk-scoring layer builds on. Nothing in this crate
//! performs I/O except the config/dataset loaders, and nothing here holds
//! per-session state.

pub mod config;
pub mod error;
pub mod matcher;

pub use config::ShieldConfig;
pub use error::{ShieldError, ShieldResult};

#[cfg(test)]
mod tests;
