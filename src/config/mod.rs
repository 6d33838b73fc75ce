//! Configuration model for joblock.
//!
//! This module defines the Config struct that represents `joblock.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! sensible defaults for optional fields, and validation of config values.

mod model;
mod operations;
pub mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::Config;
pub use types::{JobKeyConfig, StoreBackend, StoreConfig};
