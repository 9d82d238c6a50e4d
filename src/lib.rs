//! Poolfade Library
//!
//! Mean-reversion fade signal engine over a stream of DEX pool events.

pub mod cli;
pub mod config;
pub mod error;
pub mod event;
pub mod position;
pub mod strategy;
pub mod stream;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
