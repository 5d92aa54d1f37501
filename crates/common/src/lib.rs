//! Shared types, config, and error definitions for the dashboard core.

pub mod config;
pub mod error;
pub mod types;

pub use config::DashConfig;
pub use error::Error;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
