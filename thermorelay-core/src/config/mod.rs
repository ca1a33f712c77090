//! Configuration types
//!
//! Board-agnostic configuration structures, deserialized by the
//! application from its configuration file.

pub mod error;
pub mod types;

pub use error::ConfigError;
pub use types::*;
