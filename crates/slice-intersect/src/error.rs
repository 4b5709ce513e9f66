//! Error types for the intersection overlay.
//!
//! Geometry never fails: misses, missing peers and degenerate inputs hide
//! segments instead. Only configuration can produce an error.

use thiserror::Error;

/// Errors raised while building or loading settings.
#[derive(Error, Debug)]
pub enum IntersectError {
    /// A settings value is out of range.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings text could not be parsed.
    #[error("malformed settings: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Result type for settings operations.
pub type Result<T> = std::result::Result<T, IntersectError>;
