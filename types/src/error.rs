//! Top-level error type shared across crates.

use thiserror::Error;

/// Common error type for plexus value types and configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlexusError {
    #[error("invalid decimal: {0}")]
    InvalidDecimal(String),

    #[error("invalid denom: {0}")]
    InvalidDenom(String),

    #[error("invalid coin {0:?}, expected <amount><denom>")]
    InvalidCoin(String),

    #[error("coin amount overflow for denom {0}")]
    AmountOverflow(String),

    #[error("configuration error: {0}")]
    Config(String),
}
