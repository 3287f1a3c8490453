//! Shared utilities for plexus.

pub mod logging;

pub use logging::{init_logging, LogFormat, LoggingError};
