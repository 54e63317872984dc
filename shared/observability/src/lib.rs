//! Emma Observability Library
//!
//! Standardized tracing subscriber setup for Emma backend services, so every
//! binary logs with the same schema regardless of where it runs.

pub mod init;

pub use init::*;

// Re-export tracing for convenience
pub use tracing::{debug, error, info, warn, trace, span, Level, Instrument};
pub use tracing::instrument;
