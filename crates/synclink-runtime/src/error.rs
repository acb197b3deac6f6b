//! Runtime error types
//!
//! Plan execution reports failures to a CLI, so errors here are
//! application-level `anyhow` errors with context attached.

/// Result type for plan execution and backend wiring
pub type Result<T> = anyhow::Result<T>;

/// Application-level runtime error
pub type Error = anyhow::Error;
