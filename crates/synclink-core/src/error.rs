//! Error types for synclink-core

use thiserror::Error;

/// Result type alias for synclink-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in synclink-core
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file could not be found
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Failed to parse YAML configuration
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    /// Invalid configuration value
    #[error("invalid configuration: {message}")]
    ConfigInvalid {
        /// Description of what's invalid
        message: String,
    },

    /// Profile resolution error
    #[error("profile '{profile_name}': {message}")]
    ProfileError {
        /// Name of the profile
        profile_name: String,
        /// Description of the error
        message: String,
    },

    /// Setup plan is structurally valid YAML but cannot drive the wizard
    #[error("invalid setup plan: {message}")]
    InvalidPlan {
        /// Description of the problem
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
