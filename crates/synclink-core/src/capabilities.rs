//! Injected host capabilities
//!
//! The wizard never reaches into ambient globals for error tracking,
//! analytics, or messaging its host page. Callers hand it implementations
//! of these traits instead.

use crate::embed::EmbedMessage;
use crate::mutation::Failure;

/// Receives failures before they are coerced into user-facing errors
pub trait ErrorReporter: Send + Sync {
    /// Record one failed attempt of `operation`
    fn report(&self, operation: &str, failure: &Failure);
}

/// Receives product analytics events
pub trait AnalyticsSink: Send + Sync {
    /// Track a named event with JSON properties
    fn track(&self, event: &str, properties: serde_json::Value);
}

/// Channel to the page embedding the widget
pub trait NotificationChannel: Send + Sync {
    /// Post a message to the host page
    fn post(&self, message: EmbedMessage);
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct Noop;

impl ErrorReporter for Noop {
    fn report(&self, _operation: &str, _failure: &Failure) {}
}

impl AnalyticsSink for Noop {
    fn track(&self, _event: &str, _properties: serde_json::Value) {}
}

impl NotificationChannel for Noop {
    fn post(&self, _message: EmbedMessage) {}
}

/// Forwards everything to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCapabilities;

impl ErrorReporter for TracingCapabilities {
    fn report(&self, operation: &str, failure: &Failure) {
        tracing::error!(operation, failure = ?failure, "mutation failed");
    }
}

impl AnalyticsSink for TracingCapabilities {
    fn track(&self, event: &str, properties: serde_json::Value) {
        tracing::info!(event, %properties, "analytics");
    }
}

impl NotificationChannel for TracingCapabilities {
    fn post(&self, message: EmbedMessage) {
        match serde_json::to_string(&message) {
            Ok(json) => tracing::info!(message = %json, "post to host"),
            Err(e) => tracing::warn!("failed to encode embed message: {}", e),
        }
    }
}
