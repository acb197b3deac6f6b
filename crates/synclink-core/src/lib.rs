//! Synclink Core Library
//!
//! This crate provides the core of the embedded "Connect" widget: the
//! wizard that walks an end user through connecting a data warehouse,
//! picking a destination object, and finalizing a recurring sync.
//!
//! - Wizard state and transitions
//! - Step validation
//! - Remote mutation bookkeeping
//! - Backend contract and known-sources cache
//! - Host capabilities and embed messages
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Wizard    │────▶│  Mutation   │────▶│ ConnectApi  │
//! │   Shell     │     │  Wrapper    │     │  (backend)  │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!        │
//!        ▼
//! ┌─────────────┐     ┌─────────────┐
//! │ WizardState │────▶│ Validation  │
//! └─────────────┘     └─────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use synclink_core::{Capabilities, SourcesCache, StepOutcome, WizardShell};
//!
//! let mut shell = WizardShell::new(api, SourcesCache::new(), Capabilities::default());
//! while let StepOutcome::Moved(step) = shell.continue_step().await {
//!     println!("now on {:?}", step);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod cache;
pub mod capabilities;
pub mod config;
pub mod connection;
pub mod dates;
pub mod embed;
pub mod error;
pub mod mutation;
pub mod plan;
pub mod shell;
pub mod state;
pub mod validation;

pub use api::{ApiError, ApiResult, ConnectApi, SourceDescriptor, SyncDescriptor};
pub use cache::SourcesCache;
pub use config::{Config, ProjectConfig};
pub use connection::{ConnectionType, NewSourceState, SourceCredentials};
pub use error::{Error, Result};
pub use mutation::{Failure, Mutation, MutationError, MutationOutcome, MutationState};
pub use plan::{SetupPlan, SourcePlan};
pub use shell::{Capabilities, StepOutcome, WizardShell};
pub use state::{Step, WizardState};
