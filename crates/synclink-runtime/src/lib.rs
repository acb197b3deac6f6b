//! Synclink Runtime
//!
//! Backend clients and setup plan execution for Synclink.
//!
//! # Features
//!
//! - HTTP backend client authenticated with a link token
//! - In-memory backend for dry runs
//! - Plan runner driving the setup wizard end to end
//!
//! # Usage
//!
//! ```rust,ignore
//! use synclink_runtime::{HttpConnectApi, Runtime};
//!
//! let api = HttpConnectApi::new(config.api.clone(), Config::link_token_from_env())?;
//! let sync = Runtime::new(Arc::new(api)).run_plan(&plan).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod engine;
pub mod error;
pub mod http;
pub mod memory;

pub use engine::Runtime;
pub use error::{Error, Result};
pub use http::HttpConnectApi;
pub use memory::InMemoryConnectApi;
