//! CLI command implementations

use anyhow::{Context, Result};
use std::sync::Arc;
use synclink_core::{Config, ConnectApi};
use synclink_runtime::{HttpConnectApi, InMemoryConnectApi};

pub mod connect;
pub mod init;
pub mod sources;
pub mod validate;

/// Backend selection shared by commands that talk to the API
pub struct Backend<'a> {
    /// Use the in-memory backend
    pub dry_run: bool,
    /// Configuration profile to apply
    pub profile: Option<&'a str>,
    /// Session link token
    pub link_token: Option<String>,
}

impl Backend<'_> {
    /// Load configuration and build the selected backend
    pub fn connect(self, config_path: &str) -> Result<(Config, Arc<dyn ConnectApi>)> {
        let config = Config::load_with_profile(config_path, self.profile)
            .context("Failed to load configuration")?;

        if self.dry_run {
            tracing::info!("Dry run: using in-memory backend");
            let api: Arc<dyn ConnectApi> = Arc::new(InMemoryConnectApi::new());
            return Ok((config, api));
        }

        if self.link_token.is_none() {
            tracing::warn!("No link token provided; backend calls will be rejected");
        }
        let api = HttpConnectApi::new(config.api.clone(), self.link_token)
            .context("Failed to build HTTP client")?;
        tracing::debug!("Using backend {}", config.api.base_url);
        let api: Arc<dyn ConnectApi> = Arc::new(api);
        Ok((config, api))
    }
}
