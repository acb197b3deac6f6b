//! Configuration parsing and validation
//!
//! This module handles loading the widget host configuration.
//!
//! # Configuration Files
//!
//! - `synclink.yaml` - Project root configuration
//! - `plans/*.yaml` - Setup plans (see [`crate::plan`])
//!
//! The link token is never read from YAML. It comes from the
//! `SYNCLINK_LINK_TOKEN` environment variable or the command line.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::embed::Theme;
use crate::error::{Error, Result};

/// Environment variable holding the session link token
pub const LINK_TOKEN_ENV: &str = "SYNCLINK_LINK_TOKEN";

/// Root project configuration from `synclink.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Backend API settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Theme posted to the embedded widget
    #[serde(default)]
    pub theme: Theme,

    /// Named overrides selected with `--profile`
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

/// Backend API settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiConfig {
    /// Base URL every path is joined onto
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Header carrying the link token
    #[serde(default = "default_link_token_header")]
    pub link_token_header: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Endpoint paths
    #[serde(default)]
    pub paths: ApiPaths,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            link_token_header: default_link_token_header(),
            timeout_secs: default_timeout_secs(),
            paths: ApiPaths::default(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_link_token_header() -> String {
    "X-Link-Token".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Endpoint paths relative to `base_url`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiPaths {
    /// Create Source endpoint
    #[serde(default = "default_create_source_path")]
    pub create_source: String,

    /// List Sources endpoint
    #[serde(default = "default_list_sources_path")]
    pub list_sources: String,

    /// Finalize Sync endpoint
    #[serde(default = "default_finalize_sync_path")]
    pub finalize_sync: String,
}

impl Default for ApiPaths {
    fn default() -> Self {
        Self {
            create_source: default_create_source_path(),
            list_sources: default_list_sources_path(),
            finalize_sync: default_finalize_sync_path(),
        }
    }
}

fn default_create_source_path() -> String {
    "/connect/sources".to_string()
}

fn default_list_sources_path() -> String {
    "/connect/sources".to_string()
}

fn default_finalize_sync_path() -> String {
    "/connect/syncs".to_string()
}

/// Profile overrides
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    /// Override `api.base_url`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Override `api.link_token_header`
    #[serde(default)]
    pub link_token_header: Option<String>,

    /// Override `api.timeout_secs`
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// API settings after applying the active profile
    pub api: ApiConfig,

    /// Active profile, if any
    pub active_profile: Option<String>,

    /// Base path of the project
    pub base_path: std::path::PathBuf,
}

impl Config {
    /// Load configuration from a directory
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the project directory or synclink.yaml file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-project")?;
    /// println!("Project: {}", config.project.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_profile(path, None)
    }

    /// Load configuration and apply the named profile
    pub fn load_with_profile<P: AsRef<Path>>(path: P, profile: Option<&str>) -> Result<Self> {
        let path = path.as_ref();

        let (config_path, base_path) = if path.is_dir() {
            (path.join("synclink.yaml"), path.to_path_buf())
        } else {
            (
                path.to_path_buf(),
                path.parent().unwrap_or(Path::new(".")).to_path_buf(),
            )
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let project: ProjectConfig = serde_yaml::from_str(&contents)?;
        let api = resolve_api(&project, profile)?;
        validate_api(&api)?;

        tracing::debug!(
            "loaded {} (profile: {})",
            config_path.display(),
            profile.unwrap_or("none")
        );

        Ok(Self {
            project,
            api,
            active_profile: profile.map(str::to_string),
            base_path,
        })
    }

    /// Link token from the environment, if set and non-empty
    pub fn link_token_from_env() -> Option<String> {
        std::env::var(LINK_TOKEN_ENV)
            .ok()
            .filter(|token| !token.trim().is_empty())
    }
}

/// Apply a profile's overrides to the project's API settings
pub fn resolve_api(project: &ProjectConfig, profile: Option<&str>) -> Result<ApiConfig> {
    let mut api = project.api.clone();
    let Some(name) = profile else {
        return Ok(api);
    };

    let overrides = project
        .profiles
        .get(name)
        .ok_or_else(|| Error::ProfileError {
            profile_name: name.to_string(),
            message: "not defined in synclink.yaml".to_string(),
        })?;

    if let Some(base_url) = &overrides.base_url {
        api.base_url = base_url.clone();
    }
    if let Some(header) = &overrides.link_token_header {
        api.link_token_header = header.clone();
    }
    if let Some(timeout) = overrides.timeout_secs {
        api.timeout_secs = timeout;
    }
    Ok(api)
}

fn validate_api(api: &ApiConfig) -> Result<()> {
    if !(api.base_url.starts_with("http://") || api.base_url.starts_with("https://")) {
        return Err(Error::ConfigInvalid {
            message: format!("api.base_url '{}' must be an http(s) URL", api.base_url),
        });
    }
    if api.link_token_header.trim().is_empty() {
        return Err(Error::ConfigInvalid {
            message: "api.link_token_header must not be empty".to_string(),
        });
    }
    if api.timeout_secs == 0 {
        return Err(Error::ConfigInvalid {
            message: "api.timeout_secs must be greater than zero".to_string(),
        });
    }
    Ok(())
}
