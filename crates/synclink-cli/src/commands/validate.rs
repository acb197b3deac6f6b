//! Validate configuration command

use anyhow::{Context, Result};
use synclink_core::{Config, SetupPlan};

/// Run the validate command
pub async fn run(config_path: &str, profile: Option<&str>) -> Result<()> {
    tracing::info!("Validating configuration: {}", config_path);

    let config =
        Config::load_with_profile(config_path, profile).context("Failed to load configuration")?;

    tracing::info!("✓ Project: {}", config.project.name);
    tracing::info!("✓ API: {}", config.api.base_url);
    tracing::info!("✓ Link token header: {}", config.api.link_token_header);
    if let Some(profile) = &config.active_profile {
        tracing::info!("✓ Profile: {}", profile);
    }
    if Config::link_token_from_env().is_none() {
        tracing::warn!(
            "{} is not set; pass --link-token to connect",
            synclink_core::config::LINK_TOKEN_ENV
        );
    }

    let plans_dir = config.base_path.join("plans");
    if plans_dir.is_dir() {
        let mut entries: Vec<_> = std::fs::read_dir(&plans_dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("yaml" | "yml")
                )
            })
            .collect();
        entries.sort();
        for path in entries {
            SetupPlan::load(&path)
                .with_context(|| format!("Invalid setup plan {}", path.display()))?;
            tracing::info!("✓ Plan: {}", path.display());
        }
    }

    tracing::info!("✓ Configuration is valid");
    Ok(())
}
