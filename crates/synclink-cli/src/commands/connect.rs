//! Run a setup plan

use anyhow::{Context, Result};
use synclink_core::SetupPlan;
use synclink_runtime::Runtime;

use super::Backend;

/// Run the connect command
pub async fn run(config_path: &str, plan_path: &str, backend: Backend<'_>) -> Result<()> {
    let (config, api) = backend.connect(config_path)?;
    tracing::info!("Project: {}", config.project.name);

    let plan = SetupPlan::load(plan_path)
        .with_context(|| format!("Failed to load setup plan {}", plan_path))?;

    let runtime = Runtime::new(api).with_theme(config.project.theme.clone());

    tracing::info!("Running setup plan {} (press Ctrl+C to abort)", plan_path);

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received shutdown signal");
    };

    tokio::select! {
        result = runtime.run_plan(&plan) => {
            let sync = result?;
            tracing::info!(
                "✓ Sync {} configured for {}.{}",
                sync.id,
                sync.namespace,
                sync.table_name
            );
            println!("{}", serde_json::to_string_pretty(&sync)?);
        }
        _ = shutdown => {
            anyhow::bail!("Setup aborted");
        }
    }

    Ok(())
}
