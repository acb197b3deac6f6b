//! Source management commands

use anyhow::Result;
use synclink_runtime::Runtime;

use super::Backend;

/// List sources visible to the link token
pub async fn list(config_path: &str, backend: Backend<'_>, json: bool) -> Result<()> {
    let (_, api) = backend.connect(config_path)?;
    let sources = Runtime::new(api).list_sources().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&sources)?);
        return Ok(());
    }

    if sources.is_empty() {
        println!("No sources configured");
        return Ok(());
    }

    for source in &sources {
        println!(
            "{}  {}  ({})",
            source.id,
            source.display_name,
            source.connection_type.display_name()
        );
    }
    Ok(())
}
