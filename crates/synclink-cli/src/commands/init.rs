//! Initialize a new Synclink project

use anyhow::Result;
use std::fs;
use std::path::Path;

/// Run the init command
pub async fn run(path: &str, name: Option<&str>) -> Result<()> {
    let project_dir = Path::new(path);

    if !project_dir.exists() {
        fs::create_dir_all(project_dir)?;
    }

    let abs_path = project_dir.canonicalize()?;

    let project_name = match name {
        Some(n) => n.to_string(),
        None => abs_path
            .file_name()
            .and_then(|n| n.to_str())
            .map(|s| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("Could not determine project name from path"))?,
    };

    if project_dir.join("synclink.yaml").exists() {
        anyhow::bail!(
            "Directory '{}' already contains a synclink.yaml",
            project_dir.display()
        );
    }

    tracing::info!("Creating new Synclink project: {}", project_name);

    fs::create_dir_all(project_dir.join("plans"))?;

    let config = format!(
        r#"# Synclink Project Configuration
name: {project_name}

api:
  base_url: "https://api.synclink.dev"
  link_token_header: X-Link-Token
  timeout_secs: 30

theme:
  mode: light

# Overrides selected with --profile
profiles:
  staging:
    base_url: "https://staging.api.synclink.dev"
"#
    );
    fs::write(project_dir.join("synclink.yaml"), config)?;

    let example_plan = r#"# Example setup plan
# Run with: synclink connect plans/example_plan.yaml --dry-run
source:
  display_name: Analytics Warehouse
  connection:
    type: bigquery
    credentials: '{"type": "service_account", "project_id": "my-project"}'

object:
  id: obj_customers
  name: Customers

namespace: analytics
table_name: customers

field_mappings:
  - source_column: id
    destination_field: customer_id
  - source_column: email
    destination_field: email

start_date: 2026-11-01
"#;
    fs::write(project_dir.join("plans/example_plan.yaml"), example_plan)?;

    let gitignore = r#"# Credentials
.env

# IDE
.idea/
.vscode/
*.swp
"#;
    fs::write(project_dir.join(".gitignore"), gitignore)?;

    tracing::info!(
        "✓ Created project '{}' at {}",
        project_name,
        abs_path.display()
    );
    tracing::info!("");
    tracing::info!("Next steps:");
    if path != "." {
        tracing::info!("  cd {}", project_dir.display());
    }
    tracing::info!("  synclink validate                                  # Check configuration");
    tracing::info!("  synclink connect plans/example_plan.yaml --dry-run # Try the example plan");

    Ok(())
}
