//! Setup plan execution
//!
//! Drives a [`WizardShell`] through every step using the answers in a
//! [`SetupPlan`], the same way a user clicking "Continue" would.

use anyhow::{Context, anyhow, bail};
use std::sync::Arc;
use synclink_core::capabilities::TracingCapabilities;
use synclink_core::embed::{EmbedMessage, Theme};
use synclink_core::{
    Capabilities, ConnectApi, SetupPlan, SourceDescriptor, SourcePlan, SourcesCache, Step,
    StepOutcome, SyncDescriptor, WizardShell,
};

use crate::error::Result;

/// Runtime executing setup plans against a backend
pub struct Runtime<A: ConnectApi + ?Sized + 'static> {
    api: Arc<A>,
    cache: SourcesCache,
    capabilities: Capabilities,
    theme: Option<Theme>,
}

impl<A: ConnectApi + ?Sized + 'static> Runtime<A> {
    /// Create a runtime that logs analytics, errors, and host messages
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            cache: SourcesCache::new(),
            capabilities: Capabilities {
                reporter: Arc::new(TracingCapabilities),
                analytics: Arc::new(TracingCapabilities),
                notifications: Arc::new(TracingCapabilities),
            },
            theme: None,
        }
    }

    /// Replace the injected capabilities
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Theme posted to the host once the wizard is ready
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Start a new wizard session sharing this runtime's sources cache
    pub fn shell(&self) -> WizardShell<A> {
        WizardShell::new(
            self.api.clone(),
            self.cache.clone(),
            self.capabilities.clone(),
        )
    }

    /// Sources already configured for this end customer
    pub async fn list_sources(&self) -> Result<Vec<SourceDescriptor>> {
        self.cache
            .get_or_fetch(self.api.as_ref())
            .await
            .context("Failed to list sources")
    }

    /// Run `plan` to completion and return the finalized sync
    pub async fn run_plan(&self, plan: &SetupPlan) -> Result<SyncDescriptor> {
        let mut shell = self.shell();
        if shell.announce_ready()
            && let Some(theme) = &self.theme
        {
            self.capabilities
                .notifications
                .post(EmbedMessage::Theme(theme.clone()));
        }

        match &plan.source {
            SourcePlan::Existing { existing } => {
                let source = shell
                    .known_sources()
                    .await
                    .context("Failed to list sources")?
                    .into_iter()
                    .find(|s| s.id == *existing)
                    .ok_or_else(|| anyhow!("source '{}' not found", existing))?;
                tracing::info!("Using existing source {} ({})", source.id, source.display_name);
                shell.select_existing_source(source);
            }
            SourcePlan::New { connection, .. } => {
                expect_moved(shell.continue_step().await, Step::Warehouse)?;
                shell.select_connection_type(connection.connection_type());
                expect_moved(shell.continue_step().await, Step::Connection)?;
                if let Some(form) = plan.new_source_form() {
                    *shell.new_source_mut() = form;
                }
                expect_moved(shell.continue_step().await, Step::Object)
                    .context("Failed to create source")?;
            }
        }

        shell.select_object(
            plan.object.clone(),
            plan.namespace.clone(),
            plan.table_name.clone(),
        );
        expect_moved(shell.continue_step().await, Step::Finalize)?;

        shell.set_field_mappings(plan.field_mappings.clone());
        shell.set_sync_start_date(plan.start_date);

        match shell.continue_step().await {
            StepOutcome::Completed(sync) => {
                shell.request_close();
                Ok(sync)
            }
            other => Err(outcome_error(other)).context("Failed to finalize sync"),
        }
    }
}

fn expect_moved(outcome: StepOutcome, expected: Step) -> Result<()> {
    match outcome {
        StepOutcome::Moved(step) if step == expected => {
            tracing::debug!("Reached {:?}", step);
            Ok(())
        }
        StepOutcome::Moved(step) => bail!("expected to reach {:?}, reached {:?}", expected, step),
        other => Err(outcome_error(other)),
    }
}

fn outcome_error(outcome: StepOutcome) -> anyhow::Error {
    match outcome {
        StepOutcome::Blocked { missing } => anyhow!("missing {}", missing.join(", ")),
        StepOutcome::Failed(error) => anyhow!(error),
        StepOutcome::Cancelled => anyhow!("cancelled"),
        StepOutcome::Moved(step) => anyhow!("unexpected move to {:?}", step),
        StepOutcome::Completed(sync) => anyhow!("sync '{}' completed unexpectedly", sync.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryConnectApi;
    use synclink_core::ConnectionType;

    fn new_source_plan() -> SetupPlan {
        load_plan(
            r#"
source:
  display_name: Warehouse
  connection:
    type: redshift
    host: cluster.example.com
    port: "5439"
    database_name: dev
    username: admin
    password: secret
object:
  id: obj_orders
  name: Orders
namespace: public
table_name: orders
field_mappings:
  - source_column: order_id
    destination_field: id
start_date: 2026-11-01
"#,
        )
    }

    fn load_plan(yaml: &str) -> SetupPlan {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(&path, yaml).unwrap();
        SetupPlan::load(&path).unwrap()
    }

    #[tokio::test]
    async fn test_run_plan_creates_source_and_sync() {
        let api = Arc::new(InMemoryConnectApi::new());
        let runtime = Runtime::new(api.clone());

        let sync = runtime.run_plan(&new_source_plan()).await.unwrap();

        assert_eq!(sync.table_name, "orders");
        assert_eq!(sync.object_id, "obj_orders");
        assert!(sync.starts_at.is_some());
        let sources = runtime.list_sources().await.unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].connection_type, ConnectionType::Redshift);
        assert_eq!(sync.source_id, sources[0].id);
        assert_eq!(api.syncs().len(), 1);
    }

    #[tokio::test]
    async fn test_run_plan_with_existing_source() {
        let existing = SourceDescriptor {
            id: "src_existing".to_string(),
            display_name: "Prod".to_string(),
            connection_type: ConnectionType::Snowflake,
        };
        let api = Arc::new(InMemoryConnectApi::with_sources(vec![existing]));
        let runtime = Runtime::new(api);
        let plan = load_plan(
            r#"
source:
  existing: src_existing
object:
  id: obj_1
  name: Customers
namespace: public
table_name: customers
"#,
        );

        let sync = runtime.run_plan(&plan).await.unwrap();

        assert_eq!(sync.source_id, "src_existing");
        assert!(sync.starts_at.is_none());
    }

    #[tokio::test]
    async fn test_run_plan_unknown_existing_source() {
        let runtime = Runtime::new(Arc::new(InMemoryConnectApi::new()));
        let plan = load_plan(
            r#"
source:
  existing: src_nope
object:
  id: obj_1
  name: Customers
namespace: public
table_name: customers
"#,
        );

        let err = runtime.run_plan(&plan).await.unwrap_err();
        assert!(err.to_string().contains("src_nope"));
    }

    #[tokio::test]
    async fn test_run_plan_reports_create_failure() {
        let api = Arc::new(InMemoryConnectApi::new());
        api.fail_next_create("warehouse unreachable");
        let runtime = Runtime::new(api.clone());

        let err = runtime.run_plan(&new_source_plan()).await.unwrap_err();

        assert!(format!("{:#}", err).contains("warehouse unreachable"));
        assert!(api.syncs().is_empty());
    }

    #[derive(Default)]
    struct Posted(std::sync::Mutex<Vec<EmbedMessage>>);

    impl synclink_core::capabilities::NotificationChannel for Posted {
        fn post(&self, message: EmbedMessage) {
            self.0.lock().unwrap().push(message);
        }
    }

    #[tokio::test]
    async fn test_run_plan_posts_ready_theme_and_close() {
        let posted = Arc::new(Posted::default());
        let theme = Theme {
            mode: synclink_core::embed::ThemeMode::Dark,
            primary_color: Some("#4f46e5".to_string()),
        };
        let runtime = Runtime::new(Arc::new(InMemoryConnectApi::new()))
            .with_capabilities(Capabilities {
                notifications: posted.clone(),
                ..Default::default()
            })
            .with_theme(theme.clone());

        runtime.run_plan(&new_source_plan()).await.unwrap();

        assert_eq!(
            *posted.0.lock().unwrap(),
            vec![
                EmbedMessage::IframeReady,
                EmbedMessage::Theme(theme),
                EmbedMessage::Close
            ]
        );
    }

    #[test]
    fn test_expect_moved_rejects_wrong_step() {
        let err = expect_moved(StepOutcome::Moved(Step::Warehouse), Step::Object).unwrap_err();
        assert!(err.to_string().contains("Object"));
    }

    #[test]
    fn test_blocked_outcome_lists_missing_fields() {
        let err = outcome_error(StepOutcome::Blocked {
            missing: vec!["namespace", "table_name"],
        });
        assert_eq!(err.to_string(), "missing namespace, table_name");
    }
}
