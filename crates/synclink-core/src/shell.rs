//! Wizard shell
//!
//! [`WizardShell`] owns one [`WizardState`] for the length of a session and
//! wires each step's "Continue" action to validation, the backend mutation
//! for that step, and the transition table.
//!
//! ```rust,ignore
//! let mut shell = WizardShell::new(api, SourcesCache::new(), Capabilities::default());
//! shell.continue_step().await;                       // Initial -> Warehouse
//! shell.select_connection_type(ConnectionType::BigQuery);
//! shell.continue_step().await;                       // Warehouse -> Connection
//! shell.new_source_mut().display_name = "My Source".into();
//! shell.new_source_mut().bigquery_config.credentials = key_json;
//! shell.continue_step().await;                       // creates the source
//! ```
//!
//! Dropping the shell cancels any in-flight backend call.

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde_json::json;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;

use crate::api::{
    ApiResult, ConnectApi, CreateSourceRequest, FinalizeSyncRequest, SourceDescriptor,
    SyncDescriptor,
};
use crate::cache::SourcesCache;
use crate::capabilities::{AnalyticsSink, ErrorReporter, Noop, NotificationChannel};
use crate::connection::{ConnectionType, NewSourceState};
use crate::dates::{date_to_utc_midnight, picker_to_utc, utc_to_picker};
use crate::embed::EmbedMessage;
use crate::mutation::{Failure, Mutation, MutationError, MutationOutcome, MutationState};
use crate::state::{Advance, FieldMapping, ObjectDescriptor, Step, WizardState};
use crate::validation::missing_connection_fields;

/// Host capabilities injected into a shell
#[derive(Clone)]
pub struct Capabilities {
    /// Error tracking
    pub reporter: Arc<dyn ErrorReporter>,
    /// Product analytics
    pub analytics: Arc<dyn AnalyticsSink>,
    /// Messages to the embedding page
    pub notifications: Arc<dyn NotificationChannel>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            reporter: Arc::new(Noop),
            analytics: Arc::new(Noop),
            notifications: Arc::new(Noop),
        }
    }
}

/// Result of a "Continue" action
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The wizard moved to this step
    Moved(Step),
    /// Required fields are missing; nothing changed
    Blocked {
        /// Names of the missing fields
        missing: Vec<&'static str>,
    },
    /// The step's backend call failed; the user stays on the step
    Failed(MutationError),
    /// The sync was finalized and the wizard is done
    Completed(SyncDescriptor),
    /// The shell was cancelled while the backend call was in flight
    Cancelled,
}

type CompletionCallback = Box<dyn Fn(&SyncDescriptor) + Send + Sync>;

/// Orchestrates one wizard session
pub struct WizardShell<A: ConnectApi + ?Sized + 'static> {
    api: Arc<A>,
    state: WizardState,
    create_source: Mutation<CreateSourceRequest, SourceDescriptor>,
    finalize_sync: Mutation<FinalizeSyncRequest, SyncDescriptor>,
    cache: SourcesCache,
    capabilities: Capabilities,
    lifecycle: CancellationToken,
    ready: OnceLock<()>,
    on_complete: Option<CompletionCallback>,
}

impl<A: ConnectApi + ?Sized + 'static> WizardShell<A> {
    /// Start a session with fresh state
    pub fn new(api: Arc<A>, cache: SourcesCache, capabilities: Capabilities) -> Self {
        let lifecycle = CancellationToken::new();

        let create_api = api.clone();
        let create_source = Mutation::new("create_source", move |request: CreateSourceRequest| {
            let api = create_api.clone();
            async move { api.create_source(request).await.map_err(Failure::from) }
        })
        .with_reporter(capabilities.reporter.clone())
        .with_parent_token(&lifecycle);

        let finalize_api = api.clone();
        let finalize_sync = Mutation::new("finalize_sync", move |request: FinalizeSyncRequest| {
            let api = finalize_api.clone();
            async move { api.finalize_sync(request).await.map_err(Failure::from) }
        })
        .with_reporter(capabilities.reporter.clone())
        .with_parent_token(&lifecycle);

        Self {
            api,
            state: WizardState::initial(),
            create_source,
            finalize_sync,
            cache,
            capabilities,
            lifecycle,
            ready: OnceLock::new(),
            on_complete: None,
        }
    }

    /// Run `callback` when the sync is finalized
    pub fn on_complete(
        mut self,
        callback: impl Fn(&SyncDescriptor) + Send + Sync + 'static,
    ) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// Current wizard state
    pub fn state(&self) -> &WizardState {
        &self.state
    }

    /// State of the create-source call
    pub fn create_source_state(&self) -> MutationState<SourceDescriptor> {
        self.create_source.state()
    }

    /// State of the finalize-sync call
    pub fn finalize_sync_state(&self) -> MutationState<SyncDescriptor> {
        self.finalize_sync.state()
    }

    /// Whether a backend call is in flight
    pub fn is_busy(&self) -> bool {
        self.create_source.is_loading() || self.finalize_sync.is_loading()
    }

    /// Token cancelled when the session ends
    pub fn lifecycle_token(&self) -> CancellationToken {
        self.lifecycle.clone()
    }

    /// Choose the warehouse type
    ///
    /// Switching to a different type discards a source created for the
    /// previous one. Ignored while an existing source is selected, since the
    /// type comes from that source.
    pub fn select_connection_type(&mut self, connection_type: ConnectionType) {
        if self.state.skipped_source_setup {
            tracing::debug!(
                connection_type = %connection_type,
                "existing source selected, ignoring connection type change"
            );
            return;
        }
        if self.state.connection_type != Some(connection_type) {
            self.state.new_source_state.success = None;
            self.state.source = None;
        }
        self.state.connection_type = Some(connection_type);
    }

    /// Credential forms, for editing
    pub fn new_source_mut(&mut self) -> &mut NewSourceState {
        &mut self.state.new_source_state
    }

    /// Jump from the existing-sources list straight to the object step
    pub fn select_existing_source(&mut self, source: SourceDescriptor) {
        tracing::debug!(source_id = %source.id, "existing source selected");
        self.capabilities.analytics.track(
            "existing_source_selected",
            json!({ "source_id": source.id, "connection_type": source.connection_type }),
        );
        self.state.select_existing_source(source);
    }

    /// Set the destination object and table
    pub fn select_object(
        &mut self,
        object: ObjectDescriptor,
        namespace: impl Into<String>,
        table_name: impl Into<String>,
    ) {
        self.state.object = Some(object);
        self.state.namespace = Some(namespace.into());
        self.state.table_name = Some(table_name.into());
    }

    /// Set the column mappings
    pub fn set_field_mappings(&mut self, mappings: Vec<FieldMapping>) {
        self.state.field_mappings = Some(mappings);
    }

    /// Set the first sync date directly
    pub fn set_sync_start_date(&mut self, date: Option<NaiveDate>) {
        self.state.sync_start_date = date;
    }

    /// Set the first sync date from a calendar picker value
    pub fn pick_sync_start(&mut self, picked: DateTime<FixedOffset>) {
        self.state.sync_start_date = Some(picker_to_utc(picked).date_naive());
    }

    /// First sync date as a picker rendering at `offset` should show it
    pub fn sync_start_for_picker(&self, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
        self.state
            .sync_start_date
            .map(|date| utc_to_picker(date_to_utc_midnight(date), offset))
    }

    /// Sources already configured for this end customer
    pub async fn known_sources(&self) -> ApiResult<Vec<SourceDescriptor>> {
        self.cache.get_or_fetch(self.api.as_ref()).await
    }

    /// Tell the host the widget is ready; only the first call posts
    pub fn announce_ready(&self) -> bool {
        let mut posted = false;
        self.ready.get_or_init(|| {
            self.capabilities
                .notifications
                .post(EmbedMessage::IframeReady);
            posted = true;
        });
        posted
    }

    /// Ask the host to close the widget
    pub fn request_close(&self) {
        self.capabilities.notifications.post(EmbedMessage::Close);
    }

    /// Go back one step; returns false on the first step
    pub fn back(&mut self) -> bool {
        let moved = self.state.retreat();
        if moved {
            tracing::debug!(step = ?self.state.step, "moved back");
        }
        moved
    }

    /// Throw away all selections and start over
    pub fn restart(&mut self) {
        tracing::debug!("restarting wizard");
        self.state = WizardState::initial();
        self.create_source.reset();
        self.finalize_sync.reset();
    }

    /// Cancel in-flight calls and end the session
    pub fn cancel(&self) {
        self.lifecycle.cancel();
    }

    /// Handle the "Continue" action of the current step
    pub async fn continue_step(&mut self) -> StepOutcome {
        match self.state.step {
            Step::Initial | Step::Warehouse | Step::Object => self.advance(),
            Step::Connection => self.submit_connection().await,
            Step::Finalize => self.submit_finalize().await,
        }
    }

    fn missing_for_step(&self) -> Vec<&'static str> {
        let state = &self.state;
        match state.step {
            Step::Initial if state.skipped_source_setup && state.source.is_none() => {
                vec!["source"]
            }
            Step::Initial => vec![],
            Step::Warehouse if state.connection_type.is_none() => vec!["connection_type"],
            Step::Warehouse => vec![],
            Step::Connection => match state.connection_type {
                Some(connection_type) => {
                    missing_connection_fields(connection_type, &state.new_source_state)
                }
                None => vec!["connection_type"],
            },
            Step::Object | Step::Finalize => {
                let mut missing = Vec::new();
                if state.object.is_none() {
                    missing.push("object");
                }
                if state.namespace.is_none() {
                    missing.push("namespace");
                }
                if state.table_name.is_none() {
                    missing.push("table_name");
                }
                missing
            }
        }
    }

    fn advance(&mut self) -> StepOutcome {
        let from = self.state.step;
        match self.state.advance() {
            Advance::Moved(step) => {
                tracing::debug!(from = ?from, to = ?step, "step advanced");
                self.capabilities
                    .analytics
                    .track("wizard_step_viewed", json!({ "step": step }));
                StepOutcome::Moved(step)
            }
            Advance::Blocked | Advance::Complete => StepOutcome::Blocked {
                missing: self.missing_for_step(),
            },
        }
    }

    async fn submit_connection(&mut self) -> StepOutcome {
        let Some(connection_type) = self.state.connection_type else {
            return StepOutcome::Blocked {
                missing: vec!["connection_type"],
            };
        };

        let already_created = self.state.new_source_state.success == Some(true)
            && self.state.source.is_some();
        if already_created || self.state.skipped_source_setup {
            return self.advance();
        }

        let missing = self.missing_for_step();
        if !missing.is_empty() {
            return StepOutcome::Blocked { missing };
        }

        let form = &self.state.new_source_state;
        let request = CreateSourceRequest {
            display_name: form.display_name.clone(),
            credentials: form.credentials_for(connection_type),
        };

        tracing::info!(
            connection_type = %connection_type,
            display_name = %request.display_name,
            "creating source"
        );

        match self.create_source.mutate(request).await {
            MutationOutcome::Success(source) => {
                tracing::info!(source_id = %source.id, "source created");
                self.state.source = Some(source.clone());
                self.state.new_source_state.success = Some(true);
                self.capabilities.analytics.track(
                    "source_created",
                    json!({ "source_id": source.id, "connection_type": connection_type }),
                );
                self.cache.record_created(source).await;
                self.advance()
            }
            MutationOutcome::Failed(error) => {
                self.state.new_source_state.success = Some(false);
                StepOutcome::Failed(error)
            }
            MutationOutcome::Cancelled => StepOutcome::Cancelled,
        }
    }

    async fn submit_finalize(&mut self) -> StepOutcome {
        let missing = self.missing_for_step();
        if !missing.is_empty() {
            return StepOutcome::Blocked { missing };
        }

        let state = &self.state;
        let (Some(source), Some(object), Some(namespace), Some(table_name)) = (
            &state.source,
            &state.object,
            &state.namespace,
            &state.table_name,
        ) else {
            return StepOutcome::Blocked {
                missing: vec!["source"],
            };
        };

        let request = FinalizeSyncRequest {
            source_id: source.id.clone(),
            object_id: object.id.clone(),
            namespace: namespace.clone(),
            table_name: table_name.clone(),
            field_mappings: state.field_mappings.clone().unwrap_or_default(),
            starts_at: state.sync_start_date.map(date_to_utc_midnight),
        };

        tracing::info!(
            source_id = %request.source_id,
            object_id = %request.object_id,
            table = %format!("{}.{}", request.namespace, request.table_name),
            "finalizing sync"
        );

        match self.finalize_sync.mutate(request).await {
            MutationOutcome::Success(sync) => {
                tracing::info!(sync_id = %sync.id, "sync finalized");
                self.capabilities
                    .analytics
                    .track("sync_finalized", json!({ "sync_id": sync.id }));
                if let Some(callback) = &self.on_complete {
                    callback(&sync);
                }
                StepOutcome::Completed(sync)
            }
            MutationOutcome::Failed(error) => StepOutcome::Failed(error),
            MutationOutcome::Cancelled => StepOutcome::Cancelled,
        }
    }
}

impl<A: ConnectApi + ?Sized + 'static> Drop for WizardShell<A> {
    fn drop(&mut self) {
        self.lifecycle.cancel();
    }
}
