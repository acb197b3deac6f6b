//! Wizard step state and transitions
//!
//! The wizard is a strictly linear state machine:
//!
//! ```text
//! Initial ──▶ Warehouse ──▶ Connection ──▶ Object ──▶ Finalize ──▶ (complete)
//!    │                                       ▲
//!    └──────── existing source picked ───────┘
//! ```
//!
//! The transition table lives in [`next_step`] and [`prev_step`]; the data
//! guards that keep a user on a step until its fields are filled live in
//! [`WizardState::advance`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::api::SourceDescriptor;
use crate::connection::{ConnectionType, NewSourceState};
use crate::validation::validate_object_setup;

/// A wizard step
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Landing view: create a new source or pick an existing one
    #[default]
    Initial,
    /// Warehouse type picker
    Warehouse,
    /// Credential form for the chosen warehouse
    Connection,
    /// Destination object and table
    Object,
    /// Field mappings and confirmation
    Finalize,
}

/// Target object a sync writes into
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectDescriptor {
    /// Backend identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl ObjectDescriptor {
    /// Create a new object descriptor
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Mapping from a source column to an object field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Column in the source table
    pub source_column: String,
    /// Field on the target object
    pub destination_field: String,
}

/// Successor of `step`
///
/// Depends only on the step, the chosen connection type, and whether the
/// source setup was skipped. `None` means the wizard is complete.
pub fn next_step(
    step: Step,
    connection_type: Option<ConnectionType>,
    skipped_source_setup: bool,
) -> Option<Step> {
    match step {
        Step::Initial if skipped_source_setup => Some(Step::Object),
        Step::Initial => Some(Step::Warehouse),
        Step::Warehouse => match connection_type {
            Some(_) => Some(Step::Connection),
            None => Some(Step::Warehouse),
        },
        Step::Connection => Some(Step::Object),
        Step::Object => Some(Step::Finalize),
        Step::Finalize => None,
    }
}

/// Predecessor of `step`; `None` for [`Step::Initial`]
pub fn prev_step(step: Step, skipped_source_setup: bool) -> Option<Step> {
    match step {
        Step::Initial => None,
        Step::Warehouse => Some(Step::Initial),
        Step::Connection => Some(Step::Warehouse),
        Step::Object if skipped_source_setup => Some(Step::Initial),
        Step::Object => Some(Step::Connection),
        Step::Finalize => Some(Step::Object),
    }
}

/// Result of a forward transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// The wizard moved to this step
    Moved(Step),
    /// Required data is missing; state is unchanged
    Blocked,
    /// Already on the last step; the caller finishes the wizard
    Complete,
}

/// Selections accumulated across wizard steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WizardState {
    /// Current step
    pub step: Step,

    /// True when an existing source was picked instead of creating one
    pub skipped_source_setup: bool,

    /// Target object, set in the object step
    pub object: Option<ObjectDescriptor>,

    /// Destination namespace, set in the object step
    pub namespace: Option<String>,

    /// Destination table, set in the object step
    pub table_name: Option<String>,

    /// Warehouse type, set in the warehouse step
    pub connection_type: Option<ConnectionType>,

    /// Created or selected source
    pub source: Option<SourceDescriptor>,

    /// Credential forms for a new source
    pub new_source_state: NewSourceState,

    /// Column mappings, set in the finalize step
    pub field_mappings: Option<Vec<FieldMapping>>,

    /// Calendar date of the first sync run, as picked in the finalize step
    pub sync_start_date: Option<NaiveDate>,
}

impl WizardState {
    /// Fresh state with every optional field unset
    pub fn initial() -> Self {
        Self::default()
    }

    /// Successor of the current step, ignoring data guards
    pub fn next_step(&self) -> Option<Step> {
        next_step(self.step, self.connection_type, self.skipped_source_setup)
    }

    /// Predecessor of the current step
    pub fn prev_step(&self) -> Option<Step> {
        prev_step(self.step, self.skipped_source_setup)
    }

    /// Whether the current step's required data is present
    pub fn can_advance(&self) -> bool {
        match self.step {
            Step::Initial => !self.skipped_source_setup || self.source.is_some(),
            Step::Warehouse => self.connection_type.is_some(),
            Step::Connection => {
                self.skipped_source_setup || self.new_source_state.success == Some(true)
            }
            Step::Object | Step::Finalize => validate_object_setup(self),
        }
    }

    /// Move forward one step if the current step is complete
    ///
    /// A blocked transition leaves the state untouched.
    pub fn advance(&mut self) -> Advance {
        if !self.can_advance() {
            return Advance::Blocked;
        }
        match self.next_step() {
            None => Advance::Complete,
            Some(next) if next == self.step => Advance::Blocked,
            Some(next) => {
                self.step = next;
                Advance::Moved(next)
            }
        }
    }

    /// Move back one step; returns false on [`Step::Initial`]
    ///
    /// Leaving the object step back to the landing view drops the picked
    /// existing source so the user can choose again.
    pub fn retreat(&mut self) -> bool {
        let Some(prev) = self.prev_step() else {
            return false;
        };
        if prev == Step::Initial && self.skipped_source_setup {
            self.skipped_source_setup = false;
            self.source = None;
        }
        self.step = prev;
        true
    }

    /// Shortcut from the existing-sources list straight to the object step
    ///
    /// Lands on [`Step::Object`] from any step; [`Step::Finalize`] is still
    /// only reachable through [`advance`](Self::advance).
    pub fn select_existing_source(&mut self, source: SourceDescriptor) {
        self.skipped_source_setup = true;
        self.connection_type = Some(source.connection_type);
        self.source = Some(source);
        self.step = Step::Object;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn source() -> SourceDescriptor {
        SourceDescriptor {
            id: "src_1".to_string(),
            display_name: "Prod warehouse".to_string(),
            connection_type: ConnectionType::Snowflake,
        }
    }

    #[test]
    fn test_initial_state_is_empty() {
        let state = WizardState::initial();
        assert_eq!(state.step, Step::Initial);
        assert!(!state.skipped_source_setup);
        assert!(state.object.is_none());
        assert!(state.namespace.is_none());
        assert!(state.table_name.is_none());
        assert!(state.connection_type.is_none());
        assert!(state.source.is_none());
        assert!(state.new_source_state.success.is_none());
        assert!(state.field_mappings.is_none());
    }

    #[rstest]
    #[case(Step::Initial, Some(ConnectionType::BigQuery), false, Some(Step::Warehouse))]
    #[case(Step::Initial, None, true, Some(Step::Object))]
    #[case(Step::Warehouse, Some(ConnectionType::Redshift), false, Some(Step::Connection))]
    #[case(Step::Warehouse, None, false, Some(Step::Warehouse))]
    #[case(Step::Connection, Some(ConnectionType::MongoDb), false, Some(Step::Object))]
    #[case(Step::Object, Some(ConnectionType::Snowflake), true, Some(Step::Finalize))]
    #[case(Step::Finalize, Some(ConnectionType::Snowflake), false, None)]
    fn test_next_step_table(
        #[case] step: Step,
        #[case] connection_type: Option<ConnectionType>,
        #[case] skipped: bool,
        #[case] expected: Option<Step>,
    ) {
        assert_eq!(next_step(step, connection_type, skipped), expected);
    }

    #[rstest]
    #[case(Step::Initial, false, None)]
    #[case(Step::Warehouse, false, Some(Step::Initial))]
    #[case(Step::Connection, false, Some(Step::Warehouse))]
    #[case(Step::Object, false, Some(Step::Connection))]
    #[case(Step::Object, true, Some(Step::Initial))]
    #[case(Step::Finalize, true, Some(Step::Object))]
    fn test_prev_step_table(
        #[case] step: Step,
        #[case] skipped: bool,
        #[case] expected: Option<Step>,
    ) {
        assert_eq!(prev_step(step, skipped), expected);
    }

    #[test]
    fn test_next_step_ignores_unrelated_fields() {
        let mut state = WizardState::initial();
        state.step = Step::Connection;
        state.connection_type = Some(ConnectionType::BigQuery);
        let first = state.next_step();

        state.namespace = Some("public".to_string());
        state.new_source_state.display_name = "Anything".to_string();
        state.field_mappings = Some(vec![]);

        assert_eq!(state.next_step(), first);
        assert_eq!(state.next_step(), first);
    }

    #[test]
    fn test_advance_blocked_without_connection_type() {
        let mut state = WizardState::initial();
        assert_eq!(state.advance(), Advance::Moved(Step::Warehouse));

        let before = state.clone();
        assert_eq!(state.advance(), Advance::Blocked);
        assert_eq!(state, before);
    }

    #[test]
    fn test_advance_connection_requires_successful_source() {
        let mut state = WizardState::initial();
        state.step = Step::Connection;
        state.connection_type = Some(ConnectionType::BigQuery);

        assert_eq!(state.advance(), Advance::Blocked);

        state.new_source_state.success = Some(false);
        assert_eq!(state.advance(), Advance::Blocked);

        state.new_source_state.success = Some(true);
        assert_eq!(state.advance(), Advance::Moved(Step::Object));
    }

    #[test]
    fn test_advance_object_requires_object_setup() {
        let mut state = WizardState::initial();
        state.step = Step::Object;
        state.object = Some(ObjectDescriptor::new("obj_1", "Customers"));
        state.namespace = Some("public".to_string());
        assert_eq!(state.advance(), Advance::Blocked);
        assert_eq!(state.step, Step::Object);

        state.table_name = Some("customers".to_string());
        assert_eq!(state.advance(), Advance::Moved(Step::Finalize));
        assert_eq!(state.advance(), Advance::Complete);
        assert_eq!(state.step, Step::Finalize);
    }

    #[test]
    fn test_select_existing_source_skips_connection() {
        let mut state = WizardState::initial();
        state.select_existing_source(source());

        assert_eq!(state.step, Step::Object);
        assert!(state.skipped_source_setup);
        assert_eq!(state.source.as_ref().map(|s| s.id.as_str()), Some("src_1"));
        assert_eq!(state.connection_type, Some(ConnectionType::Snowflake));
        assert!(state.new_source_state.success.is_none());
    }

    #[rstest]
    #[case(Step::Initial)]
    #[case(Step::Warehouse)]
    #[case(Step::Connection)]
    #[case(Step::Object)]
    #[case(Step::Finalize)]
    fn test_select_existing_source_lands_on_object_from_any_step(#[case] from: Step) {
        let mut state = WizardState::initial();
        state.step = from;
        state.connection_type = Some(ConnectionType::BigQuery);

        state.select_existing_source(source());

        assert_eq!(state.step, Step::Object);
        assert!(!validate_object_setup(&state));
        assert_eq!(state.advance(), Advance::Blocked);
        assert_eq!(state.step, Step::Object);

        state.object = Some(ObjectDescriptor::new("obj_1", "Customers"));
        state.namespace = Some("public".to_string());
        state.table_name = Some("customers".to_string());
        assert_eq!(state.advance(), Advance::Moved(Step::Finalize));
    }

    #[test]
    fn test_retreat_from_skipped_object_returns_to_initial() {
        let mut state = WizardState::initial();
        state.select_existing_source(source());

        assert!(state.retreat());
        assert_eq!(state.step, Step::Initial);
        assert!(!state.skipped_source_setup);
        assert!(state.source.is_none());
        assert!(!state.retreat());
    }

    #[test]
    fn test_retreat_walks_back_linear_path() {
        let mut state = WizardState::initial();
        state.step = Step::Finalize;
        assert!(state.retreat());
        assert_eq!(state.step, Step::Object);
        assert!(state.retreat());
        assert_eq!(state.step, Step::Connection);
        assert!(state.retreat());
        assert_eq!(state.step, Step::Warehouse);
    }

    #[test]
    fn test_step_serialization() {
        assert_eq!(serde_json::to_string(&Step::Finalize).unwrap(), "\"finalize\"");
        let step: Step = serde_json::from_str("\"connection\"").unwrap();
        assert_eq!(step, Step::Connection);
    }
}
