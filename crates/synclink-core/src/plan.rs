//! Setup plans
//!
//! A setup plan answers every wizard step up front so a sync can be
//! configured without a UI.
//!
//! # Example
//!
//! ```yaml
//! source:
//!   display_name: My Source
//!   connection:
//!     type: bigquery
//!     credentials: '{"type": "service_account"}'
//! object:
//!   id: obj_customers
//!   name: Customers
//! namespace: analytics
//! table_name: customers
//! field_mappings:
//!   - source_column: id
//!     destination_field: customer_id
//! start_date: 2026-11-01
//! ```
//!
//! `source: { existing: src_123 }` reuses a source instead of creating one.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::connection::{NewSourceState, SourceCredentials};
use crate::error::{Error, Result};
use crate::state::{FieldMapping, ObjectDescriptor};
use crate::validation::missing_connection_fields;

/// Where the sync reads from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourcePlan {
    /// Reuse a source by id
    Existing {
        /// Source id
        existing: String,
    },

    /// Create a new source
    New {
        /// Name shown in lists
        display_name: String,
        /// Credentials for the chosen warehouse
        connection: SourceCredentials,
    },
}

/// Answers for every wizard step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SetupPlan {
    /// Source to read from
    pub source: SourcePlan,

    /// Target object
    pub object: ObjectDescriptor,

    /// Destination namespace
    pub namespace: String,

    /// Destination table
    pub table_name: String,

    /// Column mappings
    #[serde(default)]
    pub field_mappings: Vec<FieldMapping>,

    /// First sync run
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
}

impl SetupPlan {
    /// Load and validate a plan file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::ConfigNotFound {
                path: path.display().to_string(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let plan: SetupPlan = serde_yaml::from_str(&contents)?;
        plan.validate()?;
        Ok(plan)
    }

    /// Check the plan can drive the wizard to completion
    pub fn validate(&self) -> Result<()> {
        if let SourcePlan::New {
            display_name,
            connection,
        } = &self.source
        {
            let form = self.new_source_form().unwrap_or_default();
            let missing = missing_connection_fields(connection.connection_type(), &form);
            if !missing.is_empty() {
                return Err(Error::InvalidPlan {
                    message: format!(
                        "source '{}' is missing {}",
                        display_name,
                        missing.join(", ")
                    ),
                });
            }
        }
        if self.namespace.trim().is_empty() {
            return Err(Error::InvalidPlan {
                message: "namespace must not be empty".to_string(),
            });
        }
        if self.table_name.trim().is_empty() {
            return Err(Error::InvalidPlan {
                message: "table_name must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Credential form pre-filled from a `New` source plan
    pub fn new_source_form(&self) -> Option<NewSourceState> {
        match &self.source {
            SourcePlan::Existing { .. } => None,
            SourcePlan::New {
                display_name,
                connection,
            } => {
                let mut form = NewSourceState {
                    display_name: display_name.clone(),
                    ..Default::default()
                };
                form.fill_credentials(connection.clone());
                Some(form)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionType;

    const NEW_SOURCE_PLAN: &str = r#"
source:
  display_name: My Source
  connection:
    type: bigquery
    credentials: '{"type": "service_account"}'
object:
  id: obj_customers
  name: Customers
namespace: analytics
table_name: customers
field_mappings:
  - source_column: id
    destination_field: customer_id
start_date: 2026-11-01
"#;

    #[test]
    fn test_parse_new_source_plan() {
        let plan: SetupPlan = serde_yaml::from_str(NEW_SOURCE_PLAN).unwrap();
        plan.validate().unwrap();

        match &plan.source {
            SourcePlan::New { connection, .. } => {
                assert_eq!(connection.connection_type(), ConnectionType::BigQuery);
            }
            _ => panic!("Expected new source"),
        }
        assert_eq!(plan.field_mappings.len(), 1);
        assert_eq!(plan.start_date, NaiveDate::from_ymd_opt(2026, 11, 1));

        let form = plan.new_source_form().unwrap();
        assert_eq!(form.display_name, "My Source");
        assert!(form.bigquery_config.credentials.contains("service_account"));
    }

    #[test]
    fn test_parse_existing_source_plan() {
        let yaml = r#"
source:
  existing: src_123
object:
  id: obj_1
  name: Orders
namespace: public
table_name: orders
"#;
        let plan: SetupPlan = serde_yaml::from_str(yaml).unwrap();
        plan.validate().unwrap();
        assert_eq!(
            plan.source,
            SourcePlan::Existing {
                existing: "src_123".to_string()
            }
        );
        assert!(plan.new_source_form().is_none());
        assert!(plan.field_mappings.is_empty());
    }

    #[test]
    fn test_validate_reports_missing_credentials() {
        let yaml = r#"
source:
  display_name: Snow
  connection:
    type: snowflake
    username: loader
    password: secret
    database_name: DB
    warehouse_name: WH
    host: acme.snowflakecomputing.com
object:
  id: obj_1
  name: Orders
namespace: public
table_name: orders
"#;
        let plan: SetupPlan = serde_yaml::from_str(yaml).unwrap();
        let err = plan.validate().unwrap_err();
        assert!(err.to_string().contains("role"), "{}", err);
    }

    #[test]
    fn test_validate_rejects_blank_table() {
        let mut plan: SetupPlan = serde_yaml::from_str(NEW_SOURCE_PLAN).unwrap();
        plan.table_name = "  ".to_string();
        assert!(matches!(plan.validate(), Err(Error::InvalidPlan { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = SetupPlan::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.yaml");
        std::fs::write(&path, NEW_SOURCE_PLAN).unwrap();

        let plan = SetupPlan::load(&path).unwrap();
        assert_eq!(plan.table_name, "customers");
    }
}
