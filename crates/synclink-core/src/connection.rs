//! Warehouse connection types and credential forms
//!
//! Each supported warehouse has its own credential form. The wizard keeps
//! all four forms around while the user switches between types, but only the
//! form matching the selected [`ConnectionType`] is ever submitted.
//!
//! # Example
//!
//! ```yaml
//! type: snowflake
//! username: loader
//! password: secret
//! database_name: ANALYTICS
//! warehouse_name: COMPUTE_WH
//! role: LOADER
//! host: acme.snowflakecomputing.com
//! ```

use serde::{Deserialize, Serialize};

/// Supported warehouse connection types
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionType {
    /// Google BigQuery
    BigQuery,
    /// Snowflake
    Snowflake,
    /// Amazon Redshift
    Redshift,
    /// MongoDB
    MongoDb,
}

impl ConnectionType {
    /// Every connection type, in the order the warehouse picker shows them
    pub const ALL: [ConnectionType; 4] = [
        ConnectionType::BigQuery,
        ConnectionType::Snowflake,
        ConnectionType::Redshift,
        ConnectionType::MongoDb,
    ];

    /// Human-readable label
    pub fn display_name(self) -> &'static str {
        match self {
            ConnectionType::BigQuery => "BigQuery",
            ConnectionType::Snowflake => "Snowflake",
            ConnectionType::Redshift => "Redshift",
            ConnectionType::MongoDb => "MongoDB",
        }
    }
}

impl std::fmt::Display for ConnectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// BigQuery credential form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigQueryConfig {
    /// Service account key, as the raw JSON document
    #[serde(default)]
    pub credentials: String,
}

/// Snowflake credential form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnowflakeConfig {
    /// Login user
    #[serde(default)]
    pub username: String,
    /// Login password
    #[serde(default)]
    pub password: String,
    /// Database to read from
    #[serde(default)]
    pub database_name: String,
    /// Virtual warehouse used for queries
    #[serde(default)]
    pub warehouse_name: String,
    /// Role assumed by the login
    #[serde(default)]
    pub role: String,
    /// Account host, e.g. `acme.snowflakecomputing.com`
    #[serde(default)]
    pub host: String,
}

/// Redshift credential form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedshiftConfig {
    /// Cluster endpoint
    #[serde(default)]
    pub host: String,
    /// Port, kept as text because it comes straight from a form field
    #[serde(default)]
    pub port: String,
    /// Database to read from
    #[serde(default)]
    pub database_name: String,
    /// Login user
    #[serde(default)]
    pub username: String,
    /// Login password
    #[serde(default)]
    pub password: String,
}

/// MongoDB credential form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoDbConfig {
    /// Host or SRV record
    #[serde(default)]
    pub host: String,
    /// Login user
    #[serde(default)]
    pub username: String,
    /// Login password
    #[serde(default)]
    pub password: String,
    /// Database to read from
    #[serde(default)]
    pub database_name: String,
}

/// Credential payload for exactly one connection type
///
/// This is what gets sent to the backend when a source is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceCredentials {
    /// BigQuery credentials
    BigQuery(BigQueryConfig),
    /// Snowflake credentials
    Snowflake(SnowflakeConfig),
    /// Redshift credentials
    Redshift(RedshiftConfig),
    /// MongoDB credentials
    MongoDb(MongoDbConfig),
}

impl SourceCredentials {
    /// Connection type this payload belongs to
    pub fn connection_type(&self) -> ConnectionType {
        match self {
            SourceCredentials::BigQuery(_) => ConnectionType::BigQuery,
            SourceCredentials::Snowflake(_) => ConnectionType::Snowflake,
            SourceCredentials::Redshift(_) => ConnectionType::Redshift,
            SourceCredentials::MongoDb(_) => ConnectionType::MongoDb,
        }
    }
}

/// Form state for creating a new source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSourceState {
    /// Name shown for the source in lists
    #[serde(default)]
    pub display_name: String,

    /// BigQuery form
    #[serde(default)]
    pub bigquery_config: BigQueryConfig,

    /// Snowflake form
    #[serde(default)]
    pub snowflake_config: SnowflakeConfig,

    /// Redshift form
    #[serde(default)]
    pub redshift_config: RedshiftConfig,

    /// MongoDB form
    #[serde(default)]
    pub mongodb_config: MongoDbConfig,

    /// Outcome of the last creation attempt: `None` until one is made
    #[serde(default)]
    pub success: Option<bool>,
}

impl NewSourceState {
    /// Extract the credential form relevant to `connection_type`
    pub fn credentials_for(&self, connection_type: ConnectionType) -> SourceCredentials {
        match connection_type {
            ConnectionType::BigQuery => SourceCredentials::BigQuery(self.bigquery_config.clone()),
            ConnectionType::Snowflake => {
                SourceCredentials::Snowflake(self.snowflake_config.clone())
            }
            ConnectionType::Redshift => SourceCredentials::Redshift(self.redshift_config.clone()),
            ConnectionType::MongoDb => SourceCredentials::MongoDb(self.mongodb_config.clone()),
        }
    }

    /// Overwrite the form matching the payload's connection type
    pub fn fill_credentials(&mut self, credentials: SourceCredentials) {
        match credentials {
            SourceCredentials::BigQuery(c) => self.bigquery_config = c,
            SourceCredentials::Snowflake(c) => self.snowflake_config = c,
            SourceCredentials::Redshift(c) => self.redshift_config = c,
            SourceCredentials::MongoDb(c) => self.mongodb_config = c,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snowflake_credentials() {
        let yaml = r#"
type: snowflake
username: loader
password: secret
database_name: ANALYTICS
warehouse_name: COMPUTE_WH
role: LOADER
host: acme.snowflakecomputing.com
"#;
        let creds: SourceCredentials = serde_yaml::from_str(yaml).unwrap();
        match creds {
            SourceCredentials::Snowflake(s) => {
                assert_eq!(s.username, "loader");
                assert_eq!(s.role, "LOADER");
                assert_eq!(s.host, "acme.snowflakecomputing.com");
            }
            _ => panic!("Expected snowflake credentials"),
        }
    }

    #[test]
    fn test_parse_partial_form_defaults_to_empty() {
        let yaml = r#"
type: redshift
host: cluster.example.com
"#;
        let creds: SourceCredentials = serde_yaml::from_str(yaml).unwrap();
        match creds {
            SourceCredentials::Redshift(r) => {
                assert_eq!(r.host, "cluster.example.com");
                assert!(r.port.is_empty());
                assert!(r.password.is_empty());
            }
            _ => panic!("Expected redshift credentials"),
        }
    }

    #[test]
    fn test_connection_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ConnectionType::BigQuery).unwrap(),
            "\"bigquery\""
        );
        assert_eq!(
            serde_json::to_string(&ConnectionType::MongoDb).unwrap(),
            "\"mongodb\""
        );
    }

    #[test]
    fn test_credentials_for_picks_selected_form() {
        let mut form = NewSourceState::default();
        form.bigquery_config.credentials = "{}".to_string();
        form.mongodb_config.host = "mongo.internal".to_string();

        let creds = form.credentials_for(ConnectionType::MongoDb);
        assert_eq!(creds.connection_type(), ConnectionType::MongoDb);
        match creds {
            SourceCredentials::MongoDb(m) => assert_eq!(m.host, "mongo.internal"),
            _ => panic!("Expected mongodb credentials"),
        }
    }

    #[test]
    fn test_fill_credentials_leaves_other_forms_alone() {
        let mut form = NewSourceState::default();
        form.snowflake_config.role = "ADMIN".to_string();

        form.fill_credentials(SourceCredentials::BigQuery(BigQueryConfig {
            credentials: "{\"type\":\"service_account\"}".to_string(),
        }));

        assert_eq!(form.snowflake_config.role, "ADMIN");
        assert!(form.bigquery_config.credentials.contains("service_account"));
    }

    #[test]
    fn test_display_names_are_distinct() {
        let names: std::collections::HashSet<_> = ConnectionType::ALL
            .iter()
            .map(|t| t.display_name())
            .collect();
        assert_eq!(names.len(), ConnectionType::ALL.len());
        assert_eq!(ConnectionType::MongoDb.to_string(), "MongoDB");
    }
}
