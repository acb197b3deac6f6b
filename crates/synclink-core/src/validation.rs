//! Step validation
//!
//! Pure predicates deciding whether the data collected so far is enough to
//! leave a step. Matches over [`ConnectionType`] have no wildcard arm, so a
//! new connection type does not compile until its required fields are listed.

use crate::connection::{ConnectionType, NewSourceState};
use crate::state::WizardState;

/// Required credential fields for `connection_type`, as `(name, value)` pairs
fn required_fields(
    connection_type: ConnectionType,
    form: &NewSourceState,
) -> Vec<(&'static str, &str)> {
    match connection_type {
        ConnectionType::BigQuery => {
            let c = &form.bigquery_config;
            vec![("credentials", c.credentials.as_str())]
        }
        ConnectionType::Snowflake => {
            let c = &form.snowflake_config;
            vec![
                ("username", c.username.as_str()),
                ("password", c.password.as_str()),
                ("database_name", c.database_name.as_str()),
                ("warehouse_name", c.warehouse_name.as_str()),
                ("role", c.role.as_str()),
                ("host", c.host.as_str()),
            ]
        }
        ConnectionType::Redshift => {
            let c = &form.redshift_config;
            vec![
                ("host", c.host.as_str()),
                ("port", c.port.as_str()),
                ("database_name", c.database_name.as_str()),
                ("username", c.username.as_str()),
                ("password", c.password.as_str()),
            ]
        }
        ConnectionType::MongoDb => {
            let c = &form.mongodb_config;
            vec![
                ("host", c.host.as_str()),
                ("username", c.username.as_str()),
                ("password", c.password.as_str()),
                ("database_name", c.database_name.as_str()),
            ]
        }
    }
}

/// Names of the empty fields blocking source creation
///
/// `display_name` is reported first when empty, followed by the credential
/// fields of the selected type in form order.
pub fn missing_connection_fields(
    connection_type: ConnectionType,
    form: &NewSourceState,
) -> Vec<&'static str> {
    let mut missing = Vec::new();
    if form.display_name.is_empty() {
        missing.push("display_name");
    }
    missing.extend(
        required_fields(connection_type, form)
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name),
    );
    missing
}

/// Whether the connection form is complete for `connection_type`
pub fn validate_connection_setup(connection_type: ConnectionType, form: &NewSourceState) -> bool {
    missing_connection_fields(connection_type, form).is_empty()
}

/// Whether the object step has everything the finalize step needs
pub fn validate_object_setup(state: &WizardState) -> bool {
    state.object.is_some() && state.namespace.is_some() && state.table_name.is_some()
}
