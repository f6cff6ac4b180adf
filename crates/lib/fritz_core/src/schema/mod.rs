//! SQL for the per-definition entity tables.
//!
//! Each definition owns a table `entity_<id>` holding one row of data per
//! entity. Component names are the column names and their storage hint the
//! column type. Everything here is pure string building; executing it is up
//! to the storage side.

pub mod changeset;

use thiserror::Error;

use crate::definition::{Definition, DefinitionError, FieldComponent, is_column_name};
use crate::registry::DbType;
use crate::settings::{FieldSettings, values};

pub use changeset::{Changeset, alter_table_statements, compare};

/// Fixed columns every entity table starts with.
pub const BASE_COLUMNS: [&str; 4] = [
    "id UUID PRIMARY KEY DEFAULT uuid_generate_v4()",
    "entity_id UUID NOT NULL REFERENCES entities(id) ON DELETE CASCADE",
    "created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
    "updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()",
];

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("Component {0} has no storage type")]
    MissingDbType(String),

    #[error("Component {component} has an invalid storage type: {db_type}")]
    InvalidDbType { component: String, db_type: String },

    #[error("Component name is not a valid column name: {0}")]
    InvalidColumnName(String),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

/// Quoted table name for a definition's entity data.
pub fn table_name(definition: &Definition) -> String {
    format!("\"entity_{}\"", definition.id())
}

/// Column type of a component. An unsized `varchar` picks up `columnLength`.
pub fn column_type(component: &FieldComponent) -> Result<DbType, SchemaError> {
    let db_type = component.db_type();
    if db_type.is_empty() {
        return Err(SchemaError::MissingDbType(component.name().to_string()));
    }
    let valid = db_type
        .as_str()
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '(' | ')' | ',' | ' '));
    if !valid {
        return Err(SchemaError::InvalidDbType {
            component: component.name().to_string(),
            db_type: db_type.to_string(),
        });
    }

    if db_type.as_str() == DbType::VARCHAR
        && let Some(length) = component.settings().text().and_then(|s| s.column_length)
        && let Ok(length) = u32::try_from(length)
        && length > 0
    {
        return Ok(db_type.with_size(length));
    }
    Ok(db_type.clone())
}

/// SQL literal for the component's default value, if it has one.
pub fn default_literal(settings: &FieldSettings) -> Option<String> {
    match settings {
        FieldSettings::Input(s) | FieldSettings::Textarea(s) => s
            .default_value
            .as_deref()
            .filter(|v| !v.is_empty())
            .map(quote_literal),
        FieldSettings::Integer(s) => s.default_value.map(|v| v.to_string()),
        FieldSettings::Float4(s) | FieldSettings::Float8(s) => {
            s.default_value.filter(|v| v.is_finite()).map(|v| v.to_string())
        }
        FieldSettings::Date(s) => s
            .default_value
            .map(|d| quote_literal(&values::format_date(d))),
        FieldSettings::Unsupported { .. } => None,
    }
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

pub(crate) fn column_name(component: &FieldComponent) -> Result<&str, SchemaError> {
    let name = component.name();
    if is_column_name(name) {
        Ok(name)
    } else {
        Err(SchemaError::InvalidColumnName(name.to_string()))
    }
}

/// `<name> <type> [DEFAULT <v>] [NOT NULL]`
pub fn column_definition(component: &FieldComponent) -> Result<String, SchemaError> {
    let mut parts = vec![
        column_name(component)?.to_string(),
        column_type(component)?.to_string(),
    ];
    if let Some(default) = default_literal(component.settings()) {
        parts.push(format!("DEFAULT {default}"));
    }
    if component.is_mandatory() {
        parts.push("NOT NULL".to_string());
    }
    Ok(parts.join(" "))
}

/// `CREATE TABLE IF NOT EXISTS` for a definition that passes its checks.
pub fn create_table_sql(definition: &Definition) -> Result<String, SchemaError> {
    definition.check()?;
    let mut columns: Vec<String> = BASE_COLUMNS.iter().map(|c| c.to_string()).collect();
    for component in definition.layout.components() {
        columns.push(column_definition(component)?);
    }
    log::debug!(
        "entity table for {} has {} data columns",
        definition.id(),
        definition.layout.len()
    );
    Ok(format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        table_name(definition),
        columns.join(", ")
    ))
}
