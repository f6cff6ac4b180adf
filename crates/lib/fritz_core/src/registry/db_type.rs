//! Storage type hints attached to field components.

use serde::{Deserialize, Serialize};

/// Underlying column type of a field component, e.g. `varchar` or `decimal(10,2)`.
///
/// Kept as free text so hints coming from a remote definition survive a
/// round trip even when this build does not know them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DbType(String);

impl DbType {
    pub const VARCHAR: &'static str = "varchar";
    pub const TEXT: &'static str = "text";
    pub const CHAR: &'static str = "char";
    pub const SMALLINT: &'static str = "smallint";
    pub const INTEGER: &'static str = "integer";
    pub const BIGINT: &'static str = "bigint";
    pub const NUMERIC: &'static str = "numeric";
    pub const DECIMAL: &'static str = "decimal";
    pub const FLOAT4: &'static str = "float4";
    pub const FLOAT8: &'static str = "float8";
    pub const BOOLEAN: &'static str = "boolean";
    pub const DATE: &'static str = "date";
    pub const TIMESTAMP: &'static str = "timestamp";
    pub const TIMESTAMPTZ: &'static str = "timestamptz";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Sized variant, e.g. `varchar(255)`.
    pub fn with_size(&self, size: u32) -> Self {
        Self(format!("{}({size})", self.0))
    }

    /// Precision/scale variant, e.g. `decimal(10,2)`.
    pub fn with_precision(&self, precision: u32, scale: u32) -> Self {
        Self(format!("{}({precision},{scale})", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DbType {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
