//! Field type registry: the fixed catalog of data component types.
//!
//! Each entry describes one field type: its category, display strings and the
//! storage type new components of that type start with. The catalog is built
//! once; lookups of unknown identifiers return `None` and callers fall back
//! to a neutral "unsupported" state.

pub mod db_type;

use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use db_type::DbType;

/// Registry errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Unknown field type: {0}")]
    UnknownFieldType(String),
}

/// Grouping used when listing field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    Text,
    Numeric,
    Date,
}

impl FieldCategory {
    /// Display order of categories.
    pub const ALL: [FieldCategory; 3] = [Self::Text, Self::Numeric, Self::Date];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Numeric => "numeric",
            Self::Date => "date",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::Numeric => "Numeric",
            Self::Date => "Date",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Text => "document-text",
            Self::Numeric => "hashtag",
            Self::Date => "calendar",
        }
    }
}

impl std::fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field types this build knows how to edit, render and validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Input,
    Textarea,
    Integer,
    Float4,
    Float8,
    Date,
}

impl FieldType {
    pub const ALL: [FieldType; 6] = [
        Self::Input,
        Self::Textarea,
        Self::Integer,
        Self::Float4,
        Self::Float8,
        Self::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Textarea => "textarea",
            Self::Integer => "integer",
            Self::Float4 => "float4",
            Self::Float8 => "float8",
            Self::Date => "date",
        }
    }

    /// Parse a type identifier. Identifiers are lowercase; anything else is unknown.
    pub fn parse(id: &str) -> Option<FieldType> {
        Self::ALL.into_iter().find(|t| t.as_str() == id)
    }

    /// The built-in registry entry for this type.
    pub fn descriptor(&self) -> &'static FieldTypeDescriptor {
        // Every variant has a catalog entry.
        &BUILTIN.entries[*self as usize]
    }
}

impl FromStr for FieldType {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| RegistryError::UnknownFieldType(s.to_string()))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registry entry. Matches the shape served by `GET /definitions/data-component-types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldTypeDescriptor {
    pub id: String,
    pub label: String,
    pub category: FieldCategory,
    pub tooltip: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "defaultDBType")]
    pub default_db_type: DbType,
}

impl FieldTypeDescriptor {
    fn builtin(
        field_type: FieldType,
        label: &str,
        category: FieldCategory,
        tooltip: &str,
        icon: &str,
        db_type: &str,
    ) -> Self {
        Self {
            id: field_type.as_str().to_string(),
            label: label.to_string(),
            category,
            tooltip: tooltip.to_string(),
            icon: Some(icon.to_string()),
            default_db_type: DbType::from(db_type),
        }
    }

    /// The known field type behind this descriptor, if any.
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.id)
    }
}

/// Ordered catalog of field type descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldTypeRegistry {
    entries: Vec<FieldTypeDescriptor>,
}

static BUILTIN: LazyLock<FieldTypeRegistry> = LazyLock::new(|| FieldTypeRegistry {
    entries: vec![
        FieldTypeDescriptor::builtin(
            FieldType::Input,
            "Input",
            FieldCategory::Text,
            "Single line text input field",
            "text-cursor",
            DbType::VARCHAR,
        ),
        FieldTypeDescriptor::builtin(
            FieldType::Textarea,
            "Textarea",
            FieldCategory::Text,
            "Multi line text input field",
            "text-cursor",
            DbType::TEXT,
        ),
        FieldTypeDescriptor::builtin(
            FieldType::Integer,
            "Integer",
            FieldCategory::Numeric,
            "Whole number field",
            "hash",
            DbType::INTEGER,
        ),
        FieldTypeDescriptor::builtin(
            FieldType::Float4,
            "Float 4-byte",
            FieldCategory::Numeric,
            "Float 4-byte number field",
            "hash",
            DbType::FLOAT4,
        ),
        FieldTypeDescriptor::builtin(
            FieldType::Float8,
            "Float 8-byte",
            FieldCategory::Numeric,
            "Float 8-byte number field",
            "hash",
            DbType::FLOAT8,
        ),
        FieldTypeDescriptor::builtin(
            FieldType::Date,
            "Date",
            FieldCategory::Date,
            "Date picker field",
            "calendar",
            DbType::DATE,
        ),
    ],
});

impl FieldTypeRegistry {
    /// The catalog compiled into this build.
    pub fn builtin() -> &'static FieldTypeRegistry {
        &BUILTIN
    }

    /// Build a registry from descriptors, e.g. ones listed by a remote server.
    pub fn from_descriptors(entries: Vec<FieldTypeDescriptor>) -> Self {
        Self { entries }
    }

    pub fn list(&self) -> &[FieldTypeDescriptor] {
        &self.entries
    }

    pub fn lookup(&self, id: &str) -> Option<&FieldTypeDescriptor> {
        self.entries.iter().find(|d| d.id == id)
    }

    pub fn by_category(&self, category: FieldCategory) -> Vec<&FieldTypeDescriptor> {
        self.entries
            .iter()
            .filter(|d| d.category == category)
            .collect()
    }

    /// Descriptors grouped by category, categories in display order, empty groups skipped.
    pub fn grouped(&self) -> Vec<(FieldCategory, Vec<&FieldTypeDescriptor>)> {
        FieldCategory::ALL
            .into_iter()
            .map(|c| (c, self.by_category(c)))
            .filter(|(_, items)| !items.is_empty())
            .collect()
    }
}
