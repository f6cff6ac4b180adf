//! Entity definitions: a named, ordered layout of typed field components.
//!
//! A definition's `id` is fixed at creation and joins it to stored entity
//! records. Layout mutations live on [`Layout`]; [`session`] adds the
//! editing state around them (selection, unsaved changes, saving).

pub mod component;
pub mod layout;
pub mod session;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::registry::{FieldTypeRegistry, RegistryError};
use crate::settings::SettingsError;

pub use component::{FieldChange, FieldComponent};
pub use layout::{DropPosition, Layout};
pub use session::{DefinitionSession, SaveTicket, SessionError};

pub const MAX_ID_LEN: usize = 255;
pub const MAX_NAME_LEN: usize = 255;
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Definition errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("Definition ID is required")]
    MissingId,

    #[error("Definition ID must be at most 255 characters")]
    IdTooLong,

    #[error("Definition ID may only contain lowercase letters, digits, '_' and '-': {0}")]
    InvalidId(String),

    #[error("Definition name is required")]
    MissingName,

    #[error("Definition name must be at most 255 characters")]
    NameTooLong,

    #[error("Definition description must be at most 1000 characters")]
    DescriptionTooLong,

    #[error("Definition must have at least one component before saving")]
    NoComponents,

    #[error("Component at position {0} has no name")]
    MissingComponentName(usize),

    #[error("Component {0} has no title")]
    MissingComponentTitle(String),

    #[error("Component {0}: name or title longer than 255 characters")]
    ComponentFieldTooLong(String),

    #[error("Component name {0} is not a valid column name")]
    InvalidComponentName(String),

    #[error("entity duplicated component name: {0}")]
    DuplicateComponentName(String),

    #[error("A definition with this ID already exists")]
    DuplicateId(String),

    #[error("entity name already exists: {0}")]
    DuplicateName(String),

    #[error("Component {component}: {source}")]
    Settings {
        component: String,
        #[source]
        source: SettingsError,
    },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Definition {
    id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub allow_inherit: bool,
    #[serde(default)]
    pub layout: Layout,
}

impl Definition {
    /// Empty definition with the default layout type.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            allow_inherit: false,
            layout: Layout::default(),
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// New definition with its own id and name and a copy of this layout.
    pub fn copy_as(&self, id: impl Into<String>, name: impl Into<String>) -> Definition {
        Definition {
            id: id.into(),
            name: name.into(),
            description: self.description.clone(),
            allow_inherit: self.allow_inherit,
            layout: self.layout.clone(),
        }
    }

    /// Add a component of a built-in type. Returns the new component.
    pub fn add_component(&mut self, type_id: &str) -> Result<&FieldComponent, DefinitionError> {
        let descriptor = FieldTypeRegistry::builtin()
            .lookup(type_id)
            .ok_or_else(|| RegistryError::UnknownFieldType(type_id.to_string()))?;
        Ok(self.layout.add(descriptor))
    }

    /// Structural and settings checks run before a save.
    pub fn check(&self) -> Result<(), DefinitionError> {
        check_id(&self.id)?;
        check_name(&self.name)?;
        if self.description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(DefinitionError::DescriptionTooLong);
        }
        if self.layout.is_empty() {
            return Err(DefinitionError::NoComponents);
        }

        let mut seen = std::collections::HashSet::new();
        for (index, component) in self.layout.components().iter().enumerate() {
            let name = component.name();
            if name.is_empty() {
                return Err(DefinitionError::MissingComponentName(index));
            }
            if component.title().trim().is_empty() {
                return Err(DefinitionError::MissingComponentTitle(name.to_string()));
            }
            if name.chars().count() > MAX_NAME_LEN || component.title().chars().count() > MAX_NAME_LEN
            {
                return Err(DefinitionError::ComponentFieldTooLong(name.to_string()));
            }
            if !is_column_name(name) {
                return Err(DefinitionError::InvalidComponentName(name.to_string()));
            }
            if !seen.insert(name) {
                return Err(DefinitionError::DuplicateComponentName(name.to_string()));
            }
            component
                .settings()
                .check()
                .map_err(|source| DefinitionError::Settings {
                    component: name.to_string(),
                    source,
                })?;
        }
        Ok(())
    }

    /// Reject an id (case-insensitive) or name already used by `existing`.
    pub fn check_unique<'a>(
        &self,
        existing: impl IntoIterator<Item = &'a Definition>,
    ) -> Result<(), DefinitionError> {
        for other in existing {
            if other.id.eq_ignore_ascii_case(&self.id) {
                return Err(DefinitionError::DuplicateId(self.id.clone()));
            }
            if other.name == self.name {
                return Err(DefinitionError::DuplicateName(self.name.clone()));
            }
        }
        Ok(())
    }
}

/// Definition ids: non-empty, lowercase ASCII letters, digits, `_` and `-`.
pub fn check_id(id: &str) -> Result<(), DefinitionError> {
    if id.trim().is_empty() {
        return Err(DefinitionError::MissingId);
    }
    if id.len() > MAX_ID_LEN {
        return Err(DefinitionError::IdTooLong);
    }
    let valid = id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(DefinitionError::InvalidId(id.to_string()));
    }
    Ok(())
}

pub fn check_name(name: &str) -> Result<(), DefinitionError> {
    if name.trim().is_empty() {
        return Err(DefinitionError::MissingName);
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(DefinitionError::NameTooLong);
    }
    Ok(())
}

/// Component names become column names: `[a-z_][a-z0-9_]*`.
pub(crate) fn is_column_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}
