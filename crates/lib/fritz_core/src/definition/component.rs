//! Field components: one typed field of a definition's layout.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::{DbType, FieldType, FieldTypeDescriptor};
use crate::settings::{FieldSettings, SettingsEdit};

/// One field of a definition.
///
/// `type` and `name` are fixed at creation. Everything else changes through
/// [`FieldChange`] and [`SettingsEdit`] values applied by the owning layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawComponent", into = "RawComponent")]
pub struct FieldComponent {
    type_id: String,
    name: String,
    title: String,
    db_type: DbType,
    mandatory: bool,
    invisible: bool,
    not_editable: bool,
    settings: FieldSettings,
}

/// A change to one of the mutable component fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldChange {
    Title(String),
    Mandatory(bool),
    Invisible(bool),
    NotEditable(bool),
}

impl FieldComponent {
    /// Component of any type id, including ones this build does not know.
    pub fn new(type_id: impl Into<String>, name: impl Into<String>) -> Self {
        let type_id = type_id.into();
        let name = name.into();
        let (title, db_type) = match FieldType::parse(&type_id) {
            Some(t) => (
                t.descriptor().label.clone(),
                t.descriptor().default_db_type.clone(),
            ),
            None => (name.clone(), DbType::default()),
        };
        let settings = FieldSettings::from_json(&type_id, None);
        Self {
            type_id,
            name,
            title,
            db_type,
            mandatory: false,
            invisible: false,
            not_editable: false,
            settings,
        }
    }

    /// Fresh component for a registry entry: label as title, default storage type,
    /// all flags off, empty settings.
    pub fn from_descriptor(descriptor: &FieldTypeDescriptor, name: impl Into<String>) -> Self {
        Self {
            type_id: descriptor.id.clone(),
            name: name.into(),
            title: descriptor.label.clone(),
            db_type: descriptor.default_db_type.clone(),
            mandatory: false,
            invisible: false,
            not_editable: false,
            settings: FieldSettings::from_json(&descriptor.id, None),
        }
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_db_type(mut self, db_type: DbType) -> Self {
        self.db_type = db_type;
        self
    }

    pub fn mandatory(mut self, mandatory: bool) -> Self {
        self.mandatory = mandatory;
        self
    }

    pub fn invisible(mut self, invisible: bool) -> Self {
        self.invisible = invisible;
        self
    }

    pub fn not_editable(mut self, not_editable: bool) -> Self {
        self.not_editable = not_editable;
        self
    }

    /// Replace settings from raw JSON, read for this component's type.
    pub fn with_settings(mut self, raw: Value) -> Self {
        self.settings = FieldSettings::from_json(&self.type_id, Some(&raw));
        self
    }

    pub fn type_id(&self) -> &str {
        &self.type_id
    }

    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.type_id)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn db_type(&self) -> &DbType {
        &self.db_type
    }

    pub fn is_mandatory(&self) -> bool {
        self.mandatory
    }

    pub fn is_invisible(&self) -> bool {
        self.invisible
    }

    pub fn is_not_editable(&self) -> bool {
        self.not_editable
    }

    pub fn settings(&self) -> &FieldSettings {
        &self.settings
    }

    pub(crate) fn apply_change(&mut self, change: FieldChange) {
        match change {
            FieldChange::Title(title) => self.title = title,
            FieldChange::Mandatory(b) => self.mandatory = b,
            FieldChange::Invisible(b) => self.invisible = b,
            FieldChange::NotEditable(b) => self.not_editable = b,
        }
    }

    pub(crate) fn apply_settings(&mut self, edit: &SettingsEdit) -> bool {
        self.settings.apply(edit)
    }
}

/// Wire shape of a component.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawComponent {
    #[serde(rename = "type")]
    type_id: String,
    name: String,
    #[serde(default)]
    title: String,
    #[serde(rename = "dbtype", default)]
    db_type: DbType,
    #[serde(default)]
    mandatory: bool,
    #[serde(default)]
    invisible: bool,
    #[serde(default, alias = "noteditable")]
    not_editable: bool,
    #[serde(default)]
    settings: Value,
}

impl From<RawComponent> for FieldComponent {
    fn from(raw: RawComponent) -> Self {
        let settings = FieldSettings::from_json(&raw.type_id, Some(&raw.settings));
        Self {
            type_id: raw.type_id,
            name: raw.name,
            title: raw.title,
            db_type: raw.db_type,
            mandatory: raw.mandatory,
            invisible: raw.invisible,
            not_editable: raw.not_editable,
            settings,
        }
    }
}

impl From<FieldComponent> for RawComponent {
    fn from(c: FieldComponent) -> Self {
        Self {
            settings: c.settings.to_json(),
            type_id: c.type_id,
            name: c.name,
            title: c.title,
            db_type: c.db_type,
            mandatory: c.mandatory,
            invisible: c.invisible,
            not_editable: c.not_editable,
        }
    }
}
