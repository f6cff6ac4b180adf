//! Entity forms driven by a definition's layout.
//!
//! Invisible components are skipped everywhere: no default, no widget, no
//! validation. Validation errors are plain values ([`FieldErrors`]); only
//! submit failures of the adapter surface as a banner.

pub mod kind;
pub mod validation;
pub mod widget;

use serde_json::Value;
use thiserror::Error;

use crate::adapter::{AdapterError, PersistenceAdapter};
use crate::definition::{Definition, FieldComponent, Layout};
use crate::entity::{Entity, EntityRecord, RecordData};

pub use kind::{FieldKind, kind_for};
pub use validation::{FieldErrors, is_blank, validate_field, validate_record};
pub use widget::{NumberStep, RenderedField, Widget};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormError {
    #[error("entity class mismatch: form is for {expected}, entity is {found}")]
    ClassMismatch { expected: String, found: String },

    #[error("A save is already in progress")]
    SubmitInProgress,

    #[error("Please fix the errors above")]
    Invalid(FieldErrors),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Initial values for a record that was never saved.
pub fn derive_defaults(layout: &Layout) -> RecordData {
    layout
        .visible()
        .map(|c| {
            let value = match c.field_type() {
                Some(t) => kind_for(t).derive_default(c.settings()),
                None => Value::Null,
            };
            (c.name().to_string(), value)
        })
        .collect()
}

/// Widget for one component showing its current value.
pub fn render_field(
    component: &FieldComponent,
    value: Option<&Value>,
    error: Option<&String>,
) -> RenderedField {
    let widget = match component.field_type() {
        Some(t) => kind_for(t).widget(component.settings(), value),
        None => Widget::unsupported(component.type_id()),
    };
    let label = if component.is_mandatory() {
        format!("{} *", component.title())
    } else {
        component.title().to_string()
    };
    RenderedField {
        name: component.name().to_string(),
        label,
        disabled: component.is_not_editable(),
        error: error.cloned(),
        widget,
    }
}

/// Widgets for every visible component, in layout order.
pub fn render(layout: &Layout, data: &RecordData, errors: &FieldErrors) -> Vec<RenderedField> {
    layout
        .visible()
        .map(|c| render_field(c, data.get(c.name()), errors.get(c.name())))
        .collect()
}

/// Whether the entity is saved for the first time or edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    /// Entity has no data yet: values start from defaults.
    FirstSave,
    Edit,
}

/// Summary shown next to the submit button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormStatus {
    ValidationError,
    UnsavedChanges,
    Saved,
    NewEntity,
    Idle,
}

impl FormStatus {
    pub fn message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Please fix the errors above",
            Self::UnsavedChanges => "You have unsaved changes",
            Self::Saved => "All changes saved",
            Self::NewEntity => "Fill in the form and save",
            Self::Idle => "No changes",
        }
    }
}

/// Snapshot handed out by [`EntityForm::begin_submit`].
#[derive(Debug, Clone)]
pub struct SubmitTicket {
    mode: FormMode,
    record: EntityRecord,
    revision: u64,
}

impl SubmitTicket {
    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn record(&self) -> &EntityRecord {
        &self.record
    }
}

/// Data-entry state for one entity.
#[derive(Debug)]
pub struct EntityForm {
    definition: Definition,
    entity: Entity,
    mode: FormMode,
    data: RecordData,
    errors: FieldErrors,
    has_changes: bool,
    revision: u64,
    submitting: bool,
    saved: bool,
    banner: Option<String>,
}

impl EntityForm {
    fn build(
        definition: Definition,
        entity: Entity,
        mode: FormMode,
        data: RecordData,
    ) -> Result<Self, FormError> {
        if entity.entity_class != definition.id() {
            return Err(FormError::ClassMismatch {
                expected: definition.id().to_string(),
                found: entity.entity_class,
            });
        }
        Ok(Self {
            definition,
            entity,
            mode,
            data,
            errors: FieldErrors::new(),
            has_changes: false,
            revision: 0,
            submitting: false,
            saved: false,
            banner: None,
        })
    }

    /// Form for an entity without data. Values start from the derived defaults.
    pub fn first_save(definition: Definition, entity: Entity) -> Result<Self, FormError> {
        let data = derive_defaults(&definition.layout);
        Self::build(definition, entity, FormMode::FirstSave, data)
    }

    /// Form over a stored record.
    pub fn edit(definition: Definition, record: EntityRecord) -> Result<Self, FormError> {
        Self::build(definition, record.entity, FormMode::Edit, record.data)
    }

    /// Pick the mode from `entity.has_data`, reading the record when there is one.
    pub async fn load(
        definition: Definition,
        entity: Entity,
        adapter: &dyn PersistenceAdapter,
    ) -> Result<Self, FormError> {
        if !entity.has_data {
            return Self::first_save(definition, entity);
        }
        let record = adapter.read_entity(&entity.entity_class, entity.id).await?;
        Self::edit(definition, record)
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn status(&self) -> FormStatus {
        if !self.errors.is_empty() {
            FormStatus::ValidationError
        } else if self.has_changes {
            FormStatus::UnsavedChanges
        } else if self.saved {
            FormStatus::Saved
        } else if self.mode == FormMode::FirstSave {
            FormStatus::NewEntity
        } else {
            FormStatus::Idle
        }
    }

    pub fn fields(&self) -> Vec<RenderedField> {
        render(&self.definition.layout, &self.data, &self.errors)
    }

    fn editable(&self, name: &str) -> Option<&FieldComponent> {
        let component = self.definition.layout.get(name)?;
        if component.is_invisible() || component.is_not_editable() {
            log::debug!("ignoring change of read-only field {name}");
            return None;
        }
        Some(component)
    }

    /// Write a value and clear that field's error.
    pub fn change(&mut self, name: &str, value: Value) -> bool {
        if self.editable(name).is_none() {
            return false;
        }
        self.data.insert(name.to_string(), value);
        self.errors.remove(name);
        self.has_changes = true;
        self.revision += 1;
        true
    }

    /// Coerce raw widget input for `name` and write it. Unparsable input changes nothing.
    pub fn input(&mut self, name: &str, raw: &str) -> bool {
        let coerced = match self.editable(name) {
            Some(c) => match c.field_type() {
                Some(t) => kind_for(t).coerce_input(raw),
                None => None,
            },
            None => return false,
        };
        match coerced {
            Some(value) => self.change(name, value),
            None => false,
        }
    }

    /// Replace the error set with a fresh validation. Returns `true` when valid.
    pub fn validate(&mut self) -> bool {
        self.errors = validate_record(&self.definition.layout, &self.data);
        self.errors.is_empty()
    }

    pub fn begin_submit(&mut self) -> Result<SubmitTicket, FormError> {
        if self.submitting {
            return Err(FormError::SubmitInProgress);
        }
        if !self.validate() {
            return Err(FormError::Invalid(self.errors.clone()));
        }
        self.submitting = true;
        self.banner = None;
        Ok(SubmitTicket {
            mode: self.mode,
            record: EntityRecord::new(self.entity.clone(), self.data.clone()),
            revision: self.revision,
        })
    }

    /// Apply the adapter's answer. Returns `true` on success.
    pub fn complete_submit(
        &mut self,
        ticket: SubmitTicket,
        outcome: Result<EntityRecord, AdapterError>,
    ) -> bool {
        self.submitting = false;
        match outcome {
            Ok(stored) => {
                self.entity = stored.entity;
                self.mode = FormMode::Edit;
                if self.revision == ticket.revision {
                    self.has_changes = false;
                }
                self.saved = true;
                log::info!("saved entity {}", self.entity.id);
                true
            }
            Err(e) => {
                log::warn!("saving entity {} failed: {e}", self.entity.id);
                self.banner = Some(e.to_string());
                false
            }
        }
    }

    /// Validate and save: first save transitions the entity, later saves update it.
    pub async fn submit(&mut self, adapter: &dyn PersistenceAdapter) -> Result<(), FormError> {
        let ticket = self.begin_submit()?;
        let outcome = match ticket.mode() {
            FormMode::FirstSave => {
                let entity = &ticket.record().entity;
                adapter
                    .transition_entity(&entity.entity_class, entity.id, &ticket.record().data)
                    .await
            }
            FormMode::Edit => adapter.save_entity(ticket.record()).await,
        };
        let error = outcome.as_ref().err().cloned();
        self.complete_submit(ticket, outcome);
        match error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::MemoryAdapter;
    use crate::entity::NewEntity;
    use serde_json::json;

    fn product() -> Definition {
        Definition::new("product", "Product").with_layout(
            [
                FieldComponent::new("input", "title")
                    .titled("Title")
                    .mandatory(true)
                    .with_settings(json!({"defaultValue": "Untitled", "columnLength": 20})),
                FieldComponent::new("integer", "qty")
                    .titled("Quantity")
                    .with_settings(json!({"minValue": 0, "maxValue": 10})),
                FieldComponent::new("date", "launch").titled("Launch"),
                FieldComponent::new("textarea", "notes").invisible(true),
                FieldComponent::new("input", "sku").titled("SKU").not_editable(true),
            ]
            .into_iter()
            .collect(),
        )
    }

    async fn stored_entity(adapter: &MemoryAdapter) -> Entity {
        adapter.create_definition(&product()).await.unwrap();
        adapter
            .create_entity("product", &NewEntity::new("shoe", "/"))
            .await
            .unwrap()
    }

    #[test]
    fn defaults_skip_invisible_fields() {
        let defaults = derive_defaults(&product().layout);
        assert_eq!(
            Value::Object(defaults),
            json!({"title": "Untitled", "qty": null, "launch": null, "sku": ""})
        );
    }

    #[test]
    fn render_labels_and_unsupported_notice() {
        let layout: Layout = [
            FieldComponent::new("integer", "qty").titled("Qty").mandatory(true),
            FieldComponent::new("select", "colour").titled("Colour"),
            FieldComponent::new("input", "hidden").invisible(true),
        ]
        .into_iter()
        .collect();
        let fields = render(&layout, &RecordData::new(), &FieldErrors::new());
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].label, "Qty *");
        assert_eq!(
            fields[1].widget,
            Widget::Unsupported {
                type_id: "select".into(),
                notice: "Unsupported field type: select".into()
            }
        );
    }

    #[tokio::test]
    async fn change_clears_that_fields_error_only() {
        let adapter = MemoryAdapter::new();
        let entity = stored_entity(&adapter).await;
        let mut form = EntityForm::first_save(product(), entity).unwrap();
        form.change("title", json!(""));
        form.change("qty", json!(50));
        assert!(!form.validate());
        assert_eq!(form.errors().len(), 2);
        assert_eq!(form.status(), FormStatus::ValidationError);

        assert!(form.change("qty", json!(5)));
        assert_eq!(form.errors().len(), 1);
        assert!(form.errors().contains_key("title"));
    }

    #[tokio::test]
    async fn read_only_fields_reject_changes() {
        let adapter = MemoryAdapter::new();
        let entity = stored_entity(&adapter).await;
        let mut form = EntityForm::first_save(product(), entity).unwrap();
        assert!(!form.change("sku", json!("X1")));
        assert!(!form.change("notes", json!("hidden")));
        assert!(!form.change("missing", json!(1)));
        assert!(!form.has_changes());
    }

    #[tokio::test]
    async fn input_coerces_per_widget() {
        let adapter = MemoryAdapter::new();
        let entity = stored_entity(&adapter).await;
        let mut form = EntityForm::first_save(product(), entity).unwrap();
        assert!(form.input("qty", "7"));
        assert_eq!(form.data()["qty"], json!(7));
        assert!(!form.input("qty", "seven"));
        assert_eq!(form.data()["qty"], json!(7));
        assert!(form.input("launch", "2024-06-01"));
        assert_eq!(form.data()["launch"], json!("2024-06-01"));
    }

    #[tokio::test]
    async fn first_submit_transitions_then_edits() {
        let adapter = MemoryAdapter::new();
        let entity = stored_entity(&adapter).await;
        let mut form = EntityForm::first_save(product(), entity.clone()).unwrap();
        assert_eq!(form.status(), FormStatus::NewEntity);

        form.input("qty", "3");
        form.submit(&adapter).await.unwrap();
        assert_eq!(form.mode(), FormMode::Edit);
        assert!(form.entity().has_data);
        assert_eq!(form.status(), FormStatus::Saved);

        form.input("qty", "4");
        form.submit(&adapter).await.unwrap();

        let reloaded = EntityForm::load(product(), form.entity().clone(), &adapter)
            .await
            .unwrap();
        assert_eq!(reloaded.mode(), FormMode::Edit);
        assert_eq!(reloaded.data()["qty"], json!(4));
    }

    #[tokio::test]
    async fn invalid_record_is_not_submitted() {
        let adapter = MemoryAdapter::new();
        let entity = stored_entity(&adapter).await;
        let mut form = EntityForm::first_save(product(), entity).unwrap();
        form.change("qty", json!(11));
        let err = form.submit(&adapter).await.unwrap_err();
        assert!(matches!(err, FormError::Invalid(ref errors) if errors.len() == 1));
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn failed_submit_keeps_data_and_shows_banner() {
        let adapter = MemoryAdapter::new();
        let entity = stored_entity(&adapter).await;
        let mut form = EntityForm::first_save(product(), entity).unwrap();
        form.input("qty", "2");
        adapter.fail_next(AdapterError::Unavailable("connection refused".into())).await;

        assert!(form.submit(&adapter).await.is_err());
        assert_eq!(form.banner(), Some("connection refused"));
        assert!(form.has_changes());
        assert_eq!(form.mode(), FormMode::FirstSave);
        assert_eq!(form.data()["qty"], json!(2));
    }

    #[test]
    fn second_submit_is_rejected_while_pending() {
        let entity: Entity = serde_json::from_value(json!({
            "id": uuid::Uuid::new_v4(),
            "entity_class": "product",
            "o_key": "shoe",
            "o_path": "/"
        }))
        .unwrap();
        let mut form = EntityForm::first_save(product(), entity).unwrap();
        let ticket = form.begin_submit().unwrap();
        assert!(matches!(form.begin_submit(), Err(FormError::SubmitInProgress)));
        let record = ticket.record().clone();
        assert!(form.complete_submit(ticket, Ok(record)));
    }

    #[test]
    fn class_mismatch_is_rejected() {
        let entity: Entity = serde_json::from_value(json!({
            "id": uuid::Uuid::new_v4(),
            "entity_class": "car",
            "o_key": "mini",
            "o_path": "/"
        }))
        .unwrap();
        assert!(matches!(
            EntityForm::first_save(product(), entity),
            Err(FormError::ClassMismatch { .. })
        ));
    }
}
