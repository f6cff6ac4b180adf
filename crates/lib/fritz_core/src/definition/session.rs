//! Editing session over one selected definition.
//!
//! The session is the single writer of the selected definition. It tracks the
//! selected component, whether the definition was ever persisted and whether
//! it has unsaved changes. Saving is split in two halves so a caller can run
//! the remote call anywhere: [`DefinitionSession::begin_save`] hands out a
//! ticket and blocks further saves, [`DefinitionSession::complete_save`]
//! applies the outcome.
//!
//! A failed save never clears `has_changes` and never touches local edits.

use thiserror::Error;

use super::{Definition, DefinitionError, DropPosition, FieldChange, FieldComponent};
use crate::adapter::{AdapterError, PersistenceAdapter};
use crate::confirm::{Confirm, ConfirmRequest};
use crate::settings::{self, EditOutcome, RawInput, SettingKey, SettingsEdit};

/// Shown while a freshly started definition has no components.
pub const ADD_COMPONENT_HINT: &str = "Please add at least one component before saving";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SessionError {
    #[error("No definition selected")]
    NoDefinition,

    #[error("A save is already in progress")]
    SaveInProgress,

    #[error(transparent)]
    Invalid(#[from] DefinitionError),

    #[error(transparent)]
    Adapter(#[from] AdapterError),
}

/// Change to a definition's own metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailChange {
    Name(String),
    Description(String),
    AllowInherit(bool),
}

/// Snapshot handed out by [`DefinitionSession::begin_save`].
#[derive(Debug, Clone)]
pub struct SaveTicket {
    definition: Definition,
    create: bool,
    revision: u64,
    generation: u64,
}

impl SaveTicket {
    /// Definition as it was when the save started.
    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    /// `true` when the definition was never persisted and must be created.
    pub fn is_create(&self) -> bool {
        self.create
    }
}

#[derive(Debug, Default)]
pub struct DefinitionSession {
    definition: Option<Definition>,
    selected_component: Option<String>,
    is_new: bool,
    has_changes: bool,
    /// Bumped on every local edit.
    revision: u64,
    /// Bumped whenever the selected definition is replaced.
    generation: u64,
    saving: bool,
    banner: Option<String>,
    validation_message: Option<String>,
}

impl DefinitionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn definition(&self) -> Option<&Definition> {
        self.definition.as_ref()
    }

    pub fn selected_component(&self) -> Option<&FieldComponent> {
        let name = self.selected_component.as_deref()?;
        self.definition.as_ref()?.layout.get(name)
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn has_changes(&self) -> bool {
        self.has_changes
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Top-level error from the last failed remote call.
    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn validation_message(&self) -> Option<&str> {
        self.validation_message.as_deref()
    }

    /// Ask before discarding unsaved changes. `true` means go ahead.
    fn may_discard(&self, confirm: &mut dyn Confirm) -> bool {
        !self.has_changes || confirm.confirm(&ConfirmRequest::DiscardChanges)
    }

    fn replace(&mut self, definition: Option<Definition>, is_new: bool) {
        self.definition = definition;
        self.selected_component = None;
        self.is_new = is_new;
        self.has_changes = is_new;
        self.generation += 1;
        self.saving = false;
        self.banner = None;
        self.validation_message = is_new.then(|| ADD_COMPONENT_HINT.to_string());
    }

    /// Switch to a stored definition. Returns `false` if the user kept the current one.
    pub fn select_definition(&mut self, definition: Definition, confirm: &mut dyn Confirm) -> bool {
        if !self.may_discard(confirm) {
            return false;
        }
        log::debug!("selected definition {}", definition.id());
        self.replace(Some(definition), false);
        true
    }

    /// Start a new, unsaved definition.
    ///
    /// `existing` are the definitions already stored; their ids and names are taken.
    pub fn start_new(
        &mut self,
        id: &str,
        name: &str,
        existing: &[Definition],
        confirm: &mut dyn Confirm,
    ) -> Result<bool, SessionError> {
        self.start_from(Definition::new(id.trim(), name.trim()), existing, confirm)
    }

    /// Start a new, unsaved definition copying the layout of `source`.
    pub fn start_copy(
        &mut self,
        source: &Definition,
        id: &str,
        name: &str,
        existing: &[Definition],
        confirm: &mut dyn Confirm,
    ) -> Result<bool, SessionError> {
        self.start_from(source.copy_as(id.trim(), name.trim()), existing, confirm)
    }

    fn start_from(
        &mut self,
        definition: Definition,
        existing: &[Definition],
        confirm: &mut dyn Confirm,
    ) -> Result<bool, SessionError> {
        super::check_id(definition.id())?;
        super::check_name(&definition.name)?;
        definition.check_unique(existing)?;
        if !self.may_discard(confirm) {
            return Ok(false);
        }
        let has_components = !definition.layout.is_empty();
        self.replace(Some(definition), true);
        if has_components {
            self.validation_message = None;
        }
        Ok(true)
    }

    fn touch(&mut self) {
        self.has_changes = true;
        self.revision += 1;
    }

    pub fn select_component(&mut self, name: &str) -> bool {
        match self.definition.as_ref().and_then(|d| d.layout.get(name)) {
            Some(_) => {
                self.selected_component = Some(name.to_string());
                true
            }
            None => false,
        }
    }

    pub fn clear_component_selection(&mut self) {
        self.selected_component = None;
    }

    /// Add a component of `type_id` and select it. Returns its generated name.
    pub fn add_component(&mut self, type_id: &str) -> Result<String, SessionError> {
        let definition = self.definition.as_mut().ok_or(SessionError::NoDefinition)?;
        let name = definition.add_component(type_id)?.name().to_string();
        self.selected_component = Some(name.clone());
        self.validation_message = None;
        self.touch();
        Ok(name)
    }

    pub fn update_details(&mut self, change: DetailChange) -> bool {
        let Some(definition) = self.definition.as_mut() else {
            return false;
        };
        match change {
            DetailChange::Name(name) => definition.name = name,
            DetailChange::Description(description) => definition.description = description,
            DetailChange::AllowInherit(b) => definition.allow_inherit = b,
        }
        self.touch();
        true
    }

    pub fn update_field(&mut self, name: &str, change: FieldChange) -> bool {
        let changed = self
            .definition
            .as_mut()
            .is_some_and(|d| d.layout.update_field(name, change));
        if changed {
            self.touch();
        }
        changed
    }

    pub fn update_settings(&mut self, name: &str, edit: &SettingsEdit) -> bool {
        let changed = self
            .definition
            .as_mut()
            .is_some_and(|d| d.layout.update_settings(name, edit));
        if changed {
            self.touch();
        }
        changed
    }

    /// Route raw settings input through the component's editor and merge the result.
    pub fn edit_setting(&mut self, name: &str, key: SettingKey, raw: RawInput) -> bool {
        let Some(component) = self.definition.as_ref().and_then(|d| d.layout.get(name)) else {
            return false;
        };
        let Some(editor) = settings::resolve(component.type_id()) else {
            return false;
        };
        match editor.edit(key, raw) {
            EditOutcome::Emit(edit) => self.update_settings(name, &edit),
            EditOutcome::Rejected => false,
        }
    }

    pub fn reorder(&mut self, from: usize, to: usize, position: DropPosition) -> bool {
        let changed = self
            .definition
            .as_mut()
            .is_some_and(|d| d.layout.reorder(from, to, position));
        if changed {
            self.touch();
        }
        changed
    }

    /// Remove a component after confirmation. Clears the selection if it was selected.
    pub fn delete_component(&mut self, name: &str, confirm: &mut dyn Confirm) -> bool {
        let Some(title) = self
            .definition
            .as_ref()
            .and_then(|d| d.layout.get(name))
            .map(|c| c.title().to_string())
        else {
            return false;
        };
        if !confirm.confirm(&ConfirmRequest::DeleteComponent { title }) {
            return false;
        }
        let removed = self
            .definition
            .as_mut()
            .and_then(|d| d.layout.remove(name))
            .is_some();
        if removed {
            if self.selected_component.as_deref() == Some(name) {
                self.selected_component = None;
            }
            self.touch();
        }
        removed
    }

    /// Validate and snapshot the definition for saving.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SessionError> {
        if self.saving {
            return Err(SessionError::SaveInProgress);
        }
        let definition = self.definition.as_ref().ok_or(SessionError::NoDefinition)?;
        if let Err(e) = definition.check() {
            self.validation_message = Some(e.to_string());
            return Err(e.into());
        }
        let ticket = SaveTicket {
            definition: definition.clone(),
            create: self.is_new,
            revision: self.revision,
            generation: self.generation,
        };
        self.validation_message = None;
        self.banner = None;
        self.saving = true;
        Ok(ticket)
    }

    /// Apply the outcome of a save. Returns `true` when the save succeeded.
    ///
    /// Outcomes for a definition that is no longer selected are dropped.
    pub fn complete_save(&mut self, ticket: SaveTicket, outcome: Result<(), AdapterError>) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "dropping save outcome for {}: definition no longer selected",
                ticket.definition.id()
            );
            return false;
        }
        self.saving = false;
        match outcome {
            Ok(()) => {
                self.is_new = false;
                if self.revision == ticket.revision {
                    self.has_changes = false;
                }
                self.banner = None;
                log::info!("saved definition {}", ticket.definition.id());
                true
            }
            Err(e) => {
                log::warn!("saving definition {} failed: {e}", ticket.definition.id());
                self.banner = Some(e.to_string());
                false
            }
        }
    }

    /// Save through `adapter`: create when never persisted, update otherwise.
    pub async fn save(&mut self, adapter: &dyn PersistenceAdapter) -> Result<(), SessionError> {
        let ticket = self.begin_save()?;
        let outcome = if ticket.is_create() {
            adapter.create_definition(ticket.definition()).await
        } else {
            adapter
                .update_definition(ticket.definition().id(), ticket.definition())
                .await
        };
        let error = outcome.as_ref().err().cloned();
        self.complete_save(ticket, outcome);
        match error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Delete the selected definition after confirmation.
    ///
    /// A never-persisted definition is only dropped locally. Returns `Ok(false)`
    /// when the user declined.
    pub async fn delete(
        &mut self,
        adapter: &dyn PersistenceAdapter,
        confirm: &mut dyn Confirm,
    ) -> Result<bool, SessionError> {
        if self.saving {
            return Err(SessionError::SaveInProgress);
        }
        let definition = self.definition.as_ref().ok_or(SessionError::NoDefinition)?;

        if self.is_new {
            if !confirm.confirm(&ConfirmRequest::DiscardNewDefinition) {
                return Ok(false);
            }
            self.replace(None, false);
            return Ok(true);
        }

        let request = ConfirmRequest::DeleteDefinition {
            name: definition.name.clone(),
        };
        if !confirm.confirm(&request) {
            return Ok(false);
        }
        let id = definition.id().to_string();
        match adapter.delete_definition(&id).await {
            Ok(()) => {
                log::info!("deleted definition {id}");
                self.replace(None, false);
                Ok(true)
            }
            Err(e) => {
                self.banner = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}
