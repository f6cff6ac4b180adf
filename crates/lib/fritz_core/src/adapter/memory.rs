//! In-process adapter holding definitions and entities in memory.
//!
//! Applies the same acceptance rules as the Fritz server: definitions must
//! pass their checks, ids and names are unique, entities belong to a known
//! definition and their data must validate against its layout.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AdapterError, PersistenceAdapter};
use crate::definition::{Definition, DefinitionError};
use crate::entity::{Entity, EntityRecord, NewEntity, RecordData};
use crate::form::validate_record;
use crate::registry::{FieldTypeDescriptor, FieldTypeRegistry};

const MAX_KEY_LEN: usize = 255;

#[derive(Debug, Default)]
struct State {
    definitions: Vec<Definition>,
    entities: HashMap<Uuid, EntityRecord>,
    failures: VecDeque<AdapterError>,
}

impl State {
    fn definition(&self, id: &str) -> Result<&Definition, AdapterError> {
        self.definitions
            .iter()
            .find(|d| d.id() == id)
            .ok_or_else(|| AdapterError::NotFound(format!("definition {id} not found")))
    }

    fn injected_failure(&mut self) -> Result<(), AdapterError> {
        match self.failures.pop_front() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Validate and store data for an existing entity of `class`.
    fn store_data(
        &mut self,
        class: &str,
        id: Uuid,
        data: &RecordData,
    ) -> Result<&mut EntityRecord, AdapterError> {
        let layout = match self.definition(class) {
            Ok(d) => d.layout.clone(),
            Err(_) => return Err(AdapterError::Rejected("unknown entity class".into())),
        };
        let record = self
            .entities
            .get_mut(&id)
            .ok_or_else(|| AdapterError::NotFound("entity not found".into()))?;
        if record.entity.entity_class != class {
            return Err(AdapterError::Rejected("entity class mismatch".into()));
        }
        let errors = validate_record(&layout, data);
        if !errors.is_empty() {
            let messages: Vec<&str> = errors.values().map(String::as_str).collect();
            return Err(AdapterError::Rejected(messages.join("; ")));
        }
        record.data = data.clone();
        record.entity.has_data = true;
        Ok(record)
    }
}

fn rejected(e: DefinitionError) -> AdapterError {
    match e {
        DefinitionError::DuplicateId(_)
        | DefinitionError::DuplicateName(_)
        | DefinitionError::DuplicateComponentName(_) => AdapterError::Conflict(e.to_string()),
        other => AdapterError::Rejected(other.to_string()),
    }
}

/// Reference adapter for tests and offline tooling.
#[derive(Debug, Default)]
pub struct MemoryAdapter {
    state: RwLock<State>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adapter preloaded with definitions. Entries failing their checks are skipped.
    pub fn with_definitions(definitions: impl IntoIterator<Item = Definition>) -> Self {
        let mut state = State::default();
        for definition in definitions {
            match definition
                .check()
                .and_then(|_| definition.check_unique(&state.definitions))
            {
                Ok(()) => state.definitions.push(definition),
                Err(e) => log::warn!("skipping definition {}: {e}", definition.id()),
            }
        }
        Self {
            state: RwLock::new(state),
        }
    }

    /// Make the next call fail with `error`. Queued failures are consumed in order.
    pub async fn fail_next(&self, error: AdapterError) {
        self.state.write().await.failures.push_back(error);
    }
}

#[async_trait]
impl PersistenceAdapter for MemoryAdapter {
    async fn list_definitions(&self) -> Result<Vec<Definition>, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        Ok(state.definitions.clone())
    }

    async fn get_definition(&self, id: &str) -> Result<Definition, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        state.definition(id).cloned()
    }

    async fn create_definition(&self, definition: &Definition) -> Result<(), AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        definition.check().map_err(rejected)?;
        definition
            .check_unique(&state.definitions)
            .map_err(rejected)?;
        log::debug!("created definition {}", definition.id());
        state.definitions.push(definition.clone());
        Ok(())
    }

    async fn update_definition(&self, id: &str, definition: &Definition) -> Result<(), AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        if definition.id() != id {
            return Err(AdapterError::Rejected(
                "definition id cannot be changed".into(),
            ));
        }
        let index = state
            .definitions
            .iter()
            .position(|d| d.id() == id)
            .ok_or_else(|| AdapterError::NotFound(format!("definition {id} not found")))?;
        definition.check().map_err(rejected)?;
        let name_taken = state
            .definitions
            .iter()
            .enumerate()
            .any(|(i, d)| i != index && d.name == definition.name);
        if name_taken {
            return Err(AdapterError::Conflict(
                DefinitionError::DuplicateName(definition.name.clone()).to_string(),
            ));
        }
        state.definitions[index] = definition.clone();
        Ok(())
    }

    async fn delete_definition(&self, id: &str) -> Result<(), AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        let before = state.definitions.len();
        state.definitions.retain(|d| d.id() != id);
        if state.definitions.len() == before {
            return Err(AdapterError::NotFound(format!("definition {id} not found")));
        }
        state.entities.retain(|_, r| r.entity.entity_class != id);
        Ok(())
    }

    async fn list_field_types(&self) -> Result<Vec<FieldTypeDescriptor>, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        Ok(FieldTypeRegistry::builtin().list().to_vec())
    }

    async fn create_entity(&self, class: &str, entity: &NewEntity) -> Result<Entity, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        if state.definition(class).is_err() {
            return Err(AdapterError::Rejected("unknown entity class".into()));
        }
        if entity.key.is_empty() || entity.key.chars().count() > MAX_KEY_LEN {
            return Err(AdapterError::Rejected("key is required (max 255 characters)".into()));
        }
        if entity.path.is_empty() {
            return Err(AdapterError::Rejected("path is required".into()));
        }
        let created = Entity {
            id: Uuid::new_v4(),
            entity_class: class.to_string(),
            parent_id: entity.parent_id,
            o_key: entity.key.clone(),
            o_path: entity.path.clone(),
            published: entity.published,
            o_type: entity.entity_type().to_string(),
            has_data: false,
        };
        state
            .entities
            .insert(created.id, EntityRecord::new(created.clone(), RecordData::new()));
        Ok(created)
    }

    async fn read_entity(&self, class: &str, id: Uuid) -> Result<EntityRecord, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        if state.definition(class).is_err() {
            return Err(AdapterError::Rejected("unknown entity class".into()));
        }
        let record = state
            .entities
            .get(&id)
            .ok_or_else(|| AdapterError::NotFound("entity not found".into()))?;
        if record.entity.entity_class != class {
            return Err(AdapterError::Rejected("entity class mismatch".into()));
        }
        Ok(record.clone())
    }

    async fn transition_entity(
        &self,
        class: &str,
        id: Uuid,
        data: &RecordData,
    ) -> Result<EntityRecord, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        let record = state.store_data(class, id, data)?;
        Ok(record.clone())
    }

    async fn save_entity(&self, record: &EntityRecord) -> Result<EntityRecord, AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        let entity = &record.entity;
        let stored = state.store_data(&entity.entity_class, entity.id, &record.data)?;
        stored.entity.parent_id = entity.parent_id;
        stored.entity.o_key = entity.o_key.clone();
        stored.entity.o_path = entity.o_path.clone();
        stored.entity.published = entity.published;
        stored.entity.o_type = entity.o_type.clone();
        Ok(stored.clone())
    }

    async fn delete_entity(&self, class: &str, id: Uuid) -> Result<(), AdapterError> {
        let mut state = self.state.write().await;
        state.injected_failure()?;
        if state.definition(class).is_err() {
            return Err(AdapterError::Rejected("unknown entity class".into()));
        }
        match state.entities.get(&id) {
            None => return Err(AdapterError::NotFound("entity not found".into())),
            Some(r) if r.entity.entity_class != class => {
                return Err(AdapterError::Rejected("entity class mismatch".into()));
            }
            Some(_) => {}
        }
        state.entities.remove(&id);
        log::debug!("deleted entity {id} of {class}");
        Ok(())
    }
}
