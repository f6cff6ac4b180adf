//! Persistence boundary for definitions and entity records.
//!
//! Every call is fallible and asynchronous. Callers serialize their own saves;
//! implementations assume nothing about call ordering.

pub mod memory;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::definition::Definition;
use crate::entity::{Entity, EntityRecord, NewEntity, RecordData};
use crate::registry::FieldTypeDescriptor;

pub use memory::MemoryAdapter;

/// Adapter failures. The message is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("{0}")]
    NotFound(String),

    /// Id, name or component name already taken.
    #[error("{0}")]
    Conflict(String),

    /// Request refused as invalid.
    #[error("{0}")]
    Rejected(String),

    /// Backend could not be reached or timed out.
    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Internal(String),
}

impl AdapterError {
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(m)
            | Self::Conflict(m)
            | Self::Rejected(m)
            | Self::Unavailable(m)
            | Self::Internal(m) => m,
        }
    }
}

#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    async fn list_definitions(&self) -> Result<Vec<Definition>, AdapterError>;

    async fn get_definition(&self, id: &str) -> Result<Definition, AdapterError>;

    async fn create_definition(&self, definition: &Definition) -> Result<(), AdapterError>;

    async fn update_definition(&self, id: &str, definition: &Definition) -> Result<(), AdapterError>;

    async fn delete_definition(&self, id: &str) -> Result<(), AdapterError>;

    async fn list_field_types(&self) -> Result<Vec<FieldTypeDescriptor>, AdapterError>;

    /// Create entity metadata under a definition. The entity has no data yet.
    async fn create_entity(&self, class: &str, entity: &NewEntity) -> Result<Entity, AdapterError>;

    async fn read_entity(&self, class: &str, id: Uuid) -> Result<EntityRecord, AdapterError>;

    /// First save of an entity's data.
    async fn transition_entity(
        &self,
        class: &str,
        id: Uuid,
        data: &RecordData,
    ) -> Result<EntityRecord, AdapterError>;

    /// Save metadata and data of an entity that already has data.
    async fn save_entity(&self, record: &EntityRecord) -> Result<EntityRecord, AdapterError>;

    /// Remove an entity with its data.
    async fn delete_entity(&self, class: &str, id: Uuid) -> Result<(), AdapterError>;
}
