//! Entity instances and their data records.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Data of one entity: component name to value.
pub type RecordData = Map<String, Value>;

/// Entity metadata as stored in the entity tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: Uuid,
    /// Definition id the entity belongs to.
    pub entity_class: String,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub o_key: String,
    pub o_path: String,
    #[serde(default)]
    pub published: bool,
    #[serde(default = "default_entity_type")]
    pub o_type: String,
    /// `false` until the first record save.
    #[serde(default)]
    pub has_data: bool,
}

fn default_entity_type() -> String {
    "object".to_string()
}

/// Request to create entity metadata. No data is stored yet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewEntity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Uuid>,
    pub key: String,
    pub path: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub entity_type: String,
    #[serde(default)]
    pub published: bool,
}

impl NewEntity {
    pub fn new(key: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    /// Entity type, `object` when not given.
    pub fn entity_type(&self) -> &str {
        if self.entity_type.is_empty() {
            "object"
        } else {
            &self.entity_type
        }
    }
}

/// Entity metadata together with its data record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRecord {
    pub entity: Entity,
    #[serde(default)]
    pub data: RecordData,
}

impl EntityRecord {
    pub fn new(entity: Entity, data: RecordData) -> Self {
        Self { entity, data }
    }
}
