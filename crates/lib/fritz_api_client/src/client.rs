//! [`PersistenceAdapter`] over the Fritz REST API.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use fritz_core::adapter::{AdapterError, PersistenceAdapter};
use fritz_core::definition::Definition;
use fritz_core::entity::{Entity, EntityRecord, NewEntity, RecordData};
use fritz_core::registry::FieldTypeDescriptor;

use crate::config::ClientConfig;
use crate::error::ClientError;

const API_PREFIX: [&str; 2] = ["api", "v1"];
const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Serialize)]
struct EntityIdRequest {
    id: Uuid,
}

#[derive(Serialize)]
struct TransitionRequest<'a> {
    data: &'a RecordData,
}

#[derive(Serialize)]
struct SaveEntityRequest<'a> {
    id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    parent_id: Option<Uuid>,
    key: &'a str,
    path: &'a str,
    #[serde(rename = "type", skip_serializing_if = "str::is_empty")]
    entity_type: &'a str,
    published: bool,
    data: &'a RecordData,
}

#[derive(Deserialize)]
struct CreatedEntity {
    entity: Entity,
}

/// `data` is `null` for an entity that was never saved.
#[derive(Deserialize)]
struct EntityResponse {
    entity: Entity,
    #[serde(default)]
    data: Option<RecordData>,
}

impl From<EntityResponse> for EntityRecord {
    fn from(r: EntityResponse) -> Self {
        EntityRecord::new(r.entity, r.data.unwrap_or_default())
    }
}

/// Adapter talking to a Fritz server.
#[derive(Clone, Debug)]
pub struct HttpAdapter {
    client: Client,
    base_url: Url,
}

impl HttpAdapter {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.csrf_token {
            let value = HeaderValue::from_str(token).map_err(|_| ClientError::InvalidCsrfToken)?;
            headers.insert(CSRF_HEADER, value);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|source| ClientError::Transport {
                url: config.base_url.clone(),
                source,
            })?;

        Ok(Self { client, base_url })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(&ClientConfig::from_env())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/api/v1/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(API_PREFIX)
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<(RequestBuilder, String), ClientError> {
        let url = self.endpoint(segments)?;
        let display = url.to_string();
        Ok((self.client.request(method, url), display))
    }

    async fn send(&self, builder: RequestBuilder, url: &str) -> Result<Response, ClientError> {
        tracing::debug!(url, "fritz request");
        let resp = builder.send().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        tracing::warn!(url, %status, "fritz request failed");
        Err(ClientError::from_body(status, &body))
    }

    async fn decode<T: DeserializeOwned>(resp: Response, url: &str) -> Result<T, ClientError> {
        let bytes = resp.bytes().await.map_err(|source| ClientError::Transport {
            url: url.to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let (builder, url) = self.request(Method::GET, segments)?;
        let resp = self.send(builder, &url).await?;
        Self::decode(resp, &url).await
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: &B,
    ) -> Result<Response, ClientError> {
        let (builder, url) = self.request(method, segments)?;
        self.send(builder.json(body), &url).await
    }

    async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, ClientError> {
        let (builder, url) = self.request(Method::POST, segments)?;
        let resp = self.send(builder.json(body), &url).await?;
        Self::decode(resp, &url).await
    }
}

#[async_trait]
impl PersistenceAdapter for HttpAdapter {
    async fn list_definitions(&self) -> Result<Vec<Definition>, AdapterError> {
        // The server answers `null` when there are no definitions.
        let list: Option<Vec<Definition>> = self.get_json(&["definitions", ""]).await?;
        Ok(list.unwrap_or_default())
    }

    async fn get_definition(&self, id: &str) -> Result<Definition, AdapterError> {
        Ok(self.get_json(&["definitions", id]).await?)
    }

    async fn create_definition(&self, definition: &Definition) -> Result<(), AdapterError> {
        self.send_json(Method::POST, &["definitions", "create"], definition)
            .await?;
        tracing::info!(id = definition.id(), "definition created");
        Ok(())
    }

    async fn update_definition(&self, id: &str, definition: &Definition) -> Result<(), AdapterError> {
        self.send_json(Method::PUT, &["definitions", id, "update"], definition)
            .await?;
        tracing::info!(id, "definition updated");
        Ok(())
    }

    async fn delete_definition(&self, id: &str) -> Result<(), AdapterError> {
        let (builder, url) = self.request(Method::DELETE, &["definitions", id, "delete"])?;
        self.send(builder, &url).await?;
        tracing::info!(id, "definition deleted");
        Ok(())
    }

    async fn list_field_types(&self) -> Result<Vec<FieldTypeDescriptor>, AdapterError> {
        let list: Option<Vec<FieldTypeDescriptor>> =
            self.get_json(&["definitions", "data-component-types"]).await?;
        Ok(list.unwrap_or_default())
    }

    async fn create_entity(&self, class: &str, entity: &NewEntity) -> Result<Entity, AdapterError> {
        let created: CreatedEntity = self
            .post_json(&["entities", class, "create"], entity)
            .await?;
        Ok(created.entity)
    }

    async fn read_entity(&self, class: &str, id: Uuid) -> Result<EntityRecord, AdapterError> {
        let resp: EntityResponse = self
            .post_json(&["entities", class, "read"], &EntityIdRequest { id })
            .await?;
        Ok(resp.into())
    }

    async fn transition_entity(
        &self,
        class: &str,
        id: Uuid,
        data: &RecordData,
    ) -> Result<EntityRecord, AdapterError> {
        let id = id.to_string();
        let resp: EntityResponse = self
            .post_json(&["entities", class, &id, "transition"], &TransitionRequest { data })
            .await?;
        Ok(resp.into())
    }

    async fn save_entity(&self, record: &EntityRecord) -> Result<EntityRecord, AdapterError> {
        let entity = &record.entity;
        let body = SaveEntityRequest {
            id: entity.id,
            parent_id: entity.parent_id,
            key: &entity.o_key,
            path: &entity.o_path,
            entity_type: &entity.o_type,
            published: entity.published,
            data: &record.data,
        };
        let resp: EntityResponse = self
            .post_json(&["entities", &entity.entity_class, "save"], &body)
            .await?;
        Ok(resp.into())
    }

    async fn delete_entity(&self, class: &str, id: Uuid) -> Result<(), AdapterError> {
        self.send_json(Method::POST, &["entities", class, "delete"], &EntityIdRequest { id })
            .await?;
        tracing::info!(class, %id, "entity deleted");
        Ok(())
    }
}
