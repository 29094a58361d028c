//! Publication service client.
//!
//! The publication service stores dataset records inside collections. A
//! dataset starts as a draft that owns a shared storage location (a transfer
//! endpoint plus a path); data is transferred there, then the dataset is
//! submitted, which is final.

mod client;

use std::fmt;

use serde_json::Value;

pub use client::{PublicationClient, DEFAULT_SERVICE_URL};

use crate::entity::{value_kind, Entity, Field};
use crate::error::PublishError;

/// Field holding the name of a dataset's shared endpoint.
pub const SHARED_ENDPOINT_NAME: &str = "globus.shared_endpoint.name";
/// Field holding the path of a dataset's storage on its shared endpoint.
pub const SHARED_ENDPOINT_PATH: &str = "globus.shared_endpoint.path";

/// Operations offered by the publication service.
pub trait PublicationApi {
    fn list_schemas(&self) -> Result<Vec<Entity>, PublishError>;

    fn get_schema(&self, schema_id: &str) -> Result<Entity, PublishError>;

    fn list_collections(&self) -> Result<Vec<Entity>, PublishError>;

    /// Creates a draft dataset in a collection from caller-supplied metadata.
    fn create_dataset(
        &self,
        collection_id: &str,
        metadata: &Value,
    ) -> Result<DatasetRecord, PublishError>;

    /// Looks a dataset up by its internal id.
    fn get_dataset_by_id(&self, dataset_id: &str) -> Result<DatasetRecord, PublishError>;

    /// Looks a dataset up by its persistent identifier.
    fn get_dataset_by_pid(&self, pid: &str) -> Result<DatasetRecord, PublishError>;

    /// Removes a dataset that has not been submitted yet.
    fn delete_dataset(&self, dataset_id: &str) -> Result<Option<Entity>, PublishError>;

    /// Finalizes a draft dataset.
    fn submit_dataset(&self, dataset_id: &str) -> Result<Option<Entity>, PublishError>;
}

/// Storage location owned by a dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SharedEndpoint {
    pub name: String,
    pub path: String,
}

impl SharedEndpoint {
    /// Directory that receives uploaded data.
    pub fn data_path(&self) -> String {
        format!("{}data/", self.path)
    }
}

impl fmt::Display for SharedEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.path)
    }
}

/// Typed view over a dataset document.
#[derive(Clone, Debug, PartialEq)]
pub struct DatasetRecord {
    entity: Entity,
}

impl DatasetRecord {
    pub fn new(entity: Entity) -> Self {
        Self { entity }
    }

    /// The dataset id as text; numeric ids are rendered without quotes.
    pub fn id(&self) -> Option<String> {
        self.entity
            .get("id")
            .filter(|field| !field.is_null())
            .map(Field::to_display_string)
    }

    pub fn require_id(&self) -> Result<String, PublishError> {
        self.id().ok_or_else(|| PublishError::MissingField {
            field: "id".to_string(),
        })
    }

    /// The shared endpoint, if both its name and path are present.
    pub fn shared_endpoint(&self) -> Option<SharedEndpoint> {
        let name = lookup_dotted(&self.entity, SHARED_ENDPOINT_NAME)?;
        let path = lookup_dotted(&self.entity, SHARED_ENDPOINT_PATH)?;
        Some(SharedEndpoint {
            name: name.to_string(),
            path: path.to_string(),
        })
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }
}

/// Finds a string under a dotted key, stored either flat or nested.
fn lookup_dotted<'a>(entity: &'a Entity, key: &str) -> Option<&'a str> {
    if let Some(value) = entity.str_field(key) {
        return Some(value);
    }

    let mut parts = key.split('.').peekable();
    let mut current = entity;
    while let Some(part) = parts.next() {
        let field = current.get(part)?;
        if parts.peek().is_none() {
            return field.as_str();
        }
        current = field.as_entity()?;
    }
    None
}

/// Interprets a listing response as a sequence of entities.
///
/// A single object counts as a one-element listing and `null` as empty.
pub(crate) fn entities_from_listing(value: Value) -> Result<Vec<Entity>, PublishError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => items.into_iter().map(Entity::from_value).collect(),
        Value::Object(map) => Ok(vec![Entity::from_map(map)]),
        other => Err(PublishError::NotAnObject {
            found: value_kind(&other),
        }),
    }
}

/// Interprets a response whose body is optional.
pub(crate) fn optional_entity(value: Value) -> Option<Entity> {
    match value {
        Value::Object(map) => Some(Entity::from_map(map)),
        _ => None,
    }
}
