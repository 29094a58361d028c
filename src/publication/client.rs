use log::debug;
use serde_json::Value;

use crate::entity::{value_kind, Entity};
use crate::error::PublishError;
use crate::http::{RestClient, ServiceConfig};

use super::{entities_from_listing, optional_entity, DatasetRecord, PublicationApi};

/// Base URL of the public publication service API.
pub const DEFAULT_SERVICE_URL: &str = "https://publish.globus.org/v1/api/";

/// [`PublicationApi`] over HTTP.
pub struct PublicationClient {
    rest: RestClient,
}

impl PublicationClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            rest: RestClient::new(config),
        }
    }
}

impl PublicationApi for PublicationClient {
    fn list_schemas(&self) -> Result<Vec<Entity>, PublishError> {
        entities_from_listing(self.rest.get(self.rest.url(&["schemas"]))?)
    }

    fn get_schema(&self, schema_id: &str) -> Result<Entity, PublishError> {
        Entity::from_value(self.rest.get(self.rest.url(&["schemas", schema_id]))?)
    }

    fn list_collections(&self) -> Result<Vec<Entity>, PublishError> {
        entities_from_listing(self.rest.get(self.rest.url(&["collections"]))?)
    }

    fn create_dataset(
        &self,
        collection_id: &str,
        metadata: &Value,
    ) -> Result<DatasetRecord, PublishError> {
        let url = self.rest.url(&["collections", collection_id]);
        let response = self.rest.post(url, Some(metadata))?;
        Entity::from_value(response).map(DatasetRecord::new)
    }

    fn get_dataset_by_id(&self, dataset_id: &str) -> Result<DatasetRecord, PublishError> {
        let response = self.rest.get(self.rest.url(&["datasets", dataset_id]))?;
        Entity::from_value(response).map(DatasetRecord::new)
    }

    fn get_dataset_by_pid(&self, pid: &str) -> Result<DatasetRecord, PublishError> {
        let mut url = self.rest.url(&["datasets"]);
        url.query_pairs_mut().append_pair("uri", pid);

        match self.rest.get(url)? {
            Value::Array(items) => {
                debug!("Lookup of {pid} matched {} dataset(s)", items.len());
                let first = items
                    .into_iter()
                    .next()
                    .ok_or_else(|| PublishError::DatasetNotFound(pid.to_string()))?;
                Entity::from_value(first).map(DatasetRecord::new)
            }
            Value::Null => Err(PublishError::DatasetNotFound(pid.to_string())),
            Value::Object(map) => Ok(DatasetRecord::new(Entity::from_map(map))),
            other => Err(PublishError::NotAnObject {
                found: value_kind(&other),
            }),
        }
    }

    fn delete_dataset(&self, dataset_id: &str) -> Result<Option<Entity>, PublishError> {
        let response = self.rest.delete(self.rest.url(&["datasets", dataset_id]))?;
        Ok(optional_entity(response))
    }

    fn submit_dataset(&self, dataset_id: &str) -> Result<Option<Entity>, PublishError> {
        let url = self.rest.url(&["datasets", dataset_id, "submit"]);
        Ok(optional_entity(self.rest.post(url, None)?))
    }
}
