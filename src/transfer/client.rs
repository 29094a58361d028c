use crate::entity::Entity;
use crate::error::PublishError;
use crate::http::{RestClient, ServiceConfig};

use super::{EndpointSearch, TransferApi, TransferRequest};

/// Base URL of the public transfer service API.
pub const DEFAULT_TRANSFER_URL: &str = "https://transfer.api.globusonline.org/v0.10/";

/// [`TransferApi`] over HTTP.
pub struct TransferClient {
    rest: RestClient,
}

impl TransferClient {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            rest: RestClient::new(config),
        }
    }
}

impl TransferApi for TransferClient {
    fn search_endpoints(&self, search: &EndpointSearch) -> Result<Entity, PublishError> {
        let mut url = self.rest.url(&["endpoint_search"]);
        search.apply_to(&mut url);
        Entity::from_value(self.rest.get(url)?)
    }

    fn autoactivate(&self, endpoint_id: &str) -> Result<Entity, PublishError> {
        let url = self.rest.url(&["endpoint", endpoint_id, "autoactivate"]);
        Entity::from_value(self.rest.post(url, None)?)
    }

    fn allocate_submission_id(&self) -> Result<Entity, PublishError> {
        let url = self.rest.url(&["submission_id"]);
        Entity::from_value(self.rest.get(url)?)
    }

    fn submit_transfer(&self, request: &TransferRequest) -> Result<Entity, PublishError> {
        let url = self.rest.url(&["transfer"]);
        Entity::from_value(self.rest.post(url, Some(&request.document()))?)
    }

    fn get_task_status(&self, task_id: &str) -> Result<Entity, PublishError> {
        let url = self.rest.url(&["task", task_id]);
        Entity::from_value(self.rest.get(url)?)
    }
}
