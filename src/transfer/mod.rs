//! Transfer service façade.
//!
//! The transfer service moves directories between storage endpoints. This
//! module exposes the handful of calls the publication workflow needs
//! ([`TransferApi`]), the HTTP implementation ([`TransferClient`]), and the
//! helpers that chain them: endpoint resolution, transfer submission, and
//! completion polling.

mod client;
pub mod poll;

use log::{debug, info};
use serde_json::{json, Value};
use url::Url;

pub use client::{TransferClient, DEFAULT_TRANSFER_URL};
pub use poll::{wait_for_transfer, PollOptions, PollOutcome, POLL_INTERVAL};

use crate::entity::{Entity, Field};
use crate::error::PublishError;

/// Status value reported while a task is still running.
pub const ACTIVE_STATUS: &str = "ACTIVE";

/// Operations offered by the transfer service.
pub trait TransferApi {
    /// Searches endpoints; parameters that are `None` are not sent.
    fn search_endpoints(&self, search: &EndpointSearch) -> Result<Entity, PublishError>;

    /// Asks the service to activate an endpoint with cached credentials.
    fn autoactivate(&self, endpoint_id: &str) -> Result<Entity, PublishError>;

    /// Fetches a fresh submission id (field `value`). One per transfer.
    fn allocate_submission_id(&self) -> Result<Entity, PublishError>;

    /// Posts a recursive single-item transfer with notifications disabled.
    fn submit_transfer(&self, request: &TransferRequest) -> Result<Entity, PublishError>;

    /// Fetches the current state of a task.
    fn get_task_status(&self, task_id: &str) -> Result<Entity, PublishError>;
}

/// Query parameters for an endpoint search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EndpointSearch {
    pub scope: Option<String>,
    pub fulltext: Option<String>,
    pub fields: Option<String>,
    pub offset: Option<u32>,
    pub limit: Option<u32>,
}

impl EndpointSearch {
    pub fn fulltext(text: impl Into<String>) -> Self {
        Self {
            fulltext: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    pub fn with_fields(mut self, fields: impl Into<String>) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Query pairs in the service's parameter names.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(scope) = &self.scope {
            pairs.push(("filter_scope", scope.clone()));
        }
        if let Some(fulltext) = &self.fulltext {
            pairs.push(("filter_fulltext", fulltext.clone()));
        }
        if let Some(fields) = &self.fields {
            pairs.push(("fields", fields.clone()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset", offset.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    pub(crate) fn apply_to(&self, url: &mut Url) {
        let pairs = self.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
    }
}

/// Everything needed to post one transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub submission_id: String,
    pub source_endpoint: String,
    pub source_path: String,
    pub destination_endpoint: String,
    pub destination_path: String,
}

impl TransferRequest {
    /// The request body understood by the transfer service.
    pub fn document(&self) -> Value {
        json!({
            "DATA_TYPE": "transfer",
            "submission_id": self.submission_id,
            "notify_on_succeeded": false,
            "notify_on_failed": false,
            "notify_on_inactive": false,
            "source_endpoint": self.source_endpoint,
            "destination_endpoint": self.destination_endpoint,
            "DATA": [{
                "DATA_TYPE": "transfer_item",
                "source_path": self.source_path,
                "destination_path": self.destination_path,
                "recursive": true,
            }],
        })
    }
}

/// The task created by a successful submission.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmittedTransfer {
    pub submission_id: String,
    pub task_id: String,
}

/// Typed view over a task document.
#[derive(Clone, Debug, PartialEq)]
pub struct TaskStatus {
    status: String,
    entity: Entity,
}

impl TaskStatus {
    /// Fails if the document carries no `status` string.
    pub fn from_entity(entity: Entity) -> Result<Self, PublishError> {
        let status = entity.require_str("status")?.to_string();
        Ok(Self { status, entity })
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == ACTIVE_STATUS
    }

    pub fn task_id(&self) -> Option<&str> {
        self.entity.str_field("task_id")
    }

    pub fn entity(&self) -> &Entity {
        &self.entity
    }
}

/// Looks up an endpoint by name and makes sure it is activated.
///
/// Returns the endpoint id of the first full-text match.
pub fn resolve_endpoint<A>(api: &A, name: &str) -> Result<String, PublishError>
where
    A: TransferApi + ?Sized,
{
    let search = EndpointSearch::fulltext(name)
        .with_fields("id,activated")
        .with_offset(0)
        .with_limit(1);
    let result = api.search_endpoints(&search)?;

    let endpoint = result
        .require_list("DATA")?
        .first()
        .and_then(Field::as_entity)
        .ok_or_else(|| PublishError::EndpointNotFound(name.to_string()))?;
    let endpoint_id = endpoint.require_str("id")?.to_string();

    let activated = endpoint
        .get("activated")
        .and_then(Field::as_bool)
        .unwrap_or(false);
    if !activated {
        info!("Endpoint '{name}' ({endpoint_id}) is not active, requesting auto-activation");
        let response = api.autoactivate(&endpoint_id)?;
        if let Some(code) = response.str_field("code") {
            debug!("Auto-activation of {endpoint_id} answered {code}");
            if code.starts_with("AutoActivationFailed") {
                return Err(PublishError::EndpointActivation {
                    endpoint: endpoint_id,
                    code: code.to_string(),
                });
            }
        }
    }

    Ok(endpoint_id)
}

/// Allocates a submission id and submits a recursive directory transfer.
pub fn perform_transfer<A>(
    api: &A,
    source_endpoint: &str,
    source_path: &str,
    destination_endpoint: &str,
    destination_path: &str,
) -> Result<SubmittedTransfer, PublishError>
where
    A: TransferApi + ?Sized,
{
    let submission = api.allocate_submission_id()?;
    let submission_id = submission.require("value")?.to_display_string();
    info!("Submission id: {submission_id}");

    let request = TransferRequest {
        submission_id: submission_id.clone(),
        source_endpoint: source_endpoint.to_string(),
        source_path: source_path.to_string(),
        destination_endpoint: destination_endpoint.to_string(),
        destination_path: destination_path.to_string(),
    };
    debug!("Transfer document: {}", request.document());

    let response = api.submit_transfer(&request)?;
    let task_id = response.require("task_id")?.to_display_string();
    info!("Transfer task {task_id} submitted ({source_endpoint}:{source_path} -> {destination_endpoint}:{destination_path})");

    Ok(SubmittedTransfer {
        submission_id,
        task_id,
    })
}
