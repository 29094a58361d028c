#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use datapub::publication::{DatasetRecord, PublicationApi};
use datapub::transfer::{EndpointSearch, TransferApi, TransferRequest};
use datapub::{Entity, PublishError};
use serde_json::{json, Value};

fn entity(value: Value) -> Entity {
    Entity::from_value(value).expect("test fixture is an object")
}

/// In-memory publication service that records every call.
pub struct FakePublication {
    pub dataset: Value,
    pub calls: RefCell<Vec<String>>,
}

impl FakePublication {
    pub fn with_dataset(dataset: Value) -> Self {
        Self {
            dataset,
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl PublicationApi for FakePublication {
    fn list_schemas(&self) -> Result<Vec<Entity>, PublishError> {
        self.record("list_schemas".into());
        Ok(vec![entity(json!({"id": "dc", "name": "Dublin Core"}))])
    }

    fn get_schema(&self, schema_id: &str) -> Result<Entity, PublishError> {
        self.record(format!("get_schema {schema_id}"));
        Ok(entity(json!({"id": schema_id, "fields": []})))
    }

    fn list_collections(&self) -> Result<Vec<Entity>, PublishError> {
        self.record("list_collections".into());
        Ok(vec![entity(json!({"id": 27, "name": "Test collection"}))])
    }

    fn create_dataset(
        &self,
        collection_id: &str,
        _metadata: &Value,
    ) -> Result<DatasetRecord, PublishError> {
        self.record(format!("create_dataset {collection_id}"));
        Ok(DatasetRecord::new(entity(self.dataset.clone())))
    }

    fn get_dataset_by_id(&self, dataset_id: &str) -> Result<DatasetRecord, PublishError> {
        self.record(format!("get_dataset_by_id {dataset_id}"));
        Ok(DatasetRecord::new(entity(self.dataset.clone())))
    }

    fn get_dataset_by_pid(&self, pid: &str) -> Result<DatasetRecord, PublishError> {
        self.record(format!("get_dataset_by_pid {pid}"));
        Ok(DatasetRecord::new(entity(self.dataset.clone())))
    }

    fn delete_dataset(&self, dataset_id: &str) -> Result<Option<Entity>, PublishError> {
        self.record(format!("delete_dataset {dataset_id}"));
        Ok(None)
    }

    fn submit_dataset(&self, dataset_id: &str) -> Result<Option<Entity>, PublishError> {
        self.record(format!("submit_dataset {dataset_id}"));
        Ok(Some(entity(json!({"id": dataset_id, "status": "submitted"}))))
    }
}

/// In-memory transfer service with a scripted sequence of task statuses.
pub struct FakeTransfer {
    pub statuses: RefCell<VecDeque<String>>,
    pub final_status: String,
    pub calls: RefCell<Vec<String>>,
    pub submitted: RefCell<Vec<TransferRequest>>,
}

impl FakeTransfer {
    pub fn new(statuses: &[&str], final_status: &str) -> Self {
        Self {
            statuses: RefCell::new(statuses.iter().map(|s| s.to_string()).collect()),
            final_status: final_status.to_string(),
            calls: RefCell::new(Vec::new()),
            submitted: RefCell::new(Vec::new()),
        }
    }

    pub fn succeeding() -> Self {
        Self::new(&[], "SUCCEEDED")
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn status_checks(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.starts_with("task "))
            .count()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl TransferApi for FakeTransfer {
    fn search_endpoints(&self, search: &EndpointSearch) -> Result<Entity, PublishError> {
        self.record(format!(
            "endpoint_search {}",
            search.fulltext.as_deref().unwrap_or_default()
        ));
        Ok(entity(json!({"DATA": [{"id": "user-ep-id", "activated": true}]})))
    }

    fn autoactivate(&self, endpoint_id: &str) -> Result<Entity, PublishError> {
        self.record(format!("autoactivate {endpoint_id}"));
        Ok(entity(json!({"code": "AlreadyActivated"})))
    }

    fn allocate_submission_id(&self) -> Result<Entity, PublishError> {
        self.record("submission_id".into());
        Ok(entity(json!({"value": "sub-123"})))
    }

    fn submit_transfer(&self, request: &TransferRequest) -> Result<Entity, PublishError> {
        self.record("transfer".into());
        self.submitted.borrow_mut().push(request.clone());
        Ok(entity(json!({"task_id": "task-456", "code": "Accepted"})))
    }

    fn get_task_status(&self, task_id: &str) -> Result<Entity, PublishError> {
        self.record(format!("task {task_id}"));
        let status = self
            .statuses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| self.final_status.clone());
        Ok(entity(json!({"task_id": task_id, "status": status})))
    }
}

/// A dataset record with shared storage.
pub fn dataset_with_storage() -> Value {
    json!({
        "id": 42,
        "globus.shared_endpoint.name": "publish#shared",
        "globus.shared_endpoint.path": "/datasets/42/"
    })
}

/// A dataset record without shared storage fields.
pub fn dataset_without_storage() -> Value {
    json!({"id": 42, "dc.title": "No storage"})
}
