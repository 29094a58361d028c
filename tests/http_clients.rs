use datapub::http::ServiceConfig;
use datapub::publication::{PublicationApi, PublicationClient};
use datapub::transfer::{EndpointSearch, TransferApi, TransferClient, TransferRequest};
use datapub::PublishError;
use serde_json::json;
use tokio::runtime::Runtime;
use wiremock::matchers::{body_json, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// A mock server driven from blocking test code.
struct Harness {
    server: MockServer,
    runtime: Runtime,
}

impl Harness {
    fn start() -> Self {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .expect("tokio runtime");
        let server = runtime.block_on(MockServer::start());
        Self { server, runtime }
    }

    fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    fn requests(&self) -> Vec<Request> {
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
    }

    fn config(&self, token: Option<&str>) -> ServiceConfig {
        ServiceConfig::new(&format!("{}/api", self.server.uri()))
            .expect("mock server url")
            .with_token(token.map(str::to_string))
    }

    fn publication(&self, token: Option<&str>) -> PublicationClient {
        PublicationClient::new(self.config(token))
    }

    fn transfer(&self, token: Option<&str>) -> TransferClient {
        TransferClient::new(self.config(token))
    }
}

// ── Publication service ─────────────────────────────────────────

#[test]
fn list_schemas_sends_bearer_token() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/schemas"))
            .and(header("Authorization", "Bearer pub-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "dc", "fields": [{"name": "dc.title"}]},
                {"id": "globus"}
            ]))),
    );

    let schemas = harness
        .publication(Some("pub-token"))
        .list_schemas()
        .expect("schemas");

    assert_eq!(schemas.len(), 2);
    assert_eq!(schemas[0].str_field("id"), Some("dc"));
    let fields = schemas[0].require_list("fields").expect("fields");
    assert!(fields[0].as_entity().is_some());
}

#[test]
fn requests_without_token_carry_no_authorization_header() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/collections"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 27}]))),
    );

    let collections = harness.publication(None).list_collections().expect("collections");
    assert_eq!(collections.len(), 1);

    let requests = harness.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[test]
fn get_schema_by_id() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/schemas/dublin-core"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "dublin-core"}))),
    );

    let schema = harness.publication(None).get_schema("dublin-core").expect("schema");
    assert_eq!(schema.str_field("id"), Some("dublin-core"));
}

#[test]
fn create_dataset_posts_metadata_unmodified() {
    let harness = Harness::start();
    let metadata = json!({"dc.title": "Results", "dc.contributor.author": ["Doe, J."]});
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/collections/27"))
            .and(body_json(&metadata))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 42,
                "globus.shared_endpoint.name": "publish#shared",
                "globus.shared_endpoint.path": "/datasets/42/"
            }))),
    );

    let record = harness
        .publication(None)
        .create_dataset("27", &metadata)
        .expect("create");

    assert_eq!(record.id().as_deref(), Some("42"));
    let storage = record.shared_endpoint().expect("storage");
    assert_eq!(storage.name, "publish#shared");
    assert_eq!(storage.data_path(), "/datasets/42/data/");
}

#[test]
fn get_dataset_by_pid_uses_uri_query() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/datasets"))
            .and(query_param("uri", "doi:10.1234/abc def"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 7, "globus.shared_endpoint.name": "ep", "globus.shared_endpoint.path": "/d/7/"}
            ]))),
    );

    let record = harness
        .publication(None)
        .get_dataset_by_pid("doi:10.1234/abc def")
        .expect("dataset");
    assert_eq!(record.id().as_deref(), Some("7"));
}

#[test]
fn get_dataset_by_pid_with_no_match_is_not_found() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/datasets"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([]))),
    );

    let err = harness
        .publication(None)
        .get_dataset_by_pid("missing")
        .expect_err("should fail");
    assert!(matches!(err, PublishError::DatasetNotFound(pid) if pid == "missing"));
}

#[test]
fn get_dataset_by_id_uses_path() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/datasets/42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42}))),
    );

    let record = harness.publication(None).get_dataset_by_id("42").expect("dataset");
    assert_eq!(record.id().as_deref(), Some("42"));
}

#[test]
fn delete_dataset_accepts_empty_body() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("DELETE"))
            .and(path("/api/datasets/42"))
            .respond_with(ResponseTemplate::new(204)),
    );

    let response = harness.publication(None).delete_dataset("42").expect("delete");
    assert!(response.is_none());
}

#[test]
fn submit_dataset_posts_to_submit_path() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/datasets/42/submit"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"id": 42, "status": "submitted"})),
            ),
    );

    let response = harness
        .publication(None)
        .submit_dataset("42")
        .expect("submit")
        .expect("response body");
    assert_eq!(response.str_field("status"), Some("submitted"));
}

#[test]
fn error_status_is_propagated_with_body() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/datasets/42/submit"))
            .respond_with(ResponseTemplate::new(409).set_body_string("already submitted")),
    );

    let err = harness
        .publication(None)
        .submit_dataset("42")
        .expect_err("should fail");
    match err {
        PublishError::Http {
            method,
            status,
            body,
            ..
        } => {
            assert_eq!(method, "POST");
            assert_eq!(status, 409);
            assert_eq!(body, "already submitted");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ── Transfer service ────────────────────────────────────────────

#[test]
fn endpoint_search_sends_only_supplied_filters() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/endpoint_search"))
            .and(query_param("filter_fulltext", "lab storage"))
            .and(query_param("fields", "id,activated"))
            .and(query_param("limit", "1"))
            .and(header("Authorization", "Bearer xfer-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "DATA_TYPE": "endpoint_list",
                "DATA": [{"DATA_TYPE": "endpoint", "id": "ep-1", "activated": true}]
            }))),
    );

    let search = EndpointSearch::fulltext("lab storage")
        .with_fields("id,activated")
        .with_limit(1);
    let result = harness
        .transfer(Some("xfer-token"))
        .search_endpoints(&search)
        .expect("search");

    let data = result.require_list("DATA").expect("DATA");
    assert_eq!(
        data[0].as_entity().and_then(|e| e.str_field("id")),
        Some("ep-1")
    );

    let requests = harness.requests();
    let keys: Vec<String> = requests[0]
        .url
        .query_pairs()
        .map(|(key, _)| key.into_owned())
        .collect();
    assert_eq!(keys, vec!["filter_fulltext", "fields", "limit"]);
}

#[test]
fn autoactivate_posts_to_endpoint() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/endpoint/ep-1/autoactivate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": "AutoActivated.CachedCredential"})),
            ),
    );

    let response = harness.transfer(None).autoactivate("ep-1").expect("autoactivate");
    assert_eq!(
        response.str_field("code"),
        Some("AutoActivated.CachedCredential")
    );
}

#[test]
fn submission_id_and_transfer() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/submission_id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"value": "sub-1"}))),
    );
    harness.mount(
        Mock::given(method("POST"))
            .and(path("/api/transfer"))
            .and(body_partial_json(json!({
                "DATA_TYPE": "transfer",
                "submission_id": "sub-1",
                "source_endpoint": "ep-src",
                "destination_endpoint": "ep-dst",
                "notify_on_succeeded": false
            })))
            .respond_with(
                ResponseTemplate::new(202)
                    .set_body_json(json!({"task_id": "task-1", "code": "Accepted"})),
            ),
    );

    let client = harness.transfer(None);
    let submission = client.allocate_submission_id().expect("submission id");
    let request = TransferRequest {
        submission_id: submission.require_str("value").unwrap().to_string(),
        source_endpoint: "ep-src".into(),
        source_path: "/in/".into(),
        destination_endpoint: "ep-dst".into(),
        destination_path: "/out/data/".into(),
    };
    let response = client.submit_transfer(&request).expect("transfer");
    assert_eq!(response.str_field("task_id"), Some("task-1"));

    let requests = harness.requests();
    let body: serde_json::Value = serde_json::from_slice(&requests[1].body).expect("json body");
    assert_eq!(body["DATA"][0]["recursive"], true);
    assert_eq!(body["DATA"][0]["DATA_TYPE"], "transfer_item");
}

#[test]
fn task_status_lookup() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/task/task-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"task_id": "task-1", "status": "SUCCEEDED"})),
            ),
    );

    let status = harness.transfer(None).get_task_status("task-1").expect("status");
    assert_eq!(status.str_field("status"), Some("SUCCEEDED"));
}

#[test]
fn transfer_service_errors_abort() {
    let harness = Harness::start();
    harness.mount(
        Mock::given(method("GET"))
            .and(path("/api/task/nope"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"code": "ClientError.NotFound"}))),
    );

    let err = harness.transfer(None).get_task_status("nope").expect_err("should fail");
    assert!(matches!(err, PublishError::Http { status: 404, .. }));
}
