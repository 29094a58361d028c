//! Publication workflow orchestration.
//!
//! A [`Plan`] describes the requested actions and the identifiers supplied
//! for them. [`execute`] validates it up front (no remote call is made for
//! an invalid plan), then runs the actions in a fixed order, carrying the
//! dataset and transfer ids produced by earlier steps into later ones.

pub mod report;

use std::time::Duration;

use log::info;
use serde_json::Value;

pub use report::{StepOutcome, TransferDirection, WorkflowReport};

use crate::error::PublishError;
use crate::publication::{PublicationApi, SharedEndpoint};
use crate::transfer::{perform_transfer, resolve_endpoint, wait_for_transfer, PollOptions, TransferApi};

/// Requested actions plus the identifiers they operate on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Plan {
    /// Name of the user's transfer endpoint.
    pub data_endpoint: Option<String>,
    /// Directory on the user's endpoint.
    pub data_directory: Option<String>,
    pub metadata: Option<Value>,
    pub collection_id: Option<String>,
    /// Metadata and collection id are entered at a prompt once the plan
    /// has been validated.
    pub interactive: bool,
    pub dataset_id: Option<String>,
    pub dataset_pid: Option<String>,
    pub transfer_id: Option<String>,

    pub list_schemas: bool,
    pub list_collections: bool,
    pub introspect_schema: Option<String>,
    pub create_dataset: bool,
    pub transfer_data: bool,
    pub download_dataset: bool,
    pub wait: bool,
    pub poll_seconds: Option<u64>,
    pub submit: bool,
    pub delete_dataset: bool,
    pub get_dataset: bool,
}

impl Plan {
    /// Checks that every requested action has the inputs it needs.
    pub fn validate(&self) -> Result<(), PublishError> {
        if self.create_dataset
            && !self.interactive
            && (self.metadata.is_none() || self.collection_id.is_none())
        {
            return Err(PublishError::precondition(
                "--collection-id and --metadata-file must be provided with --create-dataset",
            ));
        }

        if self.transfer_data {
            self.source_location()?;
            if !self.create_dataset && self.dataset_id.is_none() {
                return Err(PublishError::precondition(
                    "--transfer-data must be combined with --create-dataset or an existing --dataset-id must be provided",
                ));
            }
        }

        if self.download_dataset {
            self.source_location()?;
            if self.dataset_pid.is_none() {
                return Err(PublishError::precondition(
                    "--dataset-pid must be provided with --download-dataset",
                ));
            }
        }

        if self.wait || self.poll_seconds.is_some() {
            if self.wait && self.poll_seconds.is_some() {
                return Err(PublishError::precondition(
                    "Only one of --wait and --poll should be specified",
                ));
            }
            if !self.transfer_data && !self.download_dataset && self.transfer_id.is_none() {
                return Err(PublishError::precondition(
                    "--transfer-data, --download-dataset or --transfer-id must be specified with --wait or --poll",
                ));
            }
        }

        if self.submit && !self.has_dataset_id() {
            return Err(PublishError::precondition(
                "--submit requires either --create-dataset or --dataset-id to be specified",
            ));
        }

        if self.delete_dataset && !self.has_dataset_id() {
            return Err(PublishError::precondition(
                "--delete-dataset requires either --create-dataset or --dataset-id to be specified",
            ));
        }

        if self.get_dataset && self.dataset_pid.is_none() {
            return Err(PublishError::precondition(
                "--get-dataset requires --dataset-pid to be specified",
            ));
        }

        Ok(())
    }

    /// True when dataset creation still waits on interactive input.
    pub fn needs_metadata_prompt(&self) -> bool {
        self.interactive && self.create_dataset
    }

    /// Poll settings for `--wait` / `--poll`, if either was requested.
    pub fn poll_options(&self) -> Option<PollOptions> {
        if self.wait {
            Some(PollOptions::indefinite())
        } else {
            self.poll_seconds.map(PollOptions::with_timeout_secs)
        }
    }

    fn has_dataset_id(&self) -> bool {
        self.create_dataset || self.dataset_id.is_some()
    }

    fn source_location(&self) -> Result<(&str, &str), PublishError> {
        match (self.data_endpoint.as_deref(), self.data_directory.as_deref()) {
            (Some(endpoint), Some(directory)) => Ok((endpoint, directory)),
            _ => Err(PublishError::precondition(
                "--data-endpoint and --data-directory must be provided to perform transfers",
            )),
        }
    }
}

/// Identifiers produced while the workflow runs.
#[derive(Debug, Default)]
struct RunState {
    dataset_id: Option<String>,
    destination: Option<SharedEndpoint>,
    transfer_id: Option<String>,
    user_endpoint_id: Option<String>,
}

/// Runs a plan against the two services.
///
/// Completed steps are appended to `report` as they finish, so the caller
/// can still show them when a later step fails. `sleep` is used between
/// transfer status checks.
pub fn execute<P, T, S>(
    plan: &Plan,
    publication: &P,
    transfer: &T,
    mut sleep: S,
    report: &mut WorkflowReport,
) -> Result<(), PublishError>
where
    P: PublicationApi + ?Sized,
    T: TransferApi + ?Sized,
    S: FnMut(Duration),
{
    plan.validate()?;

    let mut state = RunState {
        dataset_id: plan.dataset_id.clone(),
        transfer_id: plan.transfer_id.clone(),
        ..RunState::default()
    };

    if plan.list_schemas {
        report.push(StepOutcome::Schemas(publication.list_schemas()?));
    }

    if plan.list_collections {
        report.push(StepOutcome::Collections(publication.list_collections()?));
    }

    if let Some(schema_id) = plan.introspect_schema.as_deref() {
        report.push(StepOutcome::Schema(publication.get_schema(schema_id)?));
    }

    if plan.create_dataset {
        create_dataset(plan, publication, &mut state, report)?;
    }

    if plan.transfer_data {
        upload_data(plan, publication, transfer, &mut state, report)?;
    }

    if plan.download_dataset {
        download_dataset(plan, publication, transfer, &mut state, report)?;
    }

    if let Some(options) = plan.poll_options() {
        let task_id = state.transfer_id.as_deref().ok_or_else(|| {
            PublishError::precondition("--transfer-data or --transfer-id must be specified")
        })?;
        info!("Waiting for transfer {task_id}");
        let outcome = wait_for_transfer(transfer, task_id, &options, &mut sleep)?;
        report.push(StepOutcome::TransferPolled(outcome));
    }

    if plan.submit {
        let dataset_id = require_dataset_id(&state, "--submit")?;
        info!("Submitting dataset {dataset_id}");
        let response = publication.submit_dataset(&dataset_id)?;
        report.push(StepOutcome::DatasetSubmitted {
            dataset_id,
            response,
        });
    }

    if plan.delete_dataset {
        let dataset_id = require_dataset_id(&state, "--delete-dataset")?;
        info!("Deleting dataset {dataset_id}");
        publication.delete_dataset(&dataset_id)?;
        report.push(StepOutcome::DatasetDeleted { dataset_id });
    }

    if plan.get_dataset {
        let pid = plan.dataset_pid.as_deref().ok_or_else(|| {
            PublishError::precondition("--get-dataset requires --dataset-pid to be specified")
        })?;
        report.push(StepOutcome::Dataset(publication.get_dataset_by_pid(pid)?));
    }

    Ok(())
}

fn create_dataset<P>(
    plan: &Plan,
    publication: &P,
    state: &mut RunState,
    report: &mut WorkflowReport,
) -> Result<(), PublishError>
where
    P: PublicationApi + ?Sized,
{
    let (Some(collection_id), Some(metadata)) = (plan.collection_id.as_deref(), &plan.metadata)
    else {
        return Err(PublishError::precondition(
            "--collection-id and --metadata-file must be provided with --create-dataset",
        ));
    };

    info!("Creating dataset in collection {collection_id}");
    let record = publication.create_dataset(collection_id, metadata)?;
    state.dataset_id = Some(record.require_id()?);
    state.destination = record.shared_endpoint();
    report.push(StepOutcome::DatasetCreated(record));
    Ok(())
}

fn upload_data<P, T>(
    plan: &Plan,
    publication: &P,
    transfer: &T,
    state: &mut RunState,
    report: &mut WorkflowReport,
) -> Result<(), PublishError>
where
    P: PublicationApi + ?Sized,
    T: TransferApi + ?Sized,
{
    let (endpoint_name, directory) = plan.source_location()?;

    let destination = match state.destination.clone() {
        Some(destination) => destination,
        None => {
            let dataset_id = state.dataset_id.clone().ok_or_else(|| {
                PublishError::precondition(
                    "--transfer-data must be combined with --create-dataset or an existing --dataset-id must be provided",
                )
            })?;
            let record = publication.get_dataset_by_id(&dataset_id)?;
            let destination = record.shared_endpoint();
            report.push(StepOutcome::DatasetFetched(record));
            let destination = destination.ok_or_else(|| {
                PublishError::precondition(format!(
                    "dataset {dataset_id} has no shared endpoint name and path to transfer into"
                ))
            })?;
            state.destination = Some(destination.clone());
            destination
        }
    };

    let source_endpoint = user_endpoint(transfer, endpoint_name, state)?;
    let submitted = perform_transfer(
        transfer,
        &source_endpoint,
        directory,
        &destination.name,
        &destination.data_path(),
    )?;

    state.transfer_id = Some(submitted.task_id.clone());
    report.push(StepOutcome::TransferSubmitted {
        direction: TransferDirection::Upload,
        submission_id: submitted.submission_id,
        task_id: submitted.task_id,
    });
    Ok(())
}

fn download_dataset<P, T>(
    plan: &Plan,
    publication: &P,
    transfer: &T,
    state: &mut RunState,
    report: &mut WorkflowReport,
) -> Result<(), PublishError>
where
    P: PublicationApi + ?Sized,
    T: TransferApi + ?Sized,
{
    let (endpoint_name, directory) = plan.source_location()?;
    let pid = plan.dataset_pid.as_deref().ok_or_else(|| {
        PublishError::precondition("--dataset-pid must be provided with --download-dataset")
    })?;

    let record = publication.get_dataset_by_pid(pid)?;
    let storage = record.shared_endpoint();
    report.push(StepOutcome::DatasetFetched(record));
    let storage = storage.ok_or_else(|| {
        PublishError::precondition(format!(
            "dataset {pid} has no shared endpoint name and path to transfer from"
        ))
    })?;

    let destination_endpoint = user_endpoint(transfer, endpoint_name, state)?;
    let submitted = perform_transfer(
        transfer,
        &storage.name,
        &storage.path,
        &destination_endpoint,
        directory,
    )?;

    state.transfer_id = Some(submitted.task_id.clone());
    report.push(StepOutcome::TransferSubmitted {
        direction: TransferDirection::Download,
        submission_id: submitted.submission_id,
        task_id: submitted.task_id,
    });
    Ok(())
}

/// Resolves the user's endpoint once per run.
fn user_endpoint<T>(transfer: &T, name: &str, state: &mut RunState) -> Result<String, PublishError>
where
    T: TransferApi + ?Sized,
{
    if let Some(id) = &state.user_endpoint_id {
        return Ok(id.clone());
    }
    let id = resolve_endpoint(transfer, name)?;
    state.user_endpoint_id = Some(id.clone());
    Ok(id)
}

fn require_dataset_id(state: &RunState, flag: &str) -> Result<String, PublishError> {
    state.dataset_id.clone().ok_or_else(|| {
        PublishError::precondition(format!(
            "{flag} requires either --create-dataset or --dataset-id to be specified"
        ))
    })
}
