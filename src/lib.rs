//! Datapub: a command-line client for dataset publication.
//!
//! Datapub creates dataset records in a publication service, moves data into
//! (or out of) the storage those records own through a separate transfer
//! service, waits for the transfers to finish, and finally submits or deletes
//! the records.
//!
//! # Modules
//!
//! - [`entity`]: typed wrapper around JSON service responses
//! - [`publication`]: publication service client (schemas, collections, datasets)
//! - [`transfer`]: transfer service façade and completion polling
//! - [`workflow`]: validated action plans and their execution
//! - [`metadata`]: metadata files and interactive metadata entry
//! - [`http`]: shared HTTP plumbing and service configuration
//! - [`error`]: error types for datapub operations

pub mod entity;
pub mod error;
pub mod http;
pub mod logging;
pub mod metadata;
pub mod publication;
pub mod transfer;
pub mod workflow;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

pub use entity::{Entity, EntityBuilder, Field};
pub use error::PublishError;

use http::ServiceConfig;
use publication::{PublicationClient, DEFAULT_SERVICE_URL};
use transfer::{TransferClient, DEFAULT_TRANSFER_URL};
use workflow::{Plan, WorkflowReport};

/// The datapub CLI application.
#[derive(Parser)]
#[command(name = "datapub")]
#[command(version, author, about)]
struct Cli {
    // ---- Client configuration ----
    /// URL of the publication service.
    #[arg(long, env = "DATAPUB_SERVICE_URL", default_value = DEFAULT_SERVICE_URL)]
    service_url: String,

    /// URL of the transfer service.
    #[arg(long, env = "DATAPUB_TRANSFER_URL", default_value = DEFAULT_TRANSFER_URL)]
    transfer_url: String,

    /// Bearer token for the publication service.
    #[arg(long, env = "DATAPUB_AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Bearer token for the transfer service.
    #[arg(long, env = "DATAPUB_TRANSFER_TOKEN", hide_env_values = true)]
    transfer_token: Option<String>,

    /// Timeout in seconds for a single HTTP request.
    #[arg(long, value_name = "SECONDS", default_value_t = 60)]
    http_timeout: u64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    // ---- Identifiers ----
    /// Endpoint containing data to be placed in the publication.
    #[arg(long)]
    data_endpoint: Option<String>,

    /// Directory within the endpoint containing data to be placed in the publication.
    #[arg(long)]
    data_directory: Option<String>,

    /// File containing metadata to be placed in the publication.
    #[arg(long)]
    metadata_file: Option<PathBuf>,

    /// Collection to create the dataset in.
    #[arg(long)]
    collection_id: Option<String>,

    /// Id of dataset used for other actions.
    #[arg(long)]
    dataset_id: Option<String>,

    /// Persistent identifier of dataset used for other actions.
    #[arg(long)]
    dataset_pid: Option<String>,

    /// Id of transfer used for other actions.
    #[arg(long)]
    transfer_id: Option<String>,

    /// Prompt for the collection id and metadata values of --create-dataset.
    #[arg(long)]
    interactive: bool,

    // ---- Actions ----
    /// List all schemas present in the publication service.
    #[arg(long)]
    list_schemas: bool,

    /// List available collections.
    #[arg(long)]
    list_collections: bool,

    /// Display all the fields of a schema.
    #[arg(long, value_name = "SCHEMA_ID")]
    introspect_schema: Option<String>,

    /// Create a new dataset in a collection (needs --metadata-file and --collection-id).
    #[arg(long)]
    create_dataset: bool,

    /// Get a dataset by its persistent identifier (needs --dataset-pid).
    #[arg(long)]
    get_dataset: bool,

    /// Transfer data into dataset storage (needs --data-endpoint and --data-directory).
    #[arg(long)]
    transfer_data: bool,

    /// Download a dataset to --data-endpoint/--data-directory (needs --dataset-pid).
    #[arg(long)]
    download_dataset: bool,

    /// Wait for the transfer to complete before continuing.
    #[arg(long)]
    wait: bool,

    /// Poll for transfer completion for at most this many seconds (0 waits indefinitely).
    #[arg(long, value_name = "SECONDS")]
    poll: Option<u64>,

    /// Submit the dataset to its collection. Transfers must be complete.
    #[arg(long)]
    submit: bool,

    /// Delete a dataset that has not been submitted.
    #[arg(long)]
    delete_dataset: bool,
}

/// Run the datapub CLI.
///
/// This is the main entry point for the CLI, called from `main.rs`.
pub fn run() -> Result<(), PublishError> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let timeout = Duration::from_secs(cli.http_timeout);
    let publication = PublicationClient::new(
        ServiceConfig::new(&cli.service_url)?
            .with_token(cli.auth_token.clone())
            .with_timeout(timeout),
    );
    let transfer = TransferClient::new(
        ServiceConfig::new(&cli.transfer_url)?
            .with_token(cli.transfer_token.clone())
            .with_timeout(timeout),
    );

    let mut plan = build_plan(cli)?;
    plan.validate()?;
    if plan.needs_metadata_prompt() {
        prompt_for_plan_metadata(&mut plan)?;
    }

    let mut report = WorkflowReport::new();
    let result = workflow::execute(
        &plan,
        &publication,
        &transfer,
        std::thread::sleep,
        &mut report,
    );
    print!("{}", report);
    result
}

/// Fills in the collection id and metadata from stdin.
fn prompt_for_plan_metadata(plan: &mut Plan) -> Result<(), PublishError> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    let (collection_id, metadata) =
        metadata::prompt_for_metadata(&mut input, &mut output, plan.collection_id.as_deref())?;
    plan.collection_id = Some(collection_id);
    plan.metadata = Some(metadata);
    Ok(())
}

/// Turns parsed flags into a plan, loading the metadata file if given.
fn build_plan(cli: Cli) -> Result<Plan, PublishError> {
    let metadata = match cli.metadata_file.as_deref() {
        Some(path) => Some(metadata::load_metadata(path)?),
        None => None,
    };

    Ok(Plan {
        data_endpoint: cli.data_endpoint,
        data_directory: cli.data_directory,
        metadata,
        collection_id: cli.collection_id,
        interactive: cli.interactive,
        dataset_id: cli.dataset_id,
        dataset_pid: cli.dataset_pid,
        transfer_id: cli.transfer_id,
        list_schemas: cli.list_schemas,
        list_collections: cli.list_collections,
        introspect_schema: cli.introspect_schema,
        create_dataset: cli.create_dataset,
        transfer_data: cli.transfer_data,
        download_dataset: cli.download_dataset,
        wait: cli.wait,
        poll_seconds: cli.poll,
        submit: cli.submit,
        delete_dataset: cli.delete_dataset,
        get_dataset: cli.get_dataset,
    })
}
