//! Structured results of a workflow run.
//!
//! Steps record what they did here instead of printing; the CLI renders the
//! report once the run ends, successfully or not.

use std::fmt;

use crate::entity::Entity;
use crate::publication::DatasetRecord;
use crate::transfer::PollOutcome;

/// Which way data moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransferDirection {
    /// From the user's endpoint into dataset storage.
    Upload,
    /// From dataset storage to the user's endpoint.
    Download,
}

/// One completed workflow step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Schemas(Vec<Entity>),
    Schema(Entity),
    Collections(Vec<Entity>),
    DatasetCreated(DatasetRecord),
    /// A dataset fetched as input to another step.
    DatasetFetched(DatasetRecord),
    TransferSubmitted {
        direction: TransferDirection,
        submission_id: String,
        task_id: String,
    },
    TransferPolled(PollOutcome),
    DatasetSubmitted {
        dataset_id: String,
        response: Option<Entity>,
    },
    DatasetDeleted {
        dataset_id: String,
    },
    /// The answer to `--get-dataset`.
    Dataset(DatasetRecord),
}

/// All steps of a run, in execution order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkflowReport {
    pub steps: Vec<StepOutcome>,
}

impl WorkflowReport {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, step: StepOutcome) {
        self.steps.push(step);
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Id of the dataset created during the run, if any.
    pub fn created_dataset_id(&self) -> Option<String> {
        self.steps.iter().find_map(|step| match step {
            StepOutcome::DatasetCreated(record) => record.id(),
            _ => None,
        })
    }

    /// Task id of the last submitted transfer, if any.
    pub fn last_transfer_id(&self) -> Option<&str> {
        self.steps.iter().rev().find_map(|step| match step {
            StepOutcome::TransferSubmitted { task_id, .. } => Some(task_id.as_str()),
            _ => None,
        })
    }
}

impl fmt::Display for WorkflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Schemas(schemas) => {
                writeln!(f, "Schemas ({}):", schemas.len())?;
                for schema in schemas {
                    writeln!(f, "{}", schema)?;
                }
                Ok(())
            }
            StepOutcome::Schema(schema) => writeln!(f, "{}", schema),
            StepOutcome::Collections(collections) => {
                writeln!(f, "Collections ({}):", collections.len())?;
                for collection in collections {
                    writeln!(f, "{}", collection)?;
                }
                Ok(())
            }
            StepOutcome::DatasetCreated(record) => {
                writeln!(f, "Dataset record created:")?;
                writeln!(f, "{}", record.entity())
            }
            StepOutcome::DatasetFetched(record) => {
                writeln!(f, "Dataset record returned:")?;
                writeln!(f, "{}", record.entity())
            }
            StepOutcome::TransferSubmitted {
                direction,
                submission_id,
                task_id,
            } => {
                let label = match direction {
                    TransferDirection::Upload => "Upload",
                    TransferDirection::Download => "Download",
                };
                writeln!(f, "{label} submitted (submission id {submission_id})")?;
                writeln!(f, "id of transfer task is {task_id}")
            }
            StepOutcome::TransferPolled(outcome) => {
                let status = outcome.status();
                if outcome.is_finished() {
                    writeln!(f, "Transfer finished with status {}", status.status())?;
                } else {
                    writeln!(
                        f,
                        "Stopped waiting; transfer is still {}",
                        status.status()
                    )?;
                }
                writeln!(f, "{}", status.entity())
            }
            StepOutcome::DatasetSubmitted {
                dataset_id,
                response,
            } => {
                writeln!(f, "Dataset {dataset_id} submitted")?;
                match response {
                    Some(entity) => writeln!(f, "{}", entity),
                    None => Ok(()),
                }
            }
            StepOutcome::DatasetDeleted { dataset_id } => {
                writeln!(f, "Dataset {dataset_id} deleted")
            }
            StepOutcome::Dataset(record) => writeln!(f, "{}", record.entity()),
        }
    }
}
