//! Job descriptors handed to the scheduler
//!
//! A job is one invocation of an external tool. Tools implement [Job]; once a tool is added to a
//! pipeline its command is rendered and it is frozen into a [ConfiguredJob].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    #[error("job {job} is missing required parameter {parameter}")]
    MissingParameter { job: String, parameter: String },
}

pub trait Job {
    /// Scheduler-visible job name, e.g. `svcaller/<capture>-DEL`
    fn name(&self) -> String;

    /// Files and directories this job reads
    ///
    /// Every input has to be a static file or an output declared by an earlier job.
    fn inputs(&self) -> Vec<String>;

    /// Files and directories this job writes
    fn outputs(&self) -> Vec<String>;

    fn threads(&self) -> usize {
        1
    }

    /// Render the shell command; never executes anything
    fn command(&self) -> Result<String, JobError>;
}

/// A job after it has been added to a pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredJob {
    pub name: String,
    pub command: String,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub threads: usize,
}

impl ConfiguredJob {
    pub fn from_job(job: &dyn Job) -> Result<ConfiguredJob, JobError> {
        Ok(ConfiguredJob {
            name: job.name(),
            command: job.command()?,
            inputs: job.inputs(),
            outputs: job.outputs(),
            threads: job.threads(),
        })
    }
}

/// Collect the set fields of a job into a path list, skipping unset ones
///
/// Unset required paths are reported by [Job::command], not here.
pub fn paths(fields: &[&Option<String>]) -> Vec<String> {
    fields.iter().filter_map(|f| f.as_ref().cloned()).collect()
}
