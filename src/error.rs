use std::path::PathBuf;

use thiserror::Error;

use crate::job::JobError;
use crate::registry::RegistryError;

/// Everything that aborts pipeline construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can't read {}: {source}", path.display())]
    Read { path: PathBuf, source: std::io::Error },
    #[error("can't parse {}: {source}", path.display())]
    Json { path: PathBuf, source: serde_json::Error },
    #[error("{} fails schema validation: {}", path.display(), errors.join("; "))]
    Schema { path: PathBuf, errors: Vec<String> },
    #[error("capture kit {0} has no target set in the reference data")]
    UnknownCaptureKit(String),
    #[error("reference data has no {0}")]
    MissingReference(&'static str),
    #[error("capture {0} is listed more than once in the sample sheet")]
    DuplicateCapture(String),
    #[error("capture {0} has no alignment: set bam, or enable UMI processing and list fastqs")]
    NoAlignment(String),
    #[error("capture {0} lists {1} fastq1 files but {2} fastq2 files")]
    UnpairedFastqs(String, usize, usize),
    #[error("job name {0} is used by more than one job")]
    DuplicateJobName(String),
    #[error("{normal} and {cancer} are not a normal/cancer pairing of one patient and panel")]
    InvalidPairing { normal: String, cancer: String },
    #[error("output {path} of job {job} is already declared by job {first}")]
    DuplicateOutput { path: String, job: String, first: String },
    #[error("input {path} of job {job} is neither a static file nor the output of an earlier job")]
    DanglingInput { path: String, job: String },
    #[error(transparent)]
    Job(#[from] JobError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}
