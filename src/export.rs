//! Hand the configured job graph to a scheduler
//!
//! Jobs are written in configuration order, which is a valid dependency order: every input of a
//! job is static or produced by an earlier job.

/// Job graph as a JSON array
pub mod json;

/// Self-contained bash script running every job in order
pub mod script;

/// Jobs and their inputs/outputs in a SQLite database
pub mod db;

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::ValueEnum;
use log::info;

use crate::job::ConfiguredJob;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Json,
    Sqlite,
    Script,
}

impl ExportFormat {
    pub fn default_file_name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "liqbio-jobs.json",
            ExportFormat::Sqlite => "liqbio.db",
            ExportFormat::Script => "liqbio-jobs.sh",
        }
    }
}

/// Where and how to write the job graph
pub struct Export {
    pub format: ExportFormat,
    pub path: PathBuf,
    /// Render everything but leave the filesystem (or database) untouched
    pub dry_run: bool,
}

impl Export {
    /// Export to `output` if given, otherwise to the format's default file in `outdir`
    pub fn new(format: ExportFormat, output: Option<PathBuf>, outdir: &Path, dry_run: bool) -> Export {
        let path = output.unwrap_or_else(|| outdir.join(format.default_file_name()));
        Export { format, path, dry_run }
    }

    pub fn write(&self, jobs: &[ConfiguredJob], outdir: &str) -> Result<()> {
        info!("Exporting {} jobs as {:?} to {}", jobs.len(), self.format, self.path.display());
        match self.format {
            ExportFormat::Json => json::write_json(jobs, &self.path, self.dry_run),
            ExportFormat::Script => script::write_script(jobs, outdir, &self.path, self.dry_run),
            ExportFormat::Sqlite => db::write_db(jobs, &self.path, self.dry_run),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_jobs() -> Vec<ConfiguredJob> {
    vec![
        ConfiguredJob {
            name: "svcaller/a-DEL".to_string(),
            command: "svcaller run-all --event-type DEL /data/a.bam".to_string(),
            inputs: vec!["/data/a.bam".to_string()],
            outputs: vec!["/out/svs/a-DEL.bam".to_string(), "/out/svs/a-DEL.gtf".to_string()],
            threads: 1,
        },
        ConfiguredJob {
            name: "manta-somatic/b-a".to_string(),
            command: "configManta.py --exome && /out/variants/b-a-manta-somatic/runWorkflow.py -m local -j 4".to_string(),
            inputs: vec!["/data/a.bam".to_string(), "/data/b.bam".to_string()],
            outputs: vec!["/out/variants/b-a-manta-somatic".to_string()],
            threads: 4,
        },
    ]
}
