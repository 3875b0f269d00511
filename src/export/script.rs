use std::collections::BTreeSet;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use log::info;
use serde::Serialize;
use tinytemplate::TinyTemplate;

use crate::job::ConfiguredJob;

/// Rendering context for the script header
#[derive(Serialize)]
struct HeaderContext {
    time_now: String,
    job_count: usize,
    outdir: String,
}

/// Rendering context for one job section
#[derive(Serialize)]
struct JobContext<'a> {
    name: &'a str,
    threads: usize,
    inputs: &'a [String],
    outputs: &'a [String],
    /// Space separated parent directories of the outputs
    output_dirs: String,
    command: &'a str,
}

impl<'a> JobContext<'a> {
    fn new(job: &'a ConfiguredJob) -> JobContext<'a> {
        let dirs: BTreeSet<&str> = job
            .outputs
            .iter()
            .filter_map(|o| Path::new(o).parent())
            .filter_map(|p| p.to_str())
            .filter(|p| !p.is_empty())
            .collect();
        JobContext {
            name: &job.name,
            threads: job.threads,
            inputs: &job.inputs,
            outputs: &job.outputs,
            output_dirs: dirs.into_iter().collect::<Vec<_>>().join(" "),
            command: &job.command,
        }
    }
}

/// Render a bash script that runs every job in configuration order
pub fn render_script(jobs: &[ConfiguredJob], outdir: &str) -> Result<String> {
    static HEADER: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/script.txt"));
    static JOB: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/data/templates/job.txt"));

    let mut tt = TinyTemplate::new();
    // commands are shell, not HTML
    tt.set_default_formatter(&tinytemplate::format_unescaped);
    tt.add_template("header", HEADER)?;
    tt.add_template("job", JOB)?;

    let header = HeaderContext { time_now: Utc::now().to_rfc3339(), job_count: jobs.len(), outdir: outdir.to_string() };
    let mut script = tt.render("header", &header).context("Rendering script header")?;
    for job in jobs {
        let section = tt
            .render("job", &JobContext::new(job))
            .with_context(|| format!("Rendering job {}", job.name))?;
        script.push_str(&section);
    }
    Ok(script)
}

pub fn write_script(jobs: &[ConfiguredJob], outdir: &str, path: &Path, dry_run: bool) -> Result<()> {
    let script = render_script(jobs, outdir)?;
    if dry_run {
        info!("--dry-run set, not writing job script {}", path.display());
        return Ok(());
    }
    if path.exists() {
        info!("Job script {} already exists, it will be overwritten", path.display());
    }

    let mut file = OpenOptions::new().create(true).write(true).truncate(true).open(path)?;
    file.write_all(script.as_bytes()).with_context(|| format!("Can't write {}", path.display()))?;
    Ok(())
}
