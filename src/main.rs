use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::info;

use liqbio::export::{Export, ExportFormat};
use liqbio::pipeline::caller::SomaticCaller;
use liqbio::pipeline::settings::{JobParams, PipelineSettings};
use liqbio::pipeline::Pipeline;
use liqbio::refdata::ReferenceData;
use liqbio::sample::sheet::SampleSheet;
use liqbio::schema::read_plain;

/// Configure liquid biopsy analysis jobs from a sample sheet
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON sample sheet listing every capture to analyse
    #[arg(long)]
    sample_sheet: PathBuf,

    /// JSON reference data: genome files and capture panel targets
    #[arg(long)]
    refdata: PathBuf,

    /// JSON file overriding tool parameters
    #[arg(long)]
    job_params: Option<PathBuf>,

    /// Directory all job outputs are written under
    #[arg(long)]
    outdir: PathBuf,

    /// Scratch directory for temporary files of running jobs
    #[arg(long, default_value = "/scratch/tmp/tmp")]
    scratch: String,

    /// Threads given to multi-threaded tools
    #[arg(long, default_value_t = 1)]
    maxcores: usize,

    /// Build UMI consensus alignments from the sample sheet FASTQs
    #[arg(long)]
    umi: bool,

    /// Somatic small-variant callers to run on each pairing
    #[arg(long, value_enum)]
    callers: Vec<SomaticCaller>,

    #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
    format: ExportFormat,

    /// Export file, defaults to a file named after the format in --outdir
    #[arg(long)]
    output: Option<PathBuf>,

    /// Configure and render everything, but don't write the export
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    info!("Starting liqbio job configuration");

    let args = Args::parse();
    let settings = settings(&args)?;

    let sheet = SampleSheet::read(&args.sample_sheet).context("Loading sample sheet")?;
    let refdata = ReferenceData::read(&args.refdata).context("Loading reference data")?;
    let pipeline = Pipeline::build(sheet, refdata, settings).context("Configuring pipeline")?;

    let outdir = pipeline.settings.outdir.clone();
    let export = Export::new(args.format, args.output, Path::new(&outdir), args.dry_run);
    export.write(pipeline.jobs(), &outdir).context("Exporting jobs")?;

    info!("Finished configuring {} jobs", pipeline.jobs().len());
    Ok(())
}

fn settings(args: &Args) -> Result<PipelineSettings> {
    let outdir = args.outdir.to_str().context("Output directory isn't valid UTF-8")?;
    let mut settings = PipelineSettings::new(outdir);
    settings.scratch = args.scratch.clone();
    settings.maxcores = args.maxcores;
    settings.umi = args.umi;
    settings.callers = args.callers.clone();
    if let Some(path) = &args.job_params {
        settings.job_params = read_plain::<JobParams>(path).context("Loading job parameters")?;
    }
    Ok(settings)
}
