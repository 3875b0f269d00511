//! Build the liquid biopsy job graph
//!
//! [Pipeline] is the builder context: it owns the job list, the result registry and the set of
//! files that exist before any job runs. Stages are `impl Pipeline` blocks in the submodules and
//! run in a fixed order, so the same inputs always produce the same graph.

/// Somatic callers selectable on the command line
pub mod caller;

/// Pipeline settings and overridable tool parameters
pub mod settings;

/// UMI consensus processing of FASTQ input
pub mod umi;

/// Per-capture SV calling and per-pairing SV, purity and copy-number analyses
pub mod liqbio;

/// Somatic small-variant calling and annotation per pairing
pub mod somatic;

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use crate::error::ConfigError;
use crate::job::{ConfiguredJob, Job};
use crate::refdata::ReferenceData;
use crate::registry::ResultRegistry;
use crate::sample::sheet::SampleSheet;
use crate::pipeline::settings::PipelineSettings;

pub struct Pipeline {
    pub sampledata: SampleSheet,
    pub refdata: ReferenceData,
    pub settings: PipelineSettings,
    jobs: Vec<ConfiguredJob>,
    registry: ResultRegistry,
    static_paths: HashSet<String>,
    /// Declared output path to the name of the job declaring it
    declared: HashMap<String, String>,
    names: HashSet<String>,
}

impl Pipeline {
    pub fn new(sampledata: SampleSheet, refdata: ReferenceData, settings: PipelineSettings) -> Pipeline {
        let static_paths: HashSet<String> =
            sampledata.static_paths().into_iter().chain(refdata.static_paths()).collect();
        Pipeline {
            sampledata,
            refdata,
            settings,
            jobs: Vec::new(),
            registry: ResultRegistry::new(),
            static_paths,
            declared: HashMap::new(),
            names: HashSet::new(),
        }
    }

    /// Configure every enabled stage and return the finished graph
    pub fn build(sampledata: SampleSheet, refdata: ReferenceData, settings: PipelineSettings) -> Result<Pipeline, ConfigError> {
        let mut pipeline = Pipeline::new(sampledata, refdata, settings);
        info!("Configuring pipeline in {}", pipeline.settings.outdir);

        if pipeline.settings.umi {
            pipeline.configure_umi_processing()?;
        }
        pipeline.register_static_alignments()?;
        pipeline.configure_liqbio_analyses()?;

        info!("Configured {} jobs", pipeline.jobs.len());
        Ok(pipeline)
    }

    /// Register sample sheet BAMs for every capture that no earlier stage aligned
    pub fn register_static_alignments(&mut self) -> Result<(), ConfigError> {
        for entry in &self.sampledata.captures {
            if self.registry.capture(&entry.capture).is_ok() {
                continue;
            }
            match &entry.bam {
                Some(bam) => {
                    debug!("Using existing alignment {} for {}", bam, entry.capture);
                    self.registry.register_capture(&entry.capture, bam)?;
                }
                None => return Err(ConfigError::NoAlignment(entry.capture.to_string())),
            }
        }
        Ok(())
    }

    /// Render a job's command and append it to the graph
    ///
    /// Fails when a required parameter is unset, when the name or an output was already used, or
    /// when an input is neither a static file nor an earlier job's output.
    pub fn add(&mut self, job: &dyn Job) -> Result<(), ConfigError> {
        let configured = ConfiguredJob::from_job(job)?;

        if self.names.contains(&configured.name) {
            return Err(ConfigError::DuplicateJobName(configured.name));
        }
        for input in &configured.inputs {
            if !self.static_paths.contains(input) && !self.declared.contains_key(input) {
                return Err(ConfigError::DanglingInput { path: input.clone(), job: configured.name.clone() });
            }
        }
        for output in &configured.outputs {
            if let Some(first) = self.declared.get(output) {
                return Err(ConfigError::DuplicateOutput {
                    path: output.clone(),
                    job: configured.name.clone(),
                    first: first.clone(),
                });
            }
        }
        for output in &configured.outputs {
            self.declared.insert(output.clone(), configured.name.clone());
        }
        self.names.insert(configured.name.clone());

        debug!("Adding job {}", configured.name);
        self.jobs.push(configured);
        Ok(())
    }

    pub fn jobs(&self) -> &[ConfiguredJob] {
        &self.jobs
    }

    pub fn into_jobs(self) -> Vec<ConfiguredJob> {
        self.jobs
    }

    pub fn registry(&self) -> &ResultRegistry {
        &self.registry
    }

    /// Output paths of all jobs, in configuration order
    pub fn output_paths(&self) -> Vec<String> {
        self.jobs.iter().flat_map(|j| j.outputs.iter().cloned()).collect()
    }

    /// `<outdir>/<relative>`
    fn out(&self, relative: &str) -> String {
        format!("{}/{}", self.settings.outdir, relative)
    }

    fn threads(&self) -> usize {
        self.settings.maxcores.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refdata::refdata;
    use crate::sample::capture::capture;
    use crate::sample::sheet::{entry, SampleEntry};
    use crate::tools::structural::Svcaller;

    fn pipeline() -> Pipeline {
        let sheet = SampleSheet::new(vec![entry(capture("P-1", "N", "01", "CS1"))]).unwrap();
        Pipeline::new(sheet, refdata(&[("CS1", "progression", false)]), PipelineSettings::new("/out"))
    }

    fn svcaller(input: &str, output: &str) -> Svcaller {
        Svcaller {
            input_bam: Some(input.to_string()),
            event_type: Some(crate::registry::SvEventType::Del),
            reference_sequence: Some("/ref/genome.fasta".to_string()),
            output_bam: Some(format!("{output}.bam")),
            output_gtf: Some(format!("{output}.gtf")),
            scratch: "/scratch".to_string(),
            jobname: format!("svcaller/{output}"),
        }
    }

    #[test]
    fn rejects_dangling_inputs() {
        let mut pipeline = pipeline();
        let err = pipeline.add(&svcaller("/nowhere/x.bam", "/out/svs/x")).unwrap_err();
        assert!(matches!(err, ConfigError::DanglingInput { .. }));
        assert!(pipeline.jobs().is_empty());
    }

    #[test]
    fn accepts_upstream_outputs_as_inputs() {
        let mut pipeline = pipeline();
        pipeline.add(&svcaller("/data/bams/LB-P-1-N-01-TD1-CS1.bam", "/out/svs/a")).unwrap();
        pipeline.add(&svcaller("/out/svs/a.bam", "/out/svs/b")).unwrap();
        assert_eq!(pipeline.output_paths().len(), 4);
    }

    #[test]
    fn rejects_duplicate_outputs() {
        let mut pipeline = pipeline();
        let job = svcaller("/data/bams/LB-P-1-N-01-TD1-CS1.bam", "/out/svs/a");
        pipeline.add(&job).unwrap();
        let err = pipeline.add(&job).unwrap_err();
        match err {
            ConfigError::DuplicateOutput { first, .. } => assert_eq!(first, "svcaller//out/svs/a"),
            other => panic!("unexpected error {other}"),
        }
        assert_eq!(pipeline.jobs().len(), 1);
    }

    #[test]
    fn rejects_duplicate_job_names() {
        let mut pipeline = pipeline();
        pipeline.add(&svcaller("/data/bams/LB-P-1-N-01-TD1-CS1.bam", "/out/svs/a")).unwrap();
        let renamed = Svcaller {
            jobname: "svcaller//out/svs/a".to_string(),
            ..svcaller("/data/bams/LB-P-1-N-01-TD1-CS1.bam", "/out/svs/b")
        };
        let err = pipeline.add(&renamed).unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateJobName(name) if name == "svcaller//out/svs/a"));
        assert_eq!(pipeline.output_paths().len(), 2);
    }

    #[test]
    fn missing_parameter_aborts_add() {
        let mut pipeline = pipeline();
        let job = Svcaller { reference_sequence: None, ..svcaller("/data/bams/LB-P-1-N-01-TD1-CS1.bam", "/out/svs/a") };
        assert!(matches!(pipeline.add(&job), Err(ConfigError::Job(_))));
    }

    #[test]
    fn capture_without_bam_or_umi_has_no_alignment() {
        let c = capture("P-1", "N", "01", "CS1");
        let sheet = SampleSheet::new(vec![SampleEntry { capture: c, bam: None, fastq1: vec![], fastq2: vec![] }]).unwrap();
        let err = Pipeline::build(sheet, refdata(&[("CS1", "progression", false)]), PipelineSettings::new("/out"));
        assert!(matches!(err, Err(ConfigError::NoAlignment(_))));
    }
}
