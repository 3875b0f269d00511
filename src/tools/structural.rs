use crate::command::{chain, opt, CommandLine};
use crate::job::{paths, Job, JobError};
use crate::registry::SvEventType;
use crate::tools::scratch_path;

/// Call one type of structural-variant event in a single capture
#[derive(Debug, Clone, Default)]
pub struct Svcaller {
    pub input_bam: Option<String>,
    pub event_type: Option<SvEventType>,
    pub reference_sequence: Option<String>,
    pub output_bam: Option<String>,
    pub output_gtf: Option<String>,
    pub scratch: String,
    pub jobname: String,
}

impl Job for Svcaller {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_bam, &self.reference_sequence])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_bam, &self.output_gtf])
    }

    fn command(&self) -> Result<String, JobError> {
        CommandLine::new(&self.jobname, "svcaller run-all")
            .required("--event-type", "event_type", self.event_type)
            .required("--fasta-filename", "reference_sequence", opt(&self.reference_sequence))
            .arg("--filter-event-overlap")
            .required("--events-gtf", "output_gtf", opt(&self.output_gtf))
            .required("--events-bam", "output_bam", opt(&self.output_bam))
            .arg(format!("--tmp-dir {}", scratch_path(&self.scratch, "")))
            .required("", "input_bam", opt(&self.input_bam))
            .render()
    }
}

/// Manta somatic structural-variant calling on a normal/cancer pairing
///
/// The run directory is the declared output; Strelka reads its candidate indels from there.
#[derive(Debug, Clone, Default)]
pub struct MantaSomaticSv {
    pub input_normal: Option<String>,
    pub input_tumor: Option<String>,
    pub reference_sequence: Option<String>,
    pub target_bed: Option<String>,
    pub output_dir: Option<String>,
    pub threads: usize,
    pub jobname: String,
}

impl Job for MantaSomaticSv {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_normal, &self.input_tumor, &self.reference_sequence, &self.target_bed])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_dir])
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn command(&self) -> Result<String, JobError> {
        let configure = CommandLine::new(&self.jobname, "configManta.py --exome")
            .required("--normalBam", "input_normal", opt(&self.input_normal))
            .required("--tumorBam", "input_tumor", opt(&self.input_tumor))
            .required("--referenceFasta", "reference_sequence", opt(&self.reference_sequence))
            .required("--callRegions", "target_bed", opt(&self.target_bed))
            .required("--runDir", "output_dir", opt(&self.output_dir));
        let run = CommandLine::new(&self.jobname, "")
            .required("", "output_dir", self.output_dir.as_ref().map(|d| format!("{d}/runWorkflow.py")))
            .arg("-m local")
            .arg(format!("-j {}", self.threads.max(1)));
        chain(&[configure, run])
    }
}
