use crate::command::{chain, opt, pipe, CommandLine};
use crate::job::{paths, Job, JobError};
use crate::tools::scratch_path;

/// Adapter trimming of one FASTQ pair
///
/// skewer writes to a scratch directory first; only the trimmed reads and stats are copied out.
#[derive(Debug, Clone, Default)]
pub struct Skewer {
    pub input1: Option<String>,
    pub input2: Option<String>,
    pub output1: Option<String>,
    pub output2: Option<String>,
    pub stats: Option<String>,
    pub scratch: String,
    pub threads: usize,
    pub jobname: String,
}

impl Job for Skewer {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input1, &self.input2])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output1, &self.output2, &self.stats])
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let tmpdir = scratch_path(&self.scratch, "-skewer");
        let prefix = format!("{tmpdir}/skewer");
        let paired = self.input2.is_some();

        let trim = CommandLine::new(job, "skewer -z")
            .optional("-t", (self.threads > 0).then_some(self.threads))
            .arg("--quiet")
            .arg(format!("-o {prefix}"))
            .required("", "input1", opt(&self.input1))
            .optional("", opt(&self.input2));
        let copy1 = CommandLine::new(job, "cp")
            .arg(format!("{prefix}-trimmed-pair1.fastq.gz"))
            .required("", "output1", opt(&self.output1));
        let mut steps = vec![CommandLine::new(job, "mkdir -p").arg(&tmpdir), trim, copy1];
        if paired {
            steps.push(
                CommandLine::new(job, "cp")
                    .arg(format!("{prefix}-trimmed-pair2.fastq.gz"))
                    .required("", "output2", opt(&self.output2)),
            );
        }
        steps.push(CommandLine::new(job, "cp").arg(format!("{prefix}-trimmed.log")).required("", "stats", opt(&self.stats)));
        steps.push(CommandLine::new(job, "rm -r").arg(&tmpdir));
        chain(&steps)
    }
}

/// Convert trimmed FASTQs into an unmapped BAM carrying the UMIs as tags
#[derive(Debug, Clone, Default)]
pub struct FastqToBam {
    /// Trimmed first-mate files; several are streamed in as one
    pub input_fastq1: Vec<String>,
    pub input_fastq2: Vec<String>,
    pub sample: Option<String>,
    pub library: Option<String>,
    pub read_structure: String,
    pub output_bam: Option<String>,
    pub jobname: String,
}

impl Job for FastqToBam {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        self.input_fastq1.iter().chain(self.input_fastq2.iter()).cloned().collect()
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_bam])
    }

    fn command(&self) -> Result<String, JobError> {
        let structures = match self.input_fastq2.is_empty() {
            false => format!("{0} {0}", self.read_structure),
            true => self.read_structure.clone(),
        };
        CommandLine::new(&self.jobname, "fgbio FastqToBam")
            .required("--input", "input_fastq1", fastq_argument(&self.input_fastq1))
            .optional("", fastq_argument(&self.input_fastq2))
            .arg(format!("--read-structures {structures}"))
            .required("--sample", "sample", opt(&self.sample))
            .required("--library", "library", opt(&self.library))
            .required("--output", "output_bam", opt(&self.output_bam))
            .render()
    }
}

/// One file as is; several gzipped files concatenated on the fly
fn fastq_argument(files: &[String]) -> Option<String> {
    match files {
        [] => None,
        [single] => Some(single.clone()),
        several => Some(format!("<(cat {})", several.join(" "))),
    }
}

/// Align the reads of an unmapped BAM and merge the alignments back, keeping its tags
#[derive(Debug, Clone, Default)]
pub struct AlignUnmappedBam {
    pub input_bam: Option<String>,
    pub reference_genome: Option<String>,
    pub output_bam: Option<String>,
    pub threads: usize,
    pub jobname: String,
}

impl Job for AlignUnmappedBam {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_bam, &self.reference_genome])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_bam])
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let to_fastq = CommandLine::new(job, "picard SamToFastq")
            .required("", "input_bam", self.input_bam.as_ref().map(|b| format!("I={b}")))
            .arg("F=/dev/stdout INTERLEAVE=true");
        let align = CommandLine::new(job, "bwa mem -M -p")
            .arg(format!("-t {}", self.threads.max(1)))
            .required("", "reference_genome", opt(&self.reference_genome))
            .arg("/dev/stdin");
        let merge = CommandLine::new(job, "picard MergeBamAlignment")
            .required("", "input_bam", self.input_bam.as_ref().map(|b| format!("UNMAPPED={b}")))
            .arg("ALIGNED=/dev/stdin")
            .required("", "reference_genome", self.reference_genome.as_ref().map(|r| format!("R={r}")))
            .required("", "output_bam", self.output_bam.as_ref().map(|o| format!("O={o}")))
            .arg("CREATE_INDEX=true MAX_GAPS=-1 ALIGNER_PROPER_PAIR_FLAGS=true");
        pipe(&[to_fastq, align, merge])
    }
}

/// GATK3 indel realignment around known indel sites
#[derive(Debug, Clone, Default)]
pub struct Realignment {
    pub input_bam: Option<String>,
    pub reference_genome: Option<String>,
    pub known_indel1: Option<String>,
    pub known_indel2: Option<String>,
    pub target_intervals: Option<String>,
    pub output_bam: Option<String>,
    pub jobname: String,
}

impl Job for Realignment {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_bam, &self.reference_genome, &self.known_indel1, &self.known_indel2])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.target_intervals, &self.output_bam])
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let known = |cmd: CommandLine| {
            cmd.required("-known", "known_indel1", opt(&self.known_indel1))
                .required("-known", "known_indel2", opt(&self.known_indel2))
        };
        let targets = CommandLine::new(job, "gatk3 -T RealignerTargetCreator")
            .required("-R", "reference_genome", opt(&self.reference_genome))
            .required("-I", "input_bam", opt(&self.input_bam));
        let targets = known(targets).required("-o", "target_intervals", opt(&self.target_intervals));
        let realign = CommandLine::new(job, "gatk3 -T IndelRealigner")
            .required("-R", "reference_genome", opt(&self.reference_genome))
            .required("-I", "input_bam", opt(&self.input_bam))
            .required("-targetIntervals", "target_intervals", opt(&self.target_intervals));
        let realign = known(realign).required("-o", "output_bam", opt(&self.output_bam));
        chain(&[targets, realign])
    }
}

/// Group reads into UMI families
#[derive(Debug, Clone, Default)]
pub struct GroupReadsByUmi {
    pub input_bam: Option<String>,
    pub output_histogram: Option<String>,
    pub output_bam: Option<String>,
    pub jobname: String,
}

impl Job for GroupReadsByUmi {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_bam])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_histogram, &self.output_bam])
    }

    fn command(&self) -> Result<String, JobError> {
        CommandLine::new(&self.jobname, "fgbio GroupReadsByUmi --strategy paired --edits 1 --min-map-q 20")
            .required("--input", "input_bam", opt(&self.input_bam))
            .required("--family-size-histogram", "output_histogram", opt(&self.output_histogram))
            .required("--output", "output_bam", opt(&self.output_bam))
            .render()
    }
}

/// Collapse UMI families into duplex consensus reads (unmapped)
#[derive(Debug, Clone, Default)]
pub struct CallDuplexConsensusReads {
    pub input_bam: Option<String>,
    pub output_bam: Option<String>,
    pub jobname: String,
}

impl Job for CallDuplexConsensusReads {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_bam])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_bam])
    }

    fn command(&self) -> Result<String, JobError> {
        CommandLine::new(&self.jobname, "fgbio CallDuplexConsensusReads")
            .arg("--error-rate-pre-umi 45 --error-rate-post-umi 30 --min-input-base-quality 30")
            .required("--input", "input_bam", opt(&self.input_bam))
            .required("--output", "output_bam", opt(&self.output_bam))
            .render()
    }
}
