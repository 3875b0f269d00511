use crate::command::{chain, opt, pipe, CommandLine};
use crate::job::{paths, Job, JobError};
use crate::tools::vcf::{filter_pass, fix_ambiguous, remove_duplicates, split_and_leftalign};

/// VarDict paired somatic calling, filtered down to PASS somatic records
#[derive(Debug, Clone, Default)]
pub struct VarDict {
    pub input_tumor: Option<String>,
    pub input_normal: Option<String>,
    pub tumorid: Option<String>,
    pub normalid: Option<String>,
    pub reference_sequence: Option<String>,
    pub reference_dict: Option<String>,
    /// Uncompressed target BED; VarDict can't read bgzipped regions
    pub target_bed: Option<String>,
    pub blacklist_bed: Option<String>,
    pub min_alt_frac: f64,
    pub min_num_reads: Option<u32>,
    pub output: Option<String>,
    pub jobname: String,
}

impl Job for VarDict {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[
            &self.input_tumor,
            &self.input_normal,
            &self.reference_sequence,
            &self.reference_dict,
            &self.target_bed,
            &self.blacklist_bed,
        ])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output])
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let bams = match (&self.input_tumor, &self.input_normal) {
            (Some(t), Some(n)) => Some(format!("\"{t}|{n}\"")),
            _ => None,
        };
        let ids = match (&self.tumorid, &self.normalid) {
            (Some(t), Some(n)) => Some(format!("\"{t}|{n}\"")),
            _ => None,
        };

        let mut steps = vec![
            CommandLine::new(job, "vardict-java")
                .required("-G", "reference_sequence", opt(&self.reference_sequence))
                .arg(format!("-f {}", self.min_alt_frac))
                .required("-N", "tumorid", opt(&self.tumorid))
                .optional("-r", self.min_num_reads)
                .required("-b", "input_tumor/input_normal", bams)
                .arg("-c 1 -S 2 -E 3 -g 4 -Q 10")
                .required("", "target_bed", opt(&self.target_bed)),
            CommandLine::new(job, "testsomatic.R"),
            CommandLine::new(job, "var2vcf_paired.pl -P 0.9 -m 4.25 -M")
                .arg(format!("-f {}", self.min_alt_frac))
                .required("-N", "tumorid/normalid", ids),
            CommandLine::new(job, r#"bcftools filter -e 'STATUS !~ ".*Somatic"' 2> /dev/null"#),
            fix_ambiguous(job),
            remove_duplicates(job),
            CommandLine::new(job, "vcfstreamsort -w 1000"),
        ];
        steps.extend(split_and_leftalign(job, opt(&self.reference_sequence), false));
        steps.push(CommandLine::new(job, "bcftools view --apply-filters .,PASS"));
        steps.push(
            CommandLine::new(job, "vcfsorter.pl")
                .required("", "reference_dict", opt(&self.reference_dict))
                .arg("/dev/stdin"),
        );
        if let Some(blacklist) = &self.blacklist_bed {
            steps.push(CommandLine::new(job, "bedtools intersect -header -v -a stdin").arg(format!("-b {blacklist}")));
        }
        steps.push(CommandLine::new(job, "bgzip").required(">", "output", opt(&self.output)));

        let index = CommandLine::new(job, "tabix -p vcf").required("", "output", opt(&self.output));
        Ok(format!("{} && {}", pipe(&steps)?, index.render()?))
    }
}

/// Strelka somatic small-variant workflow, seeded with Manta's candidate indels
#[derive(Debug, Clone, Default)]
pub struct StrelkaSomatic {
    pub input_tumor: Option<String>,
    pub input_normal: Option<String>,
    /// Manta run directory of the same pairing
    pub input_indel_candidates: Option<String>,
    pub reference_sequence: Option<String>,
    pub target_bed: Option<String>,
    pub output_dir: Option<String>,
    pub output_snvs_vcf: Option<String>,
    pub output_indels_vcf: Option<String>,
    pub threads: usize,
    pub jobname: String,
}

impl Job for StrelkaSomatic {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[
            &self.input_tumor,
            &self.input_normal,
            &self.input_indel_candidates,
            &self.reference_sequence,
            &self.target_bed,
        ])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_dir, &self.output_snvs_vcf, &self.output_indels_vcf])
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let dir = opt(&self.output_dir);
        let candidates = self
            .input_indel_candidates
            .as_ref()
            .map(|d| format!("{d}/results/variants/candidateSmallIndels.vcf.gz"));
        let configure = CommandLine::new(job, "configureStrelkaSomaticWorkflow.py --targeted")
            .required("--normalBam", "input_normal", opt(&self.input_normal))
            .required("--tumorBam", "input_tumor", opt(&self.input_tumor))
            .required("--ref", "reference_sequence", opt(&self.reference_sequence))
            .required("--callRegions", "target_bed", opt(&self.target_bed))
            .required("--indelCandidates", "input_indel_candidates", candidates)
            .required("--runDir", "output_dir", dir);
        let run = CommandLine::new(job, "")
            .required("", "output_dir", dir.map(|d| format!("{d}/runWorkflow.py")))
            .arg(format!("-m local -j {}", self.threads.max(1)));
        let snvs = filter_pass(
            job,
            dir.map(|d| format!("{d}/results/variants/somatic.snvs.vcf.gz")).as_deref(),
            opt(&self.output_snvs_vcf),
        );
        let indels = filter_pass(
            job,
            dir.map(|d| format!("{d}/results/variants/somatic.indels.vcf.gz")).as_deref(),
            opt(&self.output_indels_vcf),
        );
        chain(&[configure, run, snvs, indels])
    }
}

/// GATK Mutect2 with contamination estimation and call filtering
#[derive(Debug, Clone, Default)]
pub struct Mutect2Somatic {
    pub input_tumor: Option<String>,
    pub input_normal: Option<String>,
    pub tumorid: Option<String>,
    pub normalid: Option<String>,
    pub reference_sequence: Option<String>,
    pub interval_list: Option<String>,
    pub exac: Option<String>,
    pub bamout: Option<String>,
    pub output: Option<String>,
    pub tumor_pileup_summaries: Option<String>,
    pub tumor_contamination: Option<String>,
    pub output_filtered: Option<String>,
    pub jobname: String,
}

impl Job for Mutect2Somatic {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_tumor, &self.input_normal, &self.reference_sequence, &self.interval_list, &self.exac])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[
            &self.bamout,
            &self.output,
            &self.tumor_pileup_summaries,
            &self.tumor_contamination,
            &self.output_filtered,
        ])
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let mutect = CommandLine::new(job, "gatk --java-options '-Xmx10g' Mutect2")
            .required("-R", "reference_sequence", opt(&self.reference_sequence))
            .required("-I", "input_tumor", opt(&self.input_tumor))
            .required("-I", "input_normal", opt(&self.input_normal))
            .required("-tumor", "tumorid", opt(&self.tumorid))
            .required("-normal", "normalid", opt(&self.normalid))
            .required("-L", "interval_list", opt(&self.interval_list))
            .arg("--disable-read-filter MateOnSameContigOrNoMappedMateReadFilter")
            .required("-bamout", "bamout", opt(&self.bamout))
            .required("-O", "output", opt(&self.output));
        let pileups = CommandLine::new(job, "gatk GetPileupSummaries")
            .required("-I", "input_tumor", opt(&self.input_tumor))
            .required("-V", "exac", opt(&self.exac))
            .required("-O", "tumor_pileup_summaries", opt(&self.tumor_pileup_summaries));
        let contamination = CommandLine::new(job, "gatk CalculateContamination")
            .required("-I", "tumor_pileup_summaries", opt(&self.tumor_pileup_summaries))
            .required("-O", "tumor_contamination", opt(&self.tumor_contamination));
        let filter = CommandLine::new(job, "gatk FilterMutectCalls")
            .required("-V", "output", opt(&self.output))
            .required("--contamination-table", "tumor_contamination", opt(&self.tumor_contamination))
            .required("-O", "output_filtered", opt(&self.output_filtered));
        chain(&[mutect, pileups, contamination, filter])
    }
}

/// VarScan2 somatic calling from per-sample pileups
///
/// `processSomatic` writes `<output>.Somatic.vcf` style files next to each output; those are the
/// paths registered for downstream use.
#[derive(Debug, Clone, Default)]
pub struct Varscan2Somatic {
    pub input_tumor: Option<String>,
    pub input_normal: Option<String>,
    pub reference_sequence: Option<String>,
    pub normal_pileup: Option<String>,
    pub tumor_pileup: Option<String>,
    pub output_snv: Option<String>,
    pub output_indel: Option<String>,
    pub jobname: String,
}

/// Path `processSomatic` derives from a VarScan output ending in `.vcf`
pub fn varscan_somatic_path(output: &str) -> String {
    format!("{}.Somatic.vcf", output.trim_end_matches(".vcf"))
}

impl Job for Varscan2Somatic {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_tumor, &self.input_normal, &self.reference_sequence])
    }

    fn outputs(&self) -> Vec<String> {
        let mut outputs = paths(&[&self.normal_pileup, &self.tumor_pileup, &self.output_snv, &self.output_indel]);
        for out in [&self.output_snv, &self.output_indel].into_iter().flatten() {
            outputs.push(varscan_somatic_path(out));
        }
        outputs
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let mpileup = |bam: &Option<String>, bam_name: &'static str, out: &Option<String>, out_name: &'static str| {
            CommandLine::new(job, "samtools mpileup -C50")
                .required("-f", "reference_sequence", opt(&self.reference_sequence))
                .required("", bam_name, opt(bam))
                .required(">", out_name, opt(out))
        };
        let varscan = CommandLine::new(job, "varscan somatic")
            .required("", "normal_pileup", opt(&self.normal_pileup))
            .required("", "tumor_pileup", opt(&self.tumor_pileup))
            .required("--output-snp", "output_snv", opt(&self.output_snv))
            .required("--output-indel", "output_indel", opt(&self.output_indel))
            .arg("--min-coverage 3 --min-var-freq 0.02 --p-value 0.10 --somatic-p-value 0.05 --strand-filter 0")
            .arg("--output-vcf 1");
        chain(&[
            mpileup(&self.input_normal, "input_normal", &self.normal_pileup, "normal_pileup"),
            mpileup(&self.input_tumor, "input_tumor", &self.tumor_pileup, "tumor_pileup"),
            varscan,
            CommandLine::new(job, "varscan processSomatic").required("", "output_indel", opt(&self.output_indel)),
            CommandLine::new(job, "varscan processSomatic").required("", "output_snv", opt(&self.output_snv)),
        ])
    }
}

/// Ensembl VEP annotation of a VCF
#[derive(Debug, Clone, Default)]
pub struct Vep {
    pub input_vcf: Option<String>,
    pub reference_sequence: Option<String>,
    pub vep_dir: Option<String>,
    pub additional_options: String,
    pub output_vcf: Option<String>,
    pub threads: usize,
    pub jobname: String,
}

impl Job for Vep {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_vcf, &self.reference_sequence, &self.vep_dir])
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_vcf])
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn command(&self) -> Result<String, JobError> {
        let job = self.jobname.as_str();
        let bgzip = self.output_vcf.as_deref().map_or(false, |o| o.ends_with("gz"));
        // vep rejects "--fork 1"
        let fork = (self.threads > 1).then_some(self.threads);
        let vep = CommandLine::new(job, "variant_effect_predictor.pl --vcf --output_file STDOUT")
            .arg(self.additional_options.trim())
            .required("--dir", "vep_dir", opt(&self.vep_dir))
            .required("--fasta", "reference_sequence", opt(&self.reference_sequence))
            .required("-i", "input_vcf", opt(&self.input_vcf))
            .arg("--check_existing --total_length --allele_number")
            .arg("--no_escape --no_stats --everything --offline")
            .optional("--fork", fork)
            .conditional(bgzip, "| bgzip")
            .required(">", "output_vcf", opt(&self.output_vcf));
        let index = CommandLine::new(job, "tabix -p vcf").required("", "output_vcf", opt(&self.output_vcf));
        chain(&[vep, index])
    }
}
