use std::path::Path;

use log::{debug, info};

use crate::error::ConfigError;
use crate::pipeline::Pipeline;
use crate::sample::sheet::SampleEntry;
use crate::tools::umi::{AlignUnmappedBam, CallDuplexConsensusReads, FastqToBam, GroupReadsByUmi, Realignment, Skewer};

fn basename(path: &str) -> &str {
    Path::new(path).file_name().and_then(|n| n.to_str()).unwrap_or(path)
}

impl Pipeline {
    /// UMI consensus alignment of every capture that lists FASTQs
    ///
    /// The realigned BAM of the second pass becomes the capture's alignment.
    pub fn configure_umi_processing(&mut self) -> Result<(), ConfigError> {
        let entries: Vec<SampleEntry> = self.sampledata.captures.iter().filter(|e| e.has_fastqs()).cloned().collect();
        info!("Configuring UMI processing of {} captures", entries.len());

        for entry in &entries {
            self.configure_umi_capture(entry)?;
        }
        Ok(())
    }

    fn configure_umi_capture(&mut self, entry: &SampleEntry) -> Result<(), ConfigError> {
        let capture = &entry.capture;
        if !entry.fastq2.is_empty() && entry.fastq1.len() != entry.fastq2.len() {
            return Err(ConfigError::UnpairedFastqs(capture.to_string(), entry.fastq1.len(), entry.fastq2.len()));
        }
        let libcap = capture.lib_capture_str();
        let dir = self.out(&format!("bams/{}", capture.capture_kit));

        let mut trimmed1 = Vec::new();
        let mut trimmed2 = Vec::new();
        for (i, fq1) in entry.fastq1.iter().enumerate() {
            let fq2 = entry.fastq2.get(i);
            // sequencers reuse file names across samples; prefix with capture and pair index
            let prefix = format!("{dir}/skewer/{libcap}-{}", i + 1);
            let skewer = Skewer {
                input1: Some(fq1.clone()),
                input2: fq2.cloned(),
                output1: Some(format!("{prefix}-{}", basename(fq1))),
                output2: fq2.map(|f| format!("{prefix}-{}", basename(f))),
                stats: Some(format!("{prefix}-skewer-stats.log")),
                scratch: self.settings.scratch.clone(),
                threads: self.threads(),
                jobname: format!("skewer/{libcap}-{}", i + 1),
            };
            self.add(&skewer)?;
            trimmed1.extend(skewer.output1);
            trimmed2.extend(skewer.output2);
        }

        let unmapped = format!("{dir}/{libcap}.unmapped.bam");
        let fastq_to_bam = FastqToBam {
            input_fastq1: trimmed1,
            input_fastq2: trimmed2,
            sample: Some(capture.sample_str()),
            library: Some(format!("{}-{}", capture.sample_str(), capture.library_kit)),
            read_structure: self.settings.job_params.umi_read_structure.clone(),
            output_bam: Some(unmapped.clone()),
            jobname: format!("fastq-to-bam/{libcap}"),
        };
        self.add(&fastq_to_bam)?;

        let realigned = self.align_and_realign(&dir, &libcap, &unmapped, "1")?;

        let grouped = format!("{dir}/{libcap}.grouped.bam");
        let group = GroupReadsByUmi {
            input_bam: Some(realigned),
            output_histogram: Some(format!("{grouped}.fs.txt")),
            output_bam: Some(grouped.clone()),
            jobname: format!("group-reads-by-umi/{libcap}"),
        };
        self.add(&group)?;

        let consensus = format!("{dir}/{libcap}.consensus.bam");
        let duplex = CallDuplexConsensusReads {
            input_bam: Some(grouped),
            output_bam: Some(consensus.clone()),
            jobname: format!("call-duplex-consensus-reads/{libcap}"),
        };
        self.add(&duplex)?;

        let final_bam = self.align_and_realign(&dir, &libcap, &consensus, "2")?;
        debug!("Consensus alignment of {} is {}", capture, final_bam);
        self.registry.register_capture(capture, &final_bam)?;
        Ok(())
    }

    /// Align an unmapped BAM and realign around known indels; returns the realigned BAM
    fn align_and_realign(&mut self, dir: &str, libcap: &str, unmapped: &str, pass: &str) -> Result<String, ConfigError> {
        let known1 = self.refdata.require(&self.refdata.known_indels_1kg, "1KG")?.to_string();
        let known2 = self
            .refdata
            .require(&self.refdata.known_indels_mills, "Mills_and_1KG_gold_standard")?
            .to_string();

        let mapped = format!("{dir}/{libcap}.mapped-{pass}.bam");
        let align = AlignUnmappedBam {
            input_bam: Some(unmapped.to_string()),
            reference_genome: Some(self.refdata.reference_genome.clone()),
            output_bam: Some(mapped.clone()),
            threads: self.threads(),
            jobname: format!("alignment-of-unmapped-bam-{pass}/{libcap}"),
        };
        self.add(&align)?;

        let realigned = format!("{dir}/{libcap}.realigned-{pass}.bam");
        let realign = Realignment {
            input_bam: Some(mapped),
            reference_genome: Some(self.refdata.reference_genome.clone()),
            known_indel1: Some(known1),
            known_indel2: Some(known2),
            target_intervals: Some(format!("{dir}/{libcap}.realigned-{pass}.intervals")),
            output_bam: Some(realigned.clone()),
            jobname: format!("realignment-{pass}/{libcap}"),
        };
        self.add(&realign)?;
        Ok(realigned)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::ConfigError;
    use crate::pipeline::settings::PipelineSettings;
    use crate::pipeline::Pipeline;
    use crate::refdata::refdata;
    use crate::sample::capture::capture;
    use crate::sample::sheet::{entry, SampleEntry, SampleSheet};

    fn umi_settings() -> PipelineSettings {
        let mut settings = PipelineSettings::new("/out");
        settings.umi = true;
        settings
    }

    fn fastq_entry(sample_type: &str, sample_id: &str, lanes: usize) -> SampleEntry {
        let c = capture("P-1", sample_type, sample_id, "CS1");
        let libcap = c.lib_capture_str();
        SampleEntry {
            capture: c,
            bam: None,
            fastq1: (1..=lanes).map(|l| format!("/data/fq/{libcap}-L{l}_1.fq.gz")).collect(),
            fastq2: (1..=lanes).map(|l| format!("/data/fq/{libcap}-L{l}_2.fq.gz")).collect(),
        }
    }

    #[test]
    fn consensus_alignment_replaces_capture_bam() {
        let sheet = SampleSheet::new(vec![fastq_entry("CFDNA", "02", 2), entry(capture("P-1", "N", "01", "CS1"))]).unwrap();
        let pipeline = Pipeline::build(sheet, refdata(&[("CS1", "progression", false)]), umi_settings()).unwrap();

        let names: Vec<&str> = pipeline.jobs().iter().map(|j| j.name.split('/').next().unwrap()).collect();
        assert_eq!(
            names[..9],
            [
                "skewer",
                "skewer",
                "fastq-to-bam",
                "alignment-of-unmapped-bam-1",
                "realignment-1",
                "group-reads-by-umi",
                "call-duplex-consensus-reads",
                "alignment-of-unmapped-bam-2",
                "realignment-2",
            ]
        );

        let cancer = capture("P-1", "CFDNA", "02", "CS1");
        let normal = capture("P-1", "N", "01", "CS1");
        let registry = pipeline.registry();
        assert_eq!(
            registry.capture_bam(&cancer).unwrap(),
            format!("/out/bams/CS1/{}.realigned-2.bam", cancer.lib_capture_str())
        );
        assert_eq!(registry.capture_bam(&normal).unwrap(), format!("/data/bams/{}.bam", normal.lib_capture_str()));

        let fastq_to_bam = &pipeline.jobs()[2];
        assert!(fastq_to_bam.command.contains("--input <(cat "));
        assert_eq!(fastq_to_bam.inputs.len(), 4);
    }

    #[test]
    fn umi_disabled_ignores_fastqs() {
        let mut e = fastq_entry("N", "01", 1);
        e.bam = Some("/data/n.bam".to_string());
        let sheet = SampleSheet::new(vec![e.clone()]).unwrap();
        let pipeline = Pipeline::build(sheet, refdata(&[("CS1", "progression", false)]), PipelineSettings::new("/out")).unwrap();
        assert!(pipeline.jobs().iter().all(|j| j.name.starts_with("svcaller/")));
        assert_eq!(pipeline.registry().capture_bam(&e.capture).unwrap(), "/data/n.bam");
    }

    #[test]
    fn captures_may_share_fastq_file_names() {
        let with_generic_names = |sample_type: &str, sample_id: &str, capture_kit: &str| {
            let c = capture("P-1", sample_type, sample_id, capture_kit);
            SampleEntry {
                fastq1: vec![format!("/data/{sample_id}-{capture_kit}/R1.fastq.gz")],
                fastq2: vec![format!("/data/{sample_id}-{capture_kit}/R2.fastq.gz")],
                capture: c,
                bam: None,
            }
        };
        let sheet = SampleSheet::new(vec![
            with_generic_names("N", "01", "CS1"),
            with_generic_names("CFDNA", "02", "CS1"),
            with_generic_names("N", "01", "AL1"),
        ])
        .unwrap();
        let refdata = refdata(&[("CS1", "progression", false), ("AL1", "alascca", false)]);
        let pipeline = Pipeline::build(sheet, refdata, umi_settings()).unwrap();

        let skewers: Vec<&str> = pipeline
            .jobs()
            .iter()
            .filter(|j| j.name.starts_with("skewer/"))
            .map(|j| j.name.as_str())
            .collect();
        assert_eq!(
            skewers,
            vec!["skewer/LB-P-1-N-01-TD1-CS1-1", "skewer/LB-P-1-CFDNA-02-TD1-CS1-1", "skewer/LB-P-1-N-01-TD1-AL1-1"]
        );
        let normal = pipeline.jobs().iter().find(|j| j.name == "skewer/LB-P-1-N-01-TD1-CS1-1").unwrap();
        assert_eq!(normal.outputs[0], "/out/bams/CS1/skewer/LB-P-1-N-01-TD1-CS1-1-R1.fastq.gz");
    }

    #[test]
    fn unpaired_fastq_lists_are_rejected() {
        let mut e = fastq_entry("N", "01", 2);
        e.fastq2.pop();
        let sheet = SampleSheet::new(vec![e]).unwrap();
        let result = Pipeline::build(sheet, refdata(&[("CS1", "progression", false)]), umi_settings());
        assert!(matches!(result, Err(ConfigError::UnpairedFastqs(_, 2, 1))));
    }

    #[test]
    fn realignment_needs_known_indels() {
        let mut refdata = refdata(&[("CS1", "progression", false)]);
        refdata.known_indels_mills = None;
        let sheet = SampleSheet::new(vec![fastq_entry("N", "01", 1)]).unwrap();
        let result = Pipeline::build(sheet, refdata, umi_settings());
        assert!(matches!(result, Err(ConfigError::MissingReference("Mills_and_1KG_gold_standard"))));
    }
}
