use log::{debug, info};

use crate::error::ConfigError;
use crate::pipeline::caller::SomaticCaller;
use crate::pipeline::Pipeline;
use crate::refdata::TargetSet;
use crate::sample::capture::UniqueCapture;
use crate::tools::variantcalling::{varscan_somatic_path, Mutect2Somatic, StrelkaSomatic, VarDict, Varscan2Somatic, Vep};

/// Registry keys of somatic caller outputs
pub mod keys {
    pub const VARDICT: &str = "vardict";
    pub const STRELKA_SNVS: &str = "strelka_snvs";
    pub const STRELKA_INDELS: &str = "strelka_indels";
    pub const MUTECT2: &str = "mutect2";
    pub const VARSCAN_SNV: &str = "varscan_snv";
    pub const VARSCAN_INDEL: &str = "varscan_indel";
}

/// Normal/cancer capture strings and BAMs used by every caller
struct PairContext {
    cancer_str: String,
    normal_str: String,
    cancer_bam: String,
    normal_bam: String,
}

impl Pipeline {
    /// Configure the selected somatic callers for a pairing and annotate the VarDict calls
    pub fn call_somatic_variants(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, target: &TargetSet) -> Result<(), ConfigError> {
        let callers = self.settings.somatic_callers();
        if callers.is_empty() {
            debug!("No somatic callers selected for {} vs {}", cancer, normal);
            return Ok(());
        }
        info!("Configuring somatic calling of {} vs {}", cancer, normal);

        let pair = PairContext {
            cancer_str: cancer.lib_capture_str(),
            normal_str: normal.lib_capture_str(),
            cancer_bam: self.registry.capture_bam(cancer)?.to_string(),
            normal_bam: self.registry.capture_bam(normal)?.to_string(),
        };
        for caller in callers {
            match caller {
                SomaticCaller::Vardict => self.configure_vardict(normal, cancer, target, &pair)?,
                SomaticCaller::Strelka => self.configure_strelka(normal, cancer, target, &pair)?,
                SomaticCaller::Mutect2 => self.configure_mutect2(normal, cancer, target, &pair)?,
                SomaticCaller::Varscan => self.configure_varscan(normal, cancer, &pair)?,
            }
        }

        if self.registry.somatic_vcf(normal, cancer, keys::VARDICT).is_ok() {
            self.configure_vep(normal, cancer, &pair)?;
        }
        Ok(())
    }

    fn configure_vardict(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, target: &TargetSet, pair: &PairContext) -> Result<(), ConfigError> {
        let params = &self.settings.job_params;
        let output = self.out(&format!("variants/vardict/{}-{}.vardict-somatic.vcf.gz", pair.cancer_str, pair.normal_str));
        let target_bed = target.targets_bed.strip_suffix(".gz").unwrap_or(&target.targets_bed).to_string();

        let vardict = VarDict {
            input_tumor: Some(pair.cancer_bam.clone()),
            input_normal: Some(pair.normal_bam.clone()),
            tumorid: Some(cancer.sample_str()),
            normalid: Some(normal.sample_str()),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            reference_dict: Some(self.refdata.reference_dict.clone()),
            target_bed: Some(target_bed),
            blacklist_bed: target.blacklist_bed.clone(),
            min_alt_frac: params.vardict_min_alt_frac,
            min_num_reads: params.vardict_min_num_reads,
            output: Some(output.clone()),
            jobname: format!("vardict/{}-{}", pair.cancer_str, pair.normal_str),
        };
        self.add(&vardict)?;
        self.registry.set_somatic_vcf(normal, cancer, keys::VARDICT, &output)?;
        Ok(())
    }

    fn configure_strelka(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, target: &TargetSet, pair: &PairContext) -> Result<(), ConfigError> {
        let output_dir = self.out(&format!("variants/{}-{}-strelka-somatic", pair.cancer_str, pair.normal_str));
        let snvs = format!("{output_dir}/results/variants/somatic.passed.snvs.vcf.gz");
        let indels = format!("{output_dir}/results/variants/somatic.passed.indels.vcf.gz");

        let strelka = StrelkaSomatic {
            input_tumor: Some(pair.cancer_bam.clone()),
            input_normal: Some(pair.normal_bam.clone()),
            input_indel_candidates: Some(self.registry.manta_dir(normal, cancer)?.to_string()),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            target_bed: Some(target.targets_bed.clone()),
            output_dir: Some(output_dir),
            output_snvs_vcf: Some(snvs.clone()),
            output_indels_vcf: Some(indels.clone()),
            threads: self.threads(),
            jobname: format!("strelka-somatic/{}-{}", pair.cancer_str, pair.normal_str),
        };
        self.add(&strelka)?;
        self.registry.set_somatic_vcf(normal, cancer, keys::STRELKA_SNVS, &snvs)?;
        self.registry.set_somatic_vcf(normal, cancer, keys::STRELKA_INDELS, &indels)?;
        Ok(())
    }

    fn configure_mutect2(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, target: &TargetSet, pair: &PairContext) -> Result<(), ConfigError> {
        let exac = self.refdata.require(&self.refdata.exac, "exac")?.to_string();
        let interval_list = self
            .refdata
            .require(&target.targets_interval_list, "targets-interval_list-slopped20")?
            .to_string();
        let prefix = self.out(&format!("variants/mutect/{}-{}", pair.cancer_str, pair.normal_str));
        let output_filtered = format!("{prefix}-gatk-mutect-somatic-filtered.vcf.gz");

        let mutect = Mutect2Somatic {
            input_tumor: Some(pair.cancer_bam.clone()),
            input_normal: Some(pair.normal_bam.clone()),
            tumorid: Some(cancer.sample_str()),
            normalid: Some(normal.sample_str()),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            interval_list: Some(interval_list),
            exac: Some(exac),
            bamout: Some(format!("{prefix}-mutect.bam")),
            output: Some(format!("{prefix}-gatk-mutect-somatic.vcf.gz")),
            tumor_pileup_summaries: Some(format!("{prefix}-mutect-tumor-pileupsummary-table")),
            tumor_contamination: Some(format!("{prefix}-mutect-tumor-contamination-table")),
            output_filtered: Some(output_filtered.clone()),
            jobname: format!("mutect2-somatic/{}-{}", pair.cancer_str, pair.normal_str),
        };
        self.add(&mutect)?;
        self.registry.set_somatic_vcf(normal, cancer, keys::MUTECT2, &output_filtered)?;
        Ok(())
    }

    fn configure_varscan(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, pair: &PairContext) -> Result<(), ConfigError> {
        // pileups are named per pairing; a normal shared by two cancers would otherwise collide
        let prefix = self.out(&format!("variants/varscan/{}-{}", pair.normal_str, pair.cancer_str));
        let output_snv = format!("{prefix}-varscan.snp.vcf");
        let output_indel = format!("{prefix}-varscan.indel.vcf");

        let varscan = Varscan2Somatic {
            input_tumor: Some(pair.cancer_bam.clone()),
            input_normal: Some(pair.normal_bam.clone()),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            normal_pileup: Some(format!("{prefix}-normal.pileup")),
            tumor_pileup: Some(format!("{prefix}-tumor.pileup")),
            output_snv: Some(output_snv.clone()),
            output_indel: Some(output_indel.clone()),
            jobname: format!("varscan-somatic/{}-{}", pair.cancer_str, pair.normal_str),
        };
        self.add(&varscan)?;
        self.registry.set_somatic_vcf(normal, cancer, keys::VARSCAN_SNV, &varscan_somatic_path(&output_snv))?;
        self.registry.set_somatic_vcf(normal, cancer, keys::VARSCAN_INDEL, &varscan_somatic_path(&output_indel))?;
        Ok(())
    }

    fn configure_vep(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, pair: &PairContext) -> Result<(), ConfigError> {
        let input_vcf = self.registry.somatic_vcf(normal, cancer, keys::VARDICT)?.to_string();
        let vep_dir = self.refdata.require(&self.refdata.vep_dir, "vep_dir")?.to_string();
        let output_vcf = self.out(&format!("variants/{}-{}.vardict-somatic.vep.vcf.gz", pair.cancer_str, pair.normal_str));

        let vep = Vep {
            input_vcf: Some(input_vcf),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            vep_dir: Some(vep_dir),
            additional_options: self.settings.job_params.vep_additional_options.clone(),
            output_vcf: Some(output_vcf.clone()),
            threads: self.threads(),
            jobname: format!("vep/{}-{}", pair.cancer_str, pair.normal_str),
        };
        self.add(&vep)?;
        self.registry.set_vepped_vcf(normal, cancer, &output_vcf)?;
        Ok(())
    }
}
