use log::{debug, info};

use crate::error::ConfigError;
use crate::pipeline::somatic::keys;
use crate::pipeline::Pipeline;
use crate::refdata::TargetSet;
use crate::registry::{RegistryError, SvEventType, SvOutput};
use crate::sample::capture::{SampleRole, UniqueCapture};
use crate::tools::purity::{LiqbioCnaPlot, PureCn};
use crate::tools::structural::{MantaSomaticSv, Svcaller};

impl Pipeline {
    /// SV calling on every capture, then the somatic analyses of every normal/cancer pairing
    pub fn configure_liqbio_analyses(&mut self) -> Result<(), ConfigError> {
        info!("Configuring liqbio analyses");
        let captures: Vec<UniqueCapture> = self.sampledata.captures.iter().map(|e| e.capture.clone()).collect();
        for capture in &captures {
            self.configure_single_capture_analysis(capture)?;
        }

        for (normal, cancer) in self.sampledata.pairings() {
            self.configure_pairing_analysis(&normal, &cancer)?;
        }
        Ok(())
    }

    /// One svcaller job per event type, registered under (capture, event type)
    pub fn configure_single_capture_analysis(&mut self, capture: &UniqueCapture) -> Result<(), ConfigError> {
        let input_bam = self.registry.capture_bam(capture)?.to_string();
        let sample_str = capture.lib_capture_str();

        for event_type in SvEventType::ALL {
            let output = SvOutput {
                bam: self.out(&format!("svs/{sample_str}-{event_type}.bam")),
                gtf: self.out(&format!("svs/{sample_str}-{event_type}.gtf")),
            };
            let svcaller = Svcaller {
                input_bam: Some(input_bam.clone()),
                event_type: Some(event_type),
                reference_sequence: Some(self.refdata.reference_genome.clone()),
                output_bam: Some(output.bam.clone()),
                output_gtf: Some(output.gtf.clone()),
                scratch: self.settings.scratch.clone(),
                jobname: format!("svcaller/{sample_str}-{event_type}"),
            };
            self.add(&svcaller)?;
            self.registry.set_capture_svs(capture, event_type, output)?;
        }
        Ok(())
    }

    /// Manta, the selected somatic callers and, for panels with PureCN targets, purity and
    /// copy-number analyses
    pub fn configure_pairing_analysis(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<(), ConfigError> {
        if normal.role() != SampleRole::Normal || cancer.role() != SampleRole::Cancer || !normal.pairs_with(cancer) {
            return Err(ConfigError::InvalidPairing { normal: normal.to_string(), cancer: cancer.to_string() });
        }
        let target = self.refdata.target_set(&cancer.capture_kit)?.clone();
        self.registry.register_pair(normal, cancer)?;

        self.configure_manta(normal, cancer, &target)?;
        self.call_somatic_variants(normal, cancer, &target)?;

        if target.purity_eligible() {
            self.configure_purecn(normal, cancer, &target)?;
        } else {
            debug!("No PureCN targets for capture kit {}, skipping purity estimation", cancer.capture_kit);
        }
        self.configure_liqbio_cna(normal, cancer)
    }

    pub fn configure_manta(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, target: &TargetSet) -> Result<(), ConfigError> {
        let cancer_str = cancer.lib_capture_str();
        let normal_str = normal.lib_capture_str();
        let output_dir = self.out(&format!("variants/{cancer_str}-{normal_str}-manta-somatic"));

        let manta = MantaSomaticSv {
            input_normal: Some(self.registry.capture_bam(normal)?.to_string()),
            input_tumor: Some(self.registry.capture_bam(cancer)?.to_string()),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            target_bed: Some(target.targets_bed.clone()),
            output_dir: Some(output_dir.clone()),
            threads: self.threads(),
            jobname: format!("manta-somatic/{cancer_str}-{normal_str}"),
        };
        self.add(&manta)?;
        self.registry.set_manta_dir(normal, cancer, &output_dir)?;
        Ok(())
    }

    pub fn configure_purecn(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, target: &TargetSet) -> Result<(), ConfigError> {
        let cancer_str = cancer.lib_capture_str();
        let normal_str = normal.lib_capture_str();

        let purecn = PureCn {
            input_tumor: Some(self.registry.capture_bam(cancer)?.to_string()),
            input_normal: Some(self.registry.capture_bam(normal)?.to_string()),
            // allelic evidence is optional; use VarDict calls when that caller ran
            input_vcf: self.registry.somatic_vcf(normal, cancer, keys::VARDICT).ok().map(str::to_string),
            tumorid: Some(cancer_str.clone()),
            reference_sequence: Some(self.refdata.reference_genome.clone()),
            intervals: target.purecn_targets.clone(),
            genome: self.settings.job_params.purecn_genome.clone(),
            output_dir: Some(self.out(&format!("purecn/{cancer_str}-{normal_str}"))),
            threads: self.threads(),
            jobname: format!("purecn/{cancer_str}-{normal_str}"),
        };
        self.add(&purecn)?;
        if let Some(outputs) = purecn.result_files() {
            self.registry.set_purecn(normal, cancer, outputs)?;
        }
        Ok(())
    }

    /// Copy-number plot; skipped when purity estimation wasn't configured for the pairing
    pub fn configure_liqbio_cna(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<(), ConfigError> {
        let purecn = match self.registry.purecn(normal, cancer) {
            Ok(outputs) => outputs.clone(),
            Err(RegistryError::NotConfigured { .. }) => {
                debug!("No purity estimates for {} vs {}, skipping copy-number plot", cancer, normal);
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };
        let sv_gtfs = |capture: &UniqueCapture| -> Result<Vec<String>, RegistryError> {
            SvEventType::ALL
                .iter()
                .map(|event| self.registry.capture_svs(capture, *event).map(|sv| sv.gtf.clone()))
                .collect()
        };
        let tumor_svs = sv_gtfs(cancer)?;
        let normal_svs = sv_gtfs(normal)?;

        let normal_str = normal.lib_capture_str();
        let cancer_str = cancer.lib_capture_str();
        let plot = LiqbioCnaPlot {
            input_purecn: Some(purecn),
            input_svcaller_tumor: tumor_svs,
            input_svcaller_normal: normal_svs,
            input_somatic_vcf: self.registry.vepped_vcf(normal, cancer).ok().map(str::to_string),
            output_plot_png: Some(self.out(&format!("qc/{normal_str}-{cancer_str}-liqbio-cna.png"))),
            output_cna_json: Some(self.out(&format!("variants/{normal_str}-{cancer_str}-liqbio-cna.json"))),
            output_purity_json: Some(self.out(&format!("qc/{normal_str}-{cancer_str}-liqbio-purity.json"))),
            jobname: format!("liqbio-cna/{cancer_str}-{normal_str}"),
        };
        self.add(&plot)?;
        if let Some(outputs) = plot.result_files() {
            self.registry.set_cna(normal, cancer, outputs)?;
        }
        Ok(())
    }
}
