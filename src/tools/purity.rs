use crate::command::{opt, CommandLine};
use crate::job::{paths, Job, JobError};
use crate::registry::{CnaOutputs, PureCnOutputs};

/// PureCN tumor purity and ploidy estimation for a normal/cancer pairing
///
/// Outputs land in `output_dir`, named after the cancer sample id as PureCN does.
#[derive(Debug, Clone, Default)]
pub struct PureCn {
    pub input_tumor: Option<String>,
    pub input_normal: Option<String>,
    /// Somatic calls to use as allelic evidence, when a caller ran for this pairing
    pub input_vcf: Option<String>,
    pub tumorid: Option<String>,
    pub reference_sequence: Option<String>,
    pub intervals: Option<String>,
    pub genome: String,
    pub output_dir: Option<String>,
    pub threads: usize,
    pub jobname: String,
}

impl PureCn {
    /// Paths PureCN writes for this configuration, `None` until `output_dir` and `tumorid` are set
    pub fn result_files(&self) -> Option<PureCnOutputs> {
        let dir = self.output_dir.as_ref()?;
        let id = self.tumorid.as_ref()?;
        Some(PureCnOutputs {
            csv: format!("{dir}/{id}.csv"),
            genes_csv: format!("{dir}/{id}_genes.csv"),
            loh_csv: format!("{dir}/{id}_loh.csv"),
            variants_csv: format!("{dir}/{id}_variants.csv"),
        })
    }
}

impl Job for PureCn {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        paths(&[&self.input_tumor, &self.input_normal, &self.input_vcf, &self.reference_sequence, &self.intervals])
    }

    fn outputs(&self) -> Vec<String> {
        match self.result_files() {
            Some(o) => vec![o.csv, o.genes_csv, o.loh_csv, o.variants_csv],
            None => vec![],
        }
    }

    fn threads(&self) -> usize {
        self.threads
    }

    fn command(&self) -> Result<String, JobError> {
        CommandLine::new(&self.jobname, "PureCN.R")
            .required("--out", "output_dir", opt(&self.output_dir))
            .required("--tumor", "input_tumor", opt(&self.input_tumor))
            .required("--normal", "input_normal", opt(&self.input_normal))
            .required("--sampleid", "tumorid", opt(&self.tumorid))
            .required("--intervals", "intervals", opt(&self.intervals))
            .required("--fasta", "reference_sequence", opt(&self.reference_sequence))
            .optional("--vcf", opt(&self.input_vcf))
            .arg(format!("--genome {}", self.genome))
            .arg("--funsegmentation PSCBS --force --postoptimize --seed 123")
            .arg(format!("--parallel --cores {}", self.threads.max(1)))
            .render()
    }
}

/// Liquid biopsy copy-number plot combining purity, SV and (optionally) somatic variant evidence
#[derive(Debug, Clone, Default)]
pub struct LiqbioCnaPlot {
    pub input_purecn: Option<PureCnOutputs>,
    /// Event type order DEL, DUP, INV, TRA
    pub input_svcaller_tumor: Vec<String>,
    pub input_svcaller_normal: Vec<String>,
    pub input_somatic_vcf: Option<String>,
    pub output_plot_png: Option<String>,
    pub output_cna_json: Option<String>,
    pub output_purity_json: Option<String>,
    pub jobname: String,
}

static EVENT_FLAGS: [&str; 4] = ["DEL", "DUP", "INV", "TRA"];

impl LiqbioCnaPlot {
    pub fn result_files(&self) -> Option<CnaOutputs> {
        Some(CnaOutputs {
            plot_png: self.output_plot_png.clone()?,
            cna_json: self.output_cna_json.clone()?,
            purity_json: self.output_purity_json.clone()?,
        })
    }

    fn sv_arguments(&self, mut cmd: CommandLine, prefix: &str, gtfs: &[String]) -> CommandLine {
        for (i, event) in EVENT_FLAGS.iter().enumerate() {
            cmd = cmd.required(&format!("--svcaller-{prefix}-{event}"), "input_svcaller", gtfs.get(i));
        }
        cmd
    }
}

impl Job for LiqbioCnaPlot {
    fn name(&self) -> String {
        self.jobname.clone()
    }

    fn inputs(&self) -> Vec<String> {
        let mut inputs = Vec::new();
        if let Some(p) = &self.input_purecn {
            inputs.extend([p.csv.clone(), p.genes_csv.clone(), p.loh_csv.clone(), p.variants_csv.clone()]);
        }
        inputs.extend(self.input_svcaller_tumor.iter().cloned());
        inputs.extend(self.input_svcaller_normal.iter().cloned());
        inputs.extend(self.input_somatic_vcf.iter().cloned());
        inputs
    }

    fn outputs(&self) -> Vec<String> {
        paths(&[&self.output_plot_png, &self.output_cna_json, &self.output_purity_json])
    }

    fn command(&self) -> Result<String, JobError> {
        let purecn = self.input_purecn.as_ref();
        let mut cmd = CommandLine::new(&self.jobname, "liqbio-cna")
            .required("--purecn-csv", "input_purecn", purecn.map(|p| &p.csv))
            .required("--purecn-genes-csv", "input_purecn", purecn.map(|p| &p.genes_csv))
            .required("--purecn-loh-csv", "input_purecn", purecn.map(|p| &p.loh_csv))
            .required("--purecn-variants-csv", "input_purecn", purecn.map(|p| &p.variants_csv));
        cmd = self.sv_arguments(cmd, "T", &self.input_svcaller_tumor);
        cmd = self.sv_arguments(cmd, "N", &self.input_svcaller_normal);
        cmd.optional("--somatic-vcf", opt(&self.input_somatic_vcf))
            .required("--output-png", "output_plot_png", opt(&self.output_plot_png))
            .required("--output-cna-json", "output_cna_json", opt(&self.output_cna_json))
            .required("--output-purity-json", "output_purity_json", opt(&self.output_purity_json))
            .render()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn purecn() -> PureCn {
        PureCn {
            input_tumor: Some("/data/t.bam".to_string()),
            input_normal: Some("/data/n.bam".to_string()),
            input_vcf: None,
            tumorid: Some("t".to_string()),
            reference_sequence: Some("/ref/genome.fasta".to_string()),
            intervals: Some("/ref/p.purecn.txt".to_string()),
            genome: "hg19".to_string(),
            output_dir: Some("/out/purecn/t-n".to_string()),
            threads: 1,
            jobname: "purecn/t".to_string(),
        }
    }

    #[test]
    fn purecn_outputs_follow_sample_id() {
        let job = purecn();
        assert_eq!(
            job.outputs(),
            vec!["/out/purecn/t-n/t.csv", "/out/purecn/t-n/t_genes.csv", "/out/purecn/t-n/t_loh.csv", "/out/purecn/t-n/t_variants.csv"]
        );
        let cmd = job.command().unwrap();
        assert!(!cmd.contains("--vcf"));
        assert!(cmd.contains("--seed 123"));
    }

    #[test]
    fn plot_needs_all_sv_inputs() {
        let gtfs = |p: &str| EVENT_FLAGS.iter().map(|e| format!("/out/svs/{p}-{e}.gtf")).collect::<Vec<_>>();
        let plot = LiqbioCnaPlot {
            input_purecn: purecn().result_files(),
            input_svcaller_tumor: gtfs("t"),
            input_svcaller_normal: gtfs("n")[..3].to_vec(),
            input_somatic_vcf: None,
            output_plot_png: Some("/out/qc/n-t-liqbio-cna.png".to_string()),
            output_cna_json: Some("/out/variants/n-t-liqbio-cna.json".to_string()),
            output_purity_json: Some("/out/qc/n-t-liqbio-purity.json".to_string()),
            jobname: "liqbio-cna/t".to_string(),
        };
        assert!(matches!(plot.command(), Err(JobError::MissingParameter { .. })));

        let plot = LiqbioCnaPlot { input_svcaller_normal: gtfs("n"), ..plot };
        let cmd = plot.command().unwrap();
        assert!(cmd.contains("--svcaller-T-DEL /out/svs/t-DEL.gtf"));
        assert!(cmd.contains("--svcaller-N-TRA /out/svs/n-TRA.gtf"));
        assert_eq!(plot.inputs().len(), 12);
    }
}
