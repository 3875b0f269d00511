use serde::{Deserialize, Serialize};

use crate::pipeline::caller::SomaticCaller;

/// Tool parameters that can be overridden from a JSON file
///
/// Keys are kebab-case (`vardict-min-alt-frac`); anything missing keeps its default.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct JobParams {
    pub vardict_min_alt_frac: f64,
    pub vardict_min_num_reads: Option<u32>,
    pub vep_additional_options: String,
    pub purecn_genome: String,
    pub umi_read_structure: String,
}

impl Default for JobParams {
    fn default() -> Self {
        JobParams {
            vardict_min_alt_frac: 0.01,
            vardict_min_num_reads: None,
            vep_additional_options: " --pick --filter_common ".to_string(),
            purecn_genome: "hg19".to_string(),
            umi_read_structure: "3M2S+T".to_string(),
        }
    }
}

/// Everything that shapes the job graph apart from the sample sheet and reference data
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub outdir: String,
    pub scratch: String,
    /// Thread hint passed to multi-threaded tools
    pub maxcores: usize,
    pub umi: bool,
    pub callers: Vec<SomaticCaller>,
    pub job_params: JobParams,
}

impl PipelineSettings {
    pub fn new(outdir: &str) -> PipelineSettings {
        PipelineSettings {
            outdir: outdir.trim_end_matches('/').to_string(),
            scratch: "/scratch/tmp/tmp".to_string(),
            maxcores: 1,
            umi: false,
            callers: vec![],
            job_params: JobParams::default(),
        }
    }

    /// Selected callers in a fixed order, each once
    pub fn somatic_callers(&self) -> Vec<SomaticCaller> {
        let mut callers = self.callers.clone();
        callers.sort();
        callers.dedup();
        callers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_job_params_keep_defaults() {
        let params: JobParams = serde_json::from_str(r#"{"vardict-min-num-reads": 4}"#).unwrap();
        assert_eq!(params.vardict_min_num_reads, Some(4));
        assert_eq!(params.vardict_min_alt_frac, 0.01);
        assert_eq!(params.vep_additional_options.trim(), "--pick --filter_common");
    }

    #[test]
    fn callers_are_ordered_and_unique() {
        let mut settings = PipelineSettings::new("/out/");
        settings.callers = vec![SomaticCaller::Strelka, SomaticCaller::Vardict, SomaticCaller::Strelka];
        assert_eq!(settings.somatic_callers(), vec![SomaticCaller::Vardict, SomaticCaller::Strelka]);
        assert_eq!(settings.outdir, "/out");
    }
}
