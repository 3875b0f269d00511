//! Reference data: genome files and per-panel target sets

use std::collections::BTreeMap;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::schema::{read_validated, InputSchema};

/// Files describing one capture panel
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TargetSet {
    #[serde(rename = "targets-bed-slopped20")]
    pub targets_bed: String,
    #[serde(rename = "targets-interval_list-slopped20", default)]
    pub targets_interval_list: Option<String>,
    #[serde(rename = "blacklist-bed", default)]
    pub blacklist_bed: Option<String>,
    /// Intervals for purity/ploidy estimation; panels without them skip PureCN
    #[serde(default)]
    pub purecn_targets: Option<String>,
}

impl TargetSet {
    pub fn purity_eligible(&self) -> bool {
        self.purecn_targets.as_deref().map_or(false, |t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ReferenceData {
    pub reference_genome: String,
    pub reference_dict: String,
    #[serde(rename = "bwaIndex", default)]
    pub bwa_index: Option<String>,
    #[serde(default)]
    pub exac: Option<String>,
    #[serde(default)]
    pub dbsnp: Option<String>,
    #[serde(default)]
    pub vep_dir: Option<String>,
    #[serde(rename = "1KG", default)]
    pub known_indels_1kg: Option<String>,
    #[serde(rename = "Mills_and_1KG_gold_standard", default)]
    pub known_indels_mills: Option<String>,
    /// Capture kit id (as it appears in the sample sheet) to target set name
    pub capture_kits: BTreeMap<String, String>,
    pub targets: BTreeMap<String, TargetSet>,
}

impl ReferenceData {
    pub fn read(path: &Path) -> Result<ReferenceData, ConfigError> {
        let refdata: ReferenceData = read_validated(path, InputSchema::ReferenceData)?;
        info!("Reference data declares {} target sets", refdata.targets.len());
        Ok(refdata)
    }

    pub fn capture_name(&self, capture_kit: &str) -> Result<&str, ConfigError> {
        self.capture_kits
            .get(capture_kit)
            .map(|s| s.as_str())
            .ok_or_else(|| ConfigError::UnknownCaptureKit(capture_kit.to_string()))
    }

    pub fn target_set(&self, capture_kit: &str) -> Result<&TargetSet, ConfigError> {
        let name = self.capture_name(capture_kit)?;
        self.targets.get(name).ok_or_else(|| ConfigError::UnknownCaptureKit(capture_kit.to_string()))
    }

    /// Look up an optional reference file that a configured step can't run without
    pub fn require<'a>(&self, value: &'a Option<String>, key: &'static str) -> Result<&'a str, ConfigError> {
        value.as_deref().ok_or(ConfigError::MissingReference(key))
    }

    /// Every path in the reference data; jobs may read these without an upstream job
    pub fn static_paths(&self) -> Vec<String> {
        let mut paths = vec![self.reference_genome.clone(), self.reference_dict.clone()];
        for file in [
            &self.bwa_index,
            &self.exac,
            &self.dbsnp,
            &self.vep_dir,
            &self.known_indels_1kg,
            &self.known_indels_mills,
        ] {
            paths.extend(file.iter().cloned());
        }
        for target in self.targets.values() {
            paths.push(target.targets_bed.clone());
            // an uncompressed copy sits next to every bgzipped target BED
            if let Some(plain) = target.targets_bed.strip_suffix(".gz") {
                paths.push(plain.to_string());
            }
            paths.extend(target.targets_interval_list.iter().cloned());
            paths.extend(target.blacklist_bed.iter().cloned());
            paths.extend(target.purecn_targets.iter().cloned());
        }
        paths
    }
}

#[cfg(test)]
pub(crate) fn refdata(panels: &[(&str, &str, bool)]) -> ReferenceData {
    let mut capture_kits = BTreeMap::new();
    let mut targets = BTreeMap::new();
    for (kit, name, purecn) in panels {
        capture_kits.insert(kit.to_string(), name.to_string());
        targets.insert(
            name.to_string(),
            TargetSet {
                targets_bed: format!("/ref/{name}.slopped20.bed.gz"),
                targets_interval_list: Some(format!("/ref/{name}.slopped20.interval_list")),
                blacklist_bed: Some(format!("/ref/{name}.blacklist.bed")),
                purecn_targets: purecn.then(|| format!("/ref/{name}.purecn.txt")),
            },
        );
    }
    ReferenceData {
        reference_genome: "/ref/genome.fasta".to_string(),
        reference_dict: "/ref/genome.dict".to_string(),
        bwa_index: Some("/ref/bwa/genome.fasta".to_string()),
        exac: Some("/ref/exac.vcf.gz".to_string()),
        dbsnp: Some("/ref/dbsnp.vcf.gz".to_string()),
        vep_dir: Some("/ref/vep".to_string()),
        known_indels_1kg: Some("/ref/1000G_phase1.indels.vcf".to_string()),
        known_indels_mills: Some("/ref/Mills_and_1000G_gold_standard.indels.vcf".to_string()),
        capture_kits,
        targets,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn maps_capture_kit_to_target_set() {
        let refdata = refdata(&[("CS1", "progression", true), ("AL1", "alascca", false)]);
        assert_eq!(refdata.capture_name("CS1").unwrap(), "progression");
        assert!(refdata.target_set("CS1").unwrap().purity_eligible());
        assert!(!refdata.target_set("AL1").unwrap().purity_eligible());
        assert!(matches!(refdata.target_set("XX"), Err(ConfigError::UnknownCaptureKit(_))));
    }

    #[test]
    fn empty_purecn_targets_are_not_eligible() {
        let target = TargetSet { purecn_targets: Some(String::new()), ..Default::default() };
        assert!(!target.purity_eligible());
    }

    #[test]
    fn reads_reference_json_with_mixed_key_styles() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "reference_genome": "/ref/genome.fasta",
                "reference_dict": "/ref/genome.dict",
                "1KG": "/ref/1kg.vcf",
                "capture_kits": {{"CS1": "progression"}},
                "targets": {{
                    "progression": {{
                        "targets-bed-slopped20": "/ref/p.bed.gz",
                        "purecn_targets": null
                    }}
                }}
            }}"#
        )
        .unwrap();

        let refdata = ReferenceData::read(file.path()).unwrap();
        assert_eq!(refdata.known_indels_1kg.as_deref(), Some("/ref/1kg.vcf"));
        assert!(!refdata.target_set("CS1").unwrap().purity_eligible());
        assert!(refdata.static_paths().contains(&"/ref/p.bed.gz".to_string()));
        assert!(matches!(refdata.require(&refdata.exac, "exac"), Err(ConfigError::MissingReference("exac"))));
    }
}
