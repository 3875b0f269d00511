//! Outputs of configured jobs, keyed by capture or by normal/cancer pairing
//!
//! Later stages read upstream outputs from here instead of re-deriving paths. Records are created
//! once and filled in field by field as dependent jobs are configured; a field is never
//! overwritten. Reading anything that was never set is a [RegistryError::NotConfigured], which
//! surfaces stage-ordering mistakes as errors instead of defaults.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::sample::capture::UniqueCapture;

/// Structural-variant event types called per capture, in configuration order
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum SvEventType {
    Del,
    Dup,
    Inv,
    Tra,
}

impl SvEventType {
    pub const ALL: [SvEventType; 4] = [SvEventType::Del, SvEventType::Dup, SvEventType::Inv, SvEventType::Tra];
}

impl fmt::Display for SvEventType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SvEventType::Del => write!(f, "DEL"),
            SvEventType::Dup => write!(f, "DUP"),
            SvEventType::Inv => write!(f, "INV"),
            SvEventType::Tra => write!(f, "TRA"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("{field} not configured for {identity}")]
    NotConfigured { identity: String, field: String },
    #[error("{field} already registered for {identity}")]
    AlreadyRegistered { identity: String, field: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SvOutput {
    pub bam: String,
    pub gtf: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PureCnOutputs {
    pub csv: String,
    pub genes_csv: String,
    pub loh_csv: String,
    pub variants_csv: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CnaOutputs {
    pub plot_png: String,
    pub cna_json: String,
    pub purity_json: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CaptureResults {
    pub bam: String,
    pub svs: BTreeMap<SvEventType, SvOutput>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PairResults {
    pub manta_dir: Option<String>,
    /// Caller output key (e.g. `vardict`, `strelka_snvs`) to VCF
    pub somatic_vcfs: BTreeMap<String, String>,
    pub vepped_vcf: Option<String>,
    pub purecn: Option<PureCnOutputs>,
    pub cna: Option<CnaOutputs>,
}

type PairKey = (UniqueCapture, UniqueCapture);

#[derive(Debug, Default)]
pub struct ResultRegistry {
    captures: HashMap<UniqueCapture, CaptureResults>,
    pairs: HashMap<PairKey, PairResults>,
}

fn pair_identity(normal: &UniqueCapture, cancer: &UniqueCapture) -> String {
    format!("{cancer} vs {normal}")
}

fn not_configured(identity: String, field: &str) -> RegistryError {
    RegistryError::NotConfigured { identity, field: field.to_string() }
}

fn set_once<T>(slot: &mut Option<T>, value: T, identity: String, field: &str) -> Result<(), RegistryError> {
    match slot {
        Some(_) => Err(RegistryError::AlreadyRegistered { identity, field: field.to_string() }),
        None => {
            *slot = Some(value);
            Ok(())
        }
    }
}

impl ResultRegistry {
    pub fn new() -> ResultRegistry {
        ResultRegistry::default()
    }

    /// Create the record for a capture once its alignment is known
    pub fn register_capture(&mut self, capture: &UniqueCapture, bam: &str) -> Result<(), RegistryError> {
        if self.captures.contains_key(capture) {
            return Err(RegistryError::AlreadyRegistered { identity: capture.to_string(), field: "bam".to_string() });
        }
        let results = CaptureResults { bam: bam.to_string(), svs: BTreeMap::new() };
        self.captures.insert(capture.clone(), results);
        Ok(())
    }

    pub fn capture(&self, capture: &UniqueCapture) -> Result<&CaptureResults, RegistryError> {
        self.captures.get(capture).ok_or_else(|| not_configured(capture.to_string(), "capture"))
    }

    pub fn capture_bam(&self, capture: &UniqueCapture) -> Result<&str, RegistryError> {
        Ok(self.capture(capture)?.bam.as_str())
    }

    pub fn set_capture_svs(&mut self, capture: &UniqueCapture, event: SvEventType, output: SvOutput) -> Result<(), RegistryError> {
        let results = self.captures.get_mut(capture).ok_or_else(|| not_configured(capture.to_string(), "capture"))?;
        if results.svs.contains_key(&event) {
            return Err(RegistryError::AlreadyRegistered { identity: capture.to_string(), field: format!("svs {event}") });
        }
        results.svs.insert(event, output);
        Ok(())
    }

    pub fn capture_svs(&self, capture: &UniqueCapture, event: SvEventType) -> Result<&SvOutput, RegistryError> {
        self.capture(capture)?.svs.get(&event).ok_or_else(|| not_configured(capture.to_string(), &format!("svs {event}")))
    }

    /// Create the record for a pairing; done when its first job is configured
    pub fn register_pair(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<(), RegistryError> {
        let key = (normal.clone(), cancer.clone());
        if self.pairs.contains_key(&key) {
            return Err(RegistryError::AlreadyRegistered { identity: pair_identity(normal, cancer), field: "pairing".to_string() });
        }
        self.pairs.insert(key, PairResults::default());
        Ok(())
    }

    pub fn pair(&self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<&PairResults, RegistryError> {
        // the key has to be owned for the lookup; pairings are few
        self.pairs
            .get(&(normal.clone(), cancer.clone()))
            .ok_or_else(|| not_configured(pair_identity(normal, cancer), "pairing"))
    }

    fn pair_mut(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<&mut PairResults, RegistryError> {
        self.pairs
            .get_mut(&(normal.clone(), cancer.clone()))
            .ok_or_else(|| not_configured(pair_identity(normal, cancer), "pairing"))
    }

    pub fn set_manta_dir(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, dir: &str) -> Result<(), RegistryError> {
        let identity = pair_identity(normal, cancer);
        set_once(&mut self.pair_mut(normal, cancer)?.manta_dir, dir.to_string(), identity, "manta")
    }

    pub fn manta_dir(&self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<&str, RegistryError> {
        self.pair(normal, cancer)?.manta_dir.as_deref().ok_or_else(|| not_configured(pair_identity(normal, cancer), "manta"))
    }

    pub fn set_somatic_vcf(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, key: &str, vcf: &str) -> Result<(), RegistryError> {
        let identity = pair_identity(normal, cancer);
        let results = self.pair_mut(normal, cancer)?;
        if results.somatic_vcfs.contains_key(key) {
            return Err(RegistryError::AlreadyRegistered { identity, field: key.to_string() });
        }
        results.somatic_vcfs.insert(key.to_string(), vcf.to_string());
        Ok(())
    }

    pub fn somatic_vcf(&self, normal: &UniqueCapture, cancer: &UniqueCapture, key: &str) -> Result<&str, RegistryError> {
        self.pair(normal, cancer)?
            .somatic_vcfs
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| not_configured(pair_identity(normal, cancer), key))
    }

    pub fn set_vepped_vcf(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, vcf: &str) -> Result<(), RegistryError> {
        let identity = pair_identity(normal, cancer);
        set_once(&mut self.pair_mut(normal, cancer)?.vepped_vcf, vcf.to_string(), identity, "vepped vcf")
    }

    pub fn vepped_vcf(&self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<&str, RegistryError> {
        self.pair(normal, cancer)?.vepped_vcf.as_deref().ok_or_else(|| not_configured(pair_identity(normal, cancer), "vepped vcf"))
    }

    pub fn set_purecn(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, outputs: PureCnOutputs) -> Result<(), RegistryError> {
        let identity = pair_identity(normal, cancer);
        set_once(&mut self.pair_mut(normal, cancer)?.purecn, outputs, identity, "purecn")
    }

    pub fn purecn(&self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<&PureCnOutputs, RegistryError> {
        self.pair(normal, cancer)?.purecn.as_ref().ok_or_else(|| not_configured(pair_identity(normal, cancer), "purecn"))
    }

    pub fn set_cna(&mut self, normal: &UniqueCapture, cancer: &UniqueCapture, outputs: CnaOutputs) -> Result<(), RegistryError> {
        let identity = pair_identity(normal, cancer);
        set_once(&mut self.pair_mut(normal, cancer)?.cna, outputs, identity, "cna")
    }

    pub fn cna(&self, normal: &UniqueCapture, cancer: &UniqueCapture) -> Result<&CnaOutputs, RegistryError> {
        self.pair(normal, cancer)?.cna.as_ref().ok_or_else(|| not_configured(pair_identity(normal, cancer), "cna"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::capture::capture;

    fn sv(event: SvEventType) -> SvOutput {
        SvOutput { bam: format!("/out/svs/x-{event}.bam"), gtf: format!("/out/svs/x-{event}.gtf") }
    }

    #[test]
    fn unknown_capture_is_not_configured() {
        let registry = ResultRegistry::new();
        let err = registry.capture_bam(&capture("P-1", "N", "01", "CS1")).unwrap_err();
        assert!(matches!(err, RegistryError::NotConfigured { .. }));
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn capture_fields_are_filled_incrementally() {
        let c = capture("P-1", "N", "01", "CS1");
        let mut registry = ResultRegistry::new();
        registry.register_capture(&c, "/data/n.bam").unwrap();

        assert!(registry.capture_svs(&c, SvEventType::Del).is_err());
        registry.set_capture_svs(&c, SvEventType::Del, sv(SvEventType::Del)).unwrap();
        assert_eq!(registry.capture_svs(&c, SvEventType::Del).unwrap(), &sv(SvEventType::Del));
        assert_eq!(registry.capture_bam(&c).unwrap(), "/data/n.bam");
    }

    #[test]
    fn fields_are_written_once() {
        let c = capture("P-1", "N", "01", "CS1");
        let mut registry = ResultRegistry::new();
        registry.register_capture(&c, "/data/n.bam").unwrap();

        assert!(matches!(registry.register_capture(&c, "/data/n.bam"), Err(RegistryError::AlreadyRegistered { .. })));
        registry.set_capture_svs(&c, SvEventType::Tra, sv(SvEventType::Tra)).unwrap();
        assert!(registry.set_capture_svs(&c, SvEventType::Tra, sv(SvEventType::Tra)).is_err());
    }

    #[test]
    fn purity_lookup_before_configuration_fails() {
        let normal = capture("P-1", "N", "01", "CS1");
        let cancer = capture("P-1", "CFDNA", "02", "CS1");
        let mut registry = ResultRegistry::new();

        assert!(registry.purecn(&normal, &cancer).is_err());
        registry.register_pair(&normal, &cancer).unwrap();
        let err = registry.purecn(&normal, &cancer).unwrap_err();
        assert_eq!(
            err,
            RegistryError::NotConfigured { identity: pair_identity(&normal, &cancer), field: "purecn".to_string() }
        );

        registry.set_somatic_vcf(&normal, &cancer, "strelka_snvs", "/out/snvs.vcf.gz").unwrap();
        registry.set_somatic_vcf(&normal, &cancer, "strelka_indels", "/out/indels.vcf.gz").unwrap();
        assert_ne!(
            registry.somatic_vcf(&normal, &cancer, "strelka_snvs").unwrap(),
            registry.somatic_vcf(&normal, &cancer, "strelka_indels").unwrap()
        );
    }
}
