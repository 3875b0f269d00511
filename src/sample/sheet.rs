use std::collections::HashSet;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::sample::capture::{SampleRole, UniqueCapture};
use crate::schema::{read_validated, InputSchema};

/// A sample sheet entry: capture identity and the files sequenced for it
///
/// `bam` is an alignment produced upstream of this pipeline. `fastq1`/`fastq2` are only read when
/// UMI processing is enabled, in which case the consensus alignment replaces `bam`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleEntry {
    #[serde(flatten)]
    pub capture: UniqueCapture,
    #[serde(default)]
    pub bam: Option<String>,
    #[serde(default)]
    pub fastq1: Vec<String>,
    #[serde(default)]
    pub fastq2: Vec<String>,
}

impl SampleEntry {
    pub fn has_fastqs(&self) -> bool {
        !self.fastq1.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SampleSheet {
    pub captures: Vec<SampleEntry>,
}

impl SampleSheet {
    pub fn read(path: &Path) -> Result<SampleSheet, ConfigError> {
        let sheet: SampleSheet = read_validated(path, InputSchema::SampleSheet)?;
        sheet.check_unique()?;
        info!("Sample sheet lists {} captures", sheet.captures.len());
        Ok(sheet)
    }

    pub fn new(captures: Vec<SampleEntry>) -> Result<SampleSheet, ConfigError> {
        let sheet = SampleSheet { captures };
        sheet.check_unique()?;
        Ok(sheet)
    }

    fn check_unique(&self) -> Result<(), ConfigError> {
        let mut seen: HashSet<&UniqueCapture> = HashSet::new();
        for entry in &self.captures {
            if !seen.insert(&entry.capture) {
                return Err(ConfigError::DuplicateCapture(entry.capture.to_string()));
            }
        }
        Ok(())
    }

    fn with_role(&self, role: SampleRole) -> impl Iterator<Item = &UniqueCapture> {
        self.captures.iter().map(|e| &e.capture).filter(move |c| c.role() == role)
    }

    /// Every normal crossed with every cancer capture, in sheet order
    ///
    /// Combinations from different patients or capture panels are dropped.
    pub fn pairings(&self) -> Vec<(UniqueCapture, UniqueCapture)> {
        let mut pairs = Vec::new();
        for normal in self.with_role(SampleRole::Normal) {
            for cancer in self.with_role(SampleRole::Cancer) {
                if normal.pairs_with(cancer) {
                    pairs.push((normal.clone(), cancer.clone()));
                } else {
                    debug!("Not pairing {} with {}: different patient or panel", normal, cancer);
                }
            }
        }
        pairs
    }

    /// Files listed in the sheet itself; these are valid job inputs without an upstream job
    pub fn static_paths(&self) -> Vec<String> {
        self.captures
            .iter()
            .flat_map(|e| e.bam.iter().chain(e.fastq1.iter()).chain(e.fastq2.iter()))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
pub(crate) fn entry(capture: UniqueCapture) -> SampleEntry {
    let bam = format!("/data/bams/{}.bam", capture.lib_capture_str());
    SampleEntry { capture, bam: Some(bam), fastq1: vec![], fastq2: vec![] }
}
