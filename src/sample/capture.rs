use std::fmt;

use serde::{Deserialize, Serialize};

/// Sample types sequenced from normal tissue; everything else is treated as cancer
static NORMAL_SAMPLE_TYPES: [&str; 1] = ["N"];

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SampleRole {
    Normal,
    Cancer,
}

impl fmt::Display for SampleRole {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SampleRole::Normal => write!(f, "normal"),
            SampleRole::Cancer => write!(f, "cancer"),
        }
    }
}

/// One (sample, library, capture panel) combination
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
pub struct UniqueCapture {
    pub project: String,
    /// Patient identifier
    pub sdid: String,
    pub sample_type: String,
    pub sample_id: String,
    pub library_kit: String,
    pub capture_kit: String,
}

impl UniqueCapture {
    pub fn role(&self) -> SampleRole {
        match NORMAL_SAMPLE_TYPES.contains(&self.sample_type.as_str()) {
            true => SampleRole::Normal,
            false => SampleRole::Cancer,
        }
    }

    /// `<project>-<sdid>-<type>-<sample_id>`, used as the read group sample name
    pub fn sample_str(&self) -> String {
        format!("{}-{}-{}-{}", self.project, self.sdid, self.sample_type, self.sample_id)
    }

    /// Sample string extended with library and capture kit; the prefix of every per-capture output
    pub fn lib_capture_str(&self) -> String {
        format!("{}-{}-{}", self.sample_str(), self.library_kit, self.capture_kit)
    }

    /// Two captures can be compared somatically when they come from the same patient and panel
    pub fn pairs_with(&self, other: &UniqueCapture) -> bool {
        self.project == other.project && self.sdid == other.sdid && self.capture_kit == other.capture_kit
    }
}

impl fmt::Display for UniqueCapture {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.lib_capture_str())
    }
}

#[cfg(test)]
pub(crate) fn capture(sdid: &str, sample_type: &str, sample_id: &str, capture_kit: &str) -> UniqueCapture {
    UniqueCapture {
        project: "LB".to_string(),
        sdid: sdid.to_string(),
        sample_type: sample_type.to_string(),
        sample_id: sample_id.to_string(),
        library_kit: "TD1".to_string(),
        capture_kit: capture_kit.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derives_role_from_sample_type() {
        assert_eq!(capture("P-1", "N", "01", "CS1").role(), SampleRole::Normal);
        assert_eq!(capture("P-1", "CFDNA", "02", "CS1").role(), SampleRole::Cancer);
        assert_eq!(capture("P-1", "T", "03", "CS1").role(), SampleRole::Cancer);
    }

    #[test]
    fn composes_identity_strings() {
        let c = capture("P-00001", "CFDNA", "03098849", "CS1");
        assert_eq!(c.sample_str(), "LB-P-00001-CFDNA-03098849");
        assert_eq!(c.lib_capture_str(), "LB-P-00001-CFDNA-03098849-TD1-CS1");
        assert_eq!(c.to_string(), c.lib_capture_str());
    }

    #[test]
    fn pairs_only_within_patient_and_panel() {
        let normal = capture("P-1", "N", "01", "CS1");
        assert!(normal.pairs_with(&capture("P-1", "CFDNA", "02", "CS1")));
        assert!(!normal.pairs_with(&capture("P-2", "CFDNA", "02", "CS1")));
        assert!(!normal.pairs_with(&capture("P-1", "CFDNA", "02", "AL1")));
    }
}
