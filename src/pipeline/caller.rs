use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Somatic small-variant callers that can run on each normal/cancer pairing
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SomaticCaller {
    Vardict,
    Strelka,
    Mutect2,
    Varscan,
}

impl fmt::Display for SomaticCaller {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SomaticCaller::Vardict => write!(f, "vardict"),
            SomaticCaller::Strelka => write!(f, "strelka"),
            SomaticCaller::Mutect2 => write!(f, "mutect2"),
            SomaticCaller::Varscan => write!(f, "varscan"),
        }
    }
}
