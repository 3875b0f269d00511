//! Descriptors for the external tools the pipeline wraps
//!
//! One struct per tool. Fields that a command can't do without are `Option`s checked when the
//! command is rendered; construction never touches the filesystem.

/// svcaller (per-capture SV events) and Manta (somatic SVs per pairing)
pub mod structural;

/// PureCN purity/ploidy estimation and the liqbio copy-number plot
pub mod purity;

/// Somatic small-variant callers and VEP annotation
pub mod variantcalling;

/// Adapter trimming, UMI consensus calling and re-alignment
pub mod umi;

/// Shared VCF clean-up pipes
pub mod vcf;

use uuid::Uuid;

/// A scratch path that no other concurrently running job will use
pub fn scratch_path(scratch: &str, suffix: &str) -> String {
    format!("{}/{}{}", scratch.trim_end_matches('/'), Uuid::new_v4(), suffix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_paths_do_not_collide() {
        let a = scratch_path("/scratch/tmp/", ".vcf.gz");
        let b = scratch_path("/scratch/tmp/", ".vcf.gz");
        assert_ne!(a, b);
        assert!(a.starts_with("/scratch/tmp/") && !a.starts_with("/scratch/tmp//"));
        assert!(a.ends_with(".vcf.gz"));
    }
}
