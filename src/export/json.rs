use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;

use crate::job::ConfiguredJob;

pub fn write_json(jobs: &[ConfiguredJob], path: &Path, dry_run: bool) -> Result<()> {
    let json = serde_json::to_string_pretty(jobs).context("Serialising jobs")?;
    if dry_run {
        info!("--dry-run set, not writing {} bytes to {}", json.len(), path.display());
        return Ok(());
    }
    fs::write(path, json).with_context(|| format!("Can't write {}", path.display()))?;
    Ok(())
}
