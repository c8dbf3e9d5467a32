//! Output formatting and persistence for the aggregated summary.
//!
//! Supports pretty-printing, JSON logging, and the single JSON file the
//! dashboard reads.

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::analyzers::types::Summary;
use std::fs;
use std::path::{Path, PathBuf};

/// Logs a summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &Summary) {
    debug!("{:#?}", summary);
}

/// Logs a summary as pretty-printed JSON.
pub fn print_json(summary: &Summary) -> Result<()> {
    info!("{}", render_json(summary)?);
    Ok(())
}

/// Renders the summary exactly as it is written to disk.
pub fn render_json(summary: &Summary) -> Result<String> {
    let mut json = serde_json::to_string_pretty(summary)?;
    json.push('\n');
    Ok(json)
}

/// Writes the summary to `path`, replacing whatever was there.
///
/// Missing parent directories are created. The JSON goes to a sibling
/// temporary file first and is renamed into place, so readers never see a
/// half-written summary.
pub fn write_summary(path: &Path, summary: &Summary) -> Result<()> {
    let json = render_json(summary)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create output directory {}", parent.display()))?;
    }

    let tmp = temp_sibling(path);
    debug!(path = %path.display(), tmp = %tmp.display(), bytes = json.len(), "Writing summary");

    fs::write(&tmp, json).with_context(|| format!("cannot write {}", tmp.display()))?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e).with_context(|| format!("cannot replace {}", path.display()));
    }

    Ok(())
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
