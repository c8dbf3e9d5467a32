use crate::analyzers::aggregate::Accumulator;
use crate::analyzers::types::{RunReport, Summary};
use crate::parser::{ParsedFile, RejectedRow, parse_file};
use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Reads every submission CSV in `submissions_dir` and folds the valid rows
/// into a single [`Summary`].
///
/// A directory that does not exist yields an empty summary. Bad rows and
/// unreadable files are logged and skipped.
///
/// # Errors
///
/// Fails only when `submissions_dir` exists but cannot be listed as a directory.
#[tracing::instrument(skip(submissions_dir), fields(submissions_dir = %submissions_dir.display()))]
pub fn aggregate_dir(submissions_dir: &Path) -> Result<(Summary, RunReport)> {
    let files = discover_csv_files(submissions_dir)?;

    let mut acc = Accumulator::new();
    let mut report = RunReport::default();

    for path in files {
        match parse_file(&path) {
            Ok(parsed) => {
                let parsed = fold_file(&mut acc, parsed);
                log_rejections(&path, &parsed);
                report.files_read += 1;
                report.rows_accepted += parsed.rows.len();
                report.rows_rejected += parsed.rejected.len();
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Skipping unreadable submission file");
                report.files_skipped += 1;
            }
        }
    }

    info!(
        files_read = report.files_read,
        files_skipped = report.files_skipped,
        rows_accepted = report.rows_accepted,
        rows_rejected = report.rows_rejected,
        "Aggregation pass complete"
    );

    Ok((acc.summarize(), report))
}

/// Parses a single submission file and summarizes it on its own.
///
/// Unlike [`aggregate_dir`], a structurally broken file is an error here.
#[tracing::instrument(skip(path), fields(file = %path.display()))]
pub fn check_file(path: &Path) -> Result<(Summary, ParsedFile)> {
    let parsed = parse_file(path).with_context(|| format!("cannot parse {}", path.display()))?;
    let mut acc = Accumulator::new();
    let parsed = fold_file(&mut acc, parsed);
    log_rejections(path, &parsed);
    Ok((acc.summarize(), parsed))
}

/// Folds a file's valid rows into `acc`. Rows the accumulator refuses move
/// to the rejected list, so `rows` ends up holding exactly what was counted.
fn fold_file(acc: &mut Accumulator, parsed: ParsedFile) -> ParsedFile {
    let ParsedFile { rows, mut rejected } = parsed;
    let mut folded = Vec::with_capacity(rows.len());

    for row in rows {
        match acc.add(&row.submission) {
            Ok(()) => folded.push(row),
            Err(error) => rejected.push(RejectedRow {
                line: row.line,
                error,
            }),
        }
    }

    rejected.sort_by_key(|r| r.line);
    ParsedFile {
        rows: folded,
        rejected,
    }
}

/// Lists the `*.csv` files directly inside `dir`, sorted by path.
///
/// A missing directory is treated as holding no submissions.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        warn!(dir = %dir.display(), "Submissions directory does not exist; nothing to aggregate");
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        bail!("submissions path {} is not a directory", dir.display());
    }

    let mut files = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("cannot read directory {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("cannot list {}", dir.display()))?;
        let path = entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("csv") {
            continue;
        }
        files.push(path);
    }

    files.sort();
    Ok(files)
}

fn log_rejections(path: &Path, parsed: &ParsedFile) {
    for rejected in &parsed.rejected {
        warn!(
            file = %path.display(),
            line = rejected.line,
            reason = %rejected.error,
            "Skipping invalid submission row"
        );
    }
}
