//! CSV parser for fatigue-report submission files.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder, Trim};
use thiserror::Error;
use tracing::{debug, warn};

use crate::submission::{REQUIRED_COLUMNS, RawSubmission, RowError, Submission};

/// A submission file that could not be read as CSV at all.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("file has no header row")]
    MissingHeader,

    #[error("unreadable CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A row that failed validation, with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedRow {
    pub line: u64,
    pub error: RowError,
}

/// A row that passed validation, with the 1-based line it started on.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRow {
    pub line: u64,
    pub submission: Submission,
}

/// Everything one submission file yielded.
#[derive(Debug, Default)]
pub struct ParsedFile {
    pub rows: Vec<ParsedRow>,
    pub rejected: Vec<RejectedRow>,
}

/// Parses submission rows from any CSV source.
///
/// Columns are matched by header name, so reordered or extra columns are
/// fine. Rows that fail validation land in [`ParsedFile::rejected`]; only a
/// structural failure of the source itself is returned as an error, in
/// which case none of its rows should be used.
///
/// # Errors
///
/// Returns [`FileError`] if the header is absent or the underlying reader fails.
pub fn parse_submissions<R: Read>(reader: R) -> Result<ParsedFile, FileError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = rdr.byte_headers()?.clone();
    if headers.is_empty() {
        return Err(FileError::MissingHeader);
    }

    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column.as_bytes()) {
            warn!(column, "Header lacks a required column; every row will be rejected");
        }
    }

    let mut parsed = ParsedFile::default();
    let mut record = ByteRecord::new();

    while rdr.read_byte_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();

        let result = record
            .deserialize::<RawSubmission>(Some(&headers))
            .map_err(|e| RowError::Malformed(e.to_string()))
            .and_then(Submission::try_from);

        match result {
            Ok(submission) => parsed.rows.push(ParsedRow { line, submission }),
            Err(error) => parsed.rejected.push(RejectedRow { line, error }),
        }
    }

    debug!(
        accepted = parsed.rows.len(),
        rejected = parsed.rejected.len(),
        "Submission rows parsed"
    );

    Ok(parsed)
}

/// Opens and parses a single submission file.
pub fn parse_file(path: &Path) -> Result<ParsedFile, FileError> {
    let file = File::open(path).map_err(|source| FileError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    parse_submissions(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "ship_type,region,sleep_hours,rest_violations,called_during_rest,port_intensity\n";

    fn parse(body: &str) -> ParsedFile {
        parse_submissions(body.as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_header_only() {
        let parsed = parse(HEADER);
        assert!(parsed.rows.is_empty());
        assert!(parsed.rejected.is_empty());
    }

    #[test]
    fn test_parse_empty_source_is_file_error() {
        let result = parse_submissions("".as_bytes());
        assert!(matches!(result, Err(FileError::MissingHeader)));
    }

    #[test]
    fn test_parse_valid_rows() {
        let body = format!("{HEADER}Tanker,Middle East,5,2,yes,high\nTanker,Middle East,7,0,no,low\n");
        let parsed = parse(&body);

        assert_eq!(parsed.rows.len(), 2);
        assert_eq!(parsed.rows[1].submission.sleep_hours, 7.0);
        assert_eq!(parsed.rows[1].submission.port_intensity.as_deref(), Some("low"));
    }

    #[test]
    fn test_bad_row_does_not_stop_later_rows() {
        let body = format!(
            "{HEADER}Tanker,Baltic,abc,1,yes,low\nContainer,North Sea,8,0,no,low\n"
        );
        let parsed = parse(&body);

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].submission.ship_type, "Container");
        assert_eq!(
            parsed.rejected,
            vec![RejectedRow {
                line: 2,
                error: RowError::InvalidSleepHours("abc".to_string()),
            }]
        );
    }

    #[test]
    fn test_reordered_header_is_matched_by_name() {
        let body = "region,rest_violations,ship_type,sleep_hours\nBaltic,3,Ferry,4.5\n";
        let parsed = parse(body);

        assert_eq!(parsed.rows.len(), 1);
        let sub = &parsed.rows[0].submission;
        assert_eq!(sub.ship_type, "Ferry");
        assert_eq!(sub.region, "Baltic");
        assert_eq!(sub.sleep_hours, 4.5);
        assert_eq!(sub.rest_violations, 3);
        assert_eq!(sub.called_during_rest, None);
    }

    #[test]
    fn test_missing_required_column_rejects_rows() {
        let body = "ship_type,region,sleep_hours\nTanker,Baltic,5\n";
        let parsed = parse(body);

        assert!(parsed.rows.is_empty());
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(
            parsed.rejected[0].error,
            RowError::MissingField("rest_violations")
        );
    }

    #[test]
    fn test_short_row_is_rejected() {
        let body = format!("{HEADER}Tanker,Baltic\nFerry,Baltic,6,1,no,low\n");
        let parsed = parse(&body);

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rejected.len(), 1);
        assert_eq!(parsed.rejected[0].error, RowError::MissingField("sleep_hours"));
    }

    #[test]
    fn test_whitespace_is_trimmed() {
        let body = format!("{HEADER} Tanker , Baltic , 5 , 1 ,yes,high\n");
        let parsed = parse(&body);

        assert_eq!(parsed.rows.len(), 1);
        assert!(parsed.rejected.is_empty());
        assert_eq!(parsed.rows[0].submission.ship_type, "Tanker");
    }

    #[test]
    fn test_row_of_empty_fields_is_rejected() {
        let body = format!("{HEADER},,,,,\n\nFerry,Baltic,6,1,no,low\n");
        let parsed = parse(&body);

        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rows[0].line, 4);
        assert_eq!(
            parsed.rejected,
            vec![RejectedRow {
                line: 2,
                error: RowError::MissingField("ship_type"),
            }]
        );
    }

    #[test]
    fn test_invalid_utf8_field_rejects_only_that_row() {
        let mut body = HEADER.as_bytes().to_vec();
        body.extend_from_slice(b"Tank\xFFer,Baltic,5,1,yes,high\n");
        body.extend_from_slice(b"Ferry,Baltic,6,0,no,low\n");

        let parsed = parse_submissions(body.as_slice()).unwrap();
        assert_eq!(parsed.rows.len(), 1);
        assert_eq!(parsed.rejected.len(), 1);
        assert!(matches!(parsed.rejected[0].error, RowError::Malformed(_)));
    }

    #[test]
    fn test_parse_file_missing_path() {
        let result = parse_file(Path::new("/definitely/not/here.csv"));
        assert!(matches!(result, Err(FileError::Open { .. })));
    }
}
