//! Submission rows: the raw CSV record and its validated form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Columns every submission file must carry for a row to count.
pub const REQUIRED_COLUMNS: [&str; 4] = ["ship_type", "region", "sleep_hours", "rest_violations"];

/// A single row deserialized from a submission CSV, before validation.
///
/// Every column is optional so a missing header, a short row or an empty cell
/// surfaces as a [`RowError`] instead of a file-level decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct RawSubmission {
    #[serde(default)]
    pub ship_type: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub sleep_hours: Option<String>,
    #[serde(default)]
    pub rest_violations: Option<String>,
    #[serde(default)]
    pub called_during_rest: Option<String>,
    #[serde(default)]
    pub port_intensity: Option<String>,
}

/// A validated fatigue report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Submission {
    pub ship_type: String,
    pub region: String,
    pub sleep_hours: f64,
    pub rest_violations: u64,

    // carried through, not aggregated
    pub called_during_rest: Option<String>,
    pub port_intensity: Option<String>,
}

/// Why a row was left out of every bucket.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RowError {
    #[error("required field `{0}` is missing or empty")]
    MissingField(&'static str),

    #[error("sleep_hours `{0}` is not a non-negative number")]
    InvalidSleepHours(String),

    #[error("rest_violations `{0}` is not a non-negative integer")]
    InvalidRestViolations(String),

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("adding this row would overflow the running {0} total")]
    TotalOverflow(&'static str),
}

impl TryFrom<RawSubmission> for Submission {
    type Error = RowError;

    fn try_from(raw: RawSubmission) -> Result<Self, Self::Error> {
        let ship_type = required_text(raw.ship_type, "ship_type")?;
        let region = required_text(raw.region, "region")?;
        let sleep_hours = parse_sleep_hours(&required_text(raw.sleep_hours, "sleep_hours")?)?;
        let rest_violations =
            parse_rest_violations(&required_text(raw.rest_violations, "rest_violations")?)?;

        Ok(Submission {
            ship_type,
            region,
            sleep_hours,
            rest_violations,
            called_during_rest: optional_text(raw.called_during_rest),
            port_intensity: optional_text(raw.port_intensity),
        })
    }
}

fn required_text(value: Option<String>, column: &'static str) -> Result<String, RowError> {
    let value = value.ok_or(RowError::MissingField(column))?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RowError::MissingField(column));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses a sleep duration in hours. Rejects negatives, NaN and infinities.
pub fn parse_sleep_hours(value: &str) -> Result<f64, RowError> {
    match value.trim().parse::<f64>() {
        Ok(hours) if hours.is_finite() && hours >= 0.0 => Ok(hours),
        _ => Err(RowError::InvalidSleepHours(value.to_string())),
    }
}

/// Parses a whole, non-negative count of rest-period violations.
pub fn parse_rest_violations(value: &str) -> Result<u64, RowError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| RowError::InvalidRestViolations(value.to_string()))
}
