//! Data types used by the aggregation pipeline.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzers::utility::average;
use crate::submission::RowError;

/// Running totals for one grouping key: overall, a ship type, or a region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bucket {
    pub count: u64,
    pub sum_sleep_hours: f64,
    pub sum_rest_violations: u64,
}

impl Bucket {
    /// Returns this bucket with one more row folded in. Leaves `self`
    /// untouched and fails when a running total would leave its range.
    pub fn checked_add(&self, sleep_hours: f64, rest_violations: u64) -> Result<Bucket, RowError> {
        let sum_sleep_hours = self.sum_sleep_hours + sleep_hours;
        if !sum_sleep_hours.is_finite() {
            return Err(RowError::TotalOverflow("sleep_hours"));
        }

        Ok(Bucket {
            count: self
                .count
                .checked_add(1)
                .ok_or(RowError::TotalOverflow("count"))?,
            sum_sleep_hours,
            sum_rest_violations: self
                .sum_rest_violations
                .checked_add(rest_violations)
                .ok_or(RowError::TotalOverflow("rest_violations"))?,
        })
    }

    /// Reduces the running totals to the published count and averages.
    pub fn summarize(&self) -> BucketSummary {
        BucketSummary {
            count: self.count,
            avg_sleep_hours: average(self.sum_sleep_hours, self.count),
            avg_rest_violations: average(self.sum_rest_violations as f64, self.count),
        }
    }
}

/// Published figures for one bucket. Averages are `null` for an empty bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketSummary {
    pub count: u64,
    pub avg_sleep_hours: Option<f64>,
    pub avg_rest_violations: Option<f64>,
}

/// The dashboard artifact, written as `data/data.json` by default.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub overall: BucketSummary,
    pub by_ship_type: BTreeMap<String, BucketSummary>,
    pub by_region: BTreeMap<String, BucketSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Summary {
    /// Stamps the summary with the time it was produced.
    pub fn with_timestamp(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }
}

/// Counters describing what one run read and skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub files_read: usize,
    pub files_skipped: usize,
    pub rows_accepted: usize,
    pub rows_rejected: usize,
}
