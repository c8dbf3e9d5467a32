use crate::analyzers::types::{Bucket, BucketSummary, Summary};
use crate::submission::{RowError, Submission};
use std::collections::BTreeMap;

/// Folds validated submissions into the overall, per-ship-type and
/// per-region buckets.
///
/// Keys are kept ordered so the serialized summary does not depend on the
/// order rows arrive in.
#[derive(Debug, Default)]
pub struct Accumulator {
    overall: Bucket,
    by_ship_type: BTreeMap<String, Bucket>,
    by_region: BTreeMap<String, Bucket>,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one submission to every bucket it belongs to.
    ///
    /// Either all three buckets take the row or none do; a row that would
    /// push a running total out of range is refused.
    pub fn add(&mut self, submission: &Submission) -> Result<(), RowError> {
        let Submission {
            ship_type,
            region,
            sleep_hours,
            rest_violations,
            ..
        } = submission;

        let overall = self.overall.checked_add(*sleep_hours, *rest_violations)?;
        let ship_bucket = self
            .by_ship_type
            .get(ship_type)
            .cloned()
            .unwrap_or_default()
            .checked_add(*sleep_hours, *rest_violations)?;
        let region_bucket = self
            .by_region
            .get(region)
            .cloned()
            .unwrap_or_default()
            .checked_add(*sleep_hours, *rest_violations)?;

        self.overall = overall;
        self.by_ship_type.insert(ship_type.clone(), ship_bucket);
        self.by_region.insert(region.clone(), region_bucket);
        Ok(())
    }

    pub fn count(&self) -> u64 {
        self.overall.count
    }

    /// Derives averages for every bucket. The result carries no timestamp.
    pub fn summarize(&self) -> Summary {
        fn reduce(buckets: &BTreeMap<String, Bucket>) -> BTreeMap<String, BucketSummary> {
            buckets
                .iter()
                .map(|(key, bucket)| (key.clone(), bucket.summarize()))
                .collect()
        }

        Summary {
            overall: self.overall.summarize(),
            by_ship_type: reduce(&self.by_ship_type),
            by_region: reduce(&self.by_region),
            updated_at: None,
        }
    }
}
