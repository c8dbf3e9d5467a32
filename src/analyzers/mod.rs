//! Submission aggregation.
//!
//! This module folds validated submission rows into overall, per-ship-type
//! and per-region buckets and reduces them to the averages published on the
//! dashboard.

pub mod aggregate;
pub mod analyzer;
pub mod types;
pub mod utility;
