#![forbid(unsafe_code)]

//! Donation aggregation.
//!
//! Statistics are recomputed from scratch on every donations emission: both
//! counters reset to zero, then a single fold over the snapshot. A stale
//! partial sum is therefore never observable, and replaying the same
//! snapshot yields the same result.
//!
//! # Key Invariants
//!
//! 1. `total_contributors` equals the number of records in the snapshot.
//! 2. `total_amount` equals the sum of the records' `amount` fields.
//! 3. An empty snapshot yields `{0.0, 0}` (the fold is never skipped).
//!
//! A record with a missing or non-numeric `amount` still counts as a
//! contributor but adds nothing to the sum.

use crate::record::Record;

/// Rolling aggregate over the most recent donations snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DonationStats {
    pub total_amount: f64,
    pub total_contributors: usize,
}

impl DonationStats {
    /// Fold a full donations snapshot into fresh statistics.
    #[must_use]
    pub fn from_records(records: &[Record]) -> Self {
        let mut stats = Self::default();
        for record in records {
            stats.total_amount += record
                .get("amount")
                .and_then(Record::as_f64)
                .unwrap_or(0.0);
            stats.total_contributors += 1;
        }
        stats
    }
}
