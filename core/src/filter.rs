//! Rating-range filter — the single user-facing control.

use crate::{
    error::{InsightsError, InsightsResult},
    review::ReviewTable,
    types::{Rating, MAX_RATING, MIN_RATING},
};
use serde::{Deserialize, Serialize};

/// A closed rating interval `[lo, hi]` with `1 <= lo <= hi <= 5`.
/// The only way to build one is through `new`, so a held filter is always valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFilter")]
pub struct RatingFilter {
    lo: Rating,
    hi: Rating,
}

#[derive(Deserialize)]
struct RawFilter {
    lo: i64,
    hi: i64,
}

impl TryFrom<RawFilter> for RatingFilter {
    type Error = InsightsError;

    fn try_from(raw: RawFilter) -> InsightsResult<Self> {
        RatingFilter::new(raw.lo, raw.hi)
    }
}

impl RatingFilter {
    pub fn new(lo: i64, hi: i64) -> InsightsResult<Self> {
        let in_domain = |v: i64| (MIN_RATING as i64..=MAX_RATING as i64).contains(&v);
        if !in_domain(lo) || !in_domain(hi) || lo > hi {
            return Err(InsightsError::InvalidFilter { lo, hi });
        }
        Ok(Self { lo: lo as Rating, hi: hi as Rating })
    }

    /// `[1, 5]`: every valid review passes.
    pub fn full() -> Self {
        Self { lo: MIN_RATING, hi: MAX_RATING }
    }

    pub fn lo(&self) -> Rating { self.lo }
    pub fn hi(&self) -> Rating { self.hi }

    pub fn contains(&self, rating: Rating) -> bool {
        self.lo <= rating && rating <= self.hi
    }
}

impl Default for RatingFilter {
    fn default() -> Self { Self::full() }
}

/// Rows of `table` whose rating lies inside `filter`, in their original order.
/// An empty result is a valid outcome.
pub fn apply_filter(table: &ReviewTable, filter: RatingFilter) -> ReviewTable {
    let rows = table
        .iter()
        .filter(|r| filter.contains(r.rating))
        .cloned()
        .collect();
    ReviewTable::new(table.platform, rows)
}
