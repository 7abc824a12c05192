//! Scalar metrics per table and the A-vs-B comparison record.
//!
//! Empty tables have no mean and no churn rate. Both are reported as `None`
//! and the sentinel propagates through every derived value.

use crate::review::ReviewTable;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub count:              usize,
    /// In `[1, 5]` when present.
    pub mean_rating:        Option<f64>,
    /// In `[0, 100]` when present.
    pub churn_risk_percent: Option<f64>,
}

impl MetricsSummary {
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

pub fn summarize(table: &ReviewTable) -> MetricsSummary {
    let count = table.len();
    if count == 0 {
        return MetricsSummary { count, mean_rating: None, churn_risk_percent: None };
    }

    let (rating_sum, churn_rows) = table.iter().fold((0u64, 0usize), |(sum, churn), r| {
        (sum + r.rating as u64, churn + usize::from(r.is_churn_risk))
    });

    MetricsSummary {
        count,
        mean_rating:        Some(rating_sum as f64 / count as f64),
        churn_risk_percent: Some(churn_rows as f64 / count as f64 * 100.0),
    }
}

/// Signed differences `A - B`. Positive `rating_advantage` favours A;
/// negative `churn_risk_advantage` favours A.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub rating_advantage:     Option<f64>,
    pub churn_risk_advantage: Option<f64>,
}

pub fn compare(a: &MetricsSummary, b: &MetricsSummary) -> ComparisonRecord {
    ComparisonRecord {
        rating_advantage:     difference(a.mean_rating, b.mean_rating),
        churn_risk_advantage: difference(a.churn_risk_percent, b.churn_risk_percent),
    }
}

/// How much more likely B's sellers are to churn than A's, as a fraction.
/// 0.5 reads as "50% higher likelihood". `None` when A has no churn rate
/// or a zero rate.
pub fn relative_churn_likelihood(a: &MetricsSummary, b: &MetricsSummary) -> Option<f64> {
    match (a.churn_risk_percent, b.churn_risk_percent) {
        (Some(pa), Some(pb)) if pa > 0.0 => Some(pb / pa - 1.0),
        _ => None,
    }
}

fn difference(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    Some(a? - b?)
}
