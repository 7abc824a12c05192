//! Frequency distributions over categorical review fields.
//!
//! Ordering: descending by count. Labels with equal counts keep the order in
//! which they first appear in the table, so identical input always yields
//! identical output.

use crate::{
    review::{ReviewField, ReviewTable},
    types::Platform,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Number of themes shown in theme charts.
pub const DEFAULT_THEME_TOP_K: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionTable {
    pub field:   ReviewField,
    pub entries: Vec<DistributionEntry>,
}

impl DistributionTable {
    /// Sum of counts across the kept entries.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|e| e.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn leader(&self) -> Option<&DistributionEntry> {
        self.entries.first()
    }

    pub fn count_of(&self, label: &str) -> usize {
        self.entries
            .iter()
            .find(|e| e.label == label)
            .map_or(0, |e| e.count)
    }

    /// Share of `label` among the kept entries, in percent.
    pub fn share_percent(&self, label: &str) -> Option<f64> {
        let total = self.total();
        if total == 0 {
            return None;
        }
        Some(self.count_of(label) as f64 / total as f64 * 100.0)
    }

    /// `(label, percent)` for every kept entry, in table order.
    pub fn shares(&self) -> Vec<(String, f64)> {
        let total = self.total();
        if total == 0 {
            return Vec::new();
        }
        self.entries
            .iter()
            .map(|e| (e.label.clone(), e.count as f64 / total as f64 * 100.0))
            .collect()
    }
}

/// Group `table` by `field`, count, sort, and keep the first `top_k` labels.
/// `top_k = None` keeps every label.
pub fn distribution(
    table: &ReviewTable,
    field: ReviewField,
    top_k: Option<usize>,
) -> DistributionTable {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut entries: Vec<DistributionEntry> = Vec::new();

    for review in table {
        let label = review.label(field);
        match index.get(label) {
            Some(&i) => entries[i].count += 1,
            None => {
                index.insert(label, entries.len());
                entries.push(DistributionEntry { label: label.to_string(), count: 1 });
            }
        }
    }

    // sort_by is stable: equal counts stay in first-seen order.
    entries.sort_by(|a, b| b.count.cmp(&a.count));
    if let Some(k) = top_k {
        entries.truncate(k);
    }

    DistributionTable { field, entries }
}

/// One bar of a grouped (platform-coloured) chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDistributionRow {
    pub platform: Platform,
    pub label:    String,
    pub count:    usize,
}

/// Tag each per-platform distribution with its platform and concatenate,
/// preserving input order.
pub fn combine_distributions(parts: &[(Platform, &DistributionTable)]) -> Vec<PlatformDistributionRow> {
    parts
        .iter()
        .flat_map(|(platform, table)| {
            table.entries.iter().map(move |e| PlatformDistributionRow {
                platform: *platform,
                label:    e.label.clone(),
                count:    e.count,
            })
        })
        .collect()
}
