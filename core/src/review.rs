//! Review rows and the per-platform tables that hold them.
//!
//! RULE: A ReviewTable is never mutated after construction.
//! Every derived view is built into a fresh value.

use crate::types::{Platform, Rating};
use serde::{Deserialize, Serialize};

/// Label used when the upstream classifier left a cell empty.
pub const UNLABELED: &str = "unlabeled";

/// One annotated seller review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    pub rating:        Rating,
    pub sentiment:     String,
    pub theme:         String,
    pub is_churn_risk: bool,
}

impl Review {
    pub fn new(
        rating: Rating,
        sentiment: impl Into<String>,
        theme: impl Into<String>,
        is_churn_risk: bool,
    ) -> Self {
        Self {
            rating,
            sentiment: sentiment.into(),
            theme: theme.into(),
            is_churn_risk,
        }
    }

    /// The categorical value of `field` for this row.
    pub fn label(&self, field: ReviewField) -> &str {
        match field {
            ReviewField::Sentiment => &self.sentiment,
            ReviewField::Theme     => &self.theme,
        }
    }
}

/// The categorical columns a distribution can be computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewField {
    Sentiment,
    Theme,
}

/// All reviews for one platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewTable {
    pub platform: Platform,
    rows:         Vec<Review>,
}

impl ReviewTable {
    pub fn new(platform: Platform, rows: Vec<Review>) -> Self {
        Self { platform, rows }
    }

    pub fn empty(platform: Platform) -> Self {
        Self::new(platform, Vec::new())
    }

    pub fn rows(&self) -> &[Review] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Review> {
        self.rows.iter()
    }
}

impl<'a> IntoIterator for &'a ReviewTable {
    type Item = &'a Review;
    type IntoIter = std::slice::Iter<'a, Review>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
