//! Shared primitive types used across the entire dashboard.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A star rating. Valid values are `MIN_RATING..=MAX_RATING`.
pub type Rating = u8;

pub const MIN_RATING: Rating = 1;
pub const MAX_RATING: Rating = 5;

/// One of the two platforms under comparison.
/// Also the dataset identifier: there is exactly one review table per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Platform {
    Square,
    Shopify,
}

impl Platform {
    /// Table A in every comparison.
    pub const PRIMARY: Platform = Platform::Square;
    /// Table B in every comparison.
    pub const RIVAL: Platform = Platform::Shopify;

    pub const ALL: [Platform; 2] = [Platform::Square, Platform::Shopify];

    pub fn name(self) -> &'static str {
        match self {
            Platform::Square  => "Square",
            Platform::Shopify => "Shopify",
        }
    }

    /// File stem used for the default dataset location.
    pub fn dataset_stem(self) -> &'static str {
        match self {
            Platform::Square  => "square_reviews_analyzed",
            Platform::Shopify => "shopify_reviews_analyzed",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
