//! Dataset loading and the per-process memo cache.
//!
//! RULE: Each platform's backing store is read at most once per loader.
//! Every later `load()` returns the cached table. The backing files are
//! assumed static for the life of the process.

use crate::{
    config::DashboardConfig,
    error::{InsightsError, InsightsResult},
    review::{Review, ReviewTable, UNLABELED},
    types::{Platform, Rating, MAX_RATING, MIN_RATING},
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const REQUIRED_COLUMNS: [&str; 4] = ["rating", "sentiment", "theme", "is_churn_risk"];

/// Where review tables come from.
pub trait ReviewSource {
    /// Read the full table for `platform`. Called at most once per platform
    /// by `DatasetLoader`.
    fn read(&self, platform: Platform) -> InsightsResult<ReviewTable>;
}

// ── CSV source ───────────────────────────────────────────────────────────────

/// Reads one CSV file per platform. Column order is irrelevant and unknown
/// columns are ignored.
pub struct CsvReviewSource {
    paths: HashMap<Platform, PathBuf>,
}

impl CsvReviewSource {
    pub fn new(paths: HashMap<Platform, PathBuf>) -> Self {
        Self { paths }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.datasets.iter().map(|(p, path)| (*p, path.clone())).collect())
    }
}

impl ReviewSource for CsvReviewSource {
    fn read(&self, platform: Platform) -> InsightsResult<ReviewTable> {
        let path = self.paths.get(&platform).ok_or_else(|| InsightsError::DataUnavailable {
            platform,
            path:   "<unconfigured>".into(),
            reason: "no dataset path configured".into(),
        })?;
        read_csv(platform, path).map_err(|reason| InsightsError::DataUnavailable {
            platform,
            path: path.display().to_string(),
            reason,
        })
    }
}

/// Column positions of the required fields within one file's header.
struct ColumnIndex {
    rating:        usize,
    sentiment:     usize,
    theme:         usize,
    is_churn_risk: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, String> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| format!("missing required column '{name}'"))
        };
        Ok(Self {
            rating:        find(REQUIRED_COLUMNS[0])?,
            sentiment:     find(REQUIRED_COLUMNS[1])?,
            theme:         find(REQUIRED_COLUMNS[2])?,
            is_churn_risk: find(REQUIRED_COLUMNS[3])?,
        })
    }
}

fn read_csv(platform: Platform, path: &Path) -> Result<ReviewTable, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| format!("cannot open file: {e}"))?;

    let headers = reader
        .headers()
        .map_err(|e| format!("cannot read header row: {e}"))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers)?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Line 1 is the header.
        let line = i + 2;
        let record = record.map_err(|e| format!("line {line}: {e}"))?;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();

        let rating = parse_rating(field(columns.rating))
            .map_err(|e| format!("line {line}: {e}"))?;
        let is_churn_risk = parse_flag(field(columns.is_churn_risk))
            .map_err(|e| format!("line {line}: {e}"))?;

        rows.push(Review {
            rating,
            sentiment: label_or_unlabeled(field(columns.sentiment)),
            theme: label_or_unlabeled(field(columns.theme)),
            is_churn_risk,
        });
    }

    log::info!("loaded {} reviews for {platform} from {}", rows.len(), path.display());
    Ok(ReviewTable::new(platform, rows))
}

/// Accepts `4` as well as the float form `4.0`.
pub fn parse_rating(raw: &str) -> Result<Rating, String> {
    let value = match raw.parse::<i64>() {
        Ok(v) => v,
        Err(_) => {
            let f: f64 = raw.parse().map_err(|_| format!("rating '{raw}' is not a number"))?;
            if f.fract() != 0.0 || !f.is_finite() {
                return Err(format!("rating '{raw}' is not a whole number"));
            }
            f as i64
        }
    };
    if !(MIN_RATING as i64..=MAX_RATING as i64).contains(&value) {
        return Err(format!("rating {value} outside {MIN_RATING}..={MAX_RATING}"));
    }
    Ok(value as Rating)
}

/// Accepts the boolean encodings commonly written by dataframe exports.
pub fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "1.0" => Ok(true),
        "false" | "0" | "0.0" => Ok(false),
        _ => Err(format!("is_churn_risk '{raw}' is not a boolean")),
    }
}

fn label_or_unlabeled(raw: &str) -> String {
    if raw.is_empty() { UNLABELED.to_string() } else { raw.to_string() }
}

// ── Memoizing loader ─────────────────────────────────────────────────────────

pub struct DatasetLoader {
    source: Box<dyn ReviewSource>,
    cache:  HashMap<Platform, Arc<ReviewTable>>,
}

impl DatasetLoader {
    pub fn new(source: Box<dyn ReviewSource>) -> Self {
        Self { source, cache: HashMap::new() }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(Box::new(CsvReviewSource::from_config(config)))
    }

    /// Return the table for `platform`, reading the backing store only on
    /// the first call. A failed read is not cached.
    pub fn load(&mut self, platform: Platform) -> InsightsResult<Arc<ReviewTable>> {
        if let Some(table) = self.cache.get(&platform) {
            log::trace!("cache hit for {platform}");
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(self.source.read(platform)?);
        self.cache.insert(platform, Arc::clone(&table));
        Ok(table)
    }

    pub fn is_loaded(&self, platform: Platform) -> bool {
        self.cache.contains_key(&platform)
    }
}
