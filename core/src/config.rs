use crate::{
    distribution::DEFAULT_THEME_TOP_K,
    error::{InsightsError, InsightsResult},
    filter::RatingFilter,
    types::Platform,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    pub platform: Platform,
    pub path:     PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
struct DashboardConfigFile {
    datasets: Vec<DatasetConfig>,
    #[serde(default = "default_theme_top_k")]
    theme_top_k: usize,
    #[serde(default)]
    sentiment_top_k: Option<usize>,
    #[serde(default)]
    default_filter: RatingFilter,
}

fn default_theme_top_k() -> usize {
    DEFAULT_THEME_TOP_K
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub datasets:        BTreeMap<Platform, PathBuf>,
    pub theme_top_k:     usize,
    /// `None` shows every sentiment label.
    pub sentiment_top_k: Option<usize>,
    pub default_filter:  RatingFilter,
}

impl DashboardConfig {
    /// Load from a JSON config file. Relative dataset paths resolve against
    /// the config file's directory.
    pub fn load(path: &str) -> InsightsResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| InsightsError::Config(format!("Cannot read {path}: {e}")))?;
        let file: DashboardConfigFile = serde_json::from_str(&content)
            .map_err(|e| InsightsError::Config(format!("Cannot parse {path}: {e}")))?;
        let base = Path::new(path).parent().unwrap_or_else(|| Path::new("."));

        let mut datasets = BTreeMap::new();
        for ds in file.datasets {
            let resolved = if ds.path.is_absolute() { ds.path } else { base.join(ds.path) };
            if datasets.insert(ds.platform, resolved).is_some() {
                return Err(InsightsError::Config(format!(
                    "dataset for {} configured more than once",
                    ds.platform
                )));
            }
        }

        let config = Self {
            datasets,
            theme_top_k:     file.theme_top_k,
            sentiment_top_k: file.sentiment_top_k,
            default_filter:  file.default_filter,
        };
        config.validate()?;
        Ok(config)
    }

    /// Default layout: one `<platform>_reviews_analyzed.csv` per platform in `data_dir`.
    pub fn for_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        let datasets = Platform::ALL
            .iter()
            .map(|p| (*p, dir.join(format!("{}.csv", p.dataset_stem()))))
            .collect();
        Self {
            datasets,
            theme_top_k:     DEFAULT_THEME_TOP_K,
            sentiment_top_k: None,
            default_filter:  RatingFilter::full(),
        }
    }

    pub fn validate(&self) -> InsightsResult<()> {
        for platform in Platform::ALL {
            if !self.datasets.contains_key(&platform) {
                return Err(InsightsError::Config(format!("no dataset configured for {platform}")));
            }
        }
        if self.theme_top_k == 0 {
            return Err(InsightsError::Config("theme_top_k must be at least 1".into()));
        }
        if self.sentiment_top_k == Some(0) {
            return Err(InsightsError::Config("sentiment_top_k must be at least 1".into()));
        }
        Ok(())
    }
}
