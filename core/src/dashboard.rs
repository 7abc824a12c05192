//! The dashboard composition root.
//!
//! EVALUATION ORDER (every render, never incremental):
//!   1. Read both base tables from the loader cache
//!   2. Filter each table by the rating range
//!   3. Summaries, then comparison
//!   4. Distributions, then grouped chart rows
//!   5. Key findings from the values above
//!
//! RULES:
//!   - Base tables are loaded once, in `open()`, and never mutated.
//!   - `render()` is pure: the same filter always yields an identical view.
//!   - No formatting happens here. The presentation layer owns all text.

use crate::{
    config::DashboardConfig,
    distribution::{combine_distributions, distribution, DistributionEntry, DistributionTable, PlatformDistributionRow},
    error::InsightsResult,
    filter::{apply_filter, RatingFilter},
    loader::DatasetLoader,
    review::{ReviewField, ReviewTable},
    summary::{compare, relative_churn_likelihood, summarize, ComparisonRecord, MetricsSummary},
    types::Platform,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// ── Public types ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub total_reviews: usize,
    pub primary:       PlatformMetrics,
    pub rival:         PlatformMetrics,
    pub comparison:    ComparisonRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformMetrics {
    pub platform: Platform,
    pub summary:  MetricsSummary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformAnalysis {
    pub platform:   Platform,
    pub sentiment:  DistributionTable,
    pub top_themes: DistributionTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMetric {
    AverageRating,
    ChurnRisk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub metric:    ComparisonMetric,
    pub primary:   Option<f64>,
    pub rival:     Option<f64>,
    /// `primary - rival`.
    pub advantage: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitiveComparison {
    pub table:     Vec<ComparisonRow>,
    pub sentiment: Vec<PlatformDistributionRow>,
    pub themes:    Vec<PlatformDistributionRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadingTheme {
    pub platform: Platform,
    pub theme:    Option<DistributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyFindings {
    pub rating_advantage:          Option<f64>,
    pub churn_risk_advantage:      Option<f64>,
    /// Rival churn rate relative to primary, minus one.
    pub relative_churn_likelihood: Option<f64>,
    pub leading_themes:            Vec<LeadingTheme>,
    /// Both platforms share the same most frequent theme.
    pub shared_leading_theme:      Option<String>,
}

/// Everything the presentation layer needs for one filter setting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub filter:     RatingFilter,
    pub headline:   HeadlineMetrics,
    pub findings:   KeyFindings,
    pub analysis:   Vec<PlatformAnalysis>,
    pub comparison: CompetitiveComparison,
}

impl DashboardView {
    pub fn analysis_for(&self, platform: Platform) -> Option<&PlatformAnalysis> {
        self.analysis.iter().find(|a| a.platform == platform)
    }
}

// ── Dashboard ────────────────────────────────────────────────────────────────

pub struct InsightsDashboard {
    config: DashboardConfig,
    loader: DatasetLoader,
}

impl InsightsDashboard {
    /// Validate the config and eagerly load both datasets, so a missing
    /// file fails here rather than on the first render.
    pub fn open(config: DashboardConfig) -> InsightsResult<Self> {
        config.validate()?;
        let loader = DatasetLoader::from_config(&config);
        Self::with_loader(config, loader)
    }

    /// Use a caller-supplied loader (tests, alternate sources).
    pub fn with_loader(config: DashboardConfig, mut loader: DatasetLoader) -> InsightsResult<Self> {
        for platform in Platform::ALL {
            loader.load(platform)?;
        }
        log::debug!("dashboard ready: both datasets cached");
        Ok(Self { config, loader })
    }

    pub fn default_filter(&self) -> RatingFilter {
        self.config.default_filter
    }

    /// Base table for `platform`. Never re-reads the backing store after `open()`.
    pub fn base_table(&mut self, platform: Platform) -> InsightsResult<Arc<ReviewTable>> {
        self.loader.load(platform)
    }

    /// Recompute every view for `filter` from the cached base tables.
    pub fn render(&mut self, filter: RatingFilter) -> InsightsResult<DashboardView> {
        let primary_base = self.base_table(Platform::PRIMARY)?;
        let rival_base = self.base_table(Platform::RIVAL)?;
        Ok(build_view(&self.config, &primary_base, &rival_base, filter))
    }
}

/// Pure view construction over two base tables.
pub fn build_view(
    config: &DashboardConfig,
    primary_base: &ReviewTable,
    rival_base: &ReviewTable,
    filter: RatingFilter,
) -> DashboardView {
    let primary = apply_filter(primary_base, filter);
    let rival = apply_filter(rival_base, filter);

    let primary_summary = summarize(&primary);
    let rival_summary = summarize(&rival);
    let comparison = compare(&primary_summary, &rival_summary);

    log::debug!(
        "render [{}, {}]: {}={} rows, {}={} rows",
        filter.lo(),
        filter.hi(),
        primary.platform,
        primary_summary.count,
        rival.platform,
        rival_summary.count
    );

    let analysis: Vec<PlatformAnalysis> = [&primary, &rival]
        .into_iter()
        .map(|table| PlatformAnalysis {
            platform:   table.platform,
            sentiment:  distribution(table, ReviewField::Sentiment, config.sentiment_top_k),
            top_themes: distribution(table, ReviewField::Theme, Some(config.theme_top_k)),
        })
        .collect();

    let (pa, ra) = (&analysis[0], &analysis[1]);
    let sentiment = combine_distributions(&[(pa.platform, &pa.sentiment), (ra.platform, &ra.sentiment)]);
    let themes = combine_distributions(&[(pa.platform, &pa.top_themes), (ra.platform, &ra.top_themes)]);

    let table = vec![
        ComparisonRow {
            metric:    ComparisonMetric::AverageRating,
            primary:   primary_summary.mean_rating,
            rival:     rival_summary.mean_rating,
            advantage: comparison.rating_advantage,
        },
        ComparisonRow {
            metric:    ComparisonMetric::ChurnRisk,
            primary:   primary_summary.churn_risk_percent,
            rival:     rival_summary.churn_risk_percent,
            advantage: comparison.churn_risk_advantage,
        },
    ];

    let findings = key_findings(&primary_summary, &rival_summary, &comparison, pa, ra);

    DashboardView {
        filter,
        headline: HeadlineMetrics {
            total_reviews: primary_summary.count + rival_summary.count,
            primary: PlatformMetrics { platform: primary.platform, summary: primary_summary },
            rival:   PlatformMetrics { platform: rival.platform, summary: rival_summary },
            comparison,
        },
        findings,
        analysis,
        comparison: CompetitiveComparison { table, sentiment, themes },
    }
}

fn key_findings(
    primary: &MetricsSummary,
    rival: &MetricsSummary,
    comparison: &ComparisonRecord,
    primary_analysis: &PlatformAnalysis,
    rival_analysis: &PlatformAnalysis,
) -> KeyFindings {
    let leading_themes: Vec<LeadingTheme> = [primary_analysis, rival_analysis]
        .into_iter()
        .map(|a| LeadingTheme { platform: a.platform, theme: a.top_themes.leader().cloned() })
        .collect();

    let shared_leading_theme = match (primary_analysis.top_themes.leader(), rival_analysis.top_themes.leader()) {
        (Some(p), Some(r)) if p.label == r.label => Some(p.label.clone()),
        _ => None,
    };

    KeyFindings {
        rating_advantage:          comparison.rating_advantage,
        churn_risk_advantage:      comparison.churn_risk_advantage,
        relative_churn_likelihood: relative_churn_likelihood(primary, rival),
        leading_themes,
        shared_leading_theme,
    }
}
