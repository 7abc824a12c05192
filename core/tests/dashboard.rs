use insights_core::{
    config::DashboardConfig,
    dashboard::{build_view, ComparisonMetric, DashboardView, InsightsDashboard},
    error::InsightsError,
    filter::RatingFilter,
    review::{Review, ReviewTable},
    snapshot::DashboardSnapshot,
    types::Platform,
};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64Mcg;
use tempfile::TempDir;

// ── Helpers ──────────────────────────────────────────────────────────────────

const SQUARE_CSV: &str = "\
rating,sentiment,theme,is_churn_risk
1,very negative,support,True
1,very negative,support,True
2,negative,fees,True
5,very positive,ease of use,False
5,very positive,support,False
4,positive,hardware,False
";

const SHOPIFY_CSV: &str = "\
rating,sentiment,theme,is_churn_risk
1,very negative,support,True
1,very negative,fees,True
2,negative,support,True
3,neutral,apps,False
";

fn data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("square_reviews_analyzed.csv"), SQUARE_CSV).unwrap();
    std::fs::write(dir.path().join("shopify_reviews_analyzed.csv"), SHOPIFY_CSV).unwrap();
    dir
}

fn open(dir: &TempDir) -> InsightsDashboard {
    let _ = env_logger::builder().is_test(true).try_init();
    InsightsDashboard::open(DashboardConfig::for_data_dir(dir.path())).unwrap()
}

fn round_trip(view: &DashboardView) -> DashboardView {
    let json = DashboardSnapshot::new("test", "2026-01-01T00:00:00Z", view.clone())
        .to_json()
        .unwrap();
    DashboardSnapshot::from_json(&json).unwrap().view
}

fn close(a: Option<f64>, b: f64) -> bool {
    a.is_some_and(|v| (v - b).abs() < 1e-9)
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Full range: headline cards, comparison table and findings.
#[test]
fn full_range_view() {
    let dir = data_dir();
    let mut dash = open(&dir);

    let view = dash.render(RatingFilter::full()).unwrap();
    let h = &view.headline;
    assert_eq!(h.total_reviews, 10);
    assert_eq!(h.primary.platform, Platform::Square);
    assert_eq!(h.rival.platform, Platform::Shopify);
    assert!(close(h.primary.summary.mean_rating, 3.0));
    assert!(close(h.rival.summary.mean_rating, 1.75));
    assert!(close(h.primary.summary.churn_risk_percent, 50.0));
    assert!(close(h.rival.summary.churn_risk_percent, 75.0));
    assert!(close(h.comparison.rating_advantage, 1.25));
    assert!(close(h.comparison.churn_risk_advantage, -25.0));

    let table = &view.comparison.table;
    assert_eq!(table.len(), 2);
    assert_eq!(table[0].metric, ComparisonMetric::AverageRating);
    assert_eq!(table[1].metric, ComparisonMetric::ChurnRisk);
    assert!(close(table[1].advantage, -25.0));

    let f = &view.findings;
    assert!(close(f.relative_churn_likelihood, 0.5));
    assert_eq!(f.shared_leading_theme.as_deref(), Some("support"));
    let square_lead = f.leading_themes[0].theme.as_ref().unwrap();
    assert_eq!((square_lead.label.as_str(), square_lead.count), ("support", 3));
}

/// Narrowing the range recomputes every view from the base tables.
#[test]
fn narrowed_range_recomputes_everything() {
    let dir = data_dir();
    let mut dash = open(&dir);

    let view = dash.render(RatingFilter::new(4, 5).unwrap()).unwrap();
    assert_eq!(view.headline.total_reviews, 3);
    assert!(view.headline.rival.summary.is_empty());
    assert_eq!(view.headline.rival.summary.mean_rating, None);
    assert_eq!(view.headline.comparison.rating_advantage, None);
    assert_eq!(view.findings.relative_churn_likelihood, None);
    assert_eq!(view.findings.shared_leading_theme, None);

    let rival = view.analysis_for(Platform::Shopify).unwrap();
    assert!(rival.sentiment.is_empty());
    assert!(rival.top_themes.is_empty());

    // Widening again must not be affected by the earlier narrow render.
    let full = dash.render(RatingFilter::full()).unwrap();
    assert_eq!(full.headline.total_reviews, 10);
}

/// Grouped chart rows: primary platform first, rival second.
#[test]
fn grouped_rows_are_platform_tagged() {
    let dir = data_dir();
    let mut dash = open(&dir);

    let view = dash.render(RatingFilter::full()).unwrap();
    let sentiment = &view.comparison.sentiment;
    let first_rival = sentiment.iter().position(|r| r.platform == Platform::Shopify).unwrap();
    assert!(sentiment[..first_rival].iter().all(|r| r.platform == Platform::Square));
    assert!(sentiment[first_rival..].iter().all(|r| r.platform == Platform::Shopify));

    let square_total: usize = sentiment[..first_rival].iter().map(|r| r.count).sum();
    assert_eq!(square_total, 6);

    let square_themes = &view.analysis_for(Platform::Square).unwrap().top_themes;
    assert!(square_themes.entries.len() <= 5);
    assert_eq!(square_themes.leader().unwrap().label, "support");
}

/// Rendering is pure: the same filter gives an identical view.
#[test]
fn render_is_idempotent() {
    let dir = data_dir();
    let mut dash = open(&dir);
    let filter = RatingFilter::new(1, 2).unwrap();

    let a = dash.render(filter).unwrap();
    let _ = dash.render(RatingFilter::new(3, 5).unwrap()).unwrap();
    let b = dash.render(filter).unwrap();
    assert_eq!(a, b);
}

/// A missing dataset fails at open, before any render.
#[test]
fn open_fails_without_datasets() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("square_reviews_analyzed.csv"), SQUARE_CSV).unwrap();

    let err = InsightsDashboard::open(DashboardConfig::for_data_dir(dir.path())).err().unwrap();
    assert!(matches!(err, InsightsError::DataUnavailable { platform: Platform::Shopify, .. }));
}

/// JSON config: relative paths resolve next to the config file.
#[test]
fn config_file_drives_dashboard() {
    let dir = data_dir();
    let config_path = dir.path().join("dashboard.json");
    std::fs::write(
        &config_path,
        r#"{
            "datasets": [
                {"platform": "Square",  "path": "square_reviews_analyzed.csv"},
                {"platform": "Shopify", "path": "shopify_reviews_analyzed.csv"}
            ],
            "theme_top_k": 1,
            "default_filter": {"lo": 1, "hi": 2}
        }"#,
    )
    .unwrap();

    let config = DashboardConfig::load(config_path.to_str().unwrap()).unwrap();
    assert_eq!(config.sentiment_top_k, None);
    let mut dash = InsightsDashboard::open(config).unwrap();

    let view = dash.render(dash.default_filter()).unwrap();
    assert_eq!(view.filter, RatingFilter::new(1, 2).unwrap());
    assert_eq!(view.analysis_for(Platform::Square).unwrap().top_themes.entries.len(), 1);
}

#[test]
fn config_requires_both_platforms() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dashboard.json");
    std::fs::write(&config_path, r#"{"datasets": [{"platform": "Square", "path": "a.csv"}]}"#).unwrap();

    let err = DashboardConfig::load(config_path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, InsightsError::Config(_)), "got {err:?}");
}

/// Snapshots carry the view unchanged through JSON.
#[test]
fn snapshot_json_preserves_view() {
    let dir = data_dir();
    let mut dash = open(&dir);
    let view = dash.render(RatingFilter::new(2, 5).unwrap()).unwrap();

    let snap = DashboardSnapshot::new("test", "2026-01-01T00:00:00Z", view.clone());
    let json = snap.to_json().unwrap();
    let back = DashboardSnapshot::from_json(&json).unwrap();
    assert_eq!(back.view, view);
    assert_eq!(back.format_version, insights_core::snapshot::SNAPSHOT_FORMAT_VERSION);
}

/// Means and rates that do not terminate in binary (8/3, 13/11, 2/11)
/// must read back bit-for-bit.
#[test]
fn snapshot_json_preserves_non_terminating_floats() {
    let square = ReviewTable::new(Platform::Square, vec![
        Review::new(2, "negative", "fees", true),
        Review::new(3, "neutral", "support", false),
        Review::new(3, "neutral", "support", false),
    ]);
    let mut shopify_rows = vec![Review::new(1, "very negative", "support", true); 10];
    shopify_rows[0].is_churn_risk = false;
    shopify_rows.push(Review::new(3, "neutral", "apps", false));
    let shopify = ReviewTable::new(Platform::Shopify, shopify_rows);

    let config = DashboardConfig::for_data_dir("unused");
    let view = build_view(&config, &square, &shopify, RatingFilter::full());
    assert!(close(view.headline.primary.summary.mean_rating, 8.0 / 3.0));
    assert!(close(view.headline.rival.summary.mean_rating, 13.0 / 11.0));

    let back = round_trip(&view);
    assert_eq!(back, view);
    assert_eq!(
        back.headline.comparison.rating_advantage.map(f64::to_bits),
        view.headline.comparison.rating_advantage.map(f64::to_bits)
    );
}

/// Seeded tables of uneven sizes: every rendered view survives JSON unchanged.
#[test]
fn snapshot_json_round_trip_over_seeded_tables() {
    let config = DashboardConfig::for_data_dir("unused");
    let labels = ["very positive", "positive", "neutral", "negative", "very negative"];

    let table = |rng: &mut Pcg64Mcg, platform: Platform| {
        let len = rng.gen_range(1..40);
        let rows = (0..len)
            .map(|_| {
                Review::new(
                    rng.gen_range(1..=5),
                    labels[rng.gen_range(0..labels.len())],
                    labels[rng.gen_range(0..labels.len())],
                    rng.gen_bool(0.5),
                )
            })
            .collect();
        ReviewTable::new(platform, rows)
    };

    for seed in 0..200u64 {
        let mut rng = Pcg64Mcg::seed_from_u64(seed);
        let square = table(&mut rng, Platform::Square);
        let shopify = table(&mut rng, Platform::Shopify);
        let view = build_view(&config, &square, &shopify, RatingFilter::full());
        assert_eq!(round_trip(&view), view, "seed={seed}");
    }
}

/// An inverted default filter in the config file is a config error.
#[test]
fn config_rejects_inverted_default_filter() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("dashboard.json");
    std::fs::write(
        &config_path,
        r#"{
            "datasets": [
                {"platform": "Square",  "path": "a.csv"},
                {"platform": "Shopify", "path": "b.csv"}
            ],
            "default_filter": {"lo": 4, "hi": 2}
        }"#,
    )
    .unwrap();

    let err = DashboardConfig::load(config_path.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, InsightsError::Config(_)), "got {err:?}");
}

/// Unreadable or malformed config files are config errors too.
#[test]
fn config_read_and_parse_failures_are_config_errors() {
    let dir = tempfile::tempdir().unwrap();

    let missing = dir.path().join("missing.json");
    let err = DashboardConfig::load(missing.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, InsightsError::Config(_)), "got {err:?}");

    let garbled = dir.path().join("garbled.json");
    std::fs::write(&garbled, "{ not json").unwrap();
    let err = DashboardConfig::load(garbled.to_str().unwrap()).unwrap_err();
    assert!(matches!(err, InsightsError::Config(_)), "got {err:?}");
}
