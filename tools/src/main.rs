//! insights-runner: headless runner for the seller insights dashboard.
//!
//! Usage:
//!   insights-runner --data-dir ./data --min-rating 1 --max-rating 3
//!   insights-runner --config dashboard.json --json
//!   insights-runner --data-dir ./data --ipc-mode

use anyhow::Result;
use insights_core::{
    config::DashboardConfig,
    dashboard::{ComparisonMetric, DashboardView, InsightsDashboard},
    filter::RatingFilter,
    snapshot::DashboardSnapshot,
    summary::MetricsSummary,
};
use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

#[derive(serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum IpcCommand {
    GetState,
    SetFilter { lo: i64, hi: i64 },
    Quit,
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config = match load_config(&args) {
        Ok(c) => c,
        Err(e) => return fatal(&e),
    };

    // Both datasets load here. A failure stops before anything is rendered.
    let mut dashboard = match InsightsDashboard::open(config) {
        Ok(d) => d,
        Err(e) => return fatal(&anyhow::Error::from(e)),
    };

    match run(&mut dashboard, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => fatal(&e),
    }
}

fn fatal(err: &anyhow::Error) -> ExitCode {
    log::error!("{err:#}");
    eprintln!("error: {err:#}");
    ExitCode::FAILURE
}

fn load_config(args: &[String]) -> Result<DashboardConfig> {
    let config = match flag_value(args, "--config")? {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::for_data_dir(flag_value(args, "--data-dir")?.unwrap_or(".")),
    };
    Ok(config)
}

fn run(dashboard: &mut InsightsDashboard, args: &[String]) -> Result<()> {
    if args.iter().any(|a| a == "--ipc-mode") {
        return run_ipc_loop(dashboard);
    }

    let default = dashboard.default_filter();
    let lo = rating_arg(args, "--min-rating", default.lo())?;
    let hi = rating_arg(args, "--max-rating", default.hi())?;
    let filter = RatingFilter::new(lo, hi)?;

    let view = dashboard.render(filter)?;
    if args.iter().any(|a| a == "--json") {
        println!("{}", snapshot(view).to_json_pretty()?);
    } else {
        print_summary(&view);
    }
    Ok(())
}

/// One JSON command per line in, one JSON line out. Every accepted command
/// answers with a full snapshot recomputed from the cached tables.
fn run_ipc_loop(dashboard: &mut InsightsDashboard) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();
    let mut filter = dashboard.default_filter();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: IpcCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e.to_string())?;
                continue;
            }
        };

        match cmd {
            IpcCommand::Quit => break,
            IpcCommand::GetState => {}
            IpcCommand::SetFilter { lo, hi } => match RatingFilter::new(lo, hi) {
                Ok(f) => filter = f,
                Err(e) => {
                    log::warn!("rejected filter: {e}");
                    write_error(&mut stdout, &e.to_string())?;
                    continue;
                }
            },
        }

        let view = dashboard.render(filter)?;
        writeln!(stdout, "{}", snapshot(view).to_json()?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(out: &mut impl Write, message: &str) -> Result<()> {
    let err_json = serde_json::json!({ "error": message });
    writeln!(out, "{err_json}")?;
    out.flush()?;
    Ok(())
}

fn snapshot(view: DashboardView) -> DashboardSnapshot {
    DashboardSnapshot::new(
        concat!("insights-runner ", env!("CARGO_PKG_VERSION")),
        chrono::Utc::now().to_rfc3339(),
        view,
    )
}

fn print_summary(view: &DashboardView) {
    let h = &view.headline;
    println!("=== SELLER INSIGHTS ===");
    println!("  rating range:   [{}, {}]", view.filter.lo(), view.filter.hi());
    println!("  total reviews:  {}", h.total_reviews);
    for m in [&h.primary, &h.rival] {
        println!(
            "  {:<8} n={:<5} avg={}  churn={}",
            m.platform.name(),
            m.summary.count,
            fmt_rating(&m.summary),
            fmt_churn(&m.summary)
        );
    }

    println!();
    println!("=== {} vs {} ===", h.primary.platform, h.rival.platform);
    for row in &view.comparison.table {
        let (label, unit) = match row.metric {
            ComparisonMetric::AverageRating => ("Average Rating", ""),
            ComparisonMetric::ChurnRisk => ("Churn Risk", "%"),
        };
        println!(
            "  {:<15} {:>8} {:>8}  advantage {}",
            label,
            fmt_value(row.primary, unit),
            fmt_value(row.rival, unit),
            fmt_delta(row.advantage, unit)
        );
    }

    for analysis in &view.analysis {
        println!();
        println!("=== {} ===", analysis.platform);
        if analysis.sentiment.is_empty() {
            println!("  (no reviews in range)");
            continue;
        }
        for (label, pct) in analysis.sentiment.shares() {
            println!("  sentiment {:<16} {:>5.1}%", label, pct);
        }
        for entry in &analysis.top_themes.entries {
            println!("  theme     {:<16} {:>5}", entry.label, entry.count);
        }
    }

    let f = &view.findings;
    println!();
    println!("=== KEY FINDINGS ===");
    println!("  rating advantage:      {}", fmt_delta(f.rating_advantage, ""));
    println!("  churn risk advantage:  {}", fmt_delta(f.churn_risk_advantage, "%"));
    println!(
        "  rival churn likelihood: {}",
        fmt_delta(f.relative_churn_likelihood.map(|r| r * 100.0), "% higher")
    );
    match &f.shared_leading_theme {
        Some(theme) => println!("  shared top theme:      {theme}"),
        None => println!("  shared top theme:      (none)"),
    }
}

fn fmt_rating(s: &MetricsSummary) -> String {
    s.mean_rating.map_or_else(|| "n/a".into(), |m| format!("{m:.2}/5"))
}

fn fmt_churn(s: &MetricsSummary) -> String {
    s.churn_risk_percent.map_or_else(|| "n/a".into(), |c| format!("{c:.1}%"))
}

fn fmt_value(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| "n/a".into(), |x| format!("{x:.2}{unit}"))
}

fn fmt_delta(v: Option<f64>, unit: &str) -> String {
    v.map_or_else(|| "n/a".into(), |x| format!("{x:+.2}{unit}"))
}

/// Value following `flag`. A flag given without a value is an error.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Result<Option<&'a str>> {
    let Some(pos) = args.iter().position(|a| a == flag) else {
        return Ok(None);
    };
    match args.get(pos + 1) {
        Some(value) if !value.starts_with("--") => Ok(Some(value.as_str())),
        _ => anyhow::bail!("{flag} requires a value"),
    }
}

/// Whole-number rating bound. Falls back to `default` only when the flag is absent.
fn rating_arg(args: &[String], flag: &str, default: u8) -> Result<i64> {
    match flag_value(args, flag)? {
        None => Ok(default as i64),
        Some(raw) => raw
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("{flag} expects a whole number, got '{raw}'")),
    }
}
