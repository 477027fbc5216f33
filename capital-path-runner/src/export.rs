//! Reporting and export — JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for simulation runs:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: equity series and period table for spreadsheets and charting
//! - **Markdown**: human-readable single-run report
//!
//! Persisted JSON carries a `schema_version`; newer versions are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use capital_path_core::{EquityEvent, EquityPoint, PeriodSummary, WithdrawalPolicy};

use crate::runner::{RunResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `RunResult` to pretty JSON.
pub fn export_json(result: &RunResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize RunResult to JSON")
}

/// Deserialize a `RunResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<RunResult> {
    let result: RunResult =
        serde_json::from_str(json).context("failed to deserialize RunResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the equity series as CSV: date, equity, event.
pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["date", "equity", "event"])?;
    for point in equity_curve {
        let event = match point.event {
            EquityEvent::Trade => "trade",
            EquityEvent::Withdrawal => "withdrawal",
        };
        wtr.write_record([
            point.date.to_string(),
            format!("{:.2}", point.equity),
            event.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the period table as CSV, one row per month with trades.
pub fn export_periods_csv(periods: &[PeriodSummary]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "period",
        "first_close",
        "last_close",
        "trades",
        "net_pl",
        "opening_equity",
        "closing_equity",
        "withdrawn",
        "equity_after_withdrawal",
    ])?;
    for p in periods {
        wtr.write_record([
            &p.key.to_string(),
            &p.first_close.to_string(),
            &p.last_close.to_string(),
            &p.trade_count.to_string(),
            &format!("{:.2}", p.net_pl),
            &format!("{:.2}", p.opening_equity),
            &format!("{:.2}", p.closing_equity),
            &format!("{:.2}", p.withdrawn),
            &format!("{:.2}", p.equity_after_withdrawal),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Directory name for a run: sanitized label (if any) plus a run id prefix.
pub fn artifact_dir_name(result: &RunResult) -> String {
    let short_id = &result.run_id[..result.run_id.len().min(12)];
    match result.label.as_deref() {
        Some(label) if !label.trim().is_empty() => {
            let clean: String = label
                .trim()
                .chars()
                .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
                .collect();
            format!("{clean}_{short_id}")
        }
        _ => short_id.to_string(),
    }
}

/// Save the full artifact set for a single run.
///
/// Creates `artifact_dir_name(result)` under `output_dir` containing:
/// - `manifest.json`: the full `RunResult`
/// - `equity.csv`: equity series with trade and withdrawal points
/// - `periods.csv`: monthly period table
/// - `report.md`: Markdown report
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &RunResult, output_dir: &Path) -> Result<PathBuf> {
    let run_dir = output_dir.join(artifact_dir_name(result));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("manifest.json"), export_json(result)?)?;
    std::fs::write(
        run_dir.join("equity.csv"),
        export_equity_csv(&result.simulation.equity_curve)?,
    )?;
    std::fs::write(
        run_dir.join("periods.csv"),
        export_periods_csv(&result.simulation.periods)?,
    )?;
    std::fs::write(run_dir.join("report.md"), generate_report(result))?;

    tracing::debug!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `RunResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<RunResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

fn describe_policy(policy: &WithdrawalPolicy) -> String {
    match policy {
        WithdrawalPolicy::None => "None".to_string(),
        WithdrawalPolicy::PercentOfMonthlyProfit { fraction } => {
            format!("{:.1}% of monthly profit", fraction * 100.0)
        }
        WithdrawalPolicy::ResetToStartingFunds => "Reset to starting funds".to_string(),
    }
}

/// Generate a Markdown report for a single run.
pub fn generate_report(result: &RunResult) -> String {
    let sim = &result.simulation;
    let m = &result.metrics;
    let mut md = String::with_capacity(2048);

    md.push_str("# Capital Path Report\n\n");

    md.push_str("## Configuration\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    if let Some(label) = &result.label {
        md.push_str(&format!("| Label | {label} |\n"));
    }
    md.push_str(&format!("| Run ID | {} |\n", result.run_id));
    md.push_str(&format!(
        "| Starting Capital | ${:.2} |\n",
        result.config.starting_capital
    ));
    md.push_str(&format!(
        "| Log Type | {} |\n",
        result.config.log_type.shape()
    ));
    md.push_str(&format!(
        "| Withdrawal Policy | {} |\n",
        describe_policy(&result.config.withdrawal)
    ));
    md.push('\n');

    md.push_str("## Totals\n\n");
    md.push_str("| Metric | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Final Equity | ${:.2} |\n", sim.final_equity));
    md.push_str(&format!("| Total P/L | ${:.2} |\n", sim.total_pl));
    md.push_str(&format!("| Gross Trading P/L | ${:.2} |\n", sim.gross_pl));
    md.push_str(&format!("| Total Withdrawn | ${:.2} |\n", sim.total_withdrawn));
    md.push_str(&format!("| Net Return | {:.2}% |\n", m.net_return * 100.0));
    md.push_str(&format!(
        "| Max Drawdown | {:.2}% |\n",
        m.max_drawdown * 100.0
    ));
    md.push_str(&format!("| Trades | {} |\n", m.trade_count));
    md.push_str(&format!("| Win Rate | {:.1}% |\n", m.trade_win_rate * 100.0));
    md.push_str(&format!(
        "| Periods | {} ({} up, {} down) |\n",
        m.period_count, m.winning_periods, m.losing_periods
    ));
    md.push_str(&format!("| Withdrawals | {} |\n", m.withdrawal_count));
    md.push('\n');

    if !sim.periods.is_empty() {
        md.push_str("## Periods\n\n");
        md.push_str("| Period | Trades | Net P/L | Closing Equity | Withdrawn | Equity After |\n");
        md.push_str("| --- | ---: | ---: | ---: | ---: | ---: |\n");
        for p in &sim.periods {
            md.push_str(&format!(
                "| {} | {} | {:.2} | {:.2} | {:.2} | {:.2} |\n",
                p.key,
                p.trade_count,
                p.net_pl,
                p.closing_equity,
                p.withdrawn,
                p.equity_after_withdrawal
            ));
        }
        md.push('\n');
    }

    md
}
