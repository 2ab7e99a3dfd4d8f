//! Reporting and export — CSV, JSON, and Markdown artifact generation.
//!
//! Provides three export formats for screen results:
//! - **CSV**: the screen table, one line per (company, metric)
//! - **JSON**: full round-trip serialization with schema versioning
//! - **Markdown**: human-readable run summary with the shortlisted companies
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use valuescreen_core::{CompanyKey, Labels, OutputRow};

use crate::runner::{ScreenResult, SCHEMA_VERSION};

/// Byte-order mark written ahead of the CSV so spreadsheet tools pick UTF-8
/// for the Hangul marker labels.
const UTF8_BOM: &str = "\u{feff}";

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the screen table as CSV.
///
/// Columns: Code, Name, Metric, one column per fiscal year, SizeBucket,
/// PBR_Basis, PER_Basis, EPS_CAGR, Undervalued, HighGrowth. Undefined
/// numeric cells are empty.
pub fn export_table_csv(result: &ScreenResult) -> Result<String> {
    let labels = &result.config.labels;
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["Code".to_string(), "Name".to_string(), "Metric".to_string()];
    header.extend(result.year_columns());
    header.extend(
        [
            "SizeBucket",
            "PBR_Basis",
            "PER_Basis",
            "EPS_CAGR",
            "Undervalued",
            "HighGrowth",
        ]
        .map(String::from),
    );
    wtr.write_record(&header)?;

    for row in &result.rows {
        wtr.write_record(table_record(row, labels))?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

fn table_record(row: &OutputRow, labels: &Labels) -> Vec<String> {
    let c = &row.classification;
    let mut record = Vec::with_capacity(row.values.len() + 9);
    record.push(row.company.code.clone());
    record.push(row.company.name.clone());
    record.push(row.metric.as_str().to_string());
    record.extend(row.values.iter().map(|v| format_cell(*v)));
    record.push(row.size_display(labels).to_string());
    record.push(format_cell(c.pbr_basis));
    record.push(format_cell(c.per_basis));
    record.push(row.cagr_display(labels));
    record.push(row.undervalued_display(labels).to_string());
    record.push(row.high_growth_display(labels).to_string());
    record
}

fn format_cell(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScreenResult` to pretty JSON.
pub fn export_json(result: &ScreenResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize ScreenResult to JSON")
}

/// Deserialize a `ScreenResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<ScreenResult> {
    let result: ScreenResult =
        serde_json::from_str(json).context("failed to deserialize ScreenResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── Markdown report ────────────────────────────────────────────────

/// Generate a Markdown report for a screen run.
pub fn generate_report(result: &ScreenResult) -> String {
    let mut md = String::with_capacity(2048);
    let f = &result.fingerprint;
    let s = &result.summary;
    let labels = &result.config.labels;

    md.push_str("# Screen Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Run At | {} |\n", f.timestamp.format("%Y-%m-%d %H:%M:%S")));
    md.push_str(&format!(
        "| Fiscal Years | {}–{} |\n",
        result.config.first_year, result.config.last_year
    ));
    md.push_str(&format!("| Facts | {} |\n", f.fact_count));
    md.push_str(&format!("| Config Hash | {} |\n", f.config_hash));
    md.push_str(&format!("| Dataset Hash | {} |\n", f.dataset_hash));
    md.push_str(&format!("| Output Hash | {} |\n", f.output_hash));
    md.push('\n');

    md.push_str("## Rules\n\n");
    md.push_str(&format!(
        "- {}: PER < {} and PBR < {} in {}\n",
        labels.undervalued, result.config.per_max, result.config.pbr_max, result.config.last_year
    ));
    md.push_str(&format!(
        "- {}: EPS CAGR {}–{} above {:.1}%\n",
        labels.high_growth,
        result.config.cagr_base_year,
        result.config.last_year,
        result.config.growth_threshold * 100.0
    ));
    md.push_str(&format!(
        "- {}: market cap at least {:.0}\n",
        labels.large, result.config.large_cap_min
    ));
    md.push('\n');

    md.push_str("## Summary\n\n");
    md.push_str("| Count | Value |\n");
    md.push_str("| --- | ---: |\n");
    md.push_str(&format!("| Companies | {} |\n", s.companies));
    md.push_str(&format!("| Rows | {} |\n", s.rows));
    md.push_str(&format!("| {} | {} |\n", labels.undervalued, s.undervalued));
    md.push_str(&format!("| {} | {} |\n", labels.high_growth, s.high_growth));
    md.push_str(&format!(
        "| {} + {} | {} |\n",
        labels.undervalued, labels.high_growth, s.both
    ));
    md.push_str(&format!("| {} | {} |\n", labels.large, s.large));
    md.push_str(&format!("| {} | {} |\n", labels.small_mid, s.small_mid));
    md.push_str(&format!("| EPS CAGR undefined | {} |\n", s.cagr_undefined));
    md.push_str(&format!("| PER recalculated | {} |\n", s.per_recalculated));
    md.push_str(&format!("| PBR recalculated | {} |\n", s.pbr_recalculated));
    md.push('\n');

    if !s.price_slots_by_tier.is_empty() {
        md.push_str("## Price Sources\n\n");
        md.push_str("| Tier | Slots Filled |\n");
        md.push_str("| --- | ---: |\n");
        for (tier, filled) in &s.price_slots_by_tier {
            md.push_str(&format!("| {tier} | {filled} |\n"));
        }
        md.push('\n');
    }

    let shortlist = shortlist(&result.rows);
    if !shortlist.is_empty() {
        md.push_str(&format!(
            "## {} + {}\n\n",
            labels.undervalued, labels.high_growth
        ));
        md.push_str("| Company | PER | PBR | EPS CAGR | Size |\n");
        md.push_str("| --- | ---: | ---: | ---: | --- |\n");
        for row in shortlist.values() {
            let c = &row.classification;
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                row.company,
                c.per_basis.map(|v| format!("{v:.2}")).unwrap_or_default(),
                c.pbr_basis.map(|v| format!("{v:.2}")).unwrap_or_default(),
                row.cagr_display(labels),
                row.size_display(labels),
            ));
        }
        md.push('\n');
    }

    md
}

/// One row per company flagged both undervalued and high growth.
fn shortlist(rows: &[OutputRow]) -> BTreeMap<&CompanyKey, &OutputRow> {
    let mut out = BTreeMap::new();
    for row in rows {
        let c = &row.classification;
        if c.is_undervalued && c.is_high_growth {
            out.entry(&row.company).or_insert(row);
        }
    }
    out
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for a screen run.
///
/// Creates a directory named `screen_{timestamp}/` under `output_dir`
/// containing:
/// - `Stock_Analysis_{date}.csv` — the screen table (UTF-8 with BOM)
/// - `manifest.json` — the full `ScreenResult`
/// - `report.md` — the Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(result: &ScreenResult, output_dir: &Path) -> Result<PathBuf> {
    let ts = result.fingerprint.timestamp;
    let run_dir = output_dir.join(format!("screen_{}", ts.format("%Y%m%d_%H%M%S")));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let table = export_table_csv(result)?;
    let table_path = run_dir.join(format!("Stock_Analysis_{}.csv", ts.format("%Y%m%d")));
    std::fs::write(&table_path, format!("{UTF8_BOM}{table}"))
        .with_context(|| format!("failed to write {}", table_path.display()))?;

    let json = export_json(result)?;
    std::fs::write(run_dir.join("manifest.json"), &json)?;

    std::fs::write(run_dir.join("report.md"), generate_report(result))?;

    tracing::info!(dir = %run_dir.display(), "artifacts saved");
    Ok(run_dir)
}

/// Load a `ScreenResult` from an artifact directory's manifest.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<ScreenResult> {
    let manifest_path = dir.join("manifest.json");
    let json = std::fs::read_to_string(&manifest_path)
        .with_context(|| format!("failed to read {}", manifest_path.display()))?;
    import_json(&json)
}
