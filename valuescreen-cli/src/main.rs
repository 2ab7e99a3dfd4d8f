//! ValueScreen CLI — screen, inspect, and config commands.
//!
//! Commands:
//! - `screen` — run the screen over a fact file from a TOML config or flags
//! - `inspect` — summarise a saved artifact directory, optionally one company
//! - `config` — print the default run configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use valuescreen_core::Labels;
use valuescreen_runner::{
    load_artifacts, run_from_config, save_artifacts, RunConfig, ScreenResult,
};

#[derive(Parser)]
#[command(
    name = "valuescreen",
    about = "ValueScreen CLI — reconcile financial facts and screen for undervalued growth"
)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Screen a long-format fact file (CSV or Parquet).
    Screen {
        /// Path to a TOML run config.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Fact file. Overrides the config's input.
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output directory for artifacts. Overrides the config's output_dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Screen companies one at a time instead of on the thread pool.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Print the summary only; write no artifacts.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Summarise a saved artifact directory.
    Inspect {
        /// Directory written by `screen` (contains manifest.json).
        dir: PathBuf,

        /// Print every row for this company code.
        #[arg(long)]
        company: Option<String>,
    },
    /// Print the default run configuration as TOML.
    Config {
        /// Input path to put in the generated config.
        #[arg(long, default_value = "stock_data_raw.csv")]
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.json);

    match cli.command {
        Commands::Screen {
            config,
            input,
            output_dir,
            sequential,
            dry_run,
        } => run_screen_cmd(config, input, output_dir, sequential, dry_run),
        Commands::Inspect { dir, company } => run_inspect(dir, company),
        Commands::Config { input } => {
            print!("{}", RunConfig::for_input(input).to_toml()?);
            Ok(())
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn run_screen_cmd(
    config_path: Option<PathBuf>,
    input: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    sequential: bool,
    dry_run: bool,
) -> Result<()> {
    let mut config = match (config_path, input.as_ref()) {
        (Some(path), _) => RunConfig::from_file(&path)
            .with_context(|| format!("failed to load run config {}", path.display()))?,
        (None, Some(input)) => RunConfig::for_input(input),
        (None, None) => bail!("one of --config or --input is required"),
    };
    if let Some(input) = input {
        config.input = input;
    }
    if let Some(dir) = output_dir {
        config.output_dir = dir;
    }
    if sequential {
        config.parallel = false;
    }

    tracing::info!(
        input = %config.input.display(),
        parallel = config.parallel,
        run_id = %config.run_id(),
        "starting screen"
    );
    let result = run_from_config(&config)
        .with_context(|| format!("screen failed for {}", config.input.display()))?;

    print_summary(&result);

    if !dry_run {
        let run_dir = save_artifacts(&result, &config.output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn run_inspect(dir: PathBuf, company: Option<String>) -> Result<()> {
    let result = load_artifacts(&dir)?;

    let Some(code) = company else {
        print_summary(&result);
        return Ok(());
    };

    let rows: Vec<_> = result
        .rows
        .iter()
        .filter(|r| r.company.code == code)
        .collect();
    let Some(first) = rows.first() else {
        bail!("company '{code}' not found in {}", dir.display());
    };

    let labels = &result.config.labels;
    let c = &first.classification;
    println!();
    println!("=== {} ===", first.company);
    println!("Size:           {}", first.size_display(labels));
    println!("PER basis:      {}", fmt_opt(c.per_basis));
    println!("PBR basis:      {}", fmt_opt(c.pbr_basis));
    println!("EPS CAGR:       {}", first.cagr_display(labels));
    println!("Market cap:     {:.0}", c.market_cap);
    println!("Flags:          {}", flags(c.is_undervalued, c.is_high_growth, labels));
    println!();

    let years = result.year_columns();
    print!("{:<8}", "Metric");
    for y in &years {
        print!("{y:>14}");
    }
    println!();
    for row in rows {
        print!("{:<8}", row.metric.as_str());
        for v in &row.values {
            print!("{:>14}", fmt_opt(*v));
        }
        println!();
    }

    Ok(())
}

fn print_summary(result: &ScreenResult) {
    let s = &result.summary;
    let f = &result.fingerprint;
    let labels = &result.config.labels;

    println!();
    println!("=== Screen Result ===");
    println!(
        "Fiscal years:   {}–{}",
        result.config.first_year, result.config.last_year
    );
    println!("Facts:          {}", f.fact_count);
    println!("Companies:      {}", s.companies);
    println!("Rows:           {}", s.rows);
    println!();
    println!("--- Classification ---");
    println!("{:<16}{}", format!("{}:", labels.undervalued), s.undervalued);
    println!("{:<16}{}", format!("{}:", labels.high_growth), s.high_growth);
    println!("Both:           {}", s.both);
    println!("{:<16}{}", format!("{}:", labels.large), s.large);
    println!("{:<16}{}", format!("{}:", labels.small_mid), s.small_mid);
    println!("CAGR undefined: {}", s.cagr_undefined);
    println!();
    println!("--- Price Sources ---");
    for (tier, filled) in &s.price_slots_by_tier {
        println!("{:<16}{filled}", format!("{tier}:"));
    }
    println!("PER recomputed: {}", s.per_recalculated);
    println!("PBR recomputed: {}", s.pbr_recalculated);
    println!();
    println!("Dataset hash:   {}", f.dataset_hash);
    println!("Output hash:    {}", f.output_hash);
}

fn fmt_opt(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_else(|| "-".to_string())
}

fn flags(undervalued: bool, high_growth: bool, labels: &Labels) -> String {
    let mut out = Vec::new();
    if undervalued {
        out.push(labels.undervalued.as_str());
    }
    if high_growth {
        out.push(labels.high_growth.as_str());
    }
    if out.is_empty() {
        labels.placeholder.clone()
    } else {
        out.join(", ")
    }
}
