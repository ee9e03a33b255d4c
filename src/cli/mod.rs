//! Command-line interface
//!
//! `run` prepares, splits and scales a raw CSV export; `inspect` summarizes
//! a CSV file column by column.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::preprocessing::{summarize, ColumnType, HousingPipeline, PipelineConfig};
use crate::source::{read_csv, write_csv, CachedSource, CsvSource, RecordSource};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString { s.truecolor(100, 210, 120) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "housing-prep")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Clean, split and scale housing-price property records")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Prepare, split and scale a raw property export
    Run {
        /// Raw property records (CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Continuous target column used for stratification
        #[arg(short, long, default_value = "taxvaluedollarcnt")]
        target: String,

        /// Directory receiving train.csv, validate.csv and test.csv
        #[arg(short, long, default_value = "prepared")]
        output: PathBuf,

        /// Pipeline configuration (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Local CSV cache of the raw records
        #[arg(long)]
        cache: Option<PathBuf>,

        /// Ignore an existing cache and re-read the raw records
        #[arg(long)]
        refresh: bool,
    },

    /// Show column types, null counts and ranges of a CSV file
    Inspect {
        /// Input CSV file
        #[arg(short, long)]
        data: PathBuf,
    },
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_run(
    data_path: &Path,
    target: &str,
    output_dir: &Path,
    config_path: Option<&Path>,
    cache_path: Option<&Path>,
    refresh: bool,
) -> anyhow::Result<()> {
    section("Run");

    let config = match config_path {
        Some(path) => {
            let config = PipelineConfig::from_file(path)?;
            step_ok(&format!("Config {}", path.display()));
            config
        }
        None => PipelineConfig::default(),
    };

    step_run("Loading records");
    let start = Instant::now();
    let source = CsvSource::new(data_path);
    let raw = match cache_path {
        Some(cache) => CachedSource::new(source, cache).with_cache(!refresh).fetch()?,
        None => source.fetch()?,
    };
    step_done(&format!("{} rows × {} cols in {:?}", raw.height(), raw.width(), start.elapsed()));

    let pipeline = HousingPipeline::with_config(config);

    step_run("Preparing");
    let start = Instant::now();
    let prepared = pipeline.prepare(&raw)?;
    step_done(&format!("{} rows × {} cols in {:?}", prepared.height(), prepared.width(), start.elapsed()));

    step_run("Encoding and splitting");
    let partitions = pipeline.split_and_encode(&prepared, target)?;
    step_done(&format!(
        "train {} / validate {} / test {}",
        partitions.train.height(),
        partitions.validate.height(),
        partitions.test.height()
    ));

    step_run("Scaling");
    let scaled = pipeline.scale(&partitions, target)?;
    step_done(&format!("{} columns", scaled.state.ranges().len()));

    for warning in scaled.state.zero_variance_columns() {
        println!("  {} zero-variance column {}", accent("!"), warning.column.white());
    }

    for (name, df) in [("train", &scaled.train), ("validate", &scaled.validate), ("test", &scaled.test)] {
        let path = output_dir.join(format!("{}.csv", name));
        write_csv(df, &path)?;
        step_ok(&format!("{} → {}", name, path.display()));
    }

    println!();
    Ok(())
}

pub fn cmd_inspect(data_path: &Path) -> anyhow::Result<()> {
    section("Inspect");

    let df = read_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), data_path.display());
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!(
        "  {:<30} {:<12} {:>6} {:>8} {:>14} {:>14}",
        muted("Column"),
        muted("Type"),
        muted("Nulls"),
        muted("Unique"),
        muted("Min"),
        muted("Max")
    );
    println!("  {}", dim(&"─".repeat(88)));

    for stats in summarize(&df)? {
        let range = |v: Option<f64>| v.map(|x| format!("{:.4}", x)).unwrap_or_else(|| "-".to_string());
        let dtype = match stats.dtype {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
            ColumnType::Other => "other",
        };
        println!(
            "  {:<30} {:<12} {:>6} {:>8} {:>14} {:>14}",
            stats.name,
            dtype.truecolor(140, 140, 140),
            stats.null_count,
            stats.unique_count,
            range(stats.min),
            range(stats.max)
        );
    }

    println!();
    Ok(())
}
