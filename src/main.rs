use anyhow::{Context, Result};
use clap::Parser;
use salespipe::{config::PipelineConfig, pipeline};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Amazon sales batch ETL: CSV -> cleaned rows -> DuckDB -> reporting tables.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// YAML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Raw sales CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// DuckDB database file (tables are recreated on each run)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Also write the cleaned rows to this CSV file
    #[arg(long)]
    cleaned_csv: Option<PathBuf>,

    /// Write the run report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::from_yaml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(csv) = self.csv {
            cfg.csv_path = csv;
        }
        if let Some(db) = self.db {
            cfg.database_path = db;
        }
        if self.cleaned_csv.is_some() {
            cfg.cleaned_csv_path = self.cleaned_csv;
        }
        if self.report.is_some() {
            cfg.report_path = self.report;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();

    // ─── 2) resolve config ───────────────────────────────────────────
    let cfg = Args::parse().into_config()?;
    info!(
        csv = %cfg.csv_path.display(),
        db = %cfg.database_path.display(),
        "startup"
    );

    // ─── 3) run the five steps ───────────────────────────────────────
    let report = pipeline::run(&cfg).map_err(|e| {
        error!("pipeline failed: {}", e);
        e
    })?;

    info!(
        "daily orders table created with {} records",
        report.daily_orders_rows
    );
    info!(
        "monthly revenue table created with {} records",
        report.monthly_revenue_rows
    );
    Ok(())
}
