// src/pipeline.rs

use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use tracing::info;

use crate::aggregate::{materialize, DailyOrders, MonthlyRevenue};
use crate::clean::{self, CleanedData, CleaningRules, CleaningStats};
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::load::{self, CsvSource};
use crate::warehouse::{QualityCheck, Warehouse};

/// Outcome of one full run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub source: PathBuf,
    pub database: PathBuf,
    pub cleaned_csv: Option<PathBuf>,
    pub cleaning: CleaningStats,
    pub records_inserted: usize,
    pub quality: QualityCheck,
    pub monthly_revenue_rows: usize,
    pub daily_orders_rows: usize,
    pub elapsed_ms: u64,
}

impl PipelineReport {
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Step 1: validate the input file.
pub fn load_step(cfg: &PipelineConfig) -> Result<CsvSource> {
    load::locate_csv(&cfg.csv_path)
}

/// Step 2: read every row and apply the business rules.
#[tracing::instrument(name = "clean", level = "info", skip_all)]
pub fn clean_step(source: &CsvSource, rules: &CleaningRules, cleaned_csv: Option<&Path>) -> Result<CleanedData> {
    let raw = load::read_raw_records(source)?;
    let cleaned = clean::clean_records(&raw, rules);
    if let Some(path) = cleaned_csv {
        clean::write_cleaned_csv(&cleaned.records, path)?;
    }
    Ok(cleaned)
}

/// Step 3: recreate the tables and bulk-load the cleaned rows.
#[tracing::instrument(name = "warehouse", level = "info", skip_all, fields(db = %db_path.display()))]
pub fn warehouse_step(db_path: &Path, cleaned: &CleanedData) -> Result<(usize, QualityCheck)> {
    let wh = Warehouse::open(db_path)?;
    wh.recreate_schema()?;
    let inserted = wh.load_records(&cleaned.records)?;
    let quality = wh.quality_check()?;
    Ok((inserted, quality))
}

/// Step 4: revenue by month and category.
#[tracing::instrument(name = "monthly_revenue", level = "info", skip_all)]
pub fn monthly_step(db_path: &Path) -> Result<usize> {
    let wh = Warehouse::open(db_path)?;
    materialize::<MonthlyRevenue>(&wh)
}

/// Step 5: orders by day and status.
#[tracing::instrument(name = "daily_orders", level = "info", skip_all)]
pub fn daily_step(db_path: &Path) -> Result<usize> {
    let wh = Warehouse::open(db_path)?;
    materialize::<DailyOrders>(&wh)
}

/// Run all five steps in order. The first error stops the run.
#[tracing::instrument(name = "pipeline", level = "info", skip_all, fields(csv = %cfg.csv_path.display()))]
pub fn run(cfg: &PipelineConfig) -> Result<PipelineReport> {
    let start = Instant::now();
    let rules = cfg.cleaning_rules()?;

    let source = load_step(cfg)?;
    let cleaned = clean_step(&source, &rules, cfg.cleaned_csv_path.as_deref())?;
    let (records_inserted, quality) = warehouse_step(&cfg.database_path, &cleaned)?;
    let monthly_revenue_rows = monthly_step(&cfg.database_path)?;
    let daily_orders_rows = daily_step(&cfg.database_path)?;

    let report = PipelineReport {
        source: source.path,
        database: cfg.database_path.clone(),
        cleaned_csv: cfg.cleaned_csv_path.clone(),
        cleaning: cleaned.stats,
        records_inserted,
        quality,
        monthly_revenue_rows,
        daily_orders_rows,
        elapsed_ms: start.elapsed().as_millis() as u64,
    };

    if let Some(path) = &cfg.report_path {
        report.write_json(path)?;
        info!(path = %path.display(), "wrote run report");
    }
    info!(
        inserted = report.records_inserted,
        monthly = report.monthly_revenue_rows,
        daily = report.daily_orders_rows,
        elapsed_ms = report.elapsed_ms,
        "pipeline finished"
    );
    Ok(report)
}
