// src/warehouse/mod.rs

pub mod schema;

use chrono::{NaiveDate, Utc};
use duckdb::{params, Connection};
use serde::Serialize;
use std::{path::Path, time::Instant};
use tracing::{debug, info};

use crate::clean::CleanRecord;
use crate::error::{PipelineError, Result};
pub use schema::{DAILY_ORDERS_TABLE, MONTHLY_REVENUE_TABLE, RAW_TABLE};

/// One open DuckDB database holding the warehouse and aggregation tables.
/// Dropping it closes the connection.
pub struct Warehouse {
    conn: Connection,
    location: String,
}

/// Quick profile of the warehouse table, logged after each load.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityCheck {
    pub total_records: i64,
    pub positive_amount: i64,
    pub flagged: i64,
    pub unique_categories: i64,
    pub unique_statuses: i64,
    pub min_amount: Option<f64>,
    pub max_amount: Option<f64>,
    pub min_date: Option<NaiveDate>,
    pub max_date: Option<NaiveDate>,
}

impl Warehouse {
    /// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let location = path.as_ref().display().to_string();
        let conn = Connection::open(path.as_ref()).map_err(|source| {
            PipelineError::WarehouseUnavailable {
                path: location.clone(),
                source,
            }
        })?;
        debug!(db = %location, "opened warehouse");
        Ok(Self { conn, location })
    }

    /// Open a DuckDB in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let location = ":memory:".to_string();
        let conn = Connection::open_in_memory().map_err(|source| {
            PipelineError::WarehouseUnavailable {
                path: location.clone(),
                source,
            }
        })?;
        Ok(Self { conn, location })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Drop and recreate the warehouse and aggregation tables.
    pub fn recreate_schema(&self) -> Result<()> {
        self.conn.execute_batch(&schema::recreate_all_sql())?;
        info!(db = %self.location, "recreated warehouse tables");
        Ok(())
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let n: i64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?;
        Ok(n as usize)
    }

    /// Bulk-insert cleaned rows through the appender and return the
    /// resulting row count of the warehouse table.
    #[tracing::instrument(level = "info", skip_all, fields(db = %self.location, rows = records.len()))]
    pub fn load_records(&self, records: &[CleanRecord]) -> Result<usize> {
        let start = Instant::now();
        let ingested_at = Utc::now().naive_utc();
        {
            let mut appender = self.conn.appender(RAW_TABLE)?;
            for r in records {
                appender.append_row(params![
                    r.index_id,
                    r.order_id,
                    r.date,
                    r.category,
                    r.size,
                    r.sku,
                    r.asin,
                    r.style,
                    r.status,
                    r.courier_status,
                    r.qty,
                    r.amount,
                    r.currency,
                    r.ship_service_level,
                    r.ship_city,
                    r.ship_state,
                    r.ship_postal_code,
                    r.ship_country,
                    r.sales_channel,
                    r.fulfilled_by,
                    r.promotion_ids,
                    r.data_quality_flag,
                    ingested_at,
                ])?;
            }
            appender.flush()?;
        }

        let inserted = self.row_count(RAW_TABLE)?;
        info!(
            inserted,
            elapsed = ?start.elapsed(),
            "inserted records into {}",
            RAW_TABLE
        );
        Ok(inserted)
    }

    pub fn quality_check(&self) -> Result<QualityCheck> {
        let sql = format!(
            "SELECT
                COUNT(*),
                COUNT(CASE WHEN amount > 0 THEN 1 END),
                COUNT(data_quality_flag),
                COUNT(DISTINCT category),
                COUNT(DISTINCT status),
                MIN(amount),
                MAX(amount),
                MIN(date_col),
                MAX(date_col)
            FROM {RAW_TABLE}"
        );
        let check = self.conn.query_row(&sql, [], |r| {
            Ok(QualityCheck {
                total_records: r.get(0)?,
                positive_amount: r.get(1)?,
                flagged: r.get(2)?,
                unique_categories: r.get(3)?,
                unique_statuses: r.get(4)?,
                min_amount: r.get(5)?,
                max_amount: r.get(6)?,
                min_date: r.get(7)?,
                max_date: r.get(8)?,
            })
        })?;
        info!(
            total = check.total_records,
            positive_amount = check.positive_amount,
            flagged = check.flagged,
            categories = check.unique_categories,
            statuses = check.unique_statuses,
            min_amount = ?check.min_amount,
            max_amount = ?check.max_amount,
            "warehouse quality check, dates {:?} to {:?}",
            check.min_date,
            check.max_date
        );
        Ok(check)
    }
}
