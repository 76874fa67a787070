// src/aggregate/mod.rs

pub mod daily;
pub mod monthly;

use std::time::Instant;
use tracing::{info, warn};

use crate::error::Result;
use crate::warehouse::Warehouse;
pub use daily::{DailyOrders, DailyOrdersRow};
pub use monthly::{MonthlyRevenue, MonthlyRevenueRow};

/// A reporting table derived from the warehouse table by one GROUP BY.
pub trait Aggregation {
    /// Target table name.
    const TABLE: &'static str;

    /// `CREATE TABLE IF NOT EXISTS` for the target.
    fn create_sql() -> &'static str;

    /// `INSERT INTO <TABLE> SELECT ... GROUP BY ...` over the warehouse table.
    fn insert_sql() -> String;

    /// Log a short digest of the materialized rows.
    fn log_summary(wh: &Warehouse) -> Result<()>;
}

/// Rebuild `A::TABLE` from the warehouse table and return its row count.
/// An empty warehouse gives an empty table, not an error.
pub fn materialize<A: Aggregation>(wh: &Warehouse) -> Result<usize> {
    let start = Instant::now();
    let conn = wh.connection();
    conn.execute_batch(A::create_sql())?;
    conn.execute(&format!("DELETE FROM {}", A::TABLE), [])?;
    conn.execute(&A::insert_sql(), [])?;

    let created = wh.row_count(A::TABLE)?;
    info!(table = A::TABLE, rows = created, elapsed = ?start.elapsed(), "materialized");
    if created > 0 {
        A::log_summary(wh)?;
    } else {
        warn!(table = A::TABLE, "no rows produced; warehouse table is empty");
    }
    Ok(created)
}
