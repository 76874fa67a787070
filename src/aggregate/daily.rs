// src/aggregate/daily.rs

use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use super::Aggregation;
use crate::error::Result;
use crate::warehouse::{schema, Warehouse, DAILY_ORDERS_TABLE, RAW_TABLE};

/// Order counts by calendar day and order status.
pub struct DailyOrders;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyOrdersRow {
    pub order_date: NaiveDate,
    pub status: Option<String>,
    pub order_count: i64,
    /// Rows without a quantity count as one unit.
    pub total_quantity: i64,
    pub total_amount: f64,
}

impl Aggregation for DailyOrders {
    const TABLE: &'static str = DAILY_ORDERS_TABLE;

    fn create_sql() -> &'static str {
        schema::CREATE_DAILY_ORDERS_TABLE
    }

    fn insert_sql() -> String {
        format!(
            "INSERT INTO {DAILY_ORDERS_TABLE}
                (order_date, status, order_count, total_quantity, total_amount)
            SELECT
                date_col AS order_date,
                status,
                COUNT(*) AS order_count,
                CAST(SUM(COALESCE(qty, 1)) AS BIGINT) AS total_quantity,
                SUM(COALESCE(amount, 0)) AS total_amount
            FROM {RAW_TABLE}
            GROUP BY date_col, status
            ORDER BY order_date, status"
        )
    }

    fn log_summary(wh: &Warehouse) -> Result<()> {
        let mut stmt = wh.connection().prepare(&format!(
            "SELECT
                status,
                COUNT(*) AS days,
                CAST(SUM(order_count) AS BIGINT) AS total_orders,
                SUM(total_amount) AS total_amount
            FROM {DAILY_ORDERS_TABLE}
            GROUP BY status
            ORDER BY total_orders DESC"
        ))?;
        let by_status = stmt.query_map([], |r| {
            Ok((
                r.get::<_, Option<String>>(0)?,
                r.get::<_, i64>(1)?,
                r.get::<_, i64>(2)?,
                r.get::<_, f64>(3)?,
            ))
        })?;
        info!("daily orders by status:");
        for row in by_status {
            let (status, days, orders, amount) = row?;
            info!(
                "{}: {} orders across {} days, {:.0} total",
                status.as_deref().unwrap_or("<none>"),
                orders,
                days,
                amount
            );
        }
        Ok(())
    }
}

impl DailyOrders {
    /// All rows, ordered by day then status.
    pub fn fetch(wh: &Warehouse) -> Result<Vec<DailyOrdersRow>> {
        let mut stmt = wh.connection().prepare(&format!(
            "SELECT order_date, status, order_count, total_quantity, total_amount
            FROM {DAILY_ORDERS_TABLE}
            ORDER BY order_date, status NULLS LAST"
        ))?;
        let rows = stmt
            .query_map([], |r| {
                Ok(DailyOrdersRow {
                    order_date: r.get(0)?,
                    status: r.get(1)?,
                    order_count: r.get(2)?,
                    total_quantity: r.get(3)?,
                    total_amount: r.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
