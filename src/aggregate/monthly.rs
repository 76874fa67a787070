// src/aggregate/monthly.rs

use serde::Serialize;
use tracing::info;

use super::Aggregation;
use crate::error::Result;
use crate::warehouse::{schema, Warehouse, MONTHLY_REVENUE_TABLE, RAW_TABLE};

/// Revenue by calendar month and product category.
pub struct MonthlyRevenue;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyRevenueRow {
    /// `YYYY-MM`
    pub year_month: String,
    pub category: Option<String>,
    pub total_revenue: f64,
    pub order_count: i64,
    pub avg_order_value: f64,
}

impl Aggregation for MonthlyRevenue {
    const TABLE: &'static str = MONTHLY_REVENUE_TABLE;

    fn create_sql() -> &'static str {
        schema::CREATE_MONTHLY_REVENUE_TABLE
    }

    fn insert_sql() -> String {
        format!(
            "INSERT INTO {MONTHLY_REVENUE_TABLE}
                (year_month, category, total_revenue, order_count, avg_order_value)
            SELECT
                strftime(date_col, '%Y-%m') AS year_month,
                category,
                SUM(COALESCE(amount, 0)) AS total_revenue,
                COUNT(*) AS order_count,
                AVG(COALESCE(amount, 0)) AS avg_order_value
            FROM {RAW_TABLE}
            GROUP BY strftime(date_col, '%Y-%m'), category
            ORDER BY year_month, total_revenue DESC"
        )
    }

    fn log_summary(wh: &Warehouse) -> Result<()> {
        let mut stmt = wh.connection().prepare(&format!(
            "SELECT year_month, category, total_revenue, order_count
            FROM {MONTHLY_REVENUE_TABLE}
            ORDER BY total_revenue DESC
            LIMIT 5"
        ))?;
        let top = stmt.query_map([], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, Option<String>>(1)?,
                r.get::<_, f64>(2)?,
                r.get::<_, i64>(3)?,
            ))
        })?;
        info!("top monthly revenue:");
        for row in top {
            let (ym, category, revenue, count) = row?;
            info!(
                "{} {}: {:.0} ({} orders)",
                ym,
                category.as_deref().unwrap_or("<none>"),
                revenue,
                count
            );
        }
        Ok(())
    }
}

impl MonthlyRevenue {
    /// All rows, ordered by month then category.
    pub fn fetch(wh: &Warehouse) -> Result<Vec<MonthlyRevenueRow>> {
        let mut stmt = wh.connection().prepare(&format!(
            "SELECT year_month, category, total_revenue, order_count, avg_order_value
            FROM {MONTHLY_REVENUE_TABLE}
            ORDER BY year_month, category NULLS LAST"
        ))?;
        let rows = stmt
            .query_map([], |r| {
                Ok(MonthlyRevenueRow {
                    year_month: r.get(0)?,
                    category: r.get(1)?,
                    total_revenue: r.get(2)?,
                    order_count: r.get(3)?,
                    avg_order_value: r.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::materialize;
    use crate::aggregate::test_support::{cleaned, loaded, row};

    fn rows() -> Vec<crate::load::RawRecord> {
        vec![
            row("04-30-22", "Shipped", "Set", Some("400"), Some("1")),
            row("04-02-22", "Shipped", "Set", Some("200"), Some("1")),
            row("04-15-22", "Cancelled", "Set", Some("999"), Some("1")),
            row("04-15-22", "Shipped", "kurta", Some("150.5"), Some("2")),
            row("05-01-22", "Shipped", "Set", None, None),
            row("05-03-22", "Pending", "Western Dress", Some("750"), Some("1")),
        ]
    }

    #[test]
    fn groups_by_month_and_category() {
        let wh = loaded(&rows());
        assert_eq!(materialize::<MonthlyRevenue>(&wh).unwrap(), 4);

        let out = MonthlyRevenue::fetch(&wh).unwrap();
        assert_eq!(out[0].year_month, "2022-04");
        assert_eq!(out[0].category.as_deref(), Some("Set"));
        assert_eq!(out[0].order_count, 3);
        assert_eq!(out[0].total_revenue, 600.0);
        assert_eq!(out[0].avg_order_value, 200.0);

        assert_eq!(out[1].category.as_deref(), Some("kurta"));
        assert_eq!(out[1].total_revenue, 150.5);

        // missing amount counts as 0
        assert_eq!(out[2].year_month, "2022-05");
        assert_eq!(out[2].category.as_deref(), Some("Set"));
        assert_eq!(out[2].total_revenue, 0.0);
        assert_eq!(out[2].order_count, 1);
    }

    #[test]
    fn totals_match_cleaned_amounts() {
        let wh = loaded(&rows());
        materialize::<MonthlyRevenue>(&wh).unwrap();

        let cleaned_sum: f64 = cleaned(&rows()).iter().filter_map(|r| r.amount).sum();
        let monthly_sum: f64 = MonthlyRevenue::fetch(&wh)
            .unwrap()
            .iter()
            .map(|r| r.total_revenue)
            .sum();
        assert!((cleaned_sum - monthly_sum).abs() < 1e-9);
    }

    #[test]
    fn empty_warehouse_gives_zero_rows() {
        let wh = loaded(&[]);
        assert_eq!(materialize::<MonthlyRevenue>(&wh).unwrap(), 0);
        assert!(MonthlyRevenue::fetch(&wh).unwrap().is_empty());
    }

    #[test]
    fn missing_category_and_negative_amount_keep_totals() {
        let rows = vec![
            row("04-10-22", "Shipped", "Set", Some("100"), Some("1")),
            crate::load::RawRecord {
                category: None,
                ..row("04-11-22", "Shipped", "", Some("50"), Some("1"))
            },
            row("04-12-22", "Shipped", "Set", Some("-5"), Some("1")),
        ];
        let wh = loaded(&rows);
        assert_eq!(materialize::<MonthlyRevenue>(&wh).unwrap(), 2);

        let out = MonthlyRevenue::fetch(&wh).unwrap();
        assert_eq!(out[0].category.as_deref(), Some("Set"));
        assert_eq!(out[0].order_count, 2);
        assert_eq!(out[0].total_revenue, 100.0);
        assert_eq!(out[1].category, None);
        assert_eq!(out[1].order_count, 1);
        assert_eq!(out[1].total_revenue, 50.0);

        let cleaned_sum: f64 = cleaned(&rows).iter().filter_map(|r| r.amount).sum();
        let monthly_sum: f64 = out.iter().map(|r| r.total_revenue).sum();
        assert_eq!(cleaned_sum, 150.0);
        assert!((cleaned_sum - monthly_sum).abs() < 1e-9);
    }

    #[test]
    fn stamps_creation_time() {
        let wh = loaded(&rows());
        materialize::<MonthlyRevenue>(&wh).unwrap();
        let stamped: i64 = wh
            .connection()
            .query_row("SELECT COUNT(created_at) FROM monthly_revenue", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stamped, 4);
    }

    #[test]
    fn rerun_replaces_rows() {
        let wh = loaded(&rows());
        materialize::<MonthlyRevenue>(&wh).unwrap();
        assert_eq!(materialize::<MonthlyRevenue>(&wh).unwrap(), 4);
    }
}
