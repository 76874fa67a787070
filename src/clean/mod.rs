// src/clean/mod.rs

pub mod date_parser;
pub mod utils;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use std::{fs::File, io::BufWriter, path::Path};
use tracing::{debug, info, warn};

use crate::error::{PipelineError, Result};
use crate::load::RawRecord;
use utils::{clean_opt, parse_amount, parse_qty};

pub const FLAG_MISSING_AMOUNT: &str = "missing_amount_non_cancelled";
pub const FLAG_NEGATIVE_AMOUNT: &str = "negative_amount";

/// The fixed business rules, compiled once per run.
#[derive(Debug, Clone)]
pub struct CleaningRules {
    pub default_currency: String,
    pub cancelled_status: Regex,
    pub date_formats: Vec<String>,
}

impl CleaningRules {
    pub fn new(default_currency: &str, cancelled_pattern: &str, date_formats: Vec<String>) -> Result<Self> {
        let cancelled_status = Regex::new(cancelled_pattern).map_err(|e| {
            PipelineError::Config(format!("cancelled_status_pattern `{}`: {}", cancelled_pattern, e))
        })?;
        Ok(Self {
            default_currency: default_currency.trim().to_string(),
            cancelled_status,
            date_formats,
        })
    }

    pub fn is_cancelled(&self, status: Option<&str>) -> bool {
        status.map_or(false, |s| self.cancelled_status.is_match(s.trim()))
    }
}

/// A row that passed cleaning. `date` and `currency` are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanRecord {
    pub index_id: i64,
    pub order_id: Option<String>,
    pub date: NaiveDate,
    pub category: Option<String>,
    pub size: Option<String>,
    pub sku: Option<String>,
    pub asin: Option<String>,
    pub style: Option<String>,
    pub status: Option<String>,
    pub courier_status: Option<String>,
    pub qty: Option<i64>,
    pub amount: Option<f64>,
    pub currency: String,
    pub ship_service_level: Option<String>,
    pub ship_city: Option<String>,
    pub ship_state: Option<String>,
    pub ship_postal_code: Option<String>,
    pub ship_country: Option<String>,
    pub sales_channel: Option<String>,
    pub fulfilled_by: Option<String>,
    pub promotion_ids: Option<String>,
    pub data_quality_flag: Option<String>,
}

/// What cleaning changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub rows_read: usize,
    pub rows_kept: usize,
    pub cancelled_zeroed: usize,
    pub currency_defaulted: usize,
    pub flagged_missing_amount: usize,
    pub flagged_negative_amount: usize,
    pub dropped_bad_date: usize,
    /// Rows touched by at least one rule, dropped rows included.
    /// Never exceeds `rows_read`.
    pub rows_affected: usize,
}

#[derive(Debug, Clone)]
pub struct CleanedData {
    pub records: Vec<CleanRecord>,
    pub stats: CleaningStats,
}

/// Apply the business rules to every raw row:
/// - cancelled orders get amount 0
/// - blank currency becomes the default
/// - the date is parsed; rows without a usable date are dropped
/// - non-cancelled rows without an amount, and negative amounts, are flagged
#[tracing::instrument(level = "info", skip_all, fields(rows = raw.len()))]
pub fn clean_records(raw: &[RawRecord], rules: &CleaningRules) -> CleanedData {
    let mut stats = CleaningStats {
        rows_read: raw.len(),
        ..CleaningStats::default()
    };
    let mut records = Vec::with_capacity(raw.len());

    for (pos, row) in raw.iter().enumerate() {
        let Some(date) = row
            .date
            .as_deref()
            .and_then(|d| date_parser::parse_order_date(d, &rules.date_formats))
        else {
            stats.dropped_bad_date += 1;
            stats.rows_affected += 1;
            debug!(row = pos, date = ?row.date, order_id = ?row.order_id, "dropping row with unparseable date");
            continue;
        };

        let status = clean_opt(row.status.as_deref());
        let mut amount = row.amount.as_deref().and_then(parse_amount);
        let mut flag = None;
        let mut touched = false;

        if rules.is_cancelled(status.as_deref()) {
            if amount != Some(0.0) {
                stats.cancelled_zeroed += 1;
                touched = true;
            }
            amount = Some(0.0);
        } else {
            match amount {
                None => {
                    stats.flagged_missing_amount += 1;
                    touched = true;
                    flag = Some(FLAG_MISSING_AMOUNT.to_string());
                }
                Some(v) if v < 0.0 => {
                    stats.flagged_negative_amount += 1;
                    touched = true;
                    flag = Some(FLAG_NEGATIVE_AMOUNT.to_string());
                    amount = Some(0.0);
                }
                Some(_) => {}
            }
        }

        let currency = match clean_opt(row.currency.as_deref()) {
            Some(c) => c,
            None => {
                stats.currency_defaulted += 1;
                touched = true;
                rules.default_currency.clone()
            }
        };
        if touched {
            stats.rows_affected += 1;
        }

        let index_id = row
            .index
            .as_deref()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .unwrap_or(pos as i64);

        records.push(CleanRecord {
            index_id,
            order_id: clean_opt(row.order_id.as_deref()),
            date,
            category: clean_opt(row.category.as_deref()),
            size: clean_opt(row.size.as_deref()),
            sku: clean_opt(row.sku.as_deref()),
            asin: clean_opt(row.asin.as_deref()),
            style: clean_opt(row.style.as_deref()),
            status,
            courier_status: clean_opt(row.courier_status.as_deref()),
            qty: row.qty.as_deref().and_then(parse_qty),
            amount,
            currency,
            ship_service_level: clean_opt(row.ship_service_level.as_deref()),
            ship_city: clean_opt(row.ship_city.as_deref()),
            ship_state: clean_opt(row.ship_state.as_deref()),
            ship_postal_code: clean_opt(row.ship_postal_code.as_deref()),
            ship_country: clean_opt(row.ship_country.as_deref()),
            sales_channel: clean_opt(row.sales_channel.as_deref()),
            fulfilled_by: clean_opt(row.fulfilled_by.as_deref()),
            promotion_ids: clean_opt(row.promotion_ids.as_deref()),
            data_quality_flag: flag,
        });
    }
    stats.rows_kept = records.len();

    info!(
        cancelled_zeroed = stats.cancelled_zeroed,
        currency_defaulted = stats.currency_defaulted,
        affected = stats.rows_affected,
        "cleaned {} of {} rows",
        stats.rows_kept,
        stats.rows_read
    );
    if stats.flagged_missing_amount > 0 || stats.flagged_negative_amount > 0 {
        warn!(
            missing_amount = stats.flagged_missing_amount,
            negative_amount = stats.flagged_negative_amount,
            "flagged data quality issues"
        );
    }
    if stats.dropped_bad_date > 0 {
        warn!(dropped = stats.dropped_bad_date, "dropped rows with unparseable dates");
    }

    CleanedData { records, stats }
}

/// Save the cleaned rows as CSV, one header row plus one line per record.
pub fn write_cleaned_csv(records: &[CleanRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut wtr = csv::Writer::from_writer(BufWriter::new(File::create(path)?));
    for rec in records {
        wtr.serialize(rec)?;
    }
    wtr.flush()?;
    info!(path = %path.display(), rows = records.len(), "saved cleaned data");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    fn rules() -> CleaningRules {
        PipelineConfig::default().cleaning_rules().unwrap()
    }

    fn raw(status: &str, amount: Option<&str>, currency: Option<&str>, date: &str) -> RawRecord {
        RawRecord {
            order_id: Some("171-0000000-0000000".into()),
            date: Some(date.into()),
            status: Some(status.into()),
            category: Some("Set".into()),
            amount: amount.map(Into::into),
            currency: currency.map(Into::into),
            ship_city: Some("MUMBAI".into()),
            ship_state: Some("MAHARASHTRA".into()),
            ..RawRecord::default()
        }
    }

    #[test]
    fn cancelled_orders_have_zero_amount() {
        let rows = vec![
            raw("Cancelled", None, Some("INR"), "04-30-22"),
            raw("Cancelled", Some("647.62"), Some("INR"), "04-30-22"),
            raw("cancelled ", Some("0"), Some("INR"), "04-30-22"),
            raw("Shipped", Some("406.00"), Some("INR"), "04-30-22"),
        ];
        let out = clean_records(&rows, &rules());
        for rec in &out.records {
            if rules().is_cancelled(rec.status.as_deref()) {
                assert_eq!(rec.amount, Some(0.0));
                assert_eq!(rec.data_quality_flag, None);
            }
        }
        assert_eq!(out.stats.cancelled_zeroed, 2);
        assert_eq!(out.records[3].amount, Some(406.0));
    }

    #[test]
    fn blank_currency_gets_default() {
        let rows = vec![
            raw("Shipped", Some("10"), None, "04-30-22"),
            raw("Shipped", Some("10"), Some("   "), "04-30-22"),
            raw("Shipped", Some("10"), Some("USD"), "04-30-22"),
        ];
        let out = clean_records(&rows, &rules());
        assert_eq!(out.records[0].currency, "INR");
        assert_eq!(out.records[1].currency, "INR");
        assert_eq!(out.records[2].currency, "USD");
        assert_eq!(out.stats.currency_defaulted, 2);
    }

    #[test]
    fn bad_dates_are_dropped_and_counted() {
        let rows = vec![
            raw("Shipped", Some("10"), Some("INR"), "04-30-22"),
            raw("Shipped", Some("10"), Some("INR"), "not a date"),
            RawRecord {
                date: None,
                ..raw("Shipped", Some("10"), Some("INR"), "")
            },
        ];
        let out = clean_records(&rows, &rules());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.stats.rows_read, 3);
        assert_eq!(out.stats.rows_kept, 1);
        assert_eq!(out.stats.dropped_bad_date, 2);
        assert_eq!(out.records[0].date, NaiveDate::from_ymd_opt(2022, 4, 30).unwrap());
    }

    #[test]
    fn missing_and_negative_amounts_are_flagged() {
        let rows = vec![
            raw("Shipped", None, Some("INR"), "04-30-22"),
            raw("Shipped", Some("-5"), Some("INR"), "04-30-22"),
        ];
        let out = clean_records(&rows, &rules());
        assert_eq!(out.records[0].amount, None);
        assert_eq!(out.records[0].data_quality_flag.as_deref(), Some(FLAG_MISSING_AMOUNT));
        assert_eq!(out.records[1].amount, Some(0.0));
        assert_eq!(out.records[1].data_quality_flag.as_deref(), Some(FLAG_NEGATIVE_AMOUNT));
        assert_eq!(out.stats.rows_affected, 2);
        assert!(out
            .records
            .iter()
            .all(|r| r.amount.map_or(true, |a| a >= 0.0)));
    }

    #[test]
    fn row_hit_by_several_rules_counts_once() {
        let rows = vec![
            raw("Cancelled", None, None, "04-30-22"),
            raw("Shipped", Some("-5"), Some(""), "04-30-22"),
            raw("Shipped", Some("10"), Some("INR"), "04-30-22"),
            raw("Shipped", None, None, "bad"),
        ];
        let out = clean_records(&rows, &rules());
        assert_eq!(out.stats.cancelled_zeroed, 1);
        assert_eq!(out.stats.currency_defaulted, 2);
        assert_eq!(out.stats.flagged_negative_amount, 1);
        assert_eq!(out.stats.dropped_bad_date, 1);
        assert_eq!(out.stats.rows_affected, 3);
        assert!(out.stats.rows_affected <= out.stats.rows_read);
    }

    #[test]
    fn index_falls_back_to_position() {
        let mut with_index = raw("Shipped", Some("1"), Some("INR"), "04-30-22");
        with_index.index = Some("41".into());
        let rows = vec![raw("Shipped", Some("1"), Some("INR"), "04-30-22"), with_index];
        let out = clean_records(&rows, &rules());
        assert_eq!(out.records[0].index_id, 0);
        assert_eq!(out.records[1].index_id, 41);
    }

    #[test]
    fn writes_cleaned_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("cleaned.csv");
        let out = clean_records(&[raw("Cancelled", None, None, "04-30-22")], &rules());
        write_cleaned_csv(&out.records, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("index_id,order_id,date,"));
        let row = lines.next().unwrap();
        assert!(row.contains("2022-04-30"));
        assert!(row.contains(",INR,"));
        assert!(lines.next().is_none());
    }
}
