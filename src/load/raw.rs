// src/load/raw.rs

use serde::Deserialize;

/// One CSV row exactly as exported, every value still text.
/// Empty fields deserialize to `None`; columns missing from the header too.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawRecord {
    #[serde(rename = "index", default)]
    pub index: Option<String>,
    #[serde(rename = "Order ID", default)]
    pub order_id: Option<String>,
    #[serde(rename = "Date", default)]
    pub date: Option<String>,
    #[serde(rename = "Status", default)]
    pub status: Option<String>,
    #[serde(rename = "Fulfilment", default)]
    pub fulfilled_by: Option<String>,
    #[serde(rename = "Sales Channel ", default)]
    pub sales_channel: Option<String>,
    #[serde(rename = "ship-service-level", default)]
    pub ship_service_level: Option<String>,
    #[serde(rename = "Style", default)]
    pub style: Option<String>,
    #[serde(rename = "SKU", default)]
    pub sku: Option<String>,
    #[serde(rename = "Category", default)]
    pub category: Option<String>,
    #[serde(rename = "Size", default)]
    pub size: Option<String>,
    #[serde(rename = "ASIN", default)]
    pub asin: Option<String>,
    #[serde(rename = "Courier Status", default)]
    pub courier_status: Option<String>,
    #[serde(rename = "Qty", default)]
    pub qty: Option<String>,
    #[serde(rename = "currency", default)]
    pub currency: Option<String>,
    #[serde(rename = "Amount", default)]
    pub amount: Option<String>,
    #[serde(rename = "ship-city", default)]
    pub ship_city: Option<String>,
    #[serde(rename = "ship-state", default)]
    pub ship_state: Option<String>,
    #[serde(rename = "ship-postal-code", default)]
    pub ship_postal_code: Option<String>,
    #[serde(rename = "ship-country", default)]
    pub ship_country: Option<String>,
    #[serde(rename = "promotion-ids", default)]
    pub promotion_ids: Option<String>,
}

/// Headers a file must carry before it is worth cleaning.
pub const REQUIRED_COLUMNS: &[&str] = &[
    "Order ID",
    "Date",
    "Status",
    "Category",
    "Amount",
    "currency",
    "ship-city",
    "ship-state",
];
