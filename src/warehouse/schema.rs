// src/warehouse/schema.rs

pub const RAW_TABLE: &str = "raw_amazon_sales";
pub const MONTHLY_REVENUE_TABLE: &str = "monthly_revenue";
pub const DAILY_ORDERS_TABLE: &str = "daily_orders";

/// Column order matches `CleanRecord` as appended by `Warehouse::load_records`,
/// followed by the load time.
pub const CREATE_RAW_TABLE: &str = "CREATE TABLE IF NOT EXISTS raw_amazon_sales (
    index_id BIGINT,
    order_id VARCHAR,
    date_col DATE NOT NULL,
    category VARCHAR,
    size VARCHAR,
    sku VARCHAR,
    asin VARCHAR,
    style VARCHAR,
    status VARCHAR,
    courier_status VARCHAR,
    qty BIGINT,
    amount DOUBLE,
    currency VARCHAR NOT NULL,
    ship_service_level VARCHAR,
    ship_city VARCHAR,
    ship_state VARCHAR,
    ship_postal_code VARCHAR,
    ship_country VARCHAR,
    sales_channel VARCHAR,
    fulfilled_by VARCHAR,
    promotion_ids VARCHAR,
    data_quality_flag VARCHAR,
    ingestion_timestamp TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);";

pub const CREATE_MONTHLY_REVENUE_TABLE: &str = "CREATE TABLE IF NOT EXISTS monthly_revenue (
    year_month VARCHAR NOT NULL,
    category VARCHAR,
    total_revenue DOUBLE NOT NULL,
    order_count BIGINT NOT NULL,
    avg_order_value DOUBLE NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);";

pub const CREATE_DAILY_ORDERS_TABLE: &str = "CREATE TABLE IF NOT EXISTS daily_orders (
    order_date DATE NOT NULL,
    status VARCHAR,
    order_count BIGINT NOT NULL,
    total_quantity BIGINT NOT NULL,
    total_amount DOUBLE NOT NULL,
    created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
);";

/// Drop every table, then create them empty.
pub fn recreate_all_sql() -> String {
    format!(
        "DROP TABLE IF EXISTS {DAILY_ORDERS_TABLE};
DROP TABLE IF EXISTS {MONTHLY_REVENUE_TABLE};
DROP TABLE IF EXISTS {RAW_TABLE};
{CREATE_RAW_TABLE}
{CREATE_MONTHLY_REVENUE_TABLE}
{CREATE_DAILY_ORDERS_TABLE}"
    )
}
