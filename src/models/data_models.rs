use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Business key (e.g. "C001") -> store-generated primary key.
pub type KeyMap = HashMap<String, i64>;

// Raw rows exactly as read from the flat files, every field still text.

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCustomer {
    pub customer_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub registration_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    pub product_id: Option<String>,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<String>,
    pub stock_quantity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSale {
    pub transaction_id: Option<String>,
    pub customer_id: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<String>,
    pub unit_price: Option<String>,
    pub transaction_date: Option<String>,
    pub status: Option<String>,
}

// Cleaned records. `surrogate_key` is dense 1..N in first-seen order and only
// meaningful within one batch.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub surrogate_key: u32,
    pub business_id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub registration_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub surrogate_key: u32,
    pub business_id: String,
    pub name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub stock_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub surrogate_key: u32,
    pub transaction_id: String,
    pub customer_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub transaction_date: Option<NaiveDate>,
    pub status: Option<String>,
}

// Persisted entities

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: i64,
    pub customer_id: i64,
    pub order_date: NaiveDate,
    pub total_amount: f64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
}

/// Counts produced by one transformer pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransformReport {
    pub input_rows: usize,
    pub duplicates_removed: usize,
    pub dropped: usize,
    pub output_rows: usize,
}

/// Outcome of the transactional order load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderLoadSummary {
    pub orders_inserted: usize,
    pub items_inserted: usize,
    pub unresolved_customer: usize,
    pub unresolved_product: usize,
    pub missing_date: usize,
}

impl OrderLoadSummary {
    pub fn skipped(&self) -> usize {
        self.unresolved_customer + self.unresolved_product + self.missing_date
    }
}
