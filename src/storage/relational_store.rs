use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::path::Path;
use tracing::{debug, info};

use crate::config::PipelineConfig;
use crate::models::{Order, OrderItem};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS customers (
        customer_id        INTEGER PRIMARY KEY AUTOINCREMENT,
        first_name         TEXT,
        last_name          TEXT,
        email              TEXT NOT NULL UNIQUE,
        phone              TEXT,
        city               TEXT,
        registration_date  TEXT
    );
    CREATE TABLE IF NOT EXISTS products (
        product_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        product_name    TEXT,
        category        TEXT,
        price           REAL NOT NULL,
        stock_quantity  INTEGER DEFAULT 0
    );
    CREATE TABLE IF NOT EXISTS orders (
        order_id      INTEGER PRIMARY KEY AUTOINCREMENT,
        customer_id   INTEGER NOT NULL REFERENCES customers(customer_id),
        order_date    TEXT NOT NULL,
        total_amount  REAL NOT NULL,
        status        TEXT DEFAULT 'Pending'
    );
    CREATE TABLE IF NOT EXISTS order_items (
        item_id     INTEGER PRIMARY KEY AUTOINCREMENT,
        order_id    INTEGER NOT NULL REFERENCES orders(order_id),
        product_id  INTEGER NOT NULL REFERENCES products(product_id),
        quantity    INTEGER NOT NULL,
        unit_price  REAL NOT NULL,
        subtotal    REAL NOT NULL
    );
"#;

pub const TABLES: [&str; 4] = ["customers", "products", "orders", "order_items"];

/// Connection to the relational store. Held for one load phase and released
/// when dropped.
pub struct RelationalStore {
    pub(super) conn: Connection,
}

impl RelationalStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open relational store: {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let store = Self::open(&config.relational.database_path)?;
        if config.should_create_schema() {
            store.ensure_schema()?;
        }

        info!("Connected to relational store at {}", config.relational.database_path);
        Ok(store)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        // SQLite leaves FK enforcement off unless asked per connection
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self { conn })
    }

    pub fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA)
            .context("Failed to create relational schema")?;
        debug!("Relational schema ready");
        Ok(())
    }

    pub fn count_rows(&self, table: &str) -> Result<i64> {
        if !TABLES.contains(&table) {
            return Err(anyhow!("Unknown table: {}", table));
        }

        let count = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| row.get(0))?;
        Ok(count)
    }

    pub fn fetch_orders(&self) -> Result<Vec<Order>> {
        let mut stmt = self.conn.prepare(
            "SELECT order_id, customer_id, order_date, total_amount, status
             FROM orders ORDER BY order_id",
        )?;

        let orders = stmt
            .query_map([], |row| {
                Ok(Order {
                    order_id: row.get(0)?,
                    customer_id: row.get(1)?,
                    order_date: row.get(2)?,
                    total_amount: row.get(3)?,
                    status: row.get(4)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(orders)
    }

    pub fn fetch_order_items(&self) -> Result<Vec<OrderItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT item_id, order_id, product_id, quantity, unit_price, subtotal
             FROM order_items ORDER BY item_id",
        )?;

        let items = stmt
            .query_map([], |row| {
                Ok(OrderItem {
                    item_id: row.get(0)?,
                    order_id: row.get(1)?,
                    product_id: row.get(2)?,
                    quantity: row.get(3)?,
                    unit_price: row.get(4)?,
                    subtotal: row.get(5)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(items)
    }
}
