use anyhow::{Context, Result};
use rusqlite::params;
use tracing::{info, warn};

use super::relational_store::RelationalStore;
use crate::models::{CustomerRecord, KeyMap, ProductRecord};

// Business keys never reach the store. Each insert hands back its generated
// primary key, so the business key -> generated key map is built in the same
// pass and never depends on email or product name being unique.

impl RelationalStore {
    /// Insert cleaned customers and map each business id to its new
    /// `customer_id`. A duplicate email violates the UNIQUE constraint and
    /// aborts the whole customer load.
    pub fn load_customers(&mut self, records: &[CustomerRecord]) -> Result<KeyMap> {
        let tx = self.conn.transaction()?;
        let mut customer_map = KeyMap::with_capacity(records.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO customers (first_name, last_name, email, phone, city, registration_date)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 RETURNING customer_id",
            )?;

            for record in records {
                let customer_id: i64 = stmt
                    .query_row(
                        params![
                            record.first_name,
                            record.last_name,
                            record.email,
                            record.phone,
                            record.city,
                            record.registration_date,
                        ],
                        |row| row.get(0),
                    )
                    .with_context(|| format!("Failed to insert customer {}", record.business_id))?;

                customer_map.insert(record.business_id.clone(), customer_id);
            }
        }

        tx.commit().context("Failed to commit customer load")?;
        info!("Loaded {} customers", customer_map.len());
        Ok(customer_map)
    }

    /// Insert cleaned products and map each business id to its new
    /// `product_id`. The destination price is NOT NULL, so a missing price is
    /// stored as 0.
    pub fn load_products(&mut self, records: &[ProductRecord]) -> Result<KeyMap> {
        let tx = self.conn.transaction()?;
        let mut product_map = KeyMap::with_capacity(records.len());
        let mut defaulted_prices = 0;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO products (product_name, category, price, stock_quantity)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING product_id",
            )?;

            for record in records {
                let price = record.price.unwrap_or_else(|| {
                    defaulted_prices += 1;
                    0.0
                });

                let product_id: i64 = stmt
                    .query_row(
                        params![record.name, record.category, price, record.stock_quantity],
                        |row| row.get(0),
                    )
                    .with_context(|| format!("Failed to insert product {}", record.business_id))?;

                product_map.insert(record.business_id.clone(), product_id);
            }
        }

        tx.commit().context("Failed to commit product load")?;

        if defaulted_prices > 0 {
            warn!("Stored {} products with missing price as 0", defaulted_prices);
        }
        info!("Loaded {} products", product_map.len());
        Ok(product_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> RelationalStore {
        let store = RelationalStore::open_in_memory().unwrap();
        store.ensure_schema().unwrap();
        store
    }

    fn customer(key: u32, id: &str, email: &str) -> CustomerRecord {
        CustomerRecord {
            surrogate_key: key,
            business_id: id.to_string(),
            first_name: Some("Test".to_string()),
            last_name: None,
            email: email.to_string(),
            phone: None,
            city: None,
            registration_date: None,
        }
    }

    fn product(key: u32, id: &str, name: &str, price: Option<f64>) -> ProductRecord {
        ProductRecord {
            surrogate_key: key,
            business_id: id.to_string(),
            name: Some(name.to_string()),
            category: Some("Electronics".to_string()),
            price,
            stock_quantity: 0,
        }
    }

    #[test]
    fn test_customer_map_uses_generated_keys() {
        let mut store = store();
        let records = vec![
            customer(1, "C001", "a@example.com"),
            customer(2, "C002", "b@example.com"),
        ];

        let map = store.load_customers(&records).unwrap();
        assert_eq!(map.len(), 2);
        assert_ne!(map["C001"], map["C002"]);

        let email: String = store
            .conn
            .query_row(
                "SELECT email FROM customers WHERE customer_id = ?1",
                params![map["C002"]],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(email, "b@example.com");
    }

    #[test]
    fn test_duplicate_email_aborts_customer_load() {
        let mut store = store();
        let records = vec![
            customer(1, "C001", "same@example.com"),
            customer(2, "C002", "same@example.com"),
        ];

        assert!(store.load_customers(&records).is_err());
        assert_eq!(store.count_rows("customers").unwrap(), 0);
    }

    #[test]
    fn test_duplicate_product_names_resolve_distinctly() {
        let mut store = store();
        let records = vec![
            product(1, "P001", "USB Cable", Some(199.0)),
            product(2, "P002", "USB Cable", None),
        ];

        let map = store.load_products(&records).unwrap();
        assert_eq!(map.len(), 2);
        assert_ne!(map["P001"], map["P002"]);

        let price: f64 = store
            .conn
            .query_row(
                "SELECT price FROM products WHERE product_id = ?1",
                params![map["P002"]],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(price, 0.0);
    }
}
