use anyhow::{Context, Result, anyhow};
use polars::prelude::*;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::{debug, info};

use crate::config::{CatalogSection, is_valid_collection_name};
use crate::models::{CategoryPriceSummary, RatingSummary, Review};
use crate::processor::round2;

/// Catalog documents kept as JSON bodies in one SQLite collection table,
/// keyed by the application-level `product_id` field.
pub struct CatalogStore {
    conn: Connection,
    collection: String,
}

/// Read a catalog file holding either an array of documents or a single one.
pub fn load_catalog_file(path: &str) -> Result<Vec<Value>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog file: {}", path))?;

    let parsed: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse catalog file: {}", path))?;

    match parsed {
        Value::Array(documents) => Ok(documents),
        document @ Value::Object(_) => Ok(vec![document]),
        other => Err(anyhow!(
            "Catalog file {} must hold an object or an array, found {}",
            path,
            other
        )),
    }
}

fn product_key(document: &Value) -> Option<String> {
    match document.get("product_id")? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn project(document: &Value, fields: &[&str]) -> Value {
    let mut projected = Map::new();
    for field in fields {
        if let Some(value) = document.get(*field) {
            projected.insert(field.to_string(), value.clone());
        }
    }
    Value::Object(projected)
}

fn average_rating(document: &Value) -> Option<f64> {
    let ratings: Vec<f64> = document
        .get("reviews")?
        .as_array()?
        .iter()
        .filter_map(|review| review.get("rating").and_then(Value::as_f64))
        .collect();

    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

fn text_field(document: &Value, field: &str) -> Option<String> {
    document.get(field).and_then(Value::as_str).map(str::to_string)
}

impl CatalogStore {
    pub fn open<P: AsRef<Path>>(path: P, collection: &str) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open catalog store: {}", path.display()))?;
        Self::with_connection(conn, collection)
    }

    pub fn open_in_memory(collection: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, collection)
    }

    pub fn from_config(config: &CatalogSection) -> Result<Self> {
        config.validate()?;
        let store = Self::open(&config.database_path, config.collection_name())?;
        info!(
            "Connected to catalog store at {} (collection '{}')",
            config.database_path, store.collection
        );
        Ok(store)
    }

    fn with_connection(conn: Connection, collection: &str) -> Result<Self> {
        if !is_valid_collection_name(collection) {
            return Err(anyhow!("Invalid catalog collection name: {}", collection));
        }

        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {coll} (
                doc_id      INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id  TEXT,
                body        TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_{coll}_product_id ON {coll} (product_id);",
            coll = collection
        ))?;

        Ok(Self {
            conn,
            collection: collection.to_string(),
        })
    }

    pub fn count(&self) -> Result<i64> {
        let count = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", self.collection),
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Insert all documents in one transaction. Every document must be a
    /// JSON object.
    pub fn insert_many(&mut self, documents: &[Value]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare(&format!(
                "INSERT INTO {} (product_id, body) VALUES (?1, ?2)",
                self.collection
            ))?;

            for (index, document) in documents.iter().enumerate() {
                if !document.is_object() {
                    return Err(anyhow!("Catalog document at index {} is not an object", index));
                }

                let body = serde_json::to_string(document)?;
                stmt.execute(params![product_key(document), body])
                    .with_context(|| format!("Failed to insert catalog document at index {}", index))?;
            }
        }
        tx.commit()?;

        info!("Inserted {} catalog documents", documents.len());
        Ok(documents.len())
    }

    fn all_documents(&self) -> Result<Vec<Value>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT body FROM {} ORDER BY doc_id", self.collection))?;

        let bodies = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).context("Corrupt catalog document body"))
            .collect()
    }

    /// Documents in `category` priced strictly below `max_price`, reduced to
    /// the projected fields.
    pub fn find_by_category_below_price(
        &self,
        category: &str,
        max_price: f64,
        projection: &[&str],
    ) -> Result<Vec<Value>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT body FROM {}
             WHERE json_extract(body, '$.category') = ?1
               AND json_extract(body, '$.price') < ?2
             ORDER BY doc_id",
            self.collection
        ))?;

        let bodies = stmt
            .query_map(params![category, max_price], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut results = Vec::with_capacity(bodies.len());
        for body in bodies {
            let document: Value = serde_json::from_str(&body)?;
            results.push(project(&document, projection));
        }

        debug!(
            "{} catalog documents in {} below {}",
            results.len(),
            category,
            max_price
        );
        Ok(results)
    }

    /// Average review rating per product, keeping products at or above
    /// `min_rating`. Products without rated reviews are left out.
    pub fn average_rating_report(&self, min_rating: f64) -> Result<Vec<RatingSummary>> {
        let report = self
            .all_documents()?
            .iter()
            .filter_map(|document| {
                let average = average_rating(document)?;
                (average >= min_rating).then(|| RatingSummary {
                    name: text_field(document, "name"),
                    category: text_field(document, "category"),
                    average_rating: average,
                })
            })
            .collect();

        Ok(report)
    }

    /// Average price (2 dp) and product count per category, highest average
    /// first.
    pub fn category_price_report(&self) -> Result<Vec<CategoryPriceSummary>> {
        let documents = self.all_documents()?;

        let categories: Vec<Option<String>> = documents
            .iter()
            .map(|document| text_field(document, "category"))
            .collect();
        let prices: Vec<Option<f64>> = documents
            .iter()
            .map(|document| document.get("price").and_then(Value::as_f64))
            .collect();

        let df = df!("category" => categories, "price" => prices)?;

        let grouped = df
            .lazy()
            .group_by([col("category")])
            .agg([
                col("price").mean().alias("avg_price"),
                len().alias("product_count"),
            ])
            .sort(
                ["avg_price"],
                SortMultipleOptions::default()
                    .with_order_descending(true)
                    .with_nulls_last(true),
            )
            .collect()?;

        let names = grouped.column("category")?.str()?;
        let averages = grouped.column("avg_price")?.f64()?;
        let counts = grouped.column("product_count")?.cast(&DataType::Int64)?;
        let counts = counts.i64()?;

        let report = names
            .into_iter()
            .zip(averages.into_iter())
            .zip(counts.into_iter())
            .map(|((category, avg_price), product_count)| CategoryPriceSummary {
                category: category.map(str::to_string),
                avg_price: avg_price.map(round2),
                product_count: product_count.unwrap_or(0),
            })
            .collect();

        Ok(report)
    }

    /// Append a review to the first document with the given product id.
    /// Returns false when no document matched.
    pub fn add_review(&mut self, product_id: &str, review: &Review) -> Result<bool> {
        let tx = self.conn.transaction()?;

        let found: Option<(i64, String)> = tx
            .query_row(
                &format!(
                    "SELECT doc_id, body FROM {} WHERE product_id = ?1 ORDER BY doc_id LIMIT 1",
                    self.collection
                ),
                params![product_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((doc_id, body)) = found else {
            return Ok(false);
        };

        let mut document: Value = serde_json::from_str(&body)?;
        let object = document
            .as_object_mut()
            .ok_or_else(|| anyhow!("Catalog document {} is not an object", doc_id))?;

        let reviews = object
            .entry("reviews")
            .or_insert_with(|| Value::Array(Vec::new()));
        let Some(reviews) = reviews.as_array_mut() else {
            return Err(anyhow!("Catalog document {} has a non-array reviews field", doc_id));
        };
        reviews.push(serde_json::to_value(review)?);

        tx.execute(
            &format!("UPDATE {} SET body = ?1 WHERE doc_id = ?2", self.collection),
            params![serde_json::to_string(&document)?, doc_id],
        )?;
        tx.commit()?;

        info!("Added review by {} to product {}", review.user, product_id);
        Ok(true)
    }
}
