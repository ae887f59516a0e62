use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::PathBuf;
use tracing::info;

use crate::models::{RawCustomer, RawProduct, RawSale};

pub const CUSTOMER_COLUMNS: [&str; 7] = [
    "customer_id",
    "first_name",
    "last_name",
    "email",
    "phone",
    "city",
    "registration_date",
];

pub const PRODUCT_COLUMNS: [&str; 5] = [
    "product_id",
    "product_name",
    "category",
    "price",
    "stock_quantity",
];

pub const SALES_COLUMNS: [&str; 7] = [
    "transaction_id",
    "customer_id",
    "product_id",
    "quantity",
    "unit_price",
    "transaction_date",
    "status",
];

/// Reads the raw delimited files. Every column is loaded as text so ids like
/// "007" and mixed-format dates survive untouched until transformation.
pub struct FlatFileReader;

/// Text columns pulled out of a DataFrame, addressed by position.
struct TextColumns {
    columns: Vec<Vec<Option<String>>>,
    height: usize,
}

impl TextColumns {
    fn extract(df: &DataFrame, names: &[&str]) -> Result<Self> {
        let mut columns = Vec::with_capacity(names.len());

        for name in names {
            let column = df
                .column(name)
                .with_context(|| format!("Missing required column '{}'", name))?;
            let values: Vec<Option<String>> = column
                .str()
                .with_context(|| format!("Column '{}' is not text", name))?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            columns.push(values);
        }

        Ok(Self {
            columns,
            height: df.height(),
        })
    }

    fn get(&self, column: usize, row: usize) -> Option<String> {
        self.columns[column][row].clone()
    }
}

impl FlatFileReader {
    pub fn new() -> Self {
        FlatFileReader
    }

    pub fn read_dataframe(&self, path: &str) -> Result<DataFrame> {
        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))
            .with_context(|| format!("Failed to open flat file: {}", path))?
            .finish()
            .with_context(|| format!("Failed to parse flat file: {}", path))?;

        info!("Read {} rows x {} columns from {}", df.height(), df.width(), path);
        Ok(df)
    }

    pub fn read_customers(&self, path: &str) -> Result<Vec<RawCustomer>> {
        let df = self.read_dataframe(path)?;
        customers_from_dataframe(&df)
    }

    pub fn read_products(&self, path: &str) -> Result<Vec<RawProduct>> {
        let df = self.read_dataframe(path)?;
        products_from_dataframe(&df)
    }

    pub fn read_sales(&self, path: &str) -> Result<Vec<RawSale>> {
        let df = self.read_dataframe(path)?;
        sales_from_dataframe(&df)
    }
}

impl Default for FlatFileReader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn customers_from_dataframe(df: &DataFrame) -> Result<Vec<RawCustomer>> {
    let cols = TextColumns::extract(df, &CUSTOMER_COLUMNS)?;

    Ok((0..cols.height)
        .map(|row| RawCustomer {
            customer_id: cols.get(0, row),
            first_name: cols.get(1, row),
            last_name: cols.get(2, row),
            email: cols.get(3, row),
            phone: cols.get(4, row),
            city: cols.get(5, row),
            registration_date: cols.get(6, row),
        })
        .collect())
}

pub fn products_from_dataframe(df: &DataFrame) -> Result<Vec<RawProduct>> {
    let cols = TextColumns::extract(df, &PRODUCT_COLUMNS)?;

    Ok((0..cols.height)
        .map(|row| RawProduct {
            product_id: cols.get(0, row),
            product_name: cols.get(1, row),
            category: cols.get(2, row),
            price: cols.get(3, row),
            stock_quantity: cols.get(4, row),
        })
        .collect())
}

pub fn sales_from_dataframe(df: &DataFrame) -> Result<Vec<RawSale>> {
    let cols = TextColumns::extract(df, &SALES_COLUMNS)?;

    Ok((0..cols.height)
        .map(|row| RawSale {
            transaction_id: cols.get(0, row),
            customer_id: cols.get(1, row),
            product_id: cols.get(2, row),
            quantity: cols.get(3, row),
            unit_price: cols.get(4, row),
            transaction_date: cols.get(5, row),
            status: cols.get(6, row),
        })
        .collect())
}
