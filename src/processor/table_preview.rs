use anyhow::Result;
use polars::prelude::*;

use crate::models::{CustomerRecord, ProductRecord, SalesRecord};

// Cleaned tables rendered as DataFrames for console previews.

fn iso_dates(dates: impl Iterator<Item = Option<chrono::NaiveDate>>) -> Vec<Option<String>> {
    dates
        .map(|d| d.map(|d| d.format("%Y-%m-%d").to_string()))
        .collect()
}

pub fn customers_to_dataframe(records: &[CustomerRecord]) -> Result<DataFrame> {
    let df = df!(
        "customer_sk" => records.iter().map(|r| r.surrogate_key).collect::<Vec<u32>>(),
        "customer_id" => records.iter().map(|r| r.business_id.clone()).collect::<Vec<String>>(),
        "first_name" => records.iter().map(|r| r.first_name.clone()).collect::<Vec<Option<String>>>(),
        "last_name" => records.iter().map(|r| r.last_name.clone()).collect::<Vec<Option<String>>>(),
        "email" => records.iter().map(|r| r.email.clone()).collect::<Vec<String>>(),
        "phone" => records.iter().map(|r| r.phone.clone()).collect::<Vec<Option<String>>>(),
        "city" => records.iter().map(|r| r.city.clone()).collect::<Vec<Option<String>>>(),
        "registration_date" => iso_dates(records.iter().map(|r| r.registration_date))
    )?;

    Ok(df)
}

pub fn products_to_dataframe(records: &[ProductRecord]) -> Result<DataFrame> {
    let df = df!(
        "product_sk" => records.iter().map(|r| r.surrogate_key).collect::<Vec<u32>>(),
        "product_id" => records.iter().map(|r| r.business_id.clone()).collect::<Vec<String>>(),
        "product_name" => records.iter().map(|r| r.name.clone()).collect::<Vec<Option<String>>>(),
        "category" => records.iter().map(|r| r.category.clone()).collect::<Vec<Option<String>>>(),
        "price" => records.iter().map(|r| r.price).collect::<Vec<Option<f64>>>(),
        "stock_quantity" => records.iter().map(|r| r.stock_quantity).collect::<Vec<i64>>()
    )?;

    Ok(df)
}

pub fn sales_to_dataframe(records: &[SalesRecord]) -> Result<DataFrame> {
    let df = df!(
        "sales_sk" => records.iter().map(|r| r.surrogate_key).collect::<Vec<u32>>(),
        "transaction_id" => records.iter().map(|r| r.transaction_id.clone()).collect::<Vec<String>>(),
        "customer_id" => records.iter().map(|r| r.customer_id.clone()).collect::<Vec<String>>(),
        "product_id" => records.iter().map(|r| r.product_id.clone()).collect::<Vec<String>>(),
        "quantity" => records.iter().map(|r| r.quantity).collect::<Vec<i64>>(),
        "unit_price" => records.iter().map(|r| r.unit_price).collect::<Vec<f64>>(),
        "transaction_date" => iso_dates(records.iter().map(|r| r.transaction_date)),
        "status" => records.iter().map(|r| r.status.clone()).collect::<Vec<Option<String>>>()
    )?;

    Ok(df)
}
