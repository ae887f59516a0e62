use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::standardizers::{
    non_blank, normalize_date, parse_decimal, parse_quantity, standardize_category,
    standardize_phone, standardize_status,
};
use crate::models::{
    CustomerRecord, ProductRecord, RawCustomer, RawProduct, RawSale, SalesRecord, TransformReport,
};

/// Keep the first row seen for each business key, in input order. Rows with a
/// blank key are discarded since nothing downstream could resolve them.
fn dedup_first<'a, T>(
    rows: &'a [T],
    key: impl Fn(&T) -> Option<&str>,
) -> (Vec<(String, &'a T)>, TransformReport) {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept = Vec::with_capacity(rows.len());
    let mut report = TransformReport {
        input_rows: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let Some(id) = non_blank(key(row)) else {
            report.dropped += 1;
            continue;
        };

        if seen.insert(id.clone()) {
            kept.push((id, row));
        } else {
            debug!("Dropping duplicate business key {}", id);
            report.duplicates_removed += 1;
        }
    }

    (kept, report)
}

fn log_report(entity: &str, report: &TransformReport) {
    info!(
        "{} transform: {} rows in, {} duplicates removed, {} dropped, {} rows out",
        entity, report.input_rows, report.duplicates_removed, report.dropped, report.output_rows
    );
    if report.dropped > 0 {
        warn!("Dropped {} {} rows with missing critical fields", report.dropped, entity);
    }
}

pub struct CustomerTransformer;

impl CustomerTransformer {
    pub fn transform(&self, rows: &[RawCustomer]) -> (Vec<CustomerRecord>, TransformReport) {
        let (unique, mut report) = dedup_first(rows, |r| r.customer_id.as_deref());

        let records: Vec<CustomerRecord> = unique
            .into_iter()
            .enumerate()
            .map(|(index, (business_id, raw))| {
                let email = non_blank(raw.email.as_deref())
                    .unwrap_or_else(|| format!("{}@unknown.com", business_id.to_lowercase()));

                CustomerRecord {
                    surrogate_key: index as u32 + 1,
                    first_name: non_blank(raw.first_name.as_deref()),
                    last_name: non_blank(raw.last_name.as_deref()),
                    email,
                    phone: raw.phone.as_deref().and_then(standardize_phone),
                    city: non_blank(raw.city.as_deref()),
                    registration_date: raw.registration_date.as_deref().and_then(normalize_date),
                    business_id,
                }
            })
            .collect();

        report.output_rows = records.len();
        log_report("Customer", &report);
        (records, report)
    }
}

pub struct ProductTransformer;

impl ProductTransformer {
    pub fn transform(&self, rows: &[RawProduct]) -> (Vec<ProductRecord>, TransformReport) {
        let (unique, mut report) = dedup_first(rows, |r| r.product_id.as_deref());

        let records: Vec<ProductRecord> = unique
            .into_iter()
            .enumerate()
            .map(|(index, (business_id, raw))| ProductRecord {
                surrogate_key: index as u32 + 1,
                name: non_blank(raw.product_name.as_deref()),
                category: standardize_category(raw.category.as_deref()),
                price: raw.price.as_deref().and_then(parse_decimal),
                stock_quantity: raw
                    .stock_quantity
                    .as_deref()
                    .and_then(parse_quantity)
                    .unwrap_or(0),
                business_id,
            })
            .collect();

        report.output_rows = records.len();
        log_report("Product", &report);
        (records, report)
    }
}

pub struct SalesTransformer;

impl SalesTransformer {
    /// Unlike customers and products, sales missing a customer, product,
    /// quantity or unit price are dropped rather than defaulted.
    pub fn transform(&self, rows: &[RawSale]) -> (Vec<SalesRecord>, TransformReport) {
        let (unique, mut report) = dedup_first(rows, |r| r.transaction_id.as_deref());

        let mut records = Vec::with_capacity(unique.len());
        for (transaction_id, raw) in unique {
            let customer_id = non_blank(raw.customer_id.as_deref());
            let product_id = non_blank(raw.product_id.as_deref());
            let quantity = raw.quantity.as_deref().and_then(parse_quantity);
            let unit_price = raw.unit_price.as_deref().and_then(parse_decimal);

            let (Some(customer_id), Some(product_id), Some(quantity), Some(unit_price)) =
                (customer_id, product_id, quantity, unit_price)
            else {
                debug!("Dropping sale {} with missing critical fields", transaction_id);
                report.dropped += 1;
                continue;
            };

            records.push(SalesRecord {
                surrogate_key: records.len() as u32 + 1,
                transaction_id,
                customer_id,
                product_id,
                quantity,
                unit_price,
                transaction_date: raw.transaction_date.as_deref().and_then(normalize_date),
                status: standardize_status(raw.status.as_deref()),
            });
        }

        report.output_rows = records.len();
        log_report("Sales", &report);
        (records, report)
    }
}
