use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::params;
use tracing::{debug, info, warn};

use super::relational_store::RelationalStore;
use crate::models::{KeyMap, OrderLoadSummary, SalesRecord};
use crate::processor::round2;

pub const DEFAULT_ORDER_STATUS: &str = "Pending";

/// One order and its single line item, resolved to store keys and ready to
/// insert.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderDraft {
    pub transaction_id: String,
    pub customer_id: i64,
    pub product_id: i64,
    pub order_date: NaiveDate,
    pub quantity: i64,
    pub unit_price: f64,
    pub subtotal: f64,
    pub status: String,
}

impl OrderDraft {
    /// One item per order, so the order total is the item subtotal.
    pub fn total_amount(&self) -> f64 {
        self.subtotal
    }
}

/// Resolve business keys through the resolver maps and compute totals.
/// Sales whose customer or product cannot be resolved, or which lack a date,
/// are skipped and counted.
pub fn plan_orders(
    sales: &[SalesRecord],
    customer_map: &KeyMap,
    product_map: &KeyMap,
) -> (Vec<OrderDraft>, OrderLoadSummary) {
    let mut summary = OrderLoadSummary::default();
    let mut drafts = Vec::with_capacity(sales.len());

    for sale in sales {
        let Some(&customer_id) = customer_map.get(&sale.customer_id) else {
            debug!("Sale {}: unknown customer {}", sale.transaction_id, sale.customer_id);
            summary.unresolved_customer += 1;
            continue;
        };
        let Some(&product_id) = product_map.get(&sale.product_id) else {
            debug!("Sale {}: unknown product {}", sale.transaction_id, sale.product_id);
            summary.unresolved_product += 1;
            continue;
        };
        let Some(order_date) = sale.transaction_date else {
            debug!("Sale {}: missing transaction date", sale.transaction_id);
            summary.missing_date += 1;
            continue;
        };

        drafts.push(OrderDraft {
            transaction_id: sale.transaction_id.clone(),
            customer_id,
            product_id,
            order_date,
            quantity: sale.quantity,
            unit_price: sale.unit_price,
            subtotal: round2(sale.quantity as f64 * sale.unit_price),
            status: sale
                .status
                .clone()
                .unwrap_or_else(|| DEFAULT_ORDER_STATUS.to_string()),
        });
    }

    (drafts, summary)
}

impl RelationalStore {
    /// Insert every resolvable sale as an order plus one order item inside a
    /// single transaction. Any failed insert rolls back the whole batch.
    pub fn load_orders(
        &mut self,
        sales: &[SalesRecord],
        customer_map: &KeyMap,
        product_map: &KeyMap,
    ) -> Result<OrderLoadSummary> {
        let (drafts, mut summary) = plan_orders(sales, customer_map, product_map);

        if summary.skipped() > 0 {
            warn!(
                "Skipping {} sales: {} unknown customer, {} unknown product, {} missing date",
                summary.skipped(),
                summary.unresolved_customer,
                summary.unresolved_product,
                summary.missing_date
            );
        }

        // Dropping the transaction without commit rolls it back
        let tx = self.conn.transaction()?;
        {
            let mut insert_order = tx.prepare(
                "INSERT INTO orders (customer_id, order_date, total_amount, status)
                 VALUES (?1, ?2, ?3, ?4)
                 RETURNING order_id",
            )?;
            let mut insert_item = tx.prepare(
                "INSERT INTO order_items (order_id, product_id, quantity, unit_price, subtotal)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for draft in &drafts {
                let order_id: i64 = insert_order
                    .query_row(
                        params![
                            draft.customer_id,
                            draft.order_date,
                            draft.total_amount(),
                            draft.status
                        ],
                        |row| row.get(0),
                    )
                    .with_context(|| {
                        format!("Failed to insert order for sale {}", draft.transaction_id)
                    })?;

                insert_item
                    .execute(params![
                        order_id,
                        draft.product_id,
                        draft.quantity,
                        draft.unit_price,
                        draft.subtotal
                    ])
                    .with_context(|| {
                        format!("Failed to insert order item for sale {}", draft.transaction_id)
                    })?;

                summary.orders_inserted += 1;
                summary.items_inserted += 1;
            }
        }

        tx.commit().context("Failed to commit order batch")?;

        info!(
            "Inserted {} orders and {} order_items",
            summary.orders_inserted, summary.items_inserted
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(id: &str, customer: &str, product: &str, date: Option<NaiveDate>) -> SalesRecord {
        SalesRecord {
            surrogate_key: 1,
            transaction_id: id.to_string(),
            customer_id: customer.to_string(),
            product_id: product.to_string(),
            quantity: 3,
            unit_price: 33.333,
            transaction_date: date,
            status: None,
        }
    }

    #[test]
    fn test_plan_resolves_and_rounds() {
        let customers = KeyMap::from([("C001".to_string(), 10)]);
        let products = KeyMap::from([("P001".to_string(), 20)]);
        let date = NaiveDate::from_ymd_opt(2024, 1, 15);

        let (drafts, summary) = plan_orders(&[sale("T1", "C001", "P001", date)], &customers, &products);

        assert_eq!(summary.skipped(), 0);
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].customer_id, 10);
        assert_eq!(drafts[0].product_id, 20);
        assert_eq!(drafts[0].subtotal, 100.0);
        assert_eq!(drafts[0].total_amount(), drafts[0].subtotal);
        assert_eq!(drafts[0].status, "Pending");
    }

    #[test]
    fn test_plan_skips_unresolvable_sales() {
        let customers = KeyMap::from([("C001".to_string(), 10)]);
        let products = KeyMap::from([("P001".to_string(), 20)]);
        let date = NaiveDate::from_ymd_opt(2024, 1, 15);

        let sales = vec![
            sale("T1", "C404", "P001", date),
            sale("T2", "C001", "P404", date),
            sale("T3", "C001", "P001", None),
        ];
        let (drafts, summary) = plan_orders(&sales, &customers, &products);

        assert!(drafts.is_empty());
        assert_eq!(summary.unresolved_customer, 1);
        assert_eq!(summary.unresolved_product, 1);
        assert_eq!(summary.missing_date, 1);
    }
}
