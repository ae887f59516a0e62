use anyhow::{Context, Result};
use tracing::{info, info_span};
use uuid::Uuid;

use crate::config::PipelineConfig;
use crate::models::{
    CustomerRecord, OrderLoadSummary, ProductRecord, RawCustomer, RawProduct, RawSale,
    SalesRecord, TransformReport,
};
use crate::processor::{
    CustomerTransformer, FlatFileReader, ProductTransformer, SalesTransformer,
    customers_to_dataframe, products_to_dataframe, sales_to_dataframe,
};
use crate::storage::RelationalStore;

/// Cleaned in-memory tables for one batch.
#[derive(Debug, Clone, Default)]
pub struct CleanedBatch {
    pub customers: Vec<CustomerRecord>,
    pub products: Vec<ProductRecord>,
    pub sales: Vec<SalesRecord>,
    pub customer_report: TransformReport,
    pub product_report: TransformReport,
    pub sales_report: TransformReport,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub run_id: Uuid,
    pub customers_loaded: usize,
    pub products_loaded: usize,
    pub orders: OrderLoadSummary,
}

pub struct EtlPipeline {
    config: PipelineConfig,
    reader: FlatFileReader,
}

impl EtlPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            reader: FlatFileReader::new(),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Read the three flat files and transform them.
    pub fn extract_and_transform(&self) -> Result<CleanedBatch> {
        let input = &self.config.input;

        let customers = self
            .reader
            .read_customers(&input.customers_path)
            .context("Failed to read customers")?;
        let products = self
            .reader
            .read_products(&input.products_path)
            .context("Failed to read products")?;
        let sales = self
            .reader
            .read_sales(&input.sales_path)
            .context("Failed to read sales")?;

        Ok(transform_batch(&customers, &products, &sales))
    }

    pub fn preview(&self, batch: &CleanedBatch) -> Result<()> {
        let rows = Some(self.config.preview_rows);

        info!("Cleaned customers:\n{}", customers_to_dataframe(&batch.customers)?.head(rows));
        info!("Cleaned products:\n{}", products_to_dataframe(&batch.products)?.head(rows));
        info!("Cleaned sales:\n{}", sales_to_dataframe(&batch.sales)?.head(rows));

        Ok(())
    }

    /// Run `phase` against a freshly acquired store connection, released as
    /// soon as the phase finishes whether or not it succeeded.
    fn with_store<T>(
        &self,
        phase: &str,
        f: impl FnOnce(&mut RelationalStore) -> Result<T>,
    ) -> Result<T> {
        let mut store = RelationalStore::from_config(&self.config)
            .with_context(|| format!("Failed to acquire store for {} phase", phase))?;
        info!("Starting {} load phase", phase);

        let result = f(&mut store);
        drop(store);
        info!("Released store connection after {} phase", phase);

        result.with_context(|| format!("{} load phase failed", phase))
    }

    /// Load master data, then orders. Resolver maps live only for this call.
    pub fn load(&self, batch: &CleanedBatch, run_id: Uuid) -> Result<BatchSummary> {
        let (customer_map, product_map) = self.with_store("master data", |store| {
            let customer_map = store.load_customers(&batch.customers)?;
            let product_map = store.load_products(&batch.products)?;
            Ok((customer_map, product_map))
        })?;

        let orders = self.with_store("orders", |store| {
            store.load_orders(&batch.sales, &customer_map, &product_map)
        })?;

        Ok(BatchSummary {
            run_id,
            customers_loaded: customer_map.len(),
            products_loaded: product_map.len(),
            orders,
        })
    }

    pub fn run(&self) -> Result<BatchSummary> {
        self.config.validate()?;

        let run_id = Uuid::new_v4();
        let span = info_span!("etl_run", %run_id);
        let _guard = span.enter();

        info!("🚀 Starting ETL batch run");

        let batch = self.extract_and_transform()?;
        self.preview(&batch)?;

        let summary = self.load(&batch, run_id)?;

        info!(
            "📊 Loaded {} customers, {} products, {} orders, {} order_items",
            summary.customers_loaded,
            summary.products_loaded,
            summary.orders.orders_inserted,
            summary.orders.items_inserted
        );
        info!("🎉 Clean data inserted successfully");

        Ok(summary)
    }
}

/// Transform raw rows into cleaned tables.
pub fn transform_batch(
    customers: &[RawCustomer],
    products: &[RawProduct],
    sales: &[RawSale],
) -> CleanedBatch {
    let (customers, customer_report) = CustomerTransformer.transform(customers);
    let (products, product_report) = ProductTransformer.transform(products);
    let (sales, sales_report) = SalesTransformer.transform(sales);

    CleanedBatch {
        customers,
        products,
        sales,
        customer_report,
        product_report,
        sales_report,
    }
}
