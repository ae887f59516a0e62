use anyhow::{Context, Result};
use fleximart_etl::EtlPipeline;
use fleximart_etl::config::PipelineConfig;
use tracing::{error, info};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = PipelineConfig::load().context("Failed to load pipeline configuration")?;

    info!(
        "Loaded pipeline configuration: customers={}, products={}, sales={} -> {}",
        config.input.customers_path,
        config.input.products_path,
        config.input.sales_path,
        config.relational.database_path
    );

    let pipeline = EtlPipeline::new(config);

    match pipeline.run() {
        Ok(summary) => {
            info!(
                "✅ Batch {} finished: {} orders, {} sales skipped",
                summary.run_id,
                summary.orders.orders_inserted,
                summary.orders.skipped()
            );
            Ok(())
        }
        Err(e) => {
            error!("❌ ETL batch failed: {:#}", e);
            Err(e)
        }
    }
}
