use anyhow::{Context, Result};
use fleximart_etl::config::PipelineConfig;
use fleximart_etl::models::Review;
use fleximart_etl::storage::{CatalogStore, load_catalog_file};
use tracing::{info, warn};

const PRICE_THRESHOLD: f64 = 50000.0;
const MIN_AVERAGE_RATING: f64 = 4.0;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenv::dotenv().ok();

    let config = PipelineConfig::load().context("Failed to load pipeline configuration")?;
    let catalog = &config.catalog;

    let mut store = CatalogStore::from_config(catalog)?;

    // Load
    let documents = load_catalog_file(&catalog.catalog_path)?;
    store.insert_many(&documents)?;
    info!("Product catalog data loaded successfully");

    // Filtered lookup with projection
    let cheap_electronics =
        store.find_by_category_below_price("Electronics", PRICE_THRESHOLD, &["name", "price", "stock"])?;
    info!("Electronics products with price < {}:", PRICE_THRESHOLD);
    for product in &cheap_electronics {
        info!("{}", product);
    }

    // Review analysis
    let rated = store.average_rating_report(MIN_AVERAGE_RATING)?;
    info!("Products with average rating >= {}:", MIN_AVERAGE_RATING);
    for summary in &rated {
        info!("{}", serde_json::to_string(summary)?);
    }

    // Append a review
    let review = Review::new("U999", 4.0, "Good value");
    if store.add_review("ELEC001", &review)? {
        info!("New review added successfully to product ELEC001");
    } else {
        warn!("No catalog product ELEC001 found, review not added");
    }

    // Category pricing
    let by_category = store.category_price_report()?;
    info!("Average Price by Category:");
    for summary in &by_category {
        info!("{}", serde_json::to_string(summary)?);
    }

    Ok(())
}
