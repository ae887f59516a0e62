pub mod catalog_config;
pub mod pipeline_config;

pub use catalog_config::{CatalogSection, is_valid_collection_name};
pub use pipeline_config::*;
