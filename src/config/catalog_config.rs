use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Collection names are interpolated into SQL, so only `[A-Za-z0-9_]` is allowed.
pub fn is_valid_collection_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Configuration for the catalog document store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSection {
    pub database_path: String,
    pub catalog_path: String,
    pub collection: Option<String>,
    pub env_database_path: Option<String>,
}

impl CatalogSection {
    pub fn collection_name(&self) -> &str {
        self.collection.as_deref().unwrap_or("products")
    }

    pub fn validate(&self) -> Result<()> {
        if self.database_path.trim().is_empty() {
            return Err(anyhow::anyhow!("Catalog database path cannot be empty"));
        }

        if self.catalog_path.trim().is_empty() {
            return Err(anyhow::anyhow!("Catalog file path cannot be empty"));
        }

        let name = self.collection_name();
        if !is_valid_collection_name(name) {
            return Err(anyhow::anyhow!("Invalid catalog collection name: {}", name));
        }

        Ok(())
    }
}

impl Default for CatalogSection {
    fn default() -> Self {
        Self {
            database_path: "data/fleximart_catalog.db".to_string(),
            catalog_path: "raw_data/products_catalog.json".to_string(),
            collection: Some("products".to_string()),
            env_database_path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_name_fallback() {
        let mut section = CatalogSection::default();
        section.collection = None;
        assert_eq!(section.collection_name(), "products");
    }

    #[test]
    fn test_collection_name_validation() {
        let mut section = CatalogSection::default();
        assert!(section.validate().is_ok());

        section.collection = Some("products; DROP TABLE x".to_string());
        assert!(section.validate().is_err());
    }
}
