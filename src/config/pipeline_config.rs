use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::warn;

use super::catalog_config::CatalogSection;

pub const DEFAULT_CONFIG_PATH: &str = "configs/pipeline.toml";
pub const CONFIG_PATH_ENV: &str = "PIPELINE_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfigFile {
    pub input: Option<InputSection>,
    pub relational: Option<RelationalSection>,
    pub catalog: Option<CatalogSection>,
    pub preview: Option<PreviewSection>,
}

/// Locations of the three raw flat files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSection {
    pub customers_path: String,
    pub products_path: String,
    pub sales_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelationalSection {
    pub database_path: String,
    pub create_schema: Option<bool>,
    // Optional environment variable name overriding database_path
    pub env_database_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewSection {
    pub rows: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: InputSection,
    pub relational: RelationalSection,
    pub catalog: CatalogSection,
    pub preview_rows: usize,
}

impl PipelineConfig {
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config file: {}", path))?;

        let mut config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse pipeline config file: {}", path))?;

        config.apply_env_overrides();

        Ok(config)
    }

    /// Resolve the config file from `PIPELINE_CONFIG`, falling back to built-in
    /// defaults when the file is absent.
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        if !Path::new(&path).exists() {
            warn!("Config file not found at {}, using defaults", path);
            let mut config = Self::default();
            config.apply_env_overrides();
            return Ok(config);
        }

        Self::from_file(&path)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: PipelineConfigFile = toml::from_str(content)?;
        let defaults = Self::default();

        Ok(Self {
            input: file.input.unwrap_or(defaults.input),
            relational: file.relational.unwrap_or(defaults.relational),
            catalog: file.catalog.unwrap_or(defaults.catalog),
            preview_rows: file
                .preview
                .and_then(|p| p.rows)
                .unwrap_or(defaults.preview_rows),
        })
    }

    pub fn apply_env_overrides(&mut self) {
        let relational_var = self
            .relational
            .env_database_path
            .as_deref()
            .unwrap_or("FLEXIMART_DATABASE_PATH");
        if let Ok(path) = env::var(relational_var) {
            self.relational.database_path = path;
        }

        let catalog_var = self
            .catalog
            .env_database_path
            .as_deref()
            .unwrap_or("FLEXIMART_CATALOG_PATH");
        if let Ok(path) = env::var(catalog_var) {
            self.catalog.database_path = path;
        }
    }

    pub fn should_create_schema(&self) -> bool {
        self.relational.create_schema.unwrap_or(true)
    }

    pub fn validate(&self) -> Result<()> {
        let inputs = [
            ("customers_path", &self.input.customers_path),
            ("products_path", &self.input.products_path),
            ("sales_path", &self.input.sales_path),
        ];
        for (name, value) in inputs {
            if value.trim().is_empty() {
                return Err(anyhow::anyhow!("Input {} cannot be empty", name));
            }
        }

        if self.relational.database_path.trim().is_empty() {
            return Err(anyhow::anyhow!("Relational database path cannot be empty"));
        }

        self.catalog.validate()
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: InputSection {
                customers_path: "raw_data/customers_raw.csv".to_string(),
                products_path: "raw_data/products_raw.csv".to_string(),
                sales_path: "raw_data/sales_raw.csv".to_string(),
            },
            relational: RelationalSection {
                database_path: "data/fleximart.db".to_string(),
                create_schema: Some(true),
                env_database_path: None,
            },
            catalog: CatalogSection::default(),
            preview_rows: 5,
        }
    }
}
