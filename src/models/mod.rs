pub mod catalog_models;
pub mod data_models;

pub use catalog_models::*;
pub use data_models::*;
