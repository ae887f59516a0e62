pub mod catalog_store;
pub mod identity_resolver;
pub mod order_loader;
pub mod relational_store;

pub use catalog_store::{CatalogStore, load_catalog_file};
pub use order_loader::{DEFAULT_ORDER_STATUS, OrderDraft, plan_orders};
pub use relational_store::{RelationalStore, TABLES};
