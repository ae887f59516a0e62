pub mod csv_reader;
pub mod standardizers;
pub mod table_preview;
pub mod transformers;

pub use csv_reader::*;
pub use standardizers::*;
pub use table_preview::*;
pub use transformers::*;
