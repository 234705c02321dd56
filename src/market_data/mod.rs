pub mod coerce;
pub mod quote_feed;
pub mod schema;
pub mod series;
pub mod table;

// Re-exports for convenient access (e.g. `use crate::market_data::PriceTable`).
pub use quote_feed::QuoteFeedClient;
pub use schema::{normalize_columns, SchemaError};
pub use series::{PriceRecord, PriceSeries};
pub use table::{PriceTable, TableError};
