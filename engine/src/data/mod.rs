// Market data boundary: CSV parsing and the providers that build a MultiSeriesTable.
pub mod csv_parser;
pub mod market_data;

pub use csv_parser::PriceCsvParser;
pub use market_data::{CsvDirectoryProvider, MarketDataProvider, MarketDataStore};
