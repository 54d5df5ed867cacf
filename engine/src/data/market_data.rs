// Providers that turn a ticker list and a date range into a MultiSeriesTable.
use crate::data::csv_parser::PriceCsvParser;
use crate::error::EngineError;
use async_trait::async_trait;
use shared::models::{DateRange, MultiSeriesTable, TimeSeries};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily series for each ticker within the inclusive `range`.
    /// Unknown tickers, or tickers with no rows in range, are left out of the table.
    async fn fetch(&self, tickers: &[String], range: DateRange) -> Result<MultiSeriesTable, EngineError>;
}

// In-memory store, keyed by uppercase symbol.
pub struct MarketDataStore {
    data: HashMap<String, TimeSeries>,
}

impl MarketDataStore {
    pub fn new() -> Self {
        MarketDataStore { data: HashMap::new() }
    }

    /// Adds `series`, merging with anything already stored for the symbol.
    /// On a repeated date the stored point wins.
    pub fn add_series(&mut self, series: TimeSeries) -> Result<(), EngineError> {
        let symbol = series.symbol().to_string();
        let merged = match self.data.remove(&symbol) {
            Some(existing) => {
                let mut points = existing.points().to_vec();
                points.extend(series.points().iter().cloned());
                points.sort_by_key(|p| p.date);
                points.dedup_by_key(|p| p.date);
                TimeSeries::new(symbol.clone(), points)?
            }
            None => series,
        };
        self.data.insert(symbol, merged);
        Ok(())
    }

    pub fn get_series(&self, symbol: &str, range: Option<&DateRange>) -> Option<TimeSeries> {
        self.data.get(&symbol.trim().to_uppercase()).map(|series| match range {
            Some(range) => series.slice(range),
            None => series.clone(),
        })
    }

    pub fn symbols(&self) -> Vec<&str> {
        let mut symbols: Vec<&str> = self.data.keys().map(String::as_str).collect();
        symbols.sort_unstable();
        symbols
    }
}

impl Default for MarketDataStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for MarketDataStore {
    async fn fetch(&self, tickers: &[String], range: DateRange) -> Result<MultiSeriesTable, EngineError> {
        let mut table = MultiSeriesTable::new();
        for ticker in tickers {
            match self.get_series(ticker, Some(&range)) {
                Some(series) if !series.is_empty() => {
                    table.insert(series);
                }
                Some(_) => debug!(%ticker, "No rows in requested range"),
                None => debug!(%ticker, "Ticker not in store"),
            }
        }
        Ok(table)
    }
}

/// Reads `<TICKER>.csv` files from one directory.
pub struct CsvDirectoryProvider {
    root: PathBuf,
}

impl CsvDirectoryProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.root.join(format!("{}.csv", ticker.trim().to_uppercase()))
    }

    async fn load(&self, ticker: &str) -> Result<Option<TimeSeries>, EngineError> {
        let path = self.path_for(ticker);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }

        let symbol = ticker.to_string();
        let series = tokio::task::spawn_blocking(move || PriceCsvParser::load_series(&path, &symbol))
            .await
            .map_err(|e| EngineError::MarketDataError(format!("CSV loader task failed for '{}': {}", ticker, e)))?
            .map_err(loader_error)?;
        Ok(Some(series))
    }
}

#[async_trait]
impl MarketDataProvider for CsvDirectoryProvider {
    async fn fetch(&self, tickers: &[String], range: DateRange) -> Result<MultiSeriesTable, EngineError> {
        let mut table = MultiSeriesTable::new();
        for ticker in tickers {
            let Some(series) = self.load(ticker).await? else {
                warn!(%ticker, dir = %self.root.display(), "No CSV file for ticker");
                continue;
            };
            let in_range = series.slice(&range);
            if in_range.is_empty() {
                warn!(%ticker, start = %range.start(), end = %range.end(), "No rows in requested range");
                continue;
            }
            debug!(%ticker, rows = in_range.len(), "Loaded series");
            table.insert(in_range);
        }
        info!(requested = tickers.len(), loaded = table.len(), "Fetched market data");
        Ok(table)
    }
}

// Keeps the csv and io error kinds distinct; anything else is a data format problem.
fn loader_error(err: anyhow::Error) -> EngineError {
    let err = match err.downcast::<csv::Error>() {
        Ok(source) => return EngineError::CsvSystemError { source },
        Err(err) => err,
    };
    match err.downcast::<std::io::Error>() {
        Ok(source) => EngineError::IoError { source },
        Err(err) => EngineError::CsvDataFormatError(format!("{:#}", err)),
    }
}
