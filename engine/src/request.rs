// Turns raw front-end input (ticker text, date strings, metric names) into a
// validated AnalysisRequest. Nothing past this point reads user text.
use crate::config::ChartConfig;
use crate::error::EngineError;
use chrono::{Duration, NaiveDate};
use shared::models::{DateRange, Metric};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    pub range: DateRange,
    pub chart: ChartConfig,
}

impl AnalysisRequest {
    pub fn new(range: DateRange, chart: ChartConfig) -> Result<Self, EngineError> {
        chart.validate()?;
        if chart.tickers.is_empty() {
            return Err(EngineError::InvalidInput("Enter at least one ticker symbol".to_string()));
        }
        Ok(Self { range, chart })
    }

    pub fn tickers(&self) -> &[String] {
        &self.chart.tickers
    }
}

/// Splits comma-separated ticker text into trimmed uppercase symbols, dropping blanks
/// and repeats while keeping the first-seen order.
pub fn parse_tickers(text: &str) -> Vec<String> {
    let mut tickers: Vec<String> = Vec::new();
    for raw in text.split(',') {
        let ticker = raw.trim().to_uppercase();
        if !ticker.is_empty() && !tickers.contains(&ticker) {
            tickers.push(ticker);
        }
    }
    tickers
}

pub fn parse_metrics(text: &str) -> Result<Vec<Metric>, EngineError> {
    let mut metrics = Vec::new();
    for raw in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let metric: Metric = raw.parse()?;
        if !metrics.contains(&metric) {
            metrics.push(metric);
        }
    }
    Ok(metrics)
}

pub fn parse_date(text: &str) -> Result<NaiveDate, EngineError> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT)
        .map_err(|_| EngineError::InvalidInput(format!("Invalid date format '{}'. Please use YYYY-MM-DD", text.trim())))
}

/// Inclusive range from optional start/end strings. A missing end means `today`;
/// a missing start means `lookback_days` before the end.
pub fn parse_date_range(
    start: Option<&str>,
    end: Option<&str>,
    today: NaiveDate,
    lookback_days: u32,
) -> Result<DateRange, EngineError> {
    let end = end.map(parse_date).transpose()?.unwrap_or(today);
    let start = match start {
        Some(text) => parse_date(text)?,
        None => end.checked_sub_signed(Duration::days(i64::from(lookback_days))).ok_or_else(|| {
            EngineError::ConfigError(format!("lookback_days {} reaches before the earliest supported date", lookback_days))
        })?,
    };
    DateRange::new(start, end)
        .map_err(|_| EngineError::InvalidInput(format!("Start date {} is after end date {}", start, end)))
}
