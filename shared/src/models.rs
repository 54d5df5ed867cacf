use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Dates for '{symbol}' are not strictly increasing at {date}")]
    UnorderedDates { symbol: String, date: NaiveDate },

    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    #[error("Derived series length mismatch: {dates} dates but {values} values")]
    LengthMismatch { dates: usize, values: usize },

    #[error("Unknown metric '{0}'. Use Open, High, Low, Close or Volume")]
    UnknownMetric(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Metric {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl Metric {
    pub const ALL: [Metric; 5] = [Metric::Open, Metric::High, Metric::Low, Metric::Close, Metric::Volume];
    pub const OHLC: [Metric; 4] = [Metric::Open, Metric::High, Metric::Low, Metric::Close];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Open => "Open",
            Metric::High => "High",
            Metric::Low => "Low",
            Metric::Close => "Close",
            Metric::Volume => "Volume",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Metric::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ModelError::UnknownMetric(wanted.to_string()))
    }
}

// One trading day for one ticker. Any subset of the metrics may be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub values: BTreeMap<Metric, f64>,
}

impl PricePoint {
    pub fn new(date: NaiveDate) -> Self {
        Self { date, values: BTreeMap::new() }
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.values.insert(metric, value);
        self
    }

    pub fn ohlcv(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self::new(date)
            .with(Metric::Open, open)
            .with(Metric::High, high)
            .with(Metric::Low, low)
            .with(Metric::Close, close)
            .with(Metric::Volume, volume)
    }

    /// Value of `metric` on this date. Non-finite values count as missing.
    pub fn get(&self, metric: Metric) -> Option<f64> {
        self.values.get(&metric).copied().filter(|v| v.is_finite())
    }
}

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ModelError> {
        if start > end {
            return Err(ModelError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Daily points for one ticker, strictly ordered by date.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    symbol: String,
    points: Vec<PricePoint>,
}

impl TimeSeries {
    pub fn new(symbol: impl Into<String>, points: Vec<PricePoint>) -> Result<Self, ModelError> {
        let symbol = symbol.into().trim().to_uppercase();
        if let Some(pair) = points.windows(2).find(|w| w[0].date >= w[1].date) {
            return Err(ModelError::UnorderedDates { symbol, date: pair[1].date });
        }
        Ok(Self { symbol, points })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    // Present when at least one date carries a finite value; other dates may be gaps.
    pub fn has_metric(&self, metric: Metric) -> bool {
        self.points.iter().any(|p| p.get(metric).is_some())
    }

    pub fn has_ohlc(&self) -> bool {
        Metric::OHLC.into_iter().all(|m| self.has_metric(m))
    }

    /// One entry per date for `metric`, `None` on dates without a value.
    /// Returns `None` when no date carries the metric at all.
    pub fn column(&self, metric: Metric) -> Option<Vec<Option<f64>>> {
        if !self.has_metric(metric) {
            return None;
        }
        Some(self.points.iter().map(|p| p.get(metric)).collect())
    }

    /// Whether `metric` shows up on some dates but not all of them.
    pub fn is_partial(&self, metric: Metric) -> bool {
        let present = self.points.iter().filter(|p| p.get(metric).is_some()).count();
        present > 0 && present < self.points.len()
    }

    pub fn slice(&self, range: &DateRange) -> TimeSeries {
        TimeSeries {
            symbol: self.symbol.clone(),
            points: self.points.iter().filter(|p| range.contains(p.date)).cloned().collect(),
        }
    }
}

/// Ticker -> series. Tickers are stored and looked up uppercase.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MultiSeriesTable {
    series: BTreeMap<String, TimeSeries>,
}

impl MultiSeriesTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, series: TimeSeries) -> Option<TimeSeries> {
        self.series.insert(series.symbol().to_string(), series)
    }

    pub fn get(&self, ticker: &str) -> Option<&TimeSeries> {
        self.series.get(&ticker.trim().to_uppercase())
    }

    pub fn contains(&self, ticker: &str) -> bool {
        self.get(ticker).is_some()
    }

    pub fn metric(&self, ticker: &str, metric: Metric) -> Option<Vec<Option<f64>>> {
        self.get(ticker).and_then(|s| s.column(metric))
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl FromIterator<TimeSeries> for MultiSeriesTable {
    fn from_iter<I: IntoIterator<Item = TimeSeries>>(iter: I) -> Self {
        let mut table = MultiSeriesTable::new();
        for series in iter {
            table.insert(series);
        }
        table
    }
}

// Output of an indicator, aligned index-for-index with the dates it was computed over.
// `None` marks dates where the indicator has no defined value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedSeries {
    dates: Vec<NaiveDate>,
    values: Vec<Option<f64>>,
}

impl DerivedSeries {
    pub fn aligned(dates: Vec<NaiveDate>, values: Vec<Option<f64>>) -> Result<Self, ModelError> {
        if dates.len() != values.len() {
            return Err(ModelError::LengthMismatch { dates: dates.len(), values: values.len() });
        }
        Ok(Self { dates, values })
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn into_parts(self) -> (Vec<NaiveDate>, Vec<Option<f64>>) {
        (self.dates, self.values)
    }
}
