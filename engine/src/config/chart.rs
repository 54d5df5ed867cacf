// Options for one chart, collected by the front end and handed to the composer.
use crate::error::EngineError;
use crate::indicators::DEFAULT_RSI_WINDOW;
use serde::{Deserialize, Serialize};
use shared::models::Metric;

pub const MAX_MA_WINDOW: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Candlestick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    /// Uppercase, deduplicated, in display order. Position decides the color.
    pub tickers: Vec<String>,
    pub metrics: Vec<Metric>,
    pub kind: ChartKind,
    /// 0 disables the moving-average overlay.
    pub ma_window: usize,
    pub show_regression: bool,
    pub show_oscillator: bool,
    pub oscillator_window: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            metrics: vec![Metric::Close],
            kind: ChartKind::Line,
            ma_window: 0,
            show_regression: false,
            show_oscillator: false,
            oscillator_window: DEFAULT_RSI_WINDOW,
        }
    }
}

impl ChartConfig {
    pub fn new<S: AsRef<str>>(tickers: impl IntoIterator<Item = S>, metrics: impl IntoIterator<Item = Metric>) -> Self {
        let mut unique_tickers: Vec<String> = Vec::new();
        for ticker in tickers {
            let ticker = ticker.as_ref().trim().to_uppercase();
            if !ticker.is_empty() && !unique_tickers.contains(&ticker) {
                unique_tickers.push(ticker);
            }
        }
        let mut unique_metrics: Vec<Metric> = Vec::new();
        for metric in metrics {
            if !unique_metrics.contains(&metric) {
                unique_metrics.push(metric);
            }
        }
        Self {
            tickers: unique_tickers,
            metrics: unique_metrics,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: ChartKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_moving_average(mut self, window: usize) -> Self {
        self.ma_window = window;
        self
    }

    pub fn with_regression(mut self, enabled: bool) -> Self {
        self.show_regression = enabled;
        self
    }

    pub fn with_oscillator(mut self, enabled: bool) -> Self {
        self.show_oscillator = enabled;
        self
    }

    pub fn with_oscillator_window(mut self, window: usize) -> Self {
        self.oscillator_window = window;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.ma_window > MAX_MA_WINDOW {
            return Err(EngineError::ConfigError(format!(
                "Moving average window {} is out of range 0..={}",
                self.ma_window, MAX_MA_WINDOW
            )));
        }
        if self.oscillator_window == 0 {
            return Err(EngineError::ConfigError("RSI window must be at least 1".to_string()));
        }
        for (i, ticker) in self.tickers.iter().enumerate() {
            if ticker.is_empty() || *ticker != ticker.trim().to_uppercase() {
                return Err(EngineError::ConfigError(format!("Ticker '{}' must be a trimmed uppercase symbol", ticker)));
            }
            if self.tickers[..i].contains(ticker) {
                return Err(EngineError::ConfigError(format!("Ticker '{}' is listed more than once", ticker)));
            }
        }
        for (i, metric) in self.metrics.iter().enumerate() {
            if self.metrics[..i].contains(metric) {
                return Err(EngineError::ConfigError(format!("Metric '{}' is listed more than once", metric)));
            }
        }
        Ok(())
    }
}
