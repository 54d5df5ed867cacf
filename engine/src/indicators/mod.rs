// Technical indicators module
pub mod rsi;
pub mod sma;
pub mod trend;

pub use rsi::{compute_oscillator, Rsi, DEFAULT_RSI_WINDOW};
pub use sma::{moving_average, Sma};
pub use trend::{fit_line, fit_trend, LinearTrend, TrendLine};

use serde_json::Value;
use shared::models::{DerivedSeries, Metric, TimeSeries};

// Common trait for all indicators. `calculate` returns one entry per input value.
// `None` in the input is a date without a price; `None` in the output marks positions
// where the indicator has no defined value.
pub trait IndicatorCalculator: Send + Sync {
    fn name(&self) -> &str;
    fn parameters(&self) -> Value; // Parameters used for this indicator instance
    fn calculate(&self, values: &[Option<f64>]) -> Vec<Option<f64>>;
}

/// Runs `calculator` over one metric of `series` and aligns the result with the series dates.
/// Returns `None` when no date carries the metric. Dates without a value are passed through as gaps.
pub fn derive_series(calculator: &dyn IndicatorCalculator, series: &TimeSeries, metric: Metric) -> Option<DerivedSeries> {
    let column = series.column(metric)?;
    tracing::trace!(
        ticker = series.symbol(),
        %metric,
        indicator = calculator.name(),
        parameters = %calculator.parameters(),
        "Deriving indicator series"
    );
    let values = calculator.calculate(&column);
    DerivedSeries::aligned(series.dates(), values).ok()
}
