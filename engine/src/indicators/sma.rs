// Simple Moving Average (SMA) indicator implementation
use super::IndicatorCalculator;
use serde_json::Value;

pub struct Sma {
    name: String,
    window: usize,
}

impl Sma {
    pub fn new(window: usize) -> Self {
        Self {
            name: format!("SMA({})", window),
            window,
        }
    }
}

impl IndicatorCalculator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window, "min_periods": 1 })
    }

    fn calculate(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        moving_average(values, self.window)
    }
}

/// Trailing mean over the last `window` positions. The first `window - 1` positions
/// average whatever is available so far. Gaps are left out of the mean; a position
/// whose window holds no values has none either. A zero window yields no values.
pub fn moving_average(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    let mut results = Vec::with_capacity(series.len());
    let mut sum = 0.0;
    let mut count = 0usize;
    for (i, value) in series.iter().enumerate() {
        if let Some(value) = value {
            sum += *value;
            count += 1;
        }
        if i >= window {
            if let Some(dropped) = series[i - window] {
                sum -= dropped;
                count -= 1;
            }
        }
        if count == 0 {
            sum = 0.0;
            results.push(None);
        } else {
            results.push(Some(sum / count as f64));
        }
    }
    results
}
