// Least-squares linear trend over a series indexed by position (0, 1, ..., n-1).
use super::IndicatorCalculator;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendLine {
    pub slope: f64,
    pub intercept: f64,
}

impl TrendLine {
    pub fn value_at(&self, index: usize) -> f64 {
        self.intercept + self.slope * index as f64
    }
}

/// Ordinary least squares fit of `series` against its index, over the positions that
/// carry a value. A single value gives a flat line through it; no values give nothing.
pub fn fit_line(series: &[Option<f64>]) -> Option<TrendLine> {
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .filter_map(|(i, y)| y.map(|y| (i as f64, y)))
        .collect();
    match points.as_slice() {
        [] => return None,
        [(_, y)] => return Some(TrendLine { slope: 0.0, intercept: *y }),
        _ => {}
    }

    // Centered on the mean index to keep the sums small.
    let n = points.len() as f64;
    let mean_x = points.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = points.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (x, y) in &points {
        let dx = x - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }

    let slope = sxy / sxx;
    Some(TrendLine { slope, intercept: mean_y - slope * mean_x })
}

/// Fitted trend value at every position of `series`, including positions without a price.
pub fn fit_trend(series: &[Option<f64>]) -> Vec<Option<f64>> {
    let Some(line) = fit_line(series) else {
        return vec![None; series.len()];
    };
    (0..series.len())
        .map(|i| Some(line.value_at(i)).filter(|v| v.is_finite()))
        .collect()
}

pub struct LinearTrend;

impl IndicatorCalculator for LinearTrend {
    fn name(&self) -> &str {
        "Regression"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "method": "ols" })
    }

    fn calculate(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        fit_trend(values)
    }
}
