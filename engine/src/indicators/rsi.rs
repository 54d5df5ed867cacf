// Relative Strength Index (RSI) indicator implementation
//
// Average gain and average loss are trailing simple means over `window` price changes.
// At the start of the series the window grows from a single point, so every position
// gets a value except where gains and losses are both zero. A price change next to a
// missing price is unknown and is left out of both means.
use super::IndicatorCalculator;
use serde_json::Value;

pub const DEFAULT_RSI_WINDOW: usize = 14;

pub struct Rsi {
    name: String,
    window: usize,
}

impl Rsi {
    pub fn new(window: usize) -> Self {
        Self {
            name: format!("RSI({})", window),
            window,
        }
    }
}

impl Default for Rsi {
    fn default() -> Self {
        Self::new(DEFAULT_RSI_WINDOW)
    }
}

impl IndicatorCalculator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn parameters(&self) -> Value {
        serde_json::json!({ "window": self.window })
    }

    fn calculate(&self, values: &[Option<f64>]) -> Vec<Option<f64>> {
        compute_oscillator(values, self.window)
    }
}

/// RSI for every position of `series`.
///
/// `None` means "no signal": both the average gain and the average loss over the
/// window are zero (a flat stretch, or the very first point), or the window holds no
/// known price change. When only the average loss is zero the value saturates at 100.
pub fn compute_oscillator(series: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; series.len()];
    }

    // delta[0] is taken as zero
    let deltas: Vec<Option<f64>> = (0..series.len())
        .map(|i| match (i, series[i]) {
            (_, None) => None,
            (0, Some(_)) => Some(0.0),
            (_, Some(price)) => series[i - 1].map(|prev| price - prev),
        })
        .collect();

    (0..series.len())
        .map(|i| {
            // Summed per window rather than as a running total so that a flat stretch
            // yields exact zeros instead of rounding residue.
            let start = (i + 1).saturating_sub(window);
            let known: Vec<f64> = deltas[start..=i].iter().flatten().copied().collect();
            if known.is_empty() {
                return None;
            }
            let count = known.len() as f64;
            let avg_gain = known.iter().map(|d| d.max(0.0)).sum::<f64>() / count;
            let avg_loss = known.iter().map(|d| (-d).max(0.0)).sum::<f64>() / count;
            rsi_from_averages(avg_gain, avg_loss)
        })
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        if avg_gain == 0.0 {
            return None;
        }
        return Some(100.0);
    }
    let rs = avg_gain / avg_loss;
    let rsi = 100.0 - (100.0 / (1.0 + rs));
    rsi.is_finite().then_some(rsi)
}
