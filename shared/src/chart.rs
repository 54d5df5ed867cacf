// Renderer-agnostic figure description: an ordered list of traces split across two
// stacked panels that share one date axis.
use crate::models::{DerivedSeries, Metric, TimeSeries};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Panel {
    Price,
    Oscillator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DashStyle {
    Solid,
    Dot,
    Dash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceKind {
    Line,
    Candlestick,
}

// Output only: traces are built through the constructors below, which keep x and y aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TraceData {
    // `None` entries serialize as null so renderers leave a gap instead of plotting zero.
    Line {
        y: Vec<Option<f64>>,
    },
    // A date without all four prices is null in every column and draws no candle.
    Candlestick {
        open: Vec<Option<f64>>,
        high: Vec<Option<f64>>,
        low: Vec<Option<f64>>,
        close: Vec<Option<f64>>,
        increasing_color: String,
        decreasing_color: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    label: String,
    color: String,
    dash: DashStyle,
    panel: Panel,
    x: Vec<NaiveDate>,
    #[serde(flatten)]
    data: TraceData,
}

impl Trace {
    pub fn line(label: impl Into<String>, color: impl Into<String>, dash: DashStyle, panel: Panel, series: DerivedSeries) -> Self {
        let (x, y) = series.into_parts();
        Self {
            label: label.into(),
            color: color.into(),
            dash,
            panel,
            x,
            data: TraceData::Line { y },
        }
    }

    /// Candlestick over the whole series, drawn in a single color for rising and falling days.
    /// Only dates carrying Open, High, Low and Close get a candle. Returns `None` when no
    /// date does.
    pub fn candlestick(label: impl Into<String>, color: impl Into<String>, series: &TimeSeries) -> Option<Self> {
        let n = series.len();
        let (mut open, mut high, mut low, mut close) =
            (Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n), Vec::with_capacity(n));
        let mut candles = 0;
        for point in series.points() {
            let prices = (
                point.get(Metric::Open),
                point.get(Metric::High),
                point.get(Metric::Low),
                point.get(Metric::Close),
            );
            match prices {
                (Some(o), Some(h), Some(l), Some(c)) => {
                    candles += 1;
                    open.push(Some(o));
                    high.push(Some(h));
                    low.push(Some(l));
                    close.push(Some(c));
                }
                _ => {
                    open.push(None);
                    high.push(None);
                    low.push(None);
                    close.push(None);
                }
            }
        }
        if candles == 0 {
            return None;
        }

        let color = color.into();
        Some(Self {
            label: label.into(),
            color: color.clone(),
            dash: DashStyle::Solid,
            panel: Panel::Price,
            x: series.dates(),
            data: TraceData::Candlestick {
                open,
                high,
                low,
                close,
                increasing_color: color.clone(),
                decreasing_color: color,
            },
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn dash(&self) -> DashStyle {
        self.dash
    }

    pub fn panel(&self) -> Panel {
        self.panel
    }

    pub fn x(&self) -> &[NaiveDate] {
        &self.x
    }

    pub fn data(&self) -> &TraceData {
        &self.data
    }

    pub fn kind(&self) -> TraceKind {
        match self.data {
            TraceData::Line { .. } => TraceKind::Line,
            TraceData::Candlestick { .. } => TraceKind::Candlestick,
        }
    }

    /// True when every y array has exactly one entry per date.
    pub fn is_aligned(&self) -> bool {
        let n = self.x.len();
        match &self.data {
            TraceData::Line { y } => y.len() == n,
            TraceData::Candlestick { open, high, low, close, .. } => {
                [open, high, low, close].iter().all(|col| col.len() == n)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizontalGuide {
    pub y: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelLayout {
    pub title: String,
    /// Share of the figure height given to this panel.
    pub height: f64,
    pub y_range: Option<[f64; 2]>,
    pub guides: Vec<HorizontalGuide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeStep {
    Month,
    Year,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    Backward,
    ToDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeButton {
    pub label: String,
    pub count: Option<u32>,
    pub step: RangeStep,
    pub mode: StepMode,
}

impl RangeButton {
    pub fn months(count: u32, label: impl Into<String>) -> Self {
        Self { label: label.into(), count: Some(count), step: RangeStep::Month, mode: StepMode::Backward }
    }

    pub fn year_to_date() -> Self {
        Self { label: "YTD".to_string(), count: Some(1), step: RangeStep::Year, mode: StepMode::ToDate }
    }

    pub fn all() -> Self {
        Self { label: "All".to_string(), count: None, step: RangeStep::All, mode: StepMode::Backward }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateAxis {
    pub buttons: Vec<RangeButton>,
    pub range_slider: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub price_panel: PanelLayout,
    pub oscillator_panel: PanelLayout,
    pub vertical_spacing: f64,
    pub shared_x_axis: bool,
    pub x_axis: DateAxis,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderSpec {
    traces: Vec<Trace>,
    layout: Layout,
}

impl RenderSpec {
    pub fn new(layout: Layout) -> Self {
        Self { traces: Vec::new(), layout }
    }

    pub fn push(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    pub fn traces(&self) -> &[Trace] {
        &self.traces
    }

    pub fn panel_traces(&self, panel: Panel) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(move |t| t.panel == panel)
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PricePoint;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn layout() -> Layout {
        let panel = |title: &str, height| PanelLayout { title: title.to_string(), height, y_range: None, guides: vec![] };
        Layout {
            price_panel: panel("Price", 0.7),
            oscillator_panel: panel("Indicators", 0.2),
            vertical_spacing: 0.1,
            shared_x_axis: true,
            x_axis: DateAxis { buttons: vec![RangeButton::months(1, "1m"), RangeButton::all()], range_slider: true },
        }
    }

    #[test]
    fn test_candlestick_needs_full_ohlc() {
        let full = TimeSeries::new("AAPL", vec![PricePoint::ohlcv(day(1), 1.0, 2.0, 0.5, 1.5, 100.0)]).unwrap();
        let trace = Trace::candlestick("AAPL", "#636EFA", &full).unwrap();
        assert_eq!(trace.kind(), TraceKind::Candlestick);
        assert!(trace.is_aligned());
        match trace.data() {
            TraceData::Candlestick { increasing_color, decreasing_color, .. } => {
                assert_eq!(increasing_color, "#636EFA");
                assert_eq!(decreasing_color, "#636EFA");
            }
            other => panic!("unexpected trace data {:?}", other),
        }

        let no_high = TimeSeries::new(
            "MSFT",
            vec![PricePoint::new(day(1)).with(Metric::Open, 1.0).with(Metric::Low, 0.5).with(Metric::Close, 1.2)],
        )
        .unwrap();
        assert!(Trace::candlestick("MSFT", "#EF553B", &no_high).is_none());
    }

    #[test]
    fn test_candlestick_leaves_incomplete_dates_empty() {
        let series = TimeSeries::new(
            "AAPL",
            vec![
                PricePoint::ohlcv(day(1), 1.0, 2.0, 0.5, 1.5, 100.0),
                PricePoint::new(day(2)).with(Metric::Open, 1.5).with(Metric::Close, 1.7),
                PricePoint::ohlcv(day(3), 1.7, 2.2, 1.6, 2.0, 120.0),
            ],
        )
        .unwrap();
        let trace = Trace::candlestick("AAPL", "#636EFA", &series).unwrap();
        assert!(trace.is_aligned());
        match trace.data() {
            TraceData::Candlestick { open, high, close, .. } => {
                assert_eq!(open, &vec![Some(1.0), None, Some(1.7)]);
                assert_eq!(high, &vec![Some(2.0), None, Some(2.2)]);
                assert_eq!(close, &vec![Some(1.5), None, Some(2.0)]);
            }
            other => panic!("unexpected trace data {:?}", other),
        }

        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(json["low"], serde_json::json!([0.5, null, 1.6]));
    }

    #[test]
    fn test_line_trace_serializes_missing_values_as_null() {
        let series = DerivedSeries::aligned(vec![day(1), day(2)], vec![None, Some(50.0)]).unwrap();
        let mut spec = RenderSpec::new(layout());
        spec.push(Trace::line("AAPL RSI", "#636EFA", DashStyle::Solid, Panel::Oscillator, series));

        let json = serde_json::to_value(&spec).unwrap();
        let trace = &json["traces"][0];
        assert_eq!(trace["kind"], "line");
        assert_eq!(trace["panel"], "oscillator");
        assert_eq!(trace["y"], serde_json::json!([null, 50.0]));
        assert_eq!(trace["x"], serde_json::json!(["2024-03-01", "2024-03-02"]));
        assert_eq!(json["layout"]["price_panel"]["title"], "Price");
    }

    #[test]
    fn test_panel_traces_filters_by_panel() {
        let series = || DerivedSeries::aligned(vec![day(1)], vec![Some(1.0)]).unwrap();
        let mut spec = RenderSpec::new(layout());
        spec.push(Trace::line("AAPL Close", "#636EFA", DashStyle::Solid, Panel::Price, series()));
        spec.push(Trace::line("AAPL RSI", "#636EFA", DashStyle::Solid, Panel::Oscillator, series()));
        assert_eq!(spec.panel_traces(Panel::Price).count(), 1);
        assert_eq!(spec.panel_traces(Panel::Oscillator).next().unwrap().label(), "AAPL RSI");
        assert_eq!(spec.len(), 2);
    }
}
