// Builds the two-panel figure for a set of tickers: price panel on top, oscillator
// panel below, one shared date axis with range presets and a slider.
use super::Palette;
use crate::config::{ChartConfig, ChartKind};
use crate::indicators::{derive_series, LinearTrend, Rsi, Sma};
use shared::chart::{DashStyle, DateAxis, HorizontalGuide, Layout, Panel, PanelLayout, RangeButton, RenderSpec, Trace};
use shared::models::{DerivedSeries, Metric, MultiSeriesTable, TimeSeries};
use tracing::{debug, info, warn};

pub const PRICE_PANEL_TITLE: &str = "Price";
pub const OSCILLATOR_PANEL_TITLE: &str = "RSI";
// Shown on the lower panel when the oscillator is off; the panel keeps its height.
pub const PLACEHOLDER_PANEL_TITLE: &str = "Indicators";

pub const PRICE_PANEL_HEIGHT: f64 = 0.7;
pub const OSCILLATOR_PANEL_HEIGHT: f64 = 0.2;
pub const PANEL_SPACING: f64 = 0.1;

pub const REGRESSION_COLOR: &str = "red";
pub const OVERBOUGHT_LEVEL: f64 = 70.0;
pub const OVERSOLD_LEVEL: f64 = 30.0;

#[derive(Debug, Clone, Default)]
pub struct ChartComposer {
    palette: Palette,
}

impl ChartComposer {
    pub fn new(palette: Palette) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Assembles every trace for `config` from `table`.
    ///
    /// Tickers or metrics missing from the table produce no traces and no error; an
    /// empty table gives a RenderSpec with zero traces. Colors follow the position of the
    /// ticker in `config.tickers`, whether or not that ticker has data.
    pub fn compose(&self, table: &MultiSeriesTable, config: &ChartConfig) -> RenderSpec {
        let mut spec = RenderSpec::new(build_layout(config));

        for (index, ticker) in config.tickers.iter().enumerate() {
            let color = self.palette.color_for(index);
            match table.get(ticker) {
                Some(series) => self.compose_ticker(&mut spec, series, color, config),
                None => debug!(%ticker, "No data for ticker, skipping"),
            }
        }

        info!(
            tickers = config.tickers.len(),
            traces = spec.len(),
            oscillator_traces = spec.panel_traces(Panel::Oscillator).count(),
            "Composed chart"
        );
        spec
    }

    fn compose_ticker(&self, spec: &mut RenderSpec, series: &TimeSeries, color: &str, config: &ChartConfig) {
        let ticker = series.symbol();

        if config.kind == ChartKind::Candlestick {
            match Trace::candlestick(ticker, color, series) {
                Some(trace) => spec.push(trace),
                None => debug!(ticker, "Open/High/Low/Close incomplete, no candlestick"),
            }
        }

        let moving_average = (config.ma_window > 0).then(|| Sma::new(config.ma_window));

        for &metric in &config.metrics {
            let Some(raw) = raw_series(series, metric) else {
                debug!(ticker, %metric, "Metric not present, skipping");
                continue;
            };
            if series.is_partial(metric) {
                warn!(ticker, %metric, "Metric missing on some dates, drawing with gaps");
            }
            spec.push(Trace::line(format!("{} {}", ticker, metric), color, DashStyle::Solid, Panel::Price, raw));

            if let Some(sma) = &moving_average {
                if let Some(averaged) = derive_series(sma, series, metric) {
                    let label = format!("{} {} {}-day MA", ticker, metric, config.ma_window);
                    spec.push(Trace::line(label, color, DashStyle::Dot, Panel::Price, averaged));
                }
            }

            if config.show_regression {
                if let Some(trend) = derive_series(&LinearTrend, series, metric) {
                    let label = format!("{} {} Regression", ticker, metric);
                    spec.push(Trace::line(label, REGRESSION_COLOR, DashStyle::Dash, Panel::Price, trend));
                }
            }
        }

        // Once per ticker, always on Close, regardless of the selected metrics.
        if config.show_oscillator {
            let rsi = Rsi::new(config.oscillator_window);
            match derive_series(&rsi, series, Metric::Close) {
                Some(values) => {
                    let label = format!("{} RSI", ticker);
                    spec.push(Trace::line(label, color, DashStyle::Solid, Panel::Oscillator, values));
                }
                None => debug!(ticker, "No Close series, no RSI"),
            }
        }
    }
}

fn raw_series(series: &TimeSeries, metric: Metric) -> Option<DerivedSeries> {
    DerivedSeries::aligned(series.dates(), series.column(metric)?).ok()
}

fn build_layout(config: &ChartConfig) -> Layout {
    let oscillator_panel = if config.show_oscillator {
        PanelLayout {
            title: OSCILLATOR_PANEL_TITLE.to_string(),
            height: OSCILLATOR_PANEL_HEIGHT,
            y_range: Some([0.0, 100.0]),
            guides: vec![
                HorizontalGuide { y: OVERBOUGHT_LEVEL, label: "Overbought".to_string() },
                HorizontalGuide { y: OVERSOLD_LEVEL, label: "Oversold".to_string() },
            ],
        }
    } else {
        PanelLayout {
            title: PLACEHOLDER_PANEL_TITLE.to_string(),
            height: OSCILLATOR_PANEL_HEIGHT,
            y_range: None,
            guides: Vec::new(),
        }
    };

    Layout {
        price_panel: PanelLayout {
            title: PRICE_PANEL_TITLE.to_string(),
            height: PRICE_PANEL_HEIGHT,
            y_range: None,
            guides: Vec::new(),
        },
        oscillator_panel,
        vertical_spacing: PANEL_SPACING,
        shared_x_axis: true,
        x_axis: DateAxis {
            buttons: vec![
                RangeButton::months(1, "1m"),
                RangeButton::months(3, "3m"),
                RangeButton::months(6, "6m"),
                RangeButton::year_to_date(),
                RangeButton::all(),
            ],
            range_slider: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shared::chart::{TraceData, TraceKind};
    use shared::models::PricePoint;

    fn day(i: usize) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(i as i64)
    }

    fn ohlcv_series(symbol: &str, closes: &[f64]) -> TimeSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::ohlcv(day(i), c - 0.5, c + 1.0, c - 1.0, c, 1_000.0))
            .collect();
        TimeSeries::new(symbol, points).unwrap()
    }

    // Open and Close only: no High/Low.
    fn open_close_series(symbol: &str, closes: &[f64]) -> TimeSeries {
        let points = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::new(day(i)).with(Metric::Open, c).with(Metric::Close, c))
            .collect();
        TimeSeries::new(symbol, points).unwrap()
    }

    fn two_ticker_table() -> MultiSeriesTable {
        vec![
            ohlcv_series("AAPL", &[10.0, 11.0, 12.0, 11.5, 13.0]),
            ohlcv_series("MSFT", &[20.0, 19.0, 19.5, 21.0, 22.0]),
        ]
        .into_iter()
        .collect()
    }

    fn labels(spec: &RenderSpec) -> Vec<&str> {
        spec.traces().iter().map(|t| t.label()).collect()
    }

    #[test]
    fn test_one_line_per_ticker_without_overlays() {
        let composer = ChartComposer::default();
        let config = ChartConfig::new(["AAPL", "MSFT"], [Metric::Close]);
        let spec = composer.compose(&two_ticker_table(), &config);

        assert_eq!(labels(&spec), vec!["AAPL Close", "MSFT Close"]);
        assert_eq!(spec.traces()[0].color(), composer.palette().color_for(0));
        assert_eq!(spec.traces()[1].color(), composer.palette().color_for(1));
        assert!(spec.traces().iter().all(|t| t.kind() == TraceKind::Line && t.dash() == DashStyle::Solid));
        assert_eq!(spec.panel_traces(Panel::Oscillator).count(), 0);
        assert_eq!(spec.layout().oscillator_panel.title, PLACEHOLDER_PANEL_TITLE);
    }

    #[test]
    fn test_all_overlays_in_order() {
        let config = ChartConfig::new(["AAPL"], [Metric::Close])
            .with_kind(ChartKind::Candlestick)
            .with_moving_average(3)
            .with_regression(true)
            .with_oscillator(true);
        let spec = ChartComposer::default().compose(&two_ticker_table(), &config);

        assert_eq!(
            labels(&spec),
            vec!["AAPL", "AAPL Close", "AAPL Close 3-day MA", "AAPL Close Regression", "AAPL RSI"]
        );
        let traces = spec.traces();
        assert_eq!(traces[0].kind(), TraceKind::Candlestick);
        assert_eq!(traces[2].dash(), DashStyle::Dot);
        assert_eq!(traces[2].color(), traces[1].color());
        assert_eq!(traces[3].dash(), DashStyle::Dash);
        assert_eq!(traces[3].color(), REGRESSION_COLOR);
        assert_eq!(traces[4].panel(), Panel::Oscillator);
        assert_eq!(traces[4].color(), traces[1].color());
        assert!(traces.iter().all(|t| t.is_aligned() && t.x().len() == 5));

        let layout = spec.layout();
        assert_eq!(layout.oscillator_panel.title, OSCILLATOR_PANEL_TITLE);
        assert_eq!(layout.oscillator_panel.y_range, Some([0.0, 100.0]));
        assert_eq!(layout.oscillator_panel.guides.len(), 2);
    }

    #[test]
    fn test_moving_average_values() {
        let table: MultiSeriesTable = vec![ohlcv_series("AAPL", &[1.0, 2.0, 3.0, 4.0])].into_iter().collect();
        let config = ChartConfig::new(["AAPL"], [Metric::Close]).with_moving_average(3);
        let spec = ChartComposer::default().compose(&table, &config);

        let ma = &spec.traces()[1];
        assert_eq!(ma.label(), "AAPL Close 3-day MA");
        assert_eq!(ma.data(), &TraceData::Line { y: vec![Some(1.0), Some(1.5), Some(2.0), Some(3.0)] });
    }

    #[test]
    fn test_candlestick_skipped_when_high_low_missing() {
        let table: MultiSeriesTable = vec![
            open_close_series("AAPL", &[10.0, 11.0, 12.0]),
            ohlcv_series("MSFT", &[20.0, 21.0, 22.0]),
        ]
        .into_iter()
        .collect();
        let config = ChartConfig::new(["AAPL", "MSFT"], [Metric::Close, Metric::Open]).with_kind(ChartKind::Candlestick);
        let spec = ChartComposer::default().compose(&table, &config);

        assert_eq!(labels(&spec), vec!["AAPL Close", "AAPL Open", "MSFT", "MSFT Close", "MSFT Open"]);
        let candles: Vec<_> = spec.traces().iter().filter(|t| t.kind() == TraceKind::Candlestick).collect();
        assert_eq!(candles.len(), 1);
        match candles[0].data() {
            TraceData::Candlestick { increasing_color, decreasing_color, .. } => {
                assert_eq!(increasing_color, decreasing_color);
                assert_eq!(increasing_color, candles[0].color());
            }
            other => panic!("unexpected trace data {:?}", other),
        }
    }

    #[test]
    fn test_missing_metric_is_skipped() {
        let table: MultiSeriesTable = vec![open_close_series("AAPL", &[1.0, 2.0])].into_iter().collect();
        let config = ChartConfig::new(["AAPL"], [Metric::Volume, Metric::Close]).with_regression(true);
        let spec = ChartComposer::default().compose(&table, &config);
        assert_eq!(labels(&spec), vec!["AAPL Close", "AAPL Close Regression"]);
    }

    #[test]
    fn test_missing_row_leaves_gaps_in_every_trace() {
        let mut points: Vec<PricePoint> = [10.0, 11.0, 12.0, 11.5]
            .iter()
            .enumerate()
            .map(|(i, &c)| PricePoint::ohlcv(day(i), c - 0.5, c + 1.0, c - 1.0, c, 1_000.0))
            .collect();
        points[2] = PricePoint::new(day(2));
        let table: MultiSeriesTable = vec![TimeSeries::new("AAPL", points).unwrap()].into_iter().collect();
        let config = ChartConfig::new(["AAPL"], [Metric::Close])
            .with_kind(ChartKind::Candlestick)
            .with_moving_average(2)
            .with_regression(true)
            .with_oscillator(true);
        let spec = ChartComposer::default().compose(&table, &config);

        assert_eq!(
            labels(&spec),
            vec!["AAPL", "AAPL Close", "AAPL Close 2-day MA", "AAPL Close Regression", "AAPL RSI"]
        );
        assert!(spec.traces().iter().all(|t| t.is_aligned() && t.x().len() == 4));

        let traces = spec.traces();
        match traces[0].data() {
            TraceData::Candlestick { close, .. } => assert_eq!(close, &vec![Some(10.0), Some(11.0), None, Some(11.5)]),
            other => panic!("unexpected trace data {:?}", other),
        }
        assert_eq!(traces[1].data(), &TraceData::Line { y: vec![Some(10.0), Some(11.0), None, Some(11.5)] });
        assert_eq!(traces[2].data(), &TraceData::Line { y: vec![Some(10.0), Some(10.5), Some(11.0), Some(11.5)] });
        match traces[3].data() {
            TraceData::Line { y } => assert!(y.iter().all(Option::is_some)),
            other => panic!("unexpected trace data {:?}", other),
        }
    }

    #[test]
    fn test_null_csv_row_still_charts() {
        let csv = "\
Date,Open,High,Low,Close,Volume
2024-01-02,10,11,9,10.5,100
2024-01-03,10.5,12,10,11.5,120
2024-01-04,null,null,null,null,null
2024-01-05,11.5,13,11,12.5,90
";
        let series = crate::data::PriceCsvParser::parse_series(csv.as_bytes(), "AAPL").unwrap();
        let table: MultiSeriesTable = vec![series].into_iter().collect();
        let config = ChartConfig::new(["AAPL"], [Metric::Close])
            .with_kind(ChartKind::Candlestick)
            .with_regression(true)
            .with_oscillator(true);
        let spec = ChartComposer::default().compose(&table, &config);

        assert_eq!(labels(&spec), vec!["AAPL", "AAPL Close", "AAPL Close Regression", "AAPL RSI"]);
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["traces"][1]["y"], serde_json::json!([10.5, 11.5, null, 12.5]));
    }

    #[test]
    fn test_rsi_once_per_ticker_and_needs_close() {
        let only_open = TimeSeries::new(
            "MSFT",
            vec![PricePoint::new(day(0)).with(Metric::Open, 1.0), PricePoint::new(day(1)).with(Metric::Open, 2.0)],
        )
        .unwrap();
        let table: MultiSeriesTable = vec![ohlcv_series("AAPL", &[1.0, 2.0, 3.0]), only_open].into_iter().collect();
        let config = ChartConfig::new(["AAPL", "MSFT"], [Metric::Open, Metric::High, Metric::Close]).with_oscillator(true);
        let spec = ChartComposer::default().compose(&table, &config);

        let rsi: Vec<&str> = spec.panel_traces(Panel::Oscillator).map(|t| t.label()).collect();
        assert_eq!(rsi, vec!["AAPL RSI"]);
        assert_eq!(spec.layout().oscillator_panel.title, OSCILLATOR_PANEL_TITLE);
    }

    #[test]
    fn test_flat_prices_give_rsi_gaps_not_numbers() {
        let table: MultiSeriesTable = vec![ohlcv_series("AAPL", &[5.0; 6])].into_iter().collect();
        let config = ChartConfig::new(["AAPL"], Vec::<Metric>::new()).with_oscillator(true);
        let spec = ChartComposer::default().compose(&table, &config);

        assert_eq!(spec.len(), 1);
        assert_eq!(spec.traces()[0].data(), &TraceData::Line { y: vec![None; 6] });
    }

    #[test]
    fn test_missing_ticker_keeps_color_slot() {
        let config = ChartConfig::new(["AAPL", "ZZZZ", "MSFT"], [Metric::Close]);
        let composer = ChartComposer::default();
        let spec = composer.compose(&two_ticker_table(), &config);

        assert_eq!(labels(&spec), vec!["AAPL Close", "MSFT Close"]);
        assert_eq!(spec.traces()[1].color(), composer.palette().color_for(2));
    }

    #[test]
    fn test_empty_table_gives_zero_traces() {
        let config = ChartConfig::new(["AAPL"], [Metric::Close]).with_oscillator(true).with_regression(true);
        let spec = ChartComposer::default().compose(&MultiSeriesTable::new(), &config);
        assert!(spec.is_empty());
        assert_eq!(spec.layout().x_axis.buttons.len(), 5);
    }

    #[test]
    fn test_layout_is_fixed() {
        let spec = ChartComposer::default().compose(&two_ticker_table(), &ChartConfig::new(["AAPL"], [Metric::Close]));
        let layout = spec.layout();
        assert_eq!(layout.price_panel.height, PRICE_PANEL_HEIGHT);
        assert_eq!(layout.oscillator_panel.height, OSCILLATOR_PANEL_HEIGHT);
        assert!(layout.shared_x_axis);
        assert!(layout.x_axis.range_slider);
        let buttons: Vec<&str> = layout.x_axis.buttons.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(buttons, vec!["1m", "3m", "6m", "YTD", "All"]);
    }

    #[test]
    fn test_compose_is_deterministic() {
        let config = ChartConfig::new(["MSFT", "AAPL"], [Metric::Close, Metric::High])
            .with_kind(ChartKind::Candlestick)
            .with_moving_average(2)
            .with_regression(true)
            .with_oscillator(true);
        let composer = ChartComposer::default();
        let table = two_ticker_table();
        assert_eq!(composer.compose(&table, &config), composer.compose(&table, &config));
    }
}
