// Fetch, compose, hand off. The provider call is the only await point; composition is pure.
use crate::chart::ChartComposer;
use crate::data::MarketDataProvider;
use crate::error::EngineError;
use crate::request::AnalysisRequest;
use shared::chart::RenderSpec;
use std::io::Write;
use tracing::{info, warn};

pub const NO_DATA_MESSAGE: &str = "No data found for the requested tickers and date range";

pub async fn build_chart<P>(provider: &P, composer: &ChartComposer, request: &AnalysisRequest) -> Result<RenderSpec, EngineError>
where
    P: MarketDataProvider + ?Sized,
{
    info!(
        tickers = ?request.tickers(),
        start = %request.range.start(),
        end = %request.range.end(),
        "Fetching market data"
    );
    let table = provider.fetch(request.tickers(), request.range).await?;
    if table.is_empty() {
        warn!(tickers = ?request.tickers(), "{}", NO_DATA_MESSAGE);
        return Err(EngineError::MarketDataError(NO_DATA_MESSAGE.to_string()));
    }
    Ok(composer.compose(&table, &request.chart))
}

pub fn write_render_spec<W: Write>(spec: &RenderSpec, mut writer: W) -> Result<(), EngineError> {
    serde_json::to_writer_pretty(&mut writer, spec)?;
    writeln!(writer)?;
    // A dropped BufWriter swallows its final flush error.
    writer.flush()?;
    Ok(())
}
