// Engine library root: indicators, chart composition, configuration and the
// market data boundary.

pub mod chart;
pub mod config;
pub mod data;
pub mod error;
pub mod indicators;
pub mod pipeline;
pub mod request;

pub use error::EngineError;
