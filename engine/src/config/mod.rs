// Engine configuration: file-backed settings plus the validated per-chart options.
pub mod chart;
pub mod settings;

pub use chart::{ChartConfig, ChartKind, MAX_MA_WINDOW};
pub use settings::EngineSettings;
