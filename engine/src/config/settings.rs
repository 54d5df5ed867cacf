// Engine settings loaded from a JSON file. Every field has a default, so a partial
// file (or no file at all) is fine.
use crate::chart::Palette;
use crate::error::EngineError;
use crate::indicators::DEFAULT_RSI_WINDOW;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EngineSettings {
    /// Directory holding one `<TICKER>.csv` per symbol.
    pub data_dir: PathBuf,
    pub default_tickers: Vec<String>,
    pub lookback_days: u32,
    pub oscillator_window: usize,
    /// Overrides the built-in color cycle when set.
    pub palette: Option<Vec<String>>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            data_dir: PathBuf::from("data"),
            default_tickers: vec!["AAPL".to_string(), "MSFT".to_string()],
            lookback_days: 365,
            oscillator_window: DEFAULT_RSI_WINDOW,
            palette: None,
        }
    }
}

impl EngineSettings {
    pub fn load(path: &Path) -> Result<Self, EngineError> {
        let raw = std::fs::read_to_string(path)?;
        let settings: EngineSettings = serde_json::from_str(&raw)
            .map_err(|e| EngineError::ConfigError(format!("Failed to parse settings '{}': {}", path.display(), e)))?;
        tracing::info!(path = %path.display(), data_dir = %settings.data_dir.display(), "Loaded engine settings");
        Ok(settings)
    }

    pub fn palette(&self) -> Result<Palette, EngineError> {
        match &self.palette {
            Some(colors) => Palette::new(colors.clone()),
            None => Ok(Palette::default()),
        }
    }
}
