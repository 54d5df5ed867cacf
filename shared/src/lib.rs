// Data model shared between the engine and whatever renders its output.
pub mod chart;
pub mod models;
