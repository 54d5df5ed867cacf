// Chart assembly: per-ticker coloring and composition of the two-panel figure.
pub mod composer;
pub mod palette;

pub use composer::ChartComposer;
pub use palette::Palette;
