use serde::{Deserialize, Serialize};

/// Min/max multipliers applied to the canvas minor dimension to size a polygon.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RadiusScale {
    pub min: f64,
    pub max: f64,
}

impl RadiusScale {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Default for RadiusScale {
    fn default() -> Self {
        Self::new(0.30, 0.55)
    }
}

/// Tuning for shape generation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fraction of shapes whose centers lie on the canvas.
    pub inside_fraction: f64,
    /// How far (as a fraction of canvas size) candidate centers may fall beyond each edge.
    pub overscan: f64,
    pub inside_radius: RadiusScale,
    pub outside_radius: RadiusScale,
    /// Candidate draws per center before spacing is relaxed.
    pub retry_budget: usize,
    /// Relative weight of palette index 0 when assigning fills; every other index weighs 1.
    pub background_weight: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            inside_fraction: 4.0 / 6.0,
            overscan: 0.2,
            inside_radius: RadiusScale::new(0.30, 0.55),
            outside_radius: RadiusScale::new(0.45, 0.75),
            retry_budget: 300,
            background_weight: 0.5,
        }
    }
}

pub const MIN_SHAPE_COUNT: usize = 3;
pub const MAX_SHAPE_COUNT: usize = 10;
pub const DEFAULT_SHAPE_COUNT: usize = 6;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// Store-level limits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Maximum snapshots kept on each of the undo and redo stacks.
    pub history_limit: usize,
    pub default_shape_count: usize,
    pub generator: GeneratorConfig,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            default_shape_count: DEFAULT_SHAPE_COUNT,
            generator: GeneratorConfig::default(),
        }
    }
}

/// Clamp a requested shape count into the supported range.
pub fn clamp_shape_count(count: usize) -> usize {
    count.clamp(MIN_SHAPE_COUNT, MAX_SHAPE_COUNT)
}
