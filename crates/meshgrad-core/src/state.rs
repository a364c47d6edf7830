use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::{GeneratorConfig, DEFAULT_SHAPE_COUNT};
use crate::generator::{generate_shapes, GenerateRequest};
use crate::geometry::Size;
use crate::palette::{Color, ColorId, Palette};
use crate::shape::{Shape, ShapeId};

pub const MIN_CANVAS_SIDE: u32 = 64;
pub const MAX_CANVAS_SIDE: u32 = 6000;
pub const MAX_BLUR: f64 = 256.0;

pub const DEFAULT_SEED: &str = "meshgrad";
pub const DEFAULT_PALETTE: [&str; 5] = ["#0f172a", "#6366f1", "#ec4899", "#f59e0b", "#22d3ee"];

/// Clamp `value` into `[min, max]`; non-finite input becomes `fallback`.
fn clamp_finite(value: f64, min: f64, max: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

/// Global post-processing applied uniformly to every shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Filters {
    /// Gaussian blur standard deviation, `0..=256`.
    pub blur: f64,
    pub grain_enabled: bool,
    /// Grain overlay opacity, `0..=1`.
    pub grain: f64,
}

impl Default for Filters {
    fn default() -> Self {
        Self {
            blur: 120.0,
            grain_enabled: false,
            grain: 0.2,
        }
    }
}

/// Partial update for [`Filters`]. `None` leaves a field unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FiltersUpdate {
    pub blur: Option<f64>,
    pub grain_enabled: Option<bool>,
    pub grain: Option<f64>,
}

impl Filters {
    /// Merge `update`, clamping blur to `[0, 256]` and grain to `[0, 1]`.
    pub fn with(&self, update: FiltersUpdate) -> Self {
        Self {
            blur: update.blur.unwrap_or(self.blur),
            grain_enabled: update.grain_enabled.unwrap_or(self.grain_enabled),
            grain: update.grain.unwrap_or(self.grain),
        }
        .clamped()
    }

    pub fn clamped(&self) -> Self {
        Self {
            blur: clamp_finite(self.blur, 0.0, MAX_BLUR, 0.0),
            grain_enabled: self.grain_enabled,
            grain: clamp_finite(self.grain, 0.0, 1.0, 0.0),
        }
    }
}

/// The logical drawing surface. `background` mirrors `palette[0]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
    pub background: Color,
}

/// Partial update for [`Canvas`]. The background is owned by the palette.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanvasUpdate {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            width,
            height,
            background,
        }
        .clamped()
    }

    /// Merge `update`, clamping both sides to `[64, 6000]`.
    pub fn with(&self, update: CanvasUpdate) -> Self {
        Self {
            width: update.width.unwrap_or(self.width),
            height: update.height.unwrap_or(self.height),
            background: self.background.clone(),
        }
        .clamped()
    }

    pub fn clamped(&self) -> Self {
        Self {
            width: self.width.clamp(MIN_CANVAS_SIDE, MAX_CANVAS_SIDE),
            height: self.height.clamp(MIN_CANVAS_SIDE, MAX_CANVAS_SIDE),
            background: self.background.clone(),
        }
    }

    pub fn size(&self) -> Size {
        Size::new(f64::from(self.width), f64::from(self.height))
    }

    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Editor chrome consumed by adapters. Never persisted, never part of history,
/// never an input to rendering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub container_width: f64,
    pub container_height: f64,
    pub aspect_locked: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            container_width: 1280.0,
            container_height: 720.0,
            aspect_locked: true,
        }
    }
}

/// The serializable gradient: everything history snapshots and share strings carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshState {
    pub palette: Palette,
    pub shapes: Vec<Shape>,
    pub filters: Filters,
    pub canvas: Canvas,
    pub seed: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_shape_id: Option<ShapeId>,
}

impl MeshState {
    /// Deterministic starting state: fixed seed, fixed palette, generated shapes.
    pub fn initial(config: &GeneratorConfig) -> Self {
        let palette = default_palette();
        let background = palette.background().cloned().unwrap_or_else(|| Color::new("#000000"));
        let mut state = Self {
            palette,
            shapes: Vec::new(),
            filters: Filters::default(),
            canvas: Canvas::new(1920, 1080, background),
            seed: DEFAULT_SEED.to_string(),
            selected_shape_id: None,
        };
        state.regenerate(DEFAULT_SHAPE_COUNT, config);
        state
    }

    /// Replace the shape set with a freshly generated one for the current seed.
    pub fn regenerate(&mut self, count: usize, config: &GeneratorConfig) {
        self.shapes = generate_shapes(
            &GenerateRequest {
                seed: &self.seed,
                count,
                canvas: self.canvas.size(),
                palette_len: self.palette.len(),
            },
            config,
        );
        self.selected_shape_id = None;
    }

    /// Bring every field back within its invariants: canvas and filter ranges,
    /// fill indices against the palette, background mirroring `palette[0]`,
    /// finite vertex coordinates, and a selection that still names an existing shape.
    pub fn normalize(&mut self) {
        self.canvas = self.canvas.clamped();
        self.filters = self.filters.clamped();
        if self.palette.is_empty() {
            log::warn!("empty palette replaced with the default palette");
            self.palette = default_palette();
        }
        for shape in &mut self.shapes {
            let dropped = shape.retain_finite();
            if dropped > 0 {
                log::warn!("dropped {dropped} non-finite vertices from shape {}", shape.id);
            }
        }
        self.sync_palette();
        if let Some(id) = self.selected_shape_id {
            if !self.shapes.iter().any(|s| s.id == id) {
                self.selected_shape_id = None;
            }
        }
    }

    /// Re-clamp fill indices and re-sync the canvas background with `palette[0]`.
    pub fn sync_palette(&mut self) {
        let max_index = self.palette.max_index();
        for shape in &mut self.shapes {
            shape.clamp_fill(max_index);
        }
        if let Some(bg) = self.palette.background() {
            self.canvas.background = bg.clone();
        }
    }

    /// Regenerate shapes when the list is empty (fresh storage, stripped share links).
    pub fn ensure_shapes(&mut self, count: usize, config: &GeneratorConfig) -> bool {
        if !self.shapes.is_empty() {
            return false;
        }
        self.regenerate(count, config);
        true
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Default palette with fixed ids so the initial state is reproducible.
pub fn default_palette() -> Palette {
    Palette::new(
        DEFAULT_PALETTE
            .iter()
            .enumerate()
            .map(|(i, hex)| Color::with_id(ColorId(Uuid::from_u128(i as u128 + 1)), hex))
            .collect(),
    )
}
