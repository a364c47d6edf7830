use meshgrad_core::{Canvas, Filters, MeshState, Palette, Shape};

use crate::grain::GrainTexture;

/// Everything the SVG compiler reads. Borrowed from a state snapshot, so a
/// render is unaffected by whatever the store does after it returns.
#[derive(Debug, Clone, Copy)]
pub struct RenderInput<'a> {
    pub canvas: &'a Canvas,
    pub shapes: &'a [Shape],
    pub palette: &'a Palette,
    pub filters: &'a Filters,
    pub grain: Option<&'a GrainTexture>,
    /// Pixel size of the SVG root; defaults to the canvas size.
    pub output_size: Option<(u32, u32)>,
}

impl<'a> RenderInput<'a> {
    pub fn from_state(state: &'a MeshState) -> Self {
        Self {
            canvas: &state.canvas,
            shapes: &state.shapes,
            palette: &state.palette,
            filters: &state.filters,
            grain: None,
            output_size: None,
        }
    }

    pub fn with_grain(mut self, grain: &'a GrainTexture) -> Self {
        self.grain = Some(grain);
        self
    }

    pub fn with_output_size(mut self, width: u32, height: u32) -> Self {
        self.output_size = Some((width.max(1), height.max(1)));
        self
    }

    pub fn output_size(&self) -> (u32, u32) {
        self.output_size
            .unwrap_or((self.canvas.width, self.canvas.height))
    }
}
