//! # Meshgrad Renderer
//!
//! Compiles a gradient snapshot into SVG markup and derives every export
//! from that one string: percent-encoded data URLs, the CSS background
//! snippet, and PNG/WebP rasters.
//!
//! `render_svg` is pure. The same [`RenderInput`] always yields the same
//! bytes, so exports and share previews are reproducible.

pub mod data_url;
pub mod frame;
pub mod grain;
pub mod raster;
pub mod render_data;
pub mod svg;

pub use data_url::{css_background, svg_data_url};
pub use frame::{resize_canvas, Frame};
pub use grain::{grain_texture, GrainTexture};
pub use raster::{
    rasterize_blocking, rasterize_data_url, CancelToken, RasterError, RasterFormat, RasterOptions,
    RasterTask,
};
pub use render_data::RenderInput;
pub use svg::render_svg;
