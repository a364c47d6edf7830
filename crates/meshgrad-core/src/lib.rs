//! # Meshgrad Core
//!
//! Gradient state model, seeded procedural shape generation (PRNG, spaced
//! center sampling, irregular polygons), and the store that owns the state
//! with a linear undo/redo history and a share-string codec.
//!
//! Rendering lives in `meshgrad-renderer`; this crate only produces the data.

pub mod config;
pub mod generator;
pub mod geometry;
pub mod history;
pub mod palette;
pub mod polygon;
pub mod prng;
pub mod sampler;
pub mod shape;
pub mod share;
pub mod spatial;
pub mod state;
pub mod store;

pub use config::{GeneratorConfig, RadiusScale, StoreConfig};
pub use generator::{generate_shapes, generate_shapes_detailed, GenerateRequest, GeneratedShape};
pub use geometry::{BBox, Point, Size};
pub use history::History;
pub use palette::{Color, ColorId, Palette};
pub use prng::Prng;
pub use sampler::{sample_centers, Region, SampleRequest};
pub use shape::{Shape, ShapeId};
pub use share::ShareError;
pub use state::{Canvas, CanvasUpdate, Filters, FiltersUpdate, MeshState, UiState};
pub use store::{MeshStore, ShareSummary};
