use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, Rgba, RgbaImage};
use meshgrad_core::Prng;
use serde::{Deserialize, Serialize};

use crate::raster::RasterError;

pub const DEFAULT_TILE_SIZE: u32 = 128;

/// A tileable noise image overlaid when grain is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrainTexture {
    /// `data:image/png;base64,...`
    pub data_uri: String,
    /// Edge length of one tile, in canvas units.
    pub tile_size: u32,
}

/// Generate a grey noise tile. The same seed always gives the same texture.
pub fn grain_texture(seed: &str, tile_size: u32) -> Result<GrainTexture, RasterError> {
    let size = tile_size.max(1);
    let mut rng = Prng::new(seed);
    let img = RgbaImage::from_fn(size, size, |_, _| {
        let v = rng.int(0, 255) as u8;
        Rgba([v, v, v, 255])
    });

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    log::debug!("grain tile {size}x{size}: {} bytes", png.len());

    Ok(GrainTexture {
        data_uri: format!("data:image/png;base64,{}", STANDARD.encode(&png)),
        tile_size: size,
    })
}
