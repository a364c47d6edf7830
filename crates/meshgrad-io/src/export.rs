use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use meshgrad_core::MeshState;
use meshgrad_renderer::{
    css_background, grain_texture, rasterize_blocking, render_svg, RasterError, RasterFormat,
    RasterOptions, RenderInput,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Raster error: {0}")]
    Raster(#[from] RasterError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Svg,
    Png,
    Webp,
    Css,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 4] = [
        ExportFormat::Svg,
        ExportFormat::Png,
        ExportFormat::Webp,
        ExportFormat::Css,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
            ExportFormat::Webp => "webp",
            ExportFormat::Css => "css",
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
            ExportFormat::Webp => "image/webp",
            ExportFormat::Css => "text/css",
        }
    }

    pub fn extension(&self) -> &'static str {
        self.name()
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn raster_format(&self) -> Option<RasterFormat> {
        match self {
            ExportFormat::Png => Some(RasterFormat::Png),
            ExportFormat::Webp => Some(RasterFormat::Webp),
            ExportFormat::Svg | ExportFormat::Css => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Device scale for raster formats.
    pub scale: f64,
    /// Grain tile edge; the tile is only generated when grain is enabled.
    pub grain_tile_size: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            grain_tile_size: meshgrad_renderer::grain::DEFAULT_TILE_SIZE,
        }
    }
}

/// A finished export artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Export {
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl Export {
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.format.extension())
    }

    /// Write to `dir/stem.ext`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path, stem: &str) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(dir)?;
        let path = dir.join(self.file_name(stem));
        fs::write(&path, &self.bytes)?;
        log::info!("wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// Render `state` and encode it as `format`. Every format derives from the
/// same SVG string.
pub fn export(state: &MeshState, format: ExportFormat, options: &ExportOptions) -> Result<Export, ExportError> {
    let grain = if state.filters.grain_enabled {
        Some(grain_texture(&state.seed, options.grain_tile_size)?)
    } else {
        None
    };
    let mut input = RenderInput::from_state(state);
    if let Some(texture) = &grain {
        input = input.with_grain(texture);
    }
    let svg = render_svg(&input);

    let bytes = match (format, format.raster_format()) {
        (_, Some(raster)) => {
            let opts = RasterOptions::new(state.canvas.width, state.canvas.height)
                .with_scale(options.scale)
                .with_format(raster);
            rasterize_blocking(&svg, &opts)?
        }
        (ExportFormat::Css, None) => css_background(&svg).into_bytes(),
        (_, None) => svg.into_bytes(),
    };
    log::info!("exported {} ({} bytes)", format.name(), bytes.len());
    Ok(Export { format, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use meshgrad_core::GeneratorConfig;

    fn small_state() -> MeshState {
        let mut s = MeshState::initial(&GeneratorConfig::default());
        s.canvas.width = 96;
        s.canvas.height = 64;
        s.filters.blur = 4.0;
        s
    }

    #[test]
    fn test_parse_format() {
        assert_eq!(ExportFormat::parse("PNG"), Some(ExportFormat::Png));
        assert_eq!(ExportFormat::parse(" css "), Some(ExportFormat::Css));
        assert_eq!(ExportFormat::parse("gif"), None);
    }

    #[test]
    fn test_svg_export_matches_renderer() {
        let s = small_state();
        let out = export(&s, ExportFormat::Svg, &ExportOptions::default()).unwrap();
        let svg = render_svg(&RenderInput::from_state(&s));
        assert_eq!(out.bytes, svg.into_bytes());
    }

    #[test]
    fn test_css_export() {
        let out = export(&small_state(), ExportFormat::Css, &ExportOptions::default()).unwrap();
        let css = String::from_utf8(out.bytes).unwrap();
        assert!(css.starts_with("background-image: url(\"data:image/svg+xml"));
    }

    #[test]
    fn test_png_export_scaled() {
        let options = ExportOptions {
            scale: 0.5,
            ..ExportOptions::default()
        };
        let out = export(&small_state(), ExportFormat::Png, &options).unwrap();
        let img = image_size(&out.bytes);
        assert_eq!(img, (48, 32));
    }

    #[test]
    fn test_grain_is_embedded() {
        let mut s = small_state();
        s.filters.grain_enabled = true;
        let options = ExportOptions {
            grain_tile_size: 8,
            ..ExportOptions::default()
        };
        let out = export(&s, ExportFormat::Svg, &options).unwrap();
        let svg = String::from_utf8(out.bytes).unwrap();
        assert!(svg.contains("xlink:href=\"data:image/png;base64,"));
    }

    #[test]
    fn test_write_to() {
        let dir = std::env::temp_dir().join(format!("meshgrad-export-{}", std::process::id()));
        let out = export(&small_state(), ExportFormat::Svg, &ExportOptions::default()).unwrap();
        let path = out.write_to(&dir, "gradient").unwrap();
        assert_eq!(path, dir.join("gradient.svg"));
        assert_eq!(fs::read(&path).unwrap(), out.bytes);
        fs::remove_dir_all(&dir).unwrap();
    }

    // PNG IHDR: width and height are big-endian u32 at offsets 16 and 20.
    fn image_size(png: &[u8]) -> (u32, u32) {
        let w = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
        let h = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
        (w, h)
    }
}
