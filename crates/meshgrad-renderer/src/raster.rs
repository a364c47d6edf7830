//! SVG → PNG/WebP rasterization.
//!
//! Parsing and drawing go through `resvg`; encoding goes through `image`.
//! [`RasterTask`] runs both phases on tokio's blocking pool and can be
//! cancelled between them. The SVG is owned by the task, so a rasterization
//! always reflects the state it was started from.

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("SVG parse error: {0}")]
    Parse(#[from] usvg::Error),
    #[error("Invalid raster size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Image encode error: {0}")]
    Encode(#[from] image::ImageError),
    #[error("Rasterization cancelled")]
    Cancelled,
    #[error("Raster task failed: {0}")]
    Task(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RasterFormat {
    Png,
    Webp,
}

impl RasterFormat {
    pub fn mime(&self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
            RasterFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RasterFormat::Png => "png",
            RasterFormat::Webp => "webp",
        }
    }

    fn image_format(&self) -> ImageFormat {
        match self {
            RasterFormat::Png => ImageFormat::Png,
            RasterFormat::Webp => ImageFormat::WebP,
        }
    }
}

/// Target size in logical pixels plus a device scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    pub scale: f64,
    pub format: RasterFormat,
}

impl RasterOptions {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: 1.0,
            format: RasterFormat::Png,
        }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_format(mut self, format: RasterFormat) -> Self {
        self.format = format;
        self
    }

    /// `round(width × scale) × round(height × scale)`, each side at least 1.
    pub fn pixel_size(&self) -> (u32, u32) {
        let scale = if self.scale.is_finite() && self.scale > 0.0 {
            self.scale
        } else {
            1.0
        };
        let side = |v: u32| (f64::from(v) * scale).round().clamp(1.0, f64::from(u32::MAX)) as u32;
        (side(self.width), side(self.height))
    }
}

pub fn decode_svg(svg: &str) -> Result<usvg::Tree, RasterError> {
    let opt = usvg::Options::default();
    Ok(usvg::Tree::from_str(svg, &opt)?)
}

/// Draw `tree` stretched to the pixel size and encode it.
pub fn draw(tree: &usvg::Tree, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
    let (width, height) = options.pixel_size();
    let mut pixmap = Pixmap::new(width, height).ok_or(RasterError::InvalidSize { width, height })?;

    let size = tree.size();
    let transform = Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(tree, transform, &mut pixmap.as_mut());

    // tiny-skia stores premultiplied alpha; image expects straight alpha.
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        rgba.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    let img = RgbaImage::from_raw(width, height, rgba).ok_or(RasterError::InvalidSize { width, height })?;

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), options.format.image_format())?;
    log::debug!(
        "rasterized {width}x{height} {} ({} bytes)",
        options.format.extension(),
        out.len()
    );
    Ok(out)
}

/// Parse, draw and encode on the calling thread.
pub fn rasterize_blocking(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
    let tree = decode_svg(svg)?;
    draw(&tree, options)
}

/// Same as [`rasterize_blocking`], wrapped as a `data:` URL.
pub fn rasterize_data_url(svg: &str, options: &RasterOptions) -> Result<String, RasterError> {
    let bytes = rasterize_blocking(svg, options)?;
    Ok(to_data_url(&bytes, options.format))
}

pub fn to_data_url(bytes: &[u8], format: RasterFormat) -> String {
    format!("data:{};base64,{}", format.mime(), STANDARD.encode(bytes))
}

/// Shared flag checked between rasterization phases.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// One asynchronous rasterization. Concurrent tasks are independent; callers
/// that want only the latest result cancel the earlier ones.
#[derive(Debug, Clone)]
pub struct RasterTask {
    svg: String,
    options: RasterOptions,
    cancel: CancelToken,
}

impl RasterTask {
    pub fn new(svg: impl Into<String>, options: RasterOptions) -> Self {
        Self {
            svg: svg.into(),
            options,
            cancel: CancelToken::new(),
        }
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub async fn run(self) -> Result<Vec<u8>, RasterError> {
        let RasterTask {
            svg,
            options,
            cancel,
        } = self;
        if cancel.is_cancelled() {
            return Err(RasterError::Cancelled);
        }

        let tree = tokio::task::spawn_blocking(move || decode_svg(&svg))
            .await
            .map_err(|e| RasterError::Task(e.to_string()))??;

        if cancel.is_cancelled() {
            log::debug!("raster task cancelled after decode");
            return Err(RasterError::Cancelled);
        }

        tokio::task::spawn_blocking(move || draw(&tree, &options))
            .await
            .map_err(|e| RasterError::Task(e.to_string()))?
    }

    pub async fn run_data_url(self) -> Result<String, RasterError> {
        let format = self.options.format;
        let bytes = self.run().await?;
        Ok(to_data_url(&bytes, format))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SVG: &str = "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"40\" height=\"20\" \
                       viewBox=\"0 0 40 20\"><rect width=\"40\" height=\"20\" fill=\"#ff0000\"/></svg>";

    #[test]
    fn test_pixel_size() {
        assert_eq!(RasterOptions::new(1920, 1080).pixel_size(), (1920, 1080));
        assert_eq!(RasterOptions::new(100, 50).with_scale(1.5).pixel_size(), (150, 75));
        assert_eq!(RasterOptions::new(3, 3).with_scale(0.1).pixel_size(), (1, 1));
        assert_eq!(RasterOptions::new(10, 10).with_scale(f64::NAN).pixel_size(), (10, 10));
    }

    #[test]
    fn test_png_output() {
        let bytes = rasterize_blocking(SVG, &RasterOptions::new(40, 20).with_scale(2.0)).unwrap();
        let img = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(img.dimensions(), (80, 40));
        assert_eq!(img.get_pixel(40, 20).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_webp_output() {
        let options = RasterOptions::new(40, 20).with_format(RasterFormat::Webp);
        let bytes = rasterize_blocking(SVG, &options).unwrap();
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WEBP");
    }

    #[test]
    fn test_data_url() {
        let url = rasterize_data_url(SVG, &RasterOptions::new(4, 2)).unwrap();
        assert!(url.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn test_parse_error() {
        let err = rasterize_blocking("not svg", &RasterOptions::new(4, 4)).unwrap_err();
        assert!(matches!(err, RasterError::Parse(_)));
    }

    #[tokio::test]
    async fn test_task_runs() {
        let bytes = RasterTask::new(SVG, RasterOptions::new(40, 20)).run().await.unwrap();
        assert!(!bytes.is_empty());
    }

    #[tokio::test]
    async fn test_task_cancelled() {
        let task = RasterTask::new(SVG, RasterOptions::new(40, 20));
        task.cancel_token().cancel();
        assert!(matches!(task.run().await, Err(RasterError::Cancelled)));
    }

    #[tokio::test]
    async fn test_tasks_are_independent() {
        let a = RasterTask::new(SVG, RasterOptions::new(40, 20));
        let b = RasterTask::new(SVG, RasterOptions::new(20, 10));
        a.cancel_token().cancel();
        let (ra, rb) = tokio::join!(a.run(), b.run());
        assert!(matches!(ra, Err(RasterError::Cancelled)));
        assert!(rb.is_ok());
    }
}
