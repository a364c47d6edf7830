//! State → SVG compiler.
//!
//! Pure and byte-stable: the same input always yields the same string, which
//! is what makes share links, caches and exports reproducible. Numbers are
//! written with fixed precision; nothing depends on hash order or the clock.

use meshgrad_core::Point;

use crate::render_data::RenderInput;

pub const BLUR_FILTER_ID: &str = "mesh-blur";
pub const GRAIN_PATTERN_ID: &str = "mesh-grain";
/// Smallest margin, in canvas units, the blur filter region extends past each edge.
pub const MIN_FILTER_PADDING: f64 = 64.0;

/// Compile the gradient to SVG markup.
pub fn render_svg(input: &RenderInput<'_>) -> String {
    let canvas = input.canvas;
    let (out_w, out_h) = input.output_size();
    let (w, h) = (f64::from(canvas.width), f64::from(canvas.height));
    let blur = input.filters.blur.max(0.0);
    let pad = (blur * 2.0).max(MIN_FILTER_PADDING);

    let mut svg = String::with_capacity(512 + input.shapes.len() * 256);
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" xmlns:xlink=\"http://www.w3.org/1999/xlink\" \
         width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\" preserveAspectRatio=\"none\">",
        canvas.width, canvas.height
    ));

    svg.push_str("<defs>");
    svg.push_str(&format!(
        "<filter id=\"{BLUR_FILTER_ID}\" filterUnits=\"userSpaceOnUse\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" \
         color-interpolation-filters=\"sRGB\"><feGaussianBlur stdDeviation=\"{}\"/></filter>",
        num(-pad),
        num(-pad),
        num(w + pad * 2.0),
        num(h + pad * 2.0),
        num(blur)
    ));
    let grain = input.grain.filter(|_| input.filters.grain_enabled);
    if let Some(texture) = grain {
        let tile = texture.tile_size.max(1);
        svg.push_str(&format!(
            "<pattern id=\"{GRAIN_PATTERN_ID}\" patternUnits=\"userSpaceOnUse\" width=\"{tile}\" height=\"{tile}\">\
             <image xlink:href=\"{}\" width=\"{tile}\" height=\"{tile}\"/></pattern>",
            escape_attr(&texture.data_uri)
        ));
    }
    svg.push_str("</defs>");

    svg.push_str(&format!(
        "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"{}\"/>",
        canvas.width,
        canvas.height,
        escape_attr(&canvas.background.value)
    ));

    svg.push_str(&format!("<g filter=\"url(#{BLUR_FILTER_ID})\">"));
    for shape in input.shapes {
        if shape.points.is_empty() {
            continue;
        }
        svg.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\"/>",
            path_data(&shape.points),
            escape_attr(input.palette.fill_color(shape.fill_index))
        ));
    }
    svg.push_str("</g>");

    if grain.is_some() {
        svg.push_str(&format!(
            "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"url(#{GRAIN_PATTERN_ID})\" opacity=\"{}\"/>",
            canvas.width,
            canvas.height,
            num(input.filters.grain.clamp(0.0, 1.0))
        ));
    }

    svg.push_str("</svg>");
    svg
}

/// `M x y L x y ... Z` with two decimals.
pub fn path_data(points: &[Point]) -> String {
    let mut d = String::with_capacity(points.len() * 20);
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            d.push(' ');
        }
        d.push_str(if i == 0 { "M " } else { "L " });
        d.push_str(&format!("{:.2} {:.2}", zero(p.x), zero(p.y)));
    }
    d.push_str(" Z");
    d
}

/// Two-decimal number with trailing zeros trimmed (`64`, `0.5`, `12.25`).
fn num(value: f64) -> String {
    let s = format!("{:.2}", zero(value));
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Fold `-0.0` and values that round to it into `0.0`.
fn zero(value: f64) -> f64 {
    if value.abs() < 0.005 {
        0.0
    } else {
        value
    }
}

fn escape_attr(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grain::GrainTexture;
    use meshgrad_core::{GeneratorConfig, MeshState, Shape, ShapeId};

    fn state() -> MeshState {
        MeshState::initial(&GeneratorConfig::default())
    }

    #[test]
    fn test_render_is_byte_stable() {
        let a = state();
        let b = a.clone();
        assert_eq!(
            render_svg(&RenderInput::from_state(&a)),
            render_svg(&RenderInput::from_state(&b))
        );
    }

    #[test]
    fn test_structure() {
        let s = state();
        let svg = render_svg(&RenderInput::from_state(&s));
        assert!(svg.starts_with("<svg "));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"1920\" height=\"1080\" viewBox=\"0 0 1920 1080\""));
        assert!(svg.contains("<feGaussianBlur stdDeviation=\"120\"/>"));
        // padding = max(120 * 2, 64) = 240
        assert!(svg.contains("x=\"-240\" y=\"-240\" width=\"2400\" height=\"1560\""));
        assert!(svg.contains(&format!("fill=\"{}\"/>", s.palette.colors()[0].value)));
        assert_eq!(svg.matches("<path ").count(), s.shapes.len());
        assert!(!svg.contains(GRAIN_PATTERN_ID));
    }

    #[test]
    fn test_min_padding() {
        let mut s = state();
        s.filters.blur = 8.0;
        let svg = render_svg(&RenderInput::from_state(&s));
        assert!(svg.contains("x=\"-64\" y=\"-64\" width=\"2048\" height=\"1208\""));
    }

    #[test]
    fn test_output_size_keeps_viewbox() {
        let s = state();
        let svg = render_svg(&RenderInput::from_state(&s).with_output_size(480, 270));
        assert!(svg.contains("width=\"480\" height=\"270\" viewBox=\"0 0 1920 1080\""));
    }

    #[test]
    fn test_fill_skips_background_slot() {
        let mut s = state();
        s.shapes.truncate(1);
        s.shapes[0].fill_index = 0;
        let svg = render_svg(&RenderInput::from_state(&s));
        let fill = &s.palette.colors()[1].value;
        assert!(svg.contains(&format!("Z\" fill=\"{fill}\"")));

        s.shapes[0].fill_index = 40;
        let svg = render_svg(&RenderInput::from_state(&s));
        let bg = &s.palette.colors()[0].value;
        assert!(svg.contains(&format!("Z\" fill=\"{bg}\"")));
    }

    #[test]
    fn test_path_data() {
        let pts = vec![
            meshgrad_core::Point::new(0.0, 0.0),
            meshgrad_core::Point::new(10.126, -3.0),
            meshgrad_core::Point::new(-0.001, 5.5),
        ];
        assert_eq!(path_data(&pts), "M 0.00 0.00 L 10.13 -3.00 L 0.00 5.50 Z");
    }

    #[test]
    fn test_empty_shape_skipped() {
        let mut s = state();
        s.shapes = vec![Shape::new(ShapeId::new(), vec![], 0)];
        let svg = render_svg(&RenderInput::from_state(&s));
        assert_eq!(svg.matches("<path ").count(), 0);
    }

    #[test]
    fn test_grain_overlay() {
        let mut s = state();
        let texture = GrainTexture {
            data_uri: "data:image/png;base64,AAAA".to_string(),
            tile_size: 128,
        };

        // Texture without the flag: no overlay.
        let svg = render_svg(&RenderInput::from_state(&s).with_grain(&texture));
        assert!(!svg.contains(GRAIN_PATTERN_ID));

        s.filters.grain_enabled = true;
        s.filters.grain = 0.35;
        let svg = render_svg(&RenderInput::from_state(&s).with_grain(&texture));
        assert!(svg.contains("<pattern id=\"mesh-grain\""));
        assert!(svg.contains("xlink:href=\"data:image/png;base64,AAAA\""));
        assert!(svg.contains("fill=\"url(#mesh-grain)\" opacity=\"0.35\""));
    }

    #[test]
    fn test_attribute_escaping() {
        let mut s = state();
        s.canvas.background.value = "\"><script>".to_string();
        let svg = render_svg(&RenderInput::from_state(&s));
        assert!(!svg.contains("<script>"));
        assert!(svg.contains("&quot;&gt;&lt;script&gt;"));
    }

    #[test]
    fn test_num_formatting() {
        assert_eq!(num(64.0), "64");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(12.25), "12.25");
        assert_eq!(num(-0.0), "0");
        assert_eq!(num(-0.001), "0");
    }
}
