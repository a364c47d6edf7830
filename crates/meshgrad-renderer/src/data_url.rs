//! Text encoders for handing SVG markup to browsers and stylesheets.

use std::borrow::Cow;

pub const SVG_DATA_URL_PREFIX: &str = "data:image/svg+xml;charset=utf-8,";

/// Percent-encoded `data:` URL. SVG is text, so no base64 is needed.
pub fn svg_data_url(svg: &str) -> String {
    format!("{SVG_DATA_URL_PREFIX}{}", urlencoding::encode(svg))
}

/// Inverse of [`svg_data_url`]. `None` for other URL kinds or bad escapes.
pub fn decode_svg_data_url(url: &str) -> Option<Cow<'_, str>> {
    let body = url.strip_prefix(SVG_DATA_URL_PREFIX)?;
    urlencoding::decode(body).ok()
}

/// CSS declarations that paint `svg` stretched over an element's box.
pub fn css_background(svg: &str) -> String {
    format!(
        "background-image: url(\"{}\"); background-size: 100% 100%; background-repeat: no-repeat;",
        svg_data_url(svg)
    )
}
