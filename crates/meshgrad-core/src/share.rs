//! Share-string codec: compact JSON of the persisted gradient fields,
//! base64 (URL-safe, unpadded) so it can ride in a query string.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette::Palette;
use crate::shape::Shape;
use crate::state::{Canvas, Filters, MeshState};

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("share string is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("share string is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("share string payload is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Serialize)]
struct SharePayloadRef<'a> {
    palette: &'a Palette,
    shapes: &'a [Shape],
    filters: &'a Filters,
    canvas: &'a Canvas,
    seed: &'a str,
}

/// Decoded fields; anything missing falls back to the caller's defaults.
#[derive(Deserialize)]
struct SharePayload {
    palette: Option<Palette>,
    shapes: Option<Vec<Shape>>,
    filters: Option<Filters>,
    canvas: Option<Canvas>,
    seed: Option<String>,
}

/// Encode palette, shapes, filters, canvas and seed. Selection, UI and history are not carried.
pub fn encode(state: &MeshState) -> Result<String, ShareError> {
    let json = serde_json::to_vec(&SharePayloadRef {
        palette: &state.palette,
        shapes: &state.shapes,
        filters: &state.filters,
        canvas: &state.canvas,
        seed: &state.seed,
    })?;
    Ok(URL_SAFE_NO_PAD.encode(json))
}

/// Decode a share string, merging the decoded fields over `defaults`.
///
/// Accepts standard or URL-safe alphabets, with or without padding. The result
/// is returned as decoded; invariants are restored by the caller.
pub fn decode(encoded: &str, defaults: MeshState) -> Result<MeshState, ShareError> {
    let normalized: String = encoded
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized.as_bytes())?;
    let json = String::from_utf8(bytes)?;
    let payload: SharePayload = serde_json::from_str(&json)?;

    Ok(MeshState {
        // An empty palette would leave no background slot.
        palette: payload
            .palette
            .filter(|p| !p.is_empty())
            .unwrap_or(defaults.palette),
        shapes: payload.shapes.unwrap_or(defaults.shapes),
        filters: payload.filters.unwrap_or(defaults.filters),
        canvas: payload.canvas.unwrap_or(defaults.canvas),
        seed: payload.seed.unwrap_or(defaults.seed),
        selected_shape_id: None,
    })
}
