use std::f64::consts::TAU;

use crate::config::RadiusScale;
use crate::geometry::{Point, Size};
use crate::prng::Prng;

pub const MIN_VERTICES: i64 = 6;
pub const MAX_VERTICES: i64 = 10;

/// Per-vertex radius multiplier range applied on top of the base radius.
const JITTER_MIN: f64 = 0.6;
const JITTER_MAX: f64 = 1.0;

/// Irregular star-shaped polygon around `center` (or a random point within `bounds`).
///
/// Vertices sit at equal angular steps from a random phase, each at its own
/// jittered radius. Angles increase monotonically, so the outline never
/// self-intersects. The polygon is implicitly closed.
pub fn polygon(
    rng: &mut Prng,
    bounds: &Size,
    center: Option<Point>,
    radius_scale: Option<RadiusScale>,
) -> Vec<Point> {
    let center = center.unwrap_or_else(|| {
        Point::new(rng.float(0.0, bounds.width), rng.float(0.0, bounds.height))
    });
    let scale = radius_scale.unwrap_or_default();
    let vertex_count = rng.int(MIN_VERTICES, MAX_VERTICES) as usize;
    let base_radius = bounds.minor() * rng.float(scale.min, scale.max);
    let step = TAU / vertex_count as f64;
    let phase = rng.float(0.0, TAU);

    (0..vertex_count)
        .map(|i| {
            let angle = phase + step * i as f64;
            let r = base_radius * rng.float(JITTER_MIN, JITTER_MAX);
            Point::new(center.x + r * angle.cos(), center.y + r * angle.sin())
        })
        .collect()
}
