//! Full shape-set generation from a seed.

use crate::config::GeneratorConfig;
use crate::geometry::{Point, Size};
use crate::polygon::polygon;
use crate::prng::Prng;
use crate::sampler::{sample_centers, Region, SampleRequest};
use crate::shape::{Shape, ShapeId};

/// Inputs for [`generate_shapes`].
#[derive(Debug, Clone, Copy)]
pub struct GenerateRequest<'a> {
    pub seed: &'a str,
    /// Already clamped by the caller.
    pub count: usize,
    pub canvas: Size,
    pub palette_len: usize,
}

/// Split `count` into (inside, outside) using `inside_fraction`.
pub fn split_count(count: usize, inside_fraction: f64) -> (usize, usize) {
    let inside = ((count as f64) * inside_fraction.clamp(0.0, 1.0)).round() as usize;
    let inside = inside.min(count);
    (inside, count - inside)
}

/// A generated shape with the center its polygon was built around.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedShape {
    pub shape: Shape,
    pub center: Point,
    pub region: Region,
}

/// Generate `request.count` shapes: inside centers first, then outside ones.
pub fn generate_shapes(request: &GenerateRequest<'_>, config: &GeneratorConfig) -> Vec<Shape> {
    generate_shapes_detailed(request, config)
        .into_iter()
        .map(|g| g.shape)
        .collect()
}

/// Same as [`generate_shapes`], keeping each shape's center and region.
pub fn generate_shapes_detailed(
    request: &GenerateRequest<'_>,
    config: &GeneratorConfig,
) -> Vec<GeneratedShape> {
    let mut rng = Prng::new(request.seed);
    let (inside_count, outside_count) = split_count(request.count, config.inside_fraction);

    let inside = sample_centers(
        &mut rng,
        &SampleRequest::new(inside_count, request.canvas, Region::Inside)
            .with_overscan(config.overscan)
            .with_retry_budget(config.retry_budget),
        &[],
    );
    let outside = sample_centers(
        &mut rng,
        &SampleRequest::new(outside_count, request.canvas, Region::Outside)
            .with_overscan(config.overscan)
            .with_retry_budget(config.retry_budget),
        &inside,
    );

    let weights = fill_weights(request.palette_len, config.background_weight);
    let centers = inside
        .into_iter()
        .map(|c| (c, Region::Inside, config.inside_radius))
        .chain(
            outside
                .into_iter()
                .map(|c| (c, Region::Outside, config.outside_radius)),
        );

    let shapes: Vec<GeneratedShape> = centers
        .map(|(center, region, scale)| {
            let points = polygon(&mut rng, &request.canvas, Some(center), Some(scale));
            let fill_index = rng.weighted_index(&weights);
            GeneratedShape {
                shape: Shape::new(ShapeId(rng.uuid()), points, fill_index),
                center,
                region,
            }
        })
        .collect();

    log::debug!(
        "generated {} shapes ({} inside, {} outside) for seed {:?}",
        shapes.len(),
        inside_count,
        outside_count,
        request.seed
    );
    shapes
}

/// Index 0 at `background_weight`, every other index at 1. Empty palettes count as one color.
fn fill_weights(palette_len: usize, background_weight: f64) -> Vec<f64> {
    let len = palette_len.max(1);
    let mut weights = vec![1.0; len];
    if len > 1 {
        weights[0] = background_weight;
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(seed: &str, count: usize, palette_len: usize) -> GenerateRequest<'_> {
        GenerateRequest {
            seed,
            count,
            canvas: Size::new(1920.0, 1080.0),
            palette_len,
        }
    }

    #[test]
    fn test_deterministic() {
        let cfg = GeneratorConfig::default();
        let a = generate_shapes(&request("seed-1", 6, 3), &cfg);
        let b = generate_shapes(&request("seed-1", 6, 3), &cfg);
        assert_eq!(a, b);

        let c = generate_shapes(&request("seed-2", 6, 3), &cfg);
        assert_ne!(a, c);
    }

    #[test]
    fn test_inside_outside_split() {
        let cfg = GeneratorConfig::default();
        let req = request("seed-1", 6, 3);
        let generated = generate_shapes_detailed(&req, &cfg);
        assert_eq!(generated.len(), 6);

        let (inside, outside) = generated.split_at(4);
        assert!(inside
            .iter()
            .all(|g| g.region == Region::Inside && req.canvas.contains(&g.center)));
        assert!(outside
            .iter()
            .all(|g| g.region == Region::Outside && !req.canvas.contains(&g.center)));

        // Each polygon surrounds its own center within the region's radius band.
        let minor = req.canvas.minor();
        for g in &generated {
            let scale = match g.region {
                Region::Outside => cfg.outside_radius,
                _ => cfg.inside_radius,
            };
            for p in &g.shape.points {
                let r = p.distance_to(&g.center);
                assert!(r >= minor * scale.min * 0.6 - 1e-9);
                assert!(r <= minor * scale.max + 1e-9);
            }
        }

        let shapes: Vec<Shape> = generated.into_iter().map(|g| g.shape).collect();
        assert_eq!(shapes, generate_shapes(&req, &cfg));
    }

    #[test]
    fn test_split_count() {
        assert_eq!(split_count(6, 4.0 / 6.0), (4, 2));
        assert_eq!(split_count(3, 4.0 / 6.0), (2, 1));
        assert_eq!(split_count(10, 4.0 / 6.0), (7, 3));
        assert_eq!(split_count(0, 4.0 / 6.0), (0, 0));
    }

    #[test]
    fn test_fill_indices_in_range() {
        let cfg = GeneratorConfig::default();
        for len in [1usize, 2, 5] {
            for shape in generate_shapes(&request("range", 10, len), &cfg) {
                assert!(shape.fill_index < len);
            }
        }
        // Empty palette behaves like a single color.
        for shape in generate_shapes(&request("empty", 4, 0), &cfg) {
            assert_eq!(shape.fill_index, 0);
        }
    }

    #[test]
    fn test_single_color_palette_always_zero() {
        let cfg = GeneratorConfig::default();
        let shapes = generate_shapes(&request("mono", 8, 1), &cfg);
        assert!(shapes.iter().all(|s| s.fill_index == 0));
    }

    #[test]
    fn test_fill_weights() {
        assert_eq!(fill_weights(0, 0.5), vec![1.0]);
        assert_eq!(fill_weights(3, 0.5), vec![0.5, 1.0, 1.0]);
    }
}
