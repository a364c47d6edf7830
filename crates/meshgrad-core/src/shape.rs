use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::{centroid, BBox, Point, Size};

/// Unique shape identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapeId(pub Uuid);

impl ShapeId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ShapeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A closed polygon blob. Vertex order is the winding used for the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    pub id: ShapeId,
    pub points: Vec<Point>,
    pub fill_index: usize,
}

impl Shape {
    pub fn new(id: ShapeId, points: Vec<Point>, fill_index: usize) -> Self {
        Self {
            id,
            points,
            fill_index,
        }
    }

    pub fn centroid(&self) -> Option<Point> {
        centroid(&self.points)
    }

    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.points)
    }

    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            points: self.points.iter().map(|p| p.translate(dx, dy)).collect(),
            ..self.clone()
        }
    }

    /// Scale every vertex about the shape's centroid.
    pub fn scaled(&self, factor: f64) -> Self {
        let Some(c) = self.centroid() else {
            return self.clone();
        };
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point::new(c.x + (p.x - c.x) * factor, c.y + (p.y - c.y) * factor))
                .collect(),
            ..self.clone()
        }
    }

    /// Drop vertices with NaN or infinite coordinates; JSON cannot carry them.
    /// Returns how many were removed.
    pub fn retain_finite(&mut self) -> usize {
        let before = self.points.len();
        self.points.retain(Point::is_finite);
        before - self.points.len()
    }

    /// Clamp the fill index to `[0, max_index]`.
    pub fn clamp_fill(&mut self, max_index: usize) {
        self.fill_index = self.fill_index.min(max_index);
    }
}

/// Push each shape's centroid away from the canvas center by `factor`
/// (`> 1` spreads, `< 1` gathers). Shapes keep their size and winding.
pub fn spread_shapes(shapes: &[Shape], canvas: Size, factor: f64) -> Vec<Shape> {
    let center = canvas.center();
    shapes
        .iter()
        .map(|shape| match shape.centroid() {
            Some(c) => {
                let dx = (c.x - center.x) * (factor - 1.0);
                let dy = (c.y - center.y) * (factor - 1.0);
                shape.translated(dx, dy)
            }
            None => shape.clone(),
        })
        .collect()
}
