use rstar::RTree;

use crate::geometry::Point;

/// R-tree over placed shape centers, used for the sampler's spacing test.
pub struct PointIndex {
    tree: RTree<[f64; 2]>,
}

impl PointIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Build the index from an existing set of centers.
    pub fn build(points: &[Point]) -> Self {
        Self {
            tree: RTree::bulk_load(points.iter().map(Point::as_array).collect()),
        }
    }

    pub fn insert(&mut self, point: Point) {
        self.tree.insert(point.as_array());
    }

    /// True if any indexed point lies strictly closer than `sqrt(min_dist_sq)` to `point`.
    pub fn has_neighbor_within(&self, point: &Point, min_dist_sq: f64) -> bool {
        self.tree
            .locate_within_distance(point.as_array(), min_dist_sq)
            .any(|p| Point::new(p[0], p[1]).distance_sq(point) < min_dist_sq)
    }

    /// Squared distance to the closest indexed point, or `None` when empty.
    pub fn nearest_distance_sq(&self, point: &Point) -> Option<f64> {
        self.tree
            .nearest_neighbor(&point.as_array())
            .map(|p| Point::new(p[0], p[1]).distance_sq(point))
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for PointIndex {
    fn default() -> Self {
        Self::new()
    }
}
