//! Placement of shape centers under a minimum-spacing constraint.
//!
//! Candidates are drawn uniformly from the canvas grown by `overscan` on every
//! side. The region filter is a hard constraint; spacing is soft and gets
//! relaxed once the retry budget runs out, so sampling never fails.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Size};
use crate::prng::Prng;
use crate::spatial::PointIndex;

/// Where a center may land relative to the visible canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Any,
    /// Within `[0, w] x [0, h]`.
    Inside,
    /// Outside `[0, w] x [0, h]` on at least one axis.
    Outside,
}

impl Region {
    pub fn admits(&self, bounds: &Size, p: &Point) -> bool {
        match self {
            Region::Any => true,
            Region::Inside => bounds.contains(p),
            Region::Outside => !bounds.contains(p),
        }
    }
}

/// Parameters for one `sample_centers` call.
#[derive(Debug, Clone, Copy)]
pub struct SampleRequest {
    pub count: usize,
    pub bounds: Size,
    pub overscan: f64,
    pub region: Region,
    pub retry_budget: usize,
}

impl SampleRequest {
    pub fn new(count: usize, bounds: Size, region: Region) -> Self {
        Self {
            count,
            bounds,
            overscan: 0.0,
            region,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    pub fn with_overscan(mut self, overscan: f64) -> Self {
        self.overscan = overscan.max(0.0);
        self
    }

    pub fn with_retry_budget(mut self, retry_budget: usize) -> Self {
        self.retry_budget = retry_budget.max(1);
        self
    }
}

pub const DEFAULT_RETRY_BUDGET: usize = 300;

/// A sampled center. `relaxed` marks points placed after the retry budget ran out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub point: Point,
    pub relaxed: bool,
}

/// Minimum pairwise distance for `total` points on a canvas of `bounds`.
///
/// Shrinks with `1/sqrt(total)`, floored at 8% and capped at 45% of the minor side.
pub fn min_distance(bounds: &Size, total: usize) -> f64 {
    let minor = bounds.minor().max(0.0);
    let n = total.max(1) as f64;
    (minor * 0.9 / n.sqrt()).clamp(minor * 0.08, minor * 0.45)
}

/// Sample `request.count` new centers, spaced against `existing` and each other.
///
/// Returns only the new points; `existing` is not modified.
pub fn sample_centers(rng: &mut Prng, request: &SampleRequest, existing: &[Point]) -> Vec<Point> {
    sample_centers_detailed(rng, request, existing)
        .into_iter()
        .map(|p| p.point)
        .collect()
}

/// Same as [`sample_centers`], reporting which placements relaxed the spacing rule.
pub fn sample_centers_detailed(
    rng: &mut Prng,
    request: &SampleRequest,
    existing: &[Point],
) -> Vec<Placement> {
    let bounds = request.bounds;
    let min_dist = min_distance(&bounds, existing.len() + request.count);
    let min_dist_sq = min_dist * min_dist;
    let mut index = PointIndex::build(existing);
    let mut placed = Vec::with_capacity(request.count);

    for _ in 0..request.count {
        let mut best: Option<(Point, f64)> = None;
        let mut last = Point::new(0.0, 0.0);
        let mut accepted = None;

        for _ in 0..request.retry_budget.max(1) {
            let candidate = draw_candidate(rng, &bounds, request.overscan);
            last = candidate;
            if !request.region.admits(&bounds, &candidate) {
                continue;
            }
            if !index.has_neighbor_within(&candidate, min_dist_sq) {
                accepted = Some(candidate);
                break;
            }
            let clearance = index.nearest_distance_sq(&candidate).unwrap_or(f64::INFINITY);
            if best.map_or(true, |(_, d)| clearance > d) {
                best = Some((candidate, clearance));
            }
        }

        let placement = match accepted {
            Some(point) => Placement { point, relaxed: false },
            None => {
                let point = match best {
                    Some((p, _)) => p,
                    None => project_into_region(&last, &bounds, request.region),
                };
                log::debug!(
                    "sampler relaxed spacing at ({:.1}, {:.1}) after {} tries",
                    point.x,
                    point.y,
                    request.retry_budget
                );
                Placement { point, relaxed: true }
            }
        };

        index.insert(placement.point);
        placed.push(placement);
    }

    placed
}

fn draw_candidate(rng: &mut Prng, bounds: &Size, overscan: f64) -> Point {
    let ox = bounds.width * overscan;
    let oy = bounds.height * overscan;
    Point::new(
        rng.float(-ox, bounds.width + ox),
        rng.float(-oy, bounds.height + oy),
    )
}

/// Force a point into `region`. Only reached when no candidate satisfied the region.
fn project_into_region(p: &Point, bounds: &Size, region: Region) -> Point {
    match region {
        Region::Any => *p,
        Region::Inside => Point::new(p.x.clamp(0.0, bounds.width), p.y.clamp(0.0, bounds.height)),
        Region::Outside => {
            if !bounds.contains(p) {
                return *p;
            }
            // Push past whichever edge is closest.
            let margin = (bounds.minor() * 0.01).max(1.0);
            let candidates = [
                (p.x, Point::new(-margin, p.y)),
                (bounds.width - p.x, Point::new(bounds.width + margin, p.y)),
                (p.y, Point::new(p.x, -margin)),
                (bounds.height - p.y, Point::new(p.x, bounds.height + margin)),
            ];
            candidates
                .iter()
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, q)| *q)
                .unwrap_or(*p)
        }
    }
}
