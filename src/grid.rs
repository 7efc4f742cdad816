//! Workspace Grid Sampler and Workspace Bounds.

use crate::error::{PlannerError, Result};
use crate::geometry::{Point2, Polygon};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorkspaceBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl WorkspaceBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        if x_max <= x_min {
            return Err(PlannerError::DegenerateBounds(format!(
                "x_max ({}) must be > x_min ({})",
                x_max, x_min
            )));
        }
        if y_max <= y_min {
            return Err(PlannerError::DegenerateBounds(format!(
                "y_max ({}) must be > y_min ({})",
                y_max, y_min
            )));
        }
        Ok(WorkspaceBounds { x_min, x_max, y_min, y_max })
    }

    fn mid(&self) -> (f64, f64) {
        (self.x_min + (self.x_max - self.x_min) * 0.5, self.y_min + (self.y_max - self.y_min) * 0.5)
    }

    /// The four fixed phantom-region quadrants, in a stable name order.
    /// Mirrors `original_source/spatial_requests/spatial_request_planner.py`'s
    /// `define_areas` labeling (top/bottom swapped there on purpose, per its
    /// own comment; here the names match the quadrant they actually sit in).
    pub fn phantom_regions(&self) -> Vec<(&'static str, Polygon)> {
        let (x_mid, y_mid) = self.mid();
        let quad = |x0: f64, x1: f64, y0: f64, y1: f64| {
            Polygon::convex_hull(&[
                Point2::new(x0, y0),
                Point2::new(x1, y0),
                Point2::new(x1, y1),
                Point2::new(x0, y1),
            ])
        };
        vec![
            ("bottom_left_corner", quad(self.x_min, x_mid, self.y_min, y_mid)),
            ("bottom_right_corner", quad(x_mid, self.x_max, self.y_min, y_mid)),
            ("top_left_corner", quad(self.x_min, x_mid, y_mid, self.y_max)),
            ("top_right_corner", quad(x_mid, self.x_max, y_mid, self.y_max)),
        ]
    }
}

pub const PHANTOM_NAMES: [&str; 4] =
    ["top_left_corner", "top_right_corner", "bottom_left_corner", "bottom_right_corner"];

/// A deterministic mesh of sample points covering `WorkspaceBounds`,
/// chosen so `nx * ny ≈ samples` while `nx / ny` matches the aspect ratio.
#[derive(Clone, Debug)]
pub struct SampleGrid {
    pub rx: Vec<f64>,
    pub ry: Vec<f64>,
    pub points: Vec<Point2>,
}

impl SampleGrid {
    pub fn new(bounds: &WorkspaceBounds, samples: usize) -> Result<Self> {
        if samples < 4 {
            return Err(PlannerError::DegenerateBounds(format!(
                "samples ({}) must be >= 4",
                samples
            )));
        }

        let x_range = bounds.x_max - bounds.x_min;
        let y_range = bounds.y_max - bounds.y_min;
        let ratio = x_range / y_range;

        let nx = ((samples as f64 * ratio).sqrt() as usize).max(2);
        let ny = (samples / nx).max(2);

        let rx = linspace(bounds.x_min, bounds.x_max, nx);
        let ry = linspace(bounds.y_min, bounds.y_max, ny);

        // row-major (y,x) order: iy outer, ix inner, matching id_flat = iy*nx+ix
        let mut points = Vec::with_capacity(nx * ny);
        for &y in &ry {
            for &x in &rx {
                points.push(Point2::new(x, y));
            }
        }

        Ok(SampleGrid { rx, ry, points })
    }

    pub fn nx(&self) -> usize {
        self.rx.len()
    }

    pub fn ny(&self) -> usize {
        self.ry.len()
    }

    pub fn flat_index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx() + ix
    }

    pub fn position_at(&self, flat_index: usize) -> Point2 {
        let ix = flat_index % self.nx();
        let iy = flat_index / self.nx();
        Point2::new(self.rx[ix], self.ry[iy])
    }
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    if n == 1 {
        return vec![lo];
    }
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degenerate_bounds_are_rejected() {
        assert!(WorkspaceBounds::new(1., 1., 0., 1.).is_err());
        assert!(WorkspaceBounds::new(0., 1., 2., 1.).is_err());
    }

    #[test]
    fn too_few_samples_rejected() {
        let bounds = WorkspaceBounds::new(0., 1., 0., 1.).unwrap();
        assert!(SampleGrid::new(&bounds, 3).is_err());
    }

    #[test]
    fn grid_size_tracks_requested_samples() {
        let bounds = WorkspaceBounds::new(0., 10., 0., 10.).unwrap();
        let grid = SampleGrid::new(&bounds, 400).unwrap();
        assert_eq!(grid.points.len(), grid.nx() * grid.ny());
        assert!(grid.points.len() as i64 - 400 <= 20);
    }

    #[test]
    fn flat_index_round_trips_through_position() {
        let bounds = WorkspaceBounds::new(-3., 3., -3., 3.).unwrap();
        let grid = SampleGrid::new(&bounds, 64).unwrap();
        let idx = grid.flat_index(2, 3);
        let p = grid.position_at(idx);
        assert!((p.x - grid.rx[2]).abs() < 1e-9);
        assert!((p.y - grid.ry[3]).abs() < 1e-9);
    }

    #[test]
    fn phantom_regions_tile_the_workspace() {
        let bounds = WorkspaceBounds::new(-3., 3., -3., 3.).unwrap();
        let regions = bounds.phantom_regions();
        assert_eq!(regions.len(), 4);
        let names: Vec<_> = regions.iter().map(|(n, _)| *n).collect();
        for n in PHANTOM_NAMES {
            assert!(names.contains(&n));
        }
    }
}
