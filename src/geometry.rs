//! Polygon geometry primitives.
//!
//! A real deployment might lean on an external geometry crate, but the
//! available 3D collision crates (`zpatial`/`mazth`) cover a different job
//! — 3D collision geometry, not 2D polygon footprints — so they're dropped
//! rather than stretched to fit; see DESIGN.md. This module is the minimal
//! concrete adapter: `center`, `translate`, deep-clone, and composition into
//! a static scene entity.

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Point2 { x, y }
    }
}

/// A convex polygon, vertices stored counter-clockwise.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    verts: Vec<Point2>,
}

impl Polygon {
    /// Builds the convex hull of a point cloud (Andrew's monotone chain).
    /// Degenerate input (< 3 distinct points) falls back to a zero-area
    /// polygon around the available points so callers never have to special
    /// case "no shape yet".
    pub fn convex_hull(points: &[Point2]) -> Self {
        let mut pts = points.to_vec();
        pts.sort_by(|a, b| a.x.partial_cmp(&b.x).unwrap().then(a.y.partial_cmp(&b.y).unwrap()));
        pts.dedup_by(|a, b| (a.x - b.x).abs() < 1e-12 && (a.y - b.y).abs() < 1e-12);

        if pts.len() < 3 {
            return Polygon { verts: pts };
        }

        let cross = |o: &Point2, a: &Point2, b: &Point2| -> f64 {
            (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
        };

        let mut lower: Vec<Point2> = Vec::new();
        for p in &pts {
            while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0. {
                lower.pop();
            }
            lower.push(*p);
        }

        let mut upper: Vec<Point2> = Vec::new();
        for p in pts.iter().rev() {
            while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0. {
                upper.pop();
            }
            upper.push(*p);
        }

        lower.pop();
        upper.pop();
        lower.extend(upper);
        Polygon { verts: lower }
    }

    pub fn from_verts_unchecked(verts: Vec<Point2>) -> Self {
        Polygon { verts }
    }

    pub fn verts(&self) -> &[Point2] {
        &self.verts
    }

    /// Area-weighted centroid. Falls back to the arithmetic mean for
    /// degenerate (zero-area) polygons.
    pub fn center(&self) -> Point2 {
        if self.verts.len() < 3 {
            let n = self.verts.len().max(1) as f64;
            let (sx, sy) = self.verts.iter().fold((0., 0.), |acc, p| (acc.0 + p.x, acc.1 + p.y));
            return Point2::new(sx / n, sy / n);
        }

        let mut area6 = 0.;
        let mut cx = 0.;
        let mut cy = 0.;
        let n = self.verts.len();
        for i in 0..n {
            let p0 = self.verts[i];
            let p1 = self.verts[(i + 1) % n];
            let cross = p0.x * p1.y - p1.x * p0.y;
            area6 += cross;
            cx += (p0.x + p1.x) * cross;
            cy += (p0.y + p1.y) * cross;
        }

        if area6.abs() < 1e-12 {
            let n = self.verts.len() as f64;
            let (sx, sy) = self.verts.iter().fold((0., 0.), |acc, p| (acc.0 + p.x, acc.1 + p.y));
            return Point2::new(sx / n, sy / n);
        }

        Point2::new(cx / (3. * area6), cy / (3. * area6))
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Polygon {
        Polygon {
            verts: self.verts.iter().map(|p| Point2::new(p.x + dx, p.y + dy)).collect(),
        }
    }

    fn contains_point(&self, p: Point2) -> bool {
        if self.verts.len() < 3 {
            return false;
        }
        let n = self.verts.len();
        for i in 0..n {
            let a = self.verts[i];
            let b = self.verts[(i + 1) % n];
            let cross = (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
            if cross < -1e-9 {
                return false;
            }
        }
        true
    }

    fn axes(&self) -> Vec<Point2> {
        let n = self.verts.len();
        (0..n)
            .map(|i| {
                let a = self.verts[i];
                let b = self.verts[(i + 1) % n];
                Point2::new(-(b.y - a.y), b.x - a.x)
            })
            .collect()
    }

    fn project(&self, axis: Point2) -> (f64, f64) {
        self.verts
            .iter()
            .map(|p| p.x * axis.x + p.y * axis.y)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(mn, mx), v| (mn.min(v), mx.max(v)))
    }

    /// Separating-axis test; correct for convex polygons.
    pub fn overlaps(&self, other: &Polygon) -> bool {
        if self.verts.len() < 2 || other.verts.len() < 2 {
            // degenerate (point) shapes: containment is the only meaningful test
            if self.verts.len() == 1 {
                return other.contains_point(self.verts[0]) || self.verts[0] == other.verts.get(0).copied().unwrap_or(self.verts[0]);
            }
            if other.verts.len() == 1 {
                return self.contains_point(other.verts[0]);
            }
            return false;
        }

        for axis in self.axes().into_iter().chain(other.axes()) {
            let (a_min, a_max) = self.project(axis);
            let (b_min, b_max) = other.project(axis);
            if a_max < b_min || b_max < a_min {
                return false;
            }
        }
        true
    }

    /// Quantitative robustness of "this overlaps other": positive and
    /// growing with penetration depth when they overlap, negative boundary
    /// distance otherwise. Used for the `overlaps` predicate's STL
    /// robustness, in the crate's quantitative (not boolean) evaluation mode.
    pub fn overlap_robustness(&self, other: &Polygon) -> f64 {
        if self.verts.len() < 2 || other.verts.len() < 2 {
            return if self.overlaps(other) { 1. } else { -self.distance(other) };
        }

        let mut depth = f64::INFINITY;
        for axis in self.axes().into_iter().chain(other.axes()) {
            let norm = (axis.x * axis.x + axis.y * axis.y).sqrt();
            if norm < 1e-12 {
                continue;
            }
            let axis = Point2::new(axis.x / norm, axis.y / norm);
            let (a_min, a_max) = self.project(axis);
            let (b_min, b_max) = other.project(axis);
            let overlap = a_max.min(b_max) - a_min.max(b_min);
            if overlap < 0. {
                return overlap; // separating axis found: negative separation distance
            }
            depth = depth.min(overlap);
        }
        depth
    }

    /// True iff `self` fully contains `other` (all vertices of `other` lie
    /// inside or on the boundary of `self`). Used for phantom-region anchors.
    pub fn contains(&self, other: &Polygon) -> bool {
        other.verts.iter().all(|p| self.contains_point(*p))
    }

    fn min_vertex_edge_distance(a: &Polygon, b: &Polygon) -> f64 {
        let mut best = f64::INFINITY;
        let n = b.verts.len().max(1);
        for p in &a.verts {
            for i in 0..n {
                let e0 = b.verts[i];
                let e1 = b.verts[(i + 1) % n];
                best = best.min(point_segment_distance(*p, e0, e1));
            }
        }
        best
    }

    /// Euclidean distance between the two polygon boundaries; 0 if they
    /// overlap or touch.
    pub fn distance(&self, other: &Polygon) -> f64 {
        if self.overlaps(other) {
            return 0.;
        }
        if self.verts.is_empty() || other.verts.is_empty() {
            return f64::INFINITY;
        }
        if self.verts.len() < 2 {
            return point_to_polygon_distance(self.verts[0], other);
        }
        if other.verts.len() < 2 {
            return point_to_polygon_distance(other.verts[0], self);
        }
        Self::min_vertex_edge_distance(self, other).min(Self::min_vertex_edge_distance(other, self))
    }
}

fn point_to_polygon_distance(p: Point2, poly: &Polygon) -> f64 {
    let n = poly.verts.len();
    (0..n)
        .map(|i| point_segment_distance(p, poly.verts[i], poly.verts[(i + 1) % n]))
        .fold(f64::INFINITY, f64::min)
}

fn point_segment_distance(p: Point2, a: Point2, b: Point2) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    let t = if len2 < 1e-12 {
        0.
    } else {
        (((p.x - a.x) * abx + (p.y - a.y) * aby) / len2).clamp(0., 1.)
    };
    let cx = a.x + t * abx;
    let cy = a.y + t * aby;
    ((p.x - cx).powi(2) + (p.y - cy).powi(2)).sqrt()
}
