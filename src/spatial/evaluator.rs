//! Spatial Evaluator (spec.md §6, "Spatial Evaluator contract").
//!
//! Out of scope per spec.md: the real quantitative STL interpreter belongs
//! to an external evaluator crate. This is the minimal concrete adapter:
//! it knows how to score the six predicates in `spatial::expr::SpatialExpr`
//! given anything implementing `ObjectLookup` (a `Scene` or a `SceneView`).
//! Positive ⇒ satisfied, non-positive ⇒ not, `NaN` ⇒ undefined (operand
//! missing from the lookup), matching spec.md §4.4's numerics.

use crate::scene::ObjectLookup;
use crate::spatial::expr::SpatialExpr;

/// Quantitative interpretation of one spatial subtree against one scene
/// snapshot. Pure: takes the assignment as an explicit argument rather than
/// mutating a shared dictionary (spec.md §9's "cleaner design" option).
pub fn interpret<L: ObjectLookup>(expr: &SpatialExpr, lookup: &L) -> f64 {
    let centroid = |name: &str| lookup.centroid(name);

    match expr {
        SpatialExpr::LeftOf(a, b) => match (centroid(a), centroid(b)) {
            (Some(ca), Some(cb)) => cb.x - ca.x,
            _ => f64::NAN,
        },
        SpatialExpr::RightOf(a, b) => match (centroid(a), centroid(b)) {
            (Some(ca), Some(cb)) => ca.x - cb.x,
            _ => f64::NAN,
        },
        SpatialExpr::Above(a, b) => match (centroid(a), centroid(b)) {
            (Some(ca), Some(cb)) => ca.y - cb.y,
            _ => f64::NAN,
        },
        SpatialExpr::Below(a, b) => match (centroid(a), centroid(b)) {
            (Some(ca), Some(cb)) => cb.y - ca.y,
            _ => f64::NAN,
        },
        SpatialExpr::Overlaps(a, b) => match (lookup.polygon(a), lookup.polygon(b)) {
            (Some(pa), Some(pb)) => pa.overlap_robustness(pb),
            _ => f64::NAN,
        },
        SpatialExpr::DistLe(a, b, k) => match (lookup.polygon(a), lookup.polygon(b)) {
            (Some(pa), Some(pb)) => k - pa.distance(pb),
            _ => f64::NAN,
        },
        SpatialExpr::And(a, b) => {
            let (va, vb) = (interpret(a, lookup), interpret(b, lookup));
            if va.is_nan() || vb.is_nan() {
                f64::NAN
            } else {
                va.min(vb)
            }
        }
        SpatialExpr::Or(a, b) => {
            let (va, vb) = (interpret(a, lookup), interpret(b, lookup));
            if va.is_nan() || vb.is_nan() {
                f64::NAN
            } else {
                va.max(vb)
            }
        }
        SpatialExpr::Not(a) => {
            let va = interpret(a, lookup);
            if va.is_nan() {
                f64::NAN
            } else {
                -va
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point2;
    use crate::grid::WorkspaceBounds;
    use crate::scene::{ObjectObservation, Scene};

    fn square(name: &str, cx: f64, cy: f64) -> ObjectObservation {
        ObjectObservation {
            name: name.to_string(),
            color: None,
            points: vec![(cx - 0.5, cy - 0.5), (cx + 0.5, cy - 0.5), (cx + 0.5, cy + 0.5), (cx - 0.5, cy + 0.5)],
        }
    }

    #[test]
    fn leftof_is_positive_when_true() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 1., 0.)]);
        let v = interpret(&SpatialExpr::LeftOf("blue".into(), "red".into()), &scene);
        assert!(v > 0.);
    }

    #[test]
    fn dist_le_turns_positive_within_threshold() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 5., 0.)]);
        let far = interpret(&SpatialExpr::DistLe("blue".into(), "red".into(), 1.0), &scene);
        assert!(far < 0.);
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 1.2, 0.)]);
        let near = interpret(&SpatialExpr::DistLe("blue".into(), "red".into(), 1.0), &scene);
        assert!(near > 0.);
    }

    #[test]
    fn missing_object_yields_nan() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.)]);
        let v = interpret(&SpatialExpr::LeftOf("blue".into(), "ghost".into()), &scene);
        assert!(v.is_nan());
    }

    #[test]
    fn conjunction_robustness_is_the_min_of_its_operands() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 1., 0.)]);
        let expr = SpatialExpr::and(
            SpatialExpr::LeftOf("blue".into(), "red".into()),
            SpatialExpr::DistLe("blue".into(), "red".into(), 0.1),
        );
        let v = interpret(&expr, &scene);
        // leftof is satisfied (positive) but dist<=0.1 is not (centroids 1 apart)
        assert!(v < 0.);
    }

    #[test]
    fn overlap_robustness_matches_centroid_heuristic() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 0.2, 0.)]);
        let v = interpret(&SpatialExpr::Overlaps("blue".into(), "red".into()), &scene);
        assert!(v > 0.);
        let _ = Point2::new(0., 0.);
    }
}
