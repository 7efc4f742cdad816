//! Gradient-Map Engine and Guard-to-Field Compiler: virtually translates one
//! object across the sample grid and scores a spatial subformula at each
//! point, then combines per-atom fields into per-guard and per-edge fields.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::automaton::guard::{Bit, Guard, Sog};
use crate::geometry::Polygon;
use crate::grid::SampleGrid;
use crate::scene::{ObjectLookup, Scene, SceneView};
use crate::spatial::{interpret, SpatialExpr};

/// For each sample point, virtually translates `obj_name`'s polygon there
/// and records `subtree`'s quantitative robustness. Pure: `scene` is never
/// mutated, satisfied architecturally by building
/// a throwaway `SceneView` per sample point rather than mutating `scene` and
/// restoring it afterward — see SPEC_FULL.md §4's note on this. The sweep
/// runs via `rayon` since each point's evaluation touches no shared state.
pub fn gradient_map(scene: &Scene, grid: &SampleGrid, obj_name: &str, subtree: &SpatialExpr) -> Vec<f64> {
    let base_polygon = match scene.get(obj_name) {
        Some(o) => o.polygon.clone(),
        None => return vec![f64::NAN; grid.points.len()],
    };
    let centroid = base_polygon.center();

    grid.points
        .par_iter()
        .map(|p| {
            let translated = base_polygon.translated(p.x - centroid.x, p.y - centroid.y);
            let view = SceneView::new(scene, obj_name, translated);
            interpret(subtree, &view)
        })
        .collect()
}

fn pointwise_min(fields: impl Iterator<Item = Vec<f64>>, len: usize) -> Vec<f64> {
    fields.fold(vec![f64::INFINITY; len], |mut acc, field| {
        for (a, f) in acc.iter_mut().zip(field) {
            *a = if a.is_nan() || f.is_nan() { f64::NAN } else { a.min(f) };
        }
        acc
    })
}

fn pointwise_max(fields: impl Iterator<Item = Vec<f64>>, len: usize) -> Vec<f64> {
    fields.fold(vec![f64::NEG_INFINITY; len], |mut acc, field| {
        for (a, f) in acc.iter_mut().zip(field) {
            *a = if a.is_nan() || f.is_nan() { f64::NAN } else { a.max(f) };
        }
        acc
    })
}

/// `field_from_guard`: conjunction (pointwise min) over the
/// non-`X` positions of `g`, negating a position's gradient map when
/// `g[i] == Zero`.
pub fn field_from_guard(
    scene: &Scene,
    grid: &SampleGrid,
    obj_name: &str,
    guard: &Guard,
    dfa_ap: &[String],
    var_to_tree: &HashMap<String, SpatialExpr>,
) -> Vec<f64> {
    let len = grid.points.len();
    let fields = guard.0.iter().enumerate().filter_map(|(i, bit)| {
        if matches!(bit, Bit::DontCare) {
            return None;
        }
        let subtree = &var_to_tree[&dfa_ap[i]];
        let mut field = gradient_map(scene, grid, obj_name, subtree);
        if matches!(bit, Bit::Zero) {
            for v in field.iter_mut() {
                if !v.is_nan() {
                    *v = -*v;
                }
            }
        }
        Some(field)
    });
    pointwise_min(fields, len)
}

/// `composite_constraint`: disjunction (pointwise max) of
/// `field_from_guard` over every guard in `sog`.
pub fn composite_constraint(
    scene: &Scene,
    grid: &SampleGrid,
    obj_name: &str,
    sog: &Sog,
    dfa_ap: &[String],
    var_to_tree: &HashMap<String, SpatialExpr>,
) -> Vec<f64> {
    let len = grid.points.len();
    if sog.is_empty() {
        return vec![f64::NEG_INFINITY; len];
    }
    let fields = sog.iter().map(|g| field_from_guard(scene, grid, obj_name, g, dfa_ap, var_to_tree));
    pointwise_max(fields, len)
}

/// `find_best_point`: among entries of `field` that are
/// `> threshold` and not `NaN`, returns the median (by insertion/flat-index
/// order) flat index among those equal to the max. `None` if no entry
/// qualifies.
pub fn find_best_point(field: &[f64], threshold: f64) -> Option<usize> {
    let candidates: Vec<usize> =
        field.iter().enumerate().filter(|(_, &v)| !v.is_nan() && v > threshold).map(|(i, _)| i).collect();
    if candidates.is_empty() {
        return None;
    }
    let max = candidates.iter().map(|&i| field[i]).fold(f64::NEG_INFINITY, f64::max);
    let argmax: Vec<usize> = candidates.into_iter().filter(|&i| field[i] == max).collect();
    Some(argmax[argmax.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::WorkspaceBounds;
    use crate::scene::ObjectObservation;

    fn square(name: &str, cx: f64, cy: f64) -> ObjectObservation {
        ObjectObservation {
            name: name.to_string(),
            color: None,
            points: vec![(cx - 0.5, cy - 0.5), (cx + 0.5, cy - 0.5), (cx + 0.5, cy + 0.5), (cx - 0.5, cy + 0.5)],
        }
    }

    #[test]
    fn gradient_map_is_pure() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 2., 0.)]);
        let grid = SampleGrid::new(&bounds, 64).unwrap();
        let before = scene.get("blue").unwrap().centroid;
        let expr = SpatialExpr::LeftOf("blue".into(), "red".into());
        let _ = gradient_map(&scene, &grid, "blue", &expr);
        let after = scene.get("blue").unwrap().centroid;
        assert_eq!(before, after);
    }

    #[test]
    fn gradient_map_is_positive_only_where_translated_blue_is_left_of_red() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 2., 0.)]);
        let grid = SampleGrid::new(&bounds, 64).unwrap();
        let expr = SpatialExpr::LeftOf("blue".into(), "red".into());
        let field = gradient_map(&scene, &grid, "blue", &expr);
        for (p, &v) in grid.points.iter().zip(&field) {
            assert_eq!(v > 0., p.x < 2.);
        }
    }

    #[test]
    fn find_best_point_picks_median_of_the_plateau() {
        let field = vec![1.0, 5.0, 5.0, 5.0, 2.0];
        let idx = find_best_point(&field, 0.0).unwrap();
        assert_eq!(idx, 2);
    }

    #[test]
    fn find_best_point_is_none_when_nothing_clears_the_threshold() {
        let field = vec![-1.0, 0.0, f64::NAN, -0.5];
        assert!(find_best_point(&field, 0.0).is_none());
    }

    #[test]
    fn composite_constraint_of_empty_sog_forbids_nothing() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let scene = Scene::new(&bounds, &[square("blue", 0., 0.), square("red", 2., 0.)]);
        let grid = SampleGrid::new(&bounds, 64).unwrap();
        let dfa_ap: Vec<String> = vec![];
        let var_to_tree: HashMap<String, SpatialExpr> = HashMap::new();
        let field = composite_constraint(&scene, &grid, "blue", &vec![], &dfa_ap, &var_to_tree);
        assert!(field.iter().all(|&v| v < 0.));
    }
}
