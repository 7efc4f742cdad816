//! Scene Model (spec.md §3, "Object") — a mapping from object name to its
//! current footprint, centroid, color, and movability.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};
use crate::geometry::{Point2, Polygon};
use crate::grid::WorkspaceBounds;

/// Wire shape of one object's observed point cloud — the payload of an
/// `init`/`observation` request in the external boundary (spec.md §6).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObjectObservation {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    pub points: Vec<(f64, f64)>,
}

#[derive(Clone, Debug)]
pub struct Object {
    pub name: String,
    pub polygon: Polygon,
    pub centroid: Point2,
    pub color: String,
    pub movable: bool,
}

impl Object {
    fn from_observation(obs: &ObjectObservation, movable: bool) -> Self {
        let points = obs.points.iter().map(|&(x, y)| Point2::new(x, y)).collect::<Vec<_>>();
        let polygon = Polygon::convex_hull(&points);
        let centroid = polygon.center();
        Object {
            name: obs.name.clone(),
            polygon,
            centroid,
            color: obs.color.clone().unwrap_or_else(|| "gray".to_string()),
            movable,
        }
    }

    fn phantom(name: &str, polygon: Polygon) -> Self {
        let centroid = polygon.center();
        Object { name: name.to_string(), polygon, centroid, color: "none".to_string(), movable: false }
    }
}

/// Owns every object currently known to the planner (graspable objects and
/// the four phantom-region anchors). Mutated only by `register_observation`.
#[derive(Clone, Debug)]
pub struct Scene {
    objects: BTreeMap<String, Object>,
}

/// Object names never considered movable regardless of whether they were
/// observed, mirroring
/// `original_source/spatial_requests/spatial_request_planner.py`'s
/// `get_relevant_objects`: the phantom corners plus the literal name
/// `"banana"`, a naming convention the original demo scenarios use for a
/// fixed, non-graspable prop (spec.md §8, scenario S3's "declared
/// non-movable by naming convention").
const UNMOVABLE_BY_NAME: [&str; 1] = ["banana"];

impl Scene {
    pub fn new(bounds: &WorkspaceBounds, initial: &[ObjectObservation]) -> Self {
        let mut objects = BTreeMap::new();
        for (name, polygon) in bounds.phantom_regions() {
            objects.insert(name.to_string(), Object::phantom(name, polygon));
        }
        for obs in initial {
            let movable = !UNMOVABLE_BY_NAME.contains(&obs.name.as_str());
            objects.insert(obs.name.clone(), Object::from_observation(obs, movable));
        }
        Scene { objects }
    }

    pub fn get(&self, name: &str) -> Option<&Object> {
        self.objects.get(name)
    }

    /// Replaces matched objects' polygons/centroids; see spec.md §4.5.
    /// Unknown names reject the whole observation (spec.md §7 resolves the
    /// implementer choice this way — see SPEC_FULL.md §7).
    pub fn register_observation(&mut self, updates: &[ObjectObservation]) -> Result<()> {
        for obs in updates {
            if !self.objects.contains_key(&obs.name) {
                return Err(PlannerError::UnknownObject(obs.name.clone()));
            }
        }
        for obs in updates {
            let movable = self.objects[&obs.name].movable;
            self.objects.insert(obs.name.clone(), Object::from_observation(obs, movable));
        }
        Ok(())
    }

    /// Movable object names, in sorted order (spec.md §4.5: "iteration in
    /// sorted object-name order, for determinism").
    pub fn movable_names(&self) -> impl Iterator<Item = &str> {
        self.objects.values().filter(|o| o.movable).map(|o| o.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> {
        self.objects.values()
    }
}

/// What the Spatial Evaluator needs to resolve a predicate's operands:
/// an object's footprint and centroid by name. Implemented by `Scene`
/// itself and by `SceneView` (the virtual-translation snapshot), so
/// `spatial::Evaluator::interpret` is agnostic to which one it is handed.
pub trait ObjectLookup {
    fn polygon(&self, name: &str) -> Option<&Polygon>;
    fn centroid(&self, name: &str) -> Option<Point2>;
}

impl ObjectLookup for Scene {
    fn polygon(&self, name: &str) -> Option<&Polygon> {
        self.get(name).map(|o| &o.polygon)
    }

    fn centroid(&self, name: &str) -> Option<Point2> {
        self.get(name).map(|o| o.centroid)
    }
}

/// A read-only view of the scene with one object's polygon virtually
/// translated, used by the Gradient-Map Engine. Never mutates `base`;
/// satisfies spec.md §4.3's purity invariant by construction rather than by
/// save/restore (see SPEC_FULL.md §4, the evaluator "cleaner design" note).
pub struct SceneView<'a> {
    base: &'a Scene,
    override_name: &'a str,
    override_polygon: Polygon,
}

impl<'a> SceneView<'a> {
    pub fn new(base: &'a Scene, override_name: &'a str, override_polygon: Polygon) -> Self {
        SceneView { base, override_name, override_polygon }
    }

    pub fn polygon(&self, name: &str) -> Option<&Polygon> {
        if name == self.override_name {
            Some(&self.override_polygon)
        } else {
            self.base.get(name).map(|o| &o.polygon)
        }
    }

    pub fn centroid(&self, name: &str) -> Option<Point2> {
        if name == self.override_name {
            Some(self.override_polygon.center())
        } else {
            self.base.get(name).map(|o| o.centroid)
        }
    }
}

impl<'a> ObjectLookup for SceneView<'a> {
    fn polygon(&self, name: &str) -> Option<&Polygon> {
        SceneView::polygon(self, name)
    }

    fn centroid(&self, name: &str) -> Option<Point2> {
        SceneView::centroid(self, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(cx: f64, cy: f64) -> ObjectObservation {
        ObjectObservation {
            name: "blue".into(),
            color: None,
            points: vec![(cx - 0.5, cy - 0.5), (cx + 0.5, cy - 0.5), (cx + 0.5, cy + 0.5), (cx - 0.5, cy + 0.5)],
        }
    }

    #[test]
    fn unknown_object_rejects_whole_observation() {
        let bounds = WorkspaceBounds::new(-3., 3., -3., 3.).unwrap();
        let mut scene = Scene::new(&bounds, &[square(0., 0.)]);
        let bad = ObjectObservation { name: "ghost".into(), color: None, points: vec![(0., 0.)] };
        let before = scene.get("blue").unwrap().centroid;
        assert!(scene.register_observation(&[square(1., 1.), bad]).is_err());
        assert_eq!(scene.get("blue").unwrap().centroid, before);
    }

    #[test]
    fn phantom_regions_are_never_movable() {
        let bounds = WorkspaceBounds::new(-3., 3., -3., 3.).unwrap();
        let scene = Scene::new(&bounds, &[square(0., 0.)]);
        assert!(!scene.get("top_left_corner").unwrap().movable);
        let movable: Vec<_> = scene.movable_names().collect();
        assert_eq!(movable, vec!["blue"]);
    }

    #[test]
    fn scene_view_override_does_not_touch_base() {
        let bounds = WorkspaceBounds::new(-3., 3., -3., 3.).unwrap();
        let scene = Scene::new(&bounds, &[square(0., 0.)]);
        let moved = scene.get("blue").unwrap().polygon.translated(5., 0.);
        let view = SceneView::new(&scene, "blue", moved);
        assert!((view.centroid("blue").unwrap().x - 5.).abs() < 1e-9);
        assert!((scene.get("blue").unwrap().centroid.x - 0.).abs() < 1e-9);
    }
}
