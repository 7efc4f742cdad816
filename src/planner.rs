//! Planner Core and edge pruning.

use std::collections::{HashMap, HashSet};

use log::{debug, info};
use petgraph::graph::NodeIndex;

use crate::automaton::driver::{AutomatonDriver, PlanStep};
use crate::automaton::guard::Guard;
use crate::error::Result;
use crate::gradient::{composite_constraint, field_from_guard, find_best_point};
use crate::grid::{SampleGrid, WorkspaceBounds, PHANTOM_NAMES};
use crate::instrumentation::Timer;
use crate::request::generate_request_text;
use crate::scene::{ObjectObservation, Scene};
use crate::spatial::SpatialExpr;

/// Command emitted by `Planner::get_next_step`.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Nothing to do: already accepting, or infeasible with no fallback.
    None { spec_satisfied: bool },
    /// Move `name` so its centroid lands at `new_pos`.
    Execute { name: String, new_pos: (f64, f64), edge: (usize, usize) },
    /// No feasible move exists; ask an external agent.
    Request { text: String },
}

/// One pruned edge, recording the target it used to lead to and how costly
/// it was to give up.
#[derive(Clone, Copy, Debug)]
struct PrunedEdge {
    target: NodeIndex,
    cost: usize,
}

/// Owns the scene, the automaton driver, the sample grid, and the
/// pruned-edges table.
pub struct Planner {
    scene: Scene,
    driver: AutomatonDriver,
    grid: SampleGrid,
    trace_ap: Vec<String>,
    var_to_tree: HashMap<String, SpatialExpr>,
    pruned_edges: HashMap<NodeIndex, Vec<PrunedEdge>>,
}

impl Planner {
    /// Builds the planner and — reproducing
    /// `original_source/spatial_requests/spatial_request_planner.py`'s
    /// `__init__` (SPEC_FULL.md §2 supplement) — steps the automaton once on
    /// the bootstrap observation of `initial`, so `current_state` already
    /// reflects the initial scene before the first `get_next_step` call.
    pub fn new(
        bounds: WorkspaceBounds,
        samples: usize,
        initial: &[ObjectObservation],
        driver: AutomatonDriver,
        trace_ap: Vec<String>,
        var_to_tree: HashMap<String, SpatialExpr>,
    ) -> Result<Self> {
        let grid = SampleGrid::new(&bounds, samples)?;
        let scene = Scene::new(&bounds, initial);

        let mut planner = Planner { scene, driver, grid, trace_ap, var_to_tree, pruned_edges: HashMap::new() };
        let obs = planner.observation_symbol();
        let trace_ap = planner.trace_ap.clone();
        planner.driver.dfa_step(&obs, &trace_ap)?;
        Ok(planner)
    }

    fn observation_symbol(&self) -> Vec<bool> {
        self.trace_ap.iter().map(|name| crate::spatial::interpret(&self.var_to_tree[name], &self.scene) > 0.).collect()
    }

    /// Applies updated observations to the scene and steps the automaton.
    pub fn register_observation(&mut self, updates: &[ObjectObservation]) -> Result<()> {
        self.scene.register_observation(updates)?;
        let obs = self.observation_symbol();
        let trace_ap = self.trace_ap.clone();
        self.driver.dfa_step(&obs, &trace_ap)?;
        Ok(())
    }

    /// `relevant_objects`: movable objects named by a non-`X`
    /// position of some guard in `sog`, excluding the phantom corners.
    fn relevant_objects(&self, sog: &[Guard]) -> Vec<String> {
        let mut names: HashSet<String> = HashSet::new();
        for g in sog {
            for (i, bit) in g.0.iter().enumerate() {
                if matches!(bit, crate::automaton::guard::Bit::DontCare) {
                    continue;
                }
                for name in self.var_to_tree[&self.driver.get_dfa_ap()[i]].object_names() {
                    if PHANTOM_NAMES.contains(&name) {
                        continue;
                    }
                    if self.scene.get(name).map_or(false, |o| o.movable) {
                        names.insert(name.to_string());
                    }
                }
            }
        }
        let mut out: Vec<String> = names.into_iter().collect();
        out.sort();
        out
    }

    /// The targets already recorded as pruned out of `u` — used to make
    /// `plan_step` skip them even when `--features disable_pruning` leaves
    /// them physically in the working DFA (see `prune_edge`).
    fn excluded_targets(&self, u: NodeIndex) -> HashSet<NodeIndex> {
        self.pruned_edges.get(&u).map(|entries| entries.iter().map(|e| e.target).collect()).unwrap_or_default()
    }

    /// Records `edge` as permanently given up on. Also removes it from the
    /// working DFA unless `disable_pruning` is set — but termination of
    /// `get_next_step`'s retry loop never depends on that removal having
    /// happened: `excluded_targets` makes every already-pruned edge
    /// logically gone regardless of the feature flag, so the loop still
    /// converges (it cannot re-select an edge already in `pruned_edges`).
    fn prune_edge(&mut self, edge: (NodeIndex, NodeIndex)) {
        let (u, v) = edge;
        let target_guards = self.driver.dfa().guards(u, v).clone();
        let self_loop_guards = self.driver.dfa().self_loop_guards(u).clone();
        let cost = target_guards
            .iter()
            .flat_map(|t| self_loop_guards.iter().map(move |l| t.hamming_distance_on_shared_fixed_bits(l)))
            .min()
            .unwrap_or(0);

        self.pruned_edges.entry(u).or_insert_with(Vec::new).push(PrunedEdge { target: v, cost });
        if cfg!(not(feature = "disable_pruning")) {
            self.driver.dfa_mut().remove_edge(u, v);
        }
        info!("pruned edge {:?} -> {:?} (cost {})", u, v, cost);
    }

    /// Among pruned edges out of `u` that can still reach acceptance in
    /// `orig_dfa`, the cheapest one to surface as a request.
    fn find_smallest_request(&self, u: NodeIndex) -> Option<(NodeIndex, NodeIndex)> {
        let entries = self.pruned_edges.get(&u)?;
        let accepting: HashSet<NodeIndex> = self.driver.orig_dfa().accepting_nodes().into_iter().collect();
        let best = entries
            .iter()
            .filter(|e| accepting.iter().any(|&acc| self.driver.orig_dfa().has_path(e.target, acc)))
            .min_by_key(|e| (e.cost, e.target.index()))?;
        Some((u, best.target))
    }

    /// Advances planning by one tick: accept, execute a move, ask for help,
    /// or give up, pruning and retrying internally as needed.
    pub fn get_next_step(&mut self) -> Command {
        let mut timer = Timer::default();
        loop {
            let current = self.driver.current_state();
            let excluded = self.excluded_targets(current);
            match self.driver.plan_step(&excluded) {
                PlanStep::Accepting => {
                    debug!("planner tick: accepting ({:.2}ms)", timer.dur_ms());
                    return Command::None { spec_satisfied: true };
                }
                PlanStep::NoPath => {
                    return match self.find_smallest_request(current) {
                        Some(edge) => Command::Request { text: generate_request_text(self.driver.orig_dfa(), edge, &self.var_to_tree, self.driver.get_dfa_ap()) },
                        None => Command::None { spec_satisfied: false },
                    };
                }
                PlanStep::Target { target_sog, constraint_sog, edge } => {
                    for obj_name in self.relevant_objects(&target_sog) {
                        let constraint_field = composite_constraint(
                            &self.scene,
                            &self.grid,
                            &obj_name,
                            &constraint_sog,
                            self.driver.get_dfa_ap(),
                            &self.var_to_tree,
                        );
                        for guard in &target_sog {
                            let mut field = field_from_guard(
                                &self.scene,
                                &self.grid,
                                &obj_name,
                                guard,
                                self.driver.get_dfa_ap(),
                                &self.var_to_tree,
                            );
                            for (v, &c) in field.iter_mut().zip(&constraint_field) {
                                if c.is_nan() || c > 0. {
                                    *v = f64::NAN;
                                }
                            }
                            if let Some(idx) = find_best_point(&field, 0.) {
                                let pos = self.grid.position_at(idx);
                                debug!("planner tick: execute {} ({:.2}ms)", obj_name, timer.dur_ms());
                                return Command::Execute {
                                    name: obj_name,
                                    new_pos: (pos.x, pos.y),
                                    edge: (edge.0.index(), edge.1.index()),
                                };
                            }
                        }
                    }
                    self.prune_edge(edge);
                    // loop: plan_step is re-evaluated against the now-smaller working DFA
                }
            }
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::build::build_dfa;
    use crate::automaton::build::{ap, finally};

    fn square(name: &str, cx: f64, cy: f64) -> ObjectObservation {
        ObjectObservation {
            name: name.to_string(),
            color: None,
            points: vec![(cx - 0.5, cy - 0.5), (cx + 0.5, cy - 0.5), (cx + 0.5, cy + 0.5), (cx - 0.5, cy + 0.5)],
        }
    }

    fn single_ap_planner(
        expr: SpatialExpr,
        formula: &crate::automaton::build::Formula,
        objs: &[ObjectObservation],
        bounds: WorkspaceBounds,
    ) -> Planner {
        let dfa = build_dfa(formula);
        let driver = AutomatonDriver::new(dfa);
        let trace_ap = driver.get_dfa_ap().to_vec();
        let mut var_to_tree = HashMap::new();
        for name in &trace_ap {
            var_to_tree.insert(name.clone(), expr.clone());
        }
        Planner::new(bounds, 400, objs, driver, trace_ap, var_to_tree).unwrap()
    }

    #[test]
    fn s1_already_accepting() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let expr = SpatialExpr::LeftOf("blue".into(), "red".into());
        let mut planner = single_ap_planner(expr, &finally(ap("p")), &[square("blue", 0., 0.), square("red", 1., 0.)], bounds);
        assert_eq!(planner.get_next_step(), Command::None { spec_satisfied: true });
    }

    #[test]
    fn s2_single_forward_move() {
        let bounds = WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let expr = SpatialExpr::LeftOf("blue".into(), "red".into());
        let mut planner = single_ap_planner(expr, &finally(ap("p")), &[square("blue", 2., 0.), square("red", 1., 0.)], bounds);
        match planner.get_next_step() {
            Command::Execute { name, new_pos, .. } => {
                assert_eq!(name, "blue");
                assert!(new_pos.0 < 1.0);
            }
            other => panic!("expected Execute, got {:?}", other),
        }
    }

    #[test]
    fn s4_determinism() {
        let bounds = || WorkspaceBounds::new(-5., 5., -5., 5.).unwrap();
        let make = || {
            let expr = SpatialExpr::LeftOf("blue".into(), "red".into());
            single_ap_planner(expr, &finally(ap("p")), &[square("blue", 2., 0.), square("red", 1., 0.)], bounds())
        };
        let mut p1 = make();
        let mut p2 = make();
        assert_eq!(p1.get_next_step(), p2.get_next_step());
    }

    #[test]
    fn s5_phantom_anchor() {
        let bounds = WorkspaceBounds::new(-3., 3., -3., 3.).unwrap();
        let expr = SpatialExpr::Overlaps("blue".into(), "top_left_corner".into());
        let mut planner = single_ap_planner(expr, &finally(ap("p")), &[square("blue", 2., 2.)], bounds);
        match planner.get_next_step() {
            Command::Execute { name, new_pos, .. } => {
                assert_eq!(name, "blue");
                assert!(new_pos.0 < 0.0);
                assert!(new_pos.1 > 0.0);
            }
            other => panic!("expected Execute, got {:?}", other),
        }
    }

    #[test]
    fn pruning_is_not_re_selected_even_without_physical_edge_removal() {
        // Regression for the `--features disable_pruning` hang: `prune_edge`
        // may leave the edge physically in the working DFA, but `plan_step`
        // must still treat it as gone once it's in `pruned_edges`, or
        // `get_next_step` never terminates.
        let bounds = WorkspaceBounds::new(-2., 2., -2., 2.).unwrap();
        let expr = SpatialExpr::LeftOf("blue".into(), "banana".into());
        let mut planner =
            single_ap_planner(expr, &finally(ap("p")), &[square("blue", 1.8, 0.), square("banana", -2.0, 0.)], bounds);

        let current = planner.driver.current_state();
        let edge = match planner.driver.plan_step(&planner.excluded_targets(current)) {
            PlanStep::Target { edge, .. } => edge,
            other => panic!("expected Target, got {:?}", other),
        };

        // prune without letting the working DFA physically lose the edge,
        // simulating `disable_pruning`.
        planner.pruned_edges.entry(edge.0).or_insert_with(Vec::new).push(PrunedEdge { target: edge.1, cost: 0 });
        assert!(planner.driver.dfa().find_edge(edge.0, edge.1).is_some(), "edge must still be physically present");

        match planner.driver.plan_step(&planner.excluded_targets(current)) {
            PlanStep::Target { edge: e2, .. } => assert_ne!(e2, edge, "excluded edge must not be re-chosen"),
            PlanStep::NoPath => {} // also acceptable: no other edge progresses
            other => panic!("unexpected {:?}", other),
        }
    }
}
