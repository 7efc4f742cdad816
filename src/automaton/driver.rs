//! Automaton Driver (spec.md §4.2) — owns both DFA copies and the planner's
//! "Current State" (spec.md §3), and implements `dfa_step`/`plan_step`.

use std::collections::HashSet;

use petgraph::graph::NodeIndex;

use crate::error::{PlannerError, Result};

use super::dfa::Dfa;
use super::guard::{sog_matches, Sog};

/// Outcome of one `plan_step` call (spec.md §4.2).
#[derive(Clone, Debug)]
pub enum PlanStep {
    /// The current state is accepting: `(∅, ∅, self-loop)`.
    Accepting,
    /// An outgoing edge was chosen to pursue: `(target_sog, constraint_sog, edge)`.
    Target { target_sog: Sog, constraint_sog: Sog, edge: (NodeIndex, NodeIndex) },
    /// No path from the current state to any accepting state exists: `(∅, ∅, none)`.
    NoPath,
}

/// Distance (BFS edge count) from `from` to the nearest accepting node of
/// `dfa`, or `None` if no accepting node is reachable.
fn distance_to_acceptance(dfa: &Dfa, from: NodeIndex) -> Option<usize> {
    if dfa.accepting(from) {
        return Some(0);
    }
    let dist = dfa.bfs_distances(from);
    dfa.accepting_nodes().into_iter().filter_map(|n| dist.get(&n).copied()).min()
}

pub struct AutomatonDriver {
    orig_dfa: Dfa,
    dfa: Dfa,
    current: NodeIndex,
    start: NodeIndex,
}

impl AutomatonDriver {
    pub fn new(dfa: Dfa) -> Self {
        let start = dfa.start;
        AutomatonDriver { orig_dfa: dfa.clone(), dfa, current: start, start }
    }

    pub fn current_state(&self) -> NodeIndex {
        self.current
    }

    pub fn reset_state(&mut self) {
        self.current = self.start;
    }

    pub fn currently_accepting(&self) -> bool {
        self.dfa.accepting(self.current)
    }

    pub fn get_dfa_ap(&self) -> &[String] {
        &self.dfa.ap
    }

    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }

    pub fn dfa_mut(&mut self) -> &mut Dfa {
        &mut self.dfa
    }

    pub fn orig_dfa(&self) -> &Dfa {
        &self.orig_dfa
    }

    /// Advances on a concrete assignment `obs`, given in `trace_ap` order.
    /// Deliberately steps `orig_dfa`, not the (possibly pruned) working one
    /// (spec.md §4.5: "observations reflect ground truth and may cross
    /// pruned edges").
    pub fn dfa_step(&mut self, obs: &[bool], trace_ap: &[String]) -> Result<()> {
        for (target, sog) in self.orig_dfa.edges_out(self.current) {
            if sog_matches(sog, obs, trace_ap, &self.orig_dfa.ap) {
                self.current = target;
                return Ok(());
            }
        }
        Err(PlannerError::ProtocolViolation {
            state: self.current.index(),
            symbol: obs.iter().map(|&b| if b { '1' } else { '0' }).collect(),
        })
    }

    /// spec.md §4.2 `plan_step`, run against the working DFA.
    ///
    /// `excluded_targets` are edge targets out of the current node to treat
    /// as pruned even if `--features disable_pruning` left them physically
    /// in the graph: termination of `Planner::get_next_step`'s retry loop
    /// must not depend on `remove_edge` actually having run (an edge
    /// recorded in the pruned-edges table is logically gone whether or not
    /// the feature flag kept it in the graph), or that loop never converges
    /// under the flag.
    pub fn plan_step(&self, excluded_targets: &HashSet<NodeIndex>) -> PlanStep {
        if self.dfa.accepting(self.current) {
            return PlanStep::Accepting;
        }

        let edges: Vec<(NodeIndex, &Sog)> = self
            .dfa
            .edges_out(self.current)
            .into_iter()
            .filter(|&(t, _)| t == self.current || !excluded_targets.contains(&t))
            .collect();
        let mut best: Option<(usize, NodeIndex)> = None;
        for &(target, _) in &edges {
            if target == self.current {
                continue; // self-loop never progresses toward acceptance
            }
            if let Some(d) = distance_to_acceptance(&self.dfa, target) {
                best = match best {
                    None => Some((d, target)),
                    Some((bd, bt)) if d < bd || (d == bd && target.index() < bt.index()) => Some((d, target)),
                    other => other,
                };
            }
        }

        let chosen = match best {
            Some((_, t)) => t,
            None => return PlanStep::NoPath,
        };

        let target_sog = self.dfa.guards(self.current, chosen).clone();
        let constraint_sog: Sog = edges
            .iter()
            .filter(|&&(t, _)| t != self.current && t != chosen)
            .flat_map(|&(_, sog)| sog.iter().cloned())
            .collect();

        PlanStep::Target { target_sog, constraint_sog, edge: (self.current, chosen) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::build::{ap, finally, BoolExpr};
    use crate::automaton::build::build_dfa;

    #[test]
    fn accepting_state_yields_accepting_plan_step() {
        let dfa = build_dfa(&finally(ap("p")));
        let mut driver = AutomatonDriver::new(dfa);
        let trace_ap = driver.get_dfa_ap().to_vec();
        driver.dfa_step(&[true], &trace_ap).unwrap();
        assert!(driver.currently_accepting());
        assert!(matches!(driver.plan_step(&HashSet::new()), PlanStep::Accepting));
    }

    #[test]
    fn pending_state_has_a_target_edge() {
        let dfa = build_dfa(&finally(ap("p")));
        let driver = AutomatonDriver::new(dfa);
        assert!(!driver.currently_accepting());
        match driver.plan_step(&HashSet::new()) {
            PlanStep::Target { edge, .. } => assert_eq!(edge.0, driver.current_state()),
            other => panic!("expected Target, got {:?}", other),
        }
    }

    #[test]
    fn excluded_target_is_skipped_even_if_still_in_the_graph() {
        // models `--features disable_pruning`: the edge stays in the
        // working DFA, but the caller-supplied exclusion set still makes
        // `plan_step` treat it as gone.
        let formula = BoolExpr::and(finally(ap("p")), finally(ap("q")));
        let dfa = build_dfa(&formula);
        let driver = AutomatonDriver::new(dfa);

        let first = match driver.plan_step(&HashSet::new()) {
            PlanStep::Target { edge, .. } => edge,
            other => panic!("expected Target, got {:?}", other),
        };

        let mut excluded = HashSet::new();
        excluded.insert(first.1);
        match driver.plan_step(&excluded) {
            PlanStep::Target { edge, .. } => assert_ne!(edge, first, "excluded edge must not be re-chosen"),
            PlanStep::NoPath => {} // also acceptable: no other edge progresses
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unmatched_observation_is_a_protocol_violation() {
        use crate::automaton::dfa::{EdgeAttr, NodeAttr};
        use crate::automaton::guard::Guard;
        use petgraph::graph::DiGraph;

        // a deliberately malformed single-node DFA whose only edge covers
        // `p=true`, so observing `p=false` matches nothing.
        let mut graph: DiGraph<NodeAttr, EdgeAttr> = DiGraph::new();
        let n0 = graph.add_node(NodeAttr { accepting: false });
        graph.add_edge(n0, n0, EdgeAttr { sog: vec![Guard::from_str("1")] });
        let dfa = Dfa { graph, ap: vec!["p".to_string()], start: n0 };

        let mut driver = AutomatonDriver::new(dfa);
        let trace_ap = vec!["p".to_string()];
        assert!(driver.dfa_step(&[false], &trace_ap).is_err());
    }
}
