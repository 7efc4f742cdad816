//! The DFA data structure itself. Represented as a `petgraph::DiGraph`
//! rather than a hand-rolled adjacency list — see DESIGN.md for why
//! `petgraph` was pulled in.

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use super::guard::Sog;

#[derive(Clone, Debug)]
pub struct NodeAttr {
    pub accepting: bool,
}

#[derive(Clone, Debug)]
pub struct EdgeAttr {
    pub sog: Sog,
}

/// Invariants (spec.md §3): deterministic; every node has a self-loop;
/// on any node the SOGs of distinct outgoing edges are mutually exclusive
/// and their union covers the full assignment space. These are established
/// by `automaton::build` at construction time and preserved by pruning
/// (pruning only ever removes a non-self-loop edge).
#[derive(Clone, Debug)]
pub struct Dfa {
    pub graph: DiGraph<NodeAttr, EdgeAttr>,
    pub ap: Vec<String>,
    pub start: NodeIndex,
}

impl Dfa {
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn accepting(&self, node: NodeIndex) -> bool {
        self.graph[node].accepting
    }

    pub fn accepting_nodes(&self) -> Vec<NodeIndex> {
        self.graph.node_indices().filter(|&n| self.accepting(n)).collect()
    }

    /// Outgoing edges from `node`, as `(target, sog)`, in a deterministic
    /// order (by target node id, spec.md §4.2 tie-break convention).
    pub fn edges_out(&self, node: NodeIndex) -> Vec<(NodeIndex, &Sog)> {
        let mut out: Vec<(NodeIndex, &Sog)> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|e| (e.target(), &e.weight().sog))
            .collect();
        out.sort_by_key(|(t, _)| t.index());
        out
    }

    pub fn find_edge(&self, u: NodeIndex, v: NodeIndex) -> Option<EdgeIndex> {
        self.graph.find_edge(u, v)
    }

    pub fn guards(&self, u: NodeIndex, v: NodeIndex) -> &Sog {
        let e = self.find_edge(u, v).expect("edge must exist");
        &self.graph[e].sog
    }

    pub fn self_loop_guards(&self, u: NodeIndex) -> &Sog {
        self.guards(u, u)
    }

    pub fn remove_edge(&mut self, u: NodeIndex, v: NodeIndex) {
        if let Some(e) = self.find_edge(u, v) {
            self.graph.remove_edge(e);
        }
    }

    /// True iff some path exists from `from` to `to` in this DFA.
    pub fn has_path(&self, from: NodeIndex, to: NodeIndex) -> bool {
        if from == to {
            return true;
        }
        self.bfs_distances(from).contains_key(&to)
    }

    /// Shortest edge-count distance from `from` to every reachable node
    /// (spec.md §4.2 `plan_step`'s "estimated distance-to-acceptance").
    pub fn bfs_distances(&self, from: NodeIndex) -> std::collections::HashMap<NodeIndex, usize> {
        use std::collections::{HashMap, VecDeque};
        let mut dist = HashMap::new();
        dist.insert(from, 0usize);
        let mut queue = VecDeque::new();
        queue.push_back(from);
        while let Some(u) = queue.pop_front() {
            let d = dist[&u];
            for (v, _) in self.edges_out(u) {
                if !dist.contains_key(&v) {
                    dist.insert(v, d + 1);
                    queue.push_back(v);
                }
            }
        }
        dist
    }
}
