//! Automaton construction from a formula tree — spec.md lists this among the
//! components treated as an external collaborator ("the automaton
//! construction from a parsed tree"). What follows is the minimal concrete
//! stand-in described in SPEC_FULL.md §1: a direct product construction for
//! boolean combinations of `F(bool-over-aps)` / `G(bool-over-aps)`, not a
//! general LTL-to-DFA compiler.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};

use super::dfa::{Dfa, EdgeAttr, NodeAttr};
use super::guard::{reduce, Bit, Guard, Sog};

/// A boolean formula over leaves of type `L`.
#[derive(Clone, Debug)]
pub enum BoolExpr<L> {
    Leaf(L),
    Not(Box<BoolExpr<L>>),
    And(Box<BoolExpr<L>>, Box<BoolExpr<L>>),
    Or(Box<BoolExpr<L>>, Box<BoolExpr<L>>),
}

impl<L> BoolExpr<L> {
    pub fn not(e: BoolExpr<L>) -> Self {
        BoolExpr::Not(Box::new(e))
    }
    pub fn and(a: BoolExpr<L>, b: BoolExpr<L>) -> Self {
        BoolExpr::And(Box::new(a), Box::new(b))
    }
    pub fn or(a: BoolExpr<L>, b: BoolExpr<L>) -> Self {
        BoolExpr::Or(Box::new(a), Box::new(b))
    }
}

/// A boolean expression whose leaves name atomic propositions (APs) —
/// the `bool` half of `F(bool)` / `G(bool)`.
pub type ApExpr = BoolExpr<String>;

/// One top-level temporal atom: an eventually- or always-bounded AP
/// expression. Nesting temporal operators inside one another is outside
/// this stand-in's restricted fragment (see the module doc comment).
#[derive(Clone, Debug)]
pub enum TemporalAtom {
    Finally(ApExpr),
    Globally(ApExpr),
}

/// The top-level formula: a boolean combination of temporal atoms.
pub type Formula = BoolExpr<TemporalAtom>;

pub fn ap(name: &str) -> ApExpr {
    BoolExpr::Leaf(name.to_string())
}

pub fn finally(e: ApExpr) -> Formula {
    BoolExpr::Leaf(TemporalAtom::Finally(e))
}

pub fn globally(e: ApExpr) -> Formula {
    BoolExpr::Leaf(TemporalAtom::Globally(e))
}

fn eval_ap_expr(e: &ApExpr, env: &HashMap<&str, bool>) -> bool {
    match e {
        BoolExpr::Leaf(name) => env[name.as_str()],
        BoolExpr::Not(a) => !eval_ap_expr(a, env),
        BoolExpr::And(a, b) => eval_ap_expr(a, env) && eval_ap_expr(b, env),
        BoolExpr::Or(a, b) => eval_ap_expr(a, env) || eval_ap_expr(b, env),
    }
}

/// Collects AP names referenced by `expr`, in first-occurrence depth-first
/// order, appending into `out` (skipping names already present).
fn collect_ap_names(expr: &ApExpr, out: &mut Vec<String>) {
    match expr {
        BoolExpr::Leaf(name) => {
            if !out.contains(name) {
                out.push(name.clone());
            }
        }
        BoolExpr::Not(a) => collect_ap_names(a, out),
        BoolExpr::And(a, b) | BoolExpr::Or(a, b) => {
            collect_ap_names(a, out);
            collect_ap_names(b, out);
        }
    }
}

fn collect_atoms<'a>(formula: &'a Formula, out: &mut Vec<&'a TemporalAtom>) {
    match formula {
        BoolExpr::Leaf(atom) => out.push(atom),
        BoolExpr::Not(a) => collect_atoms(a, out),
        BoolExpr::And(a, b) | BoolExpr::Or(a, b) => {
            collect_atoms(a, out);
            collect_atoms(b, out);
        }
    }
}

fn eval_top_with_atoms(formula: &Formula, atom_index: &HashMap<*const TemporalAtom, usize>, atom_truth: &[bool]) -> bool {
    match formula {
        BoolExpr::Leaf(atom) => atom_truth[atom_index[&(atom as *const TemporalAtom)]],
        BoolExpr::Not(a) => !eval_top_with_atoms(a, atom_index, atom_truth),
        BoolExpr::And(a, b) => eval_top_with_atoms(a, atom_index, atom_truth) && eval_top_with_atoms(b, atom_index, atom_truth),
        BoolExpr::Or(a, b) => eval_top_with_atoms(a, atom_index, atom_truth) || eval_top_with_atoms(b, atom_index, atom_truth),
    }
}

fn lift(local_sog: &Sog, local_ap: &[String], dfa_ap: &[String]) -> Sog {
    local_sog.iter().map(|g| g.reorder(local_ap, dfa_ap)).collect()
}

/// The Sog (over `local_ap`) of assignments for which `expr` is true.
fn sat_sog(expr: &ApExpr, local_ap: &[String]) -> Sog {
    let width = local_ap.len();
    let mut guards = Vec::new();
    for mask in 0..(1u32 << width) {
        let mut env = HashMap::new();
        let mut bits = Vec::with_capacity(width);
        for (i, name) in local_ap.iter().enumerate() {
            let v = (mask >> i) & 1 == 1;
            env.insert(name.as_str(), v);
            bits.push(if v { Bit::One } else { Bit::Zero });
        }
        if eval_ap_expr(expr, &env) {
            guards.push(Guard(bits));
        }
    }
    reduce(&guards)
}

/// Full product of every atom's automaton, synchronized on whichever of
/// each atom's outgoing edges matches a given global assignment.
pub fn build_dfa(formula: &Formula) -> Dfa {
    let mut dfa_ap: Vec<String> = Vec::new();
    let mut atoms: Vec<&TemporalAtom> = Vec::new();
    collect_atoms(formula, &mut atoms);
    for atom in &atoms {
        let expr = match atom {
            TemporalAtom::Finally(e) => e,
            TemporalAtom::Globally(e) => e,
        };
        collect_ap_names(expr, &mut dfa_ap);
    }

    let atom_index: HashMap<*const TemporalAtom, usize> =
        atoms.iter().enumerate().map(|(i, a)| (*a as *const TemporalAtom, i)).collect();

    // rebuild each atom automaton using the *sog* (not single-guard) form so
    // multi-guard transitions are respected during product combination.
    struct FullAtom {
        accepting: Vec<bool>,
        edges: Vec<Vec<(Sog, usize)>>,
    }
    let full_atoms: Vec<FullAtom> = atoms
        .iter()
        .map(|atom| {
            let expr = match atom {
                TemporalAtom::Finally(e) => e,
                TemporalAtom::Globally(e) => e,
            };
            let mut local_ap = Vec::new();
            collect_ap_names(expr, &mut local_ap);
            let sat_full = lift(&sat_sog(expr, &local_ap), &local_ap, &dfa_ap);
            let unsat_full = lift(&sat_sog(&BoolExpr::not(expr.clone()), &local_ap), &local_ap, &dfa_ap);
            let all_full = vec![Guard::all_dont_care(dfa_ap.len())];
            match atom {
                TemporalAtom::Finally(_) => FullAtom {
                    accepting: vec![false, true],
                    edges: vec![vec![(sat_full, 1), (unsat_full, 0)], vec![(all_full, 1)]],
                },
                TemporalAtom::Globally(_) => FullAtom {
                    accepting: vec![true, false],
                    edges: vec![vec![(sat_full, 0), (unsat_full, 1)], vec![(all_full, 1)]],
                },
            }
        })
        .collect();

    let n_atoms = full_atoms.len();
    let width = dfa_ap.len();

    let mut graph: DiGraph<NodeAttr, EdgeAttr> = DiGraph::new();
    let mut state_index: HashMap<Vec<usize>, NodeIndex> = HashMap::new();
    let mut pending_edges: Vec<(Vec<usize>, HashMap<Vec<usize>, Sog>)> = Vec::new();

    let initial_tuple: Vec<usize> = vec![0; n_atoms.max(1)];
    let initial_accepting = eval_top_with_atoms(
        formula,
        &atom_index,
        &full_atoms.iter().map(|a| a.accepting[0]).collect::<Vec<_>>(),
    );
    let start = graph.add_node(NodeAttr { accepting: initial_accepting });
    state_index.insert(initial_tuple.clone(), start);

    let mut frontier = vec![initial_tuple];
    let mut seen: std::collections::HashSet<Vec<usize>> = state_index.keys().cloned().collect();

    while let Some(tuple) = frontier.pop() {
        // cartesian product of this tuple's atoms' outgoing edges
        let mut combos: Vec<(Vec<usize>, Guard)> = vec![(Vec::new(), Guard::all_dont_care(width))];
        for (i, _) in tuple.iter().enumerate() {
            let atom_edges = &full_atoms[i].edges[tuple[i]];
            let mut next_combos = Vec::new();
            for (prefix, guard_so_far) in &combos {
                for (sog, target) in atom_edges {
                    for g in sog {
                        if let Some(merged) = guard_so_far.meet(g) {
                            let mut p = prefix.clone();
                            p.push(*target);
                            next_combos.push((p, merged));
                        }
                    }
                }
            }
            combos = next_combos;
        }

        let mut per_target: HashMap<Vec<usize>, Sog> = HashMap::new();
        for (target_tuple, guard) in combos {
            per_target.entry(target_tuple).or_insert_with(Vec::new).push(guard);
        }

        for (target_tuple, sog) in &per_target {
            if !seen.contains(target_tuple) {
                seen.insert(target_tuple.clone());
                let accepting = eval_top_with_atoms(
                    formula,
                    &atom_index,
                    &target_tuple.iter().enumerate().map(|(i, &s)| full_atoms[i].accepting[s]).collect::<Vec<_>>(),
                );
                let node = graph.add_node(NodeAttr { accepting });
                state_index.insert(target_tuple.clone(), node);
                frontier.push(target_tuple.clone());
            }
        }

        pending_edges.push((tuple, per_target));
    }

    for (tuple, per_target) in pending_edges {
        let u = state_index[&tuple];
        for (target_tuple, sog) in per_target {
            let v = state_index[&target_tuple];
            let reduced = reduce(&sog);
            graph.add_edge(u, v, EdgeAttr { sog: reduced });
        }
    }

    Dfa { graph, ap: dfa_ap, start }
}
