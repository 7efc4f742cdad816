//! Request Synthesizer: turns a pruned edge's guards into human-readable
//! request text.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

use crate::automaton::dfa::Dfa;
use crate::automaton::guard::{reduce, Bit};
use crate::spatial::SpatialExpr;

/// A `0` bit negates the subtree's pretty-printed text. Simplification:
/// strip a leading `"(not"`/trailing `")"` pair rather than double-negating,
/// else wrap in `not(...)`.
fn negate_text(text: &str) -> String {
    if text.starts_with("(not") && text.ends_with(')') {
        text[4..text.len() - 1].trim().to_string()
    } else {
        format!("not({})", text)
    }
}

/// Given the pruned edge `(u,v)`, reduces `orig_dfa`'s guards on that edge
/// and formats them into human-readable request text.
///
/// Filtering a target clause that's redundant against a constraint clause
/// is left exactly as the original's disabled, commented-out block leaves
/// it: unfiltered. See DESIGN.md.
pub fn generate_request_text(
    orig_dfa: &Dfa,
    edge: (NodeIndex, NodeIndex),
    var_to_tree: &HashMap<String, SpatialExpr>,
    dfa_ap: &[String],
) -> String {
    let (u, v) = edge;
    let target = reduce(orig_dfa.guards(u, v));

    let clauses: Vec<String> = target
        .iter()
        .map(|g| {
            g.0.iter()
                .enumerate()
                .filter(|(_, bit)| !matches!(bit, Bit::DontCare))
                .map(|(i, bit)| {
                    let text = format!("{}", var_to_tree[&dfa_ap[i]]);
                    if matches!(bit, Bit::Zero) {
                        negate_text(&text)
                    } else {
                        text
                    }
                })
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect();

    format!("Please help me achieve:\n{}", clauses.join("\nOR\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::automaton::build::{ap, build_dfa, finally, BoolExpr};

    #[test]
    fn request_text_names_both_clauses() {
        let formula = BoolExpr::and(finally(ap("p")), finally(ap("q")));
        let dfa = build_dfa(&formula);
        let dfa_ap = dfa.ap.clone();

        let mut var_to_tree = HashMap::new();
        var_to_tree.insert(dfa_ap[0].clone(), SpatialExpr::LeftOf("blue".into(), "red".into()));
        var_to_tree.insert(dfa_ap[1].clone(), SpatialExpr::DistLe("blue".into(), "red".into(), 1.0));

        let start = dfa.start;
        let (target, _) = dfa.edges_out(start).into_iter().find(|(t, _)| *t != start).unwrap();

        let text = generate_request_text(&dfa, (start, target), &var_to_tree, &dfa_ap);
        assert!(text.starts_with("Please help me achieve:"));
        assert!(text.contains("leftof") || text.contains("dist"));
    }

    #[test]
    fn negate_text_strips_existing_not_wrapper() {
        assert_eq!(negate_text("(not blue leftof red)"), "blue leftof red");
        assert_eq!(negate_text("blue leftof red"), "not(blue leftof red)");
    }
}
