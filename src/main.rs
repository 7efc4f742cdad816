//! CLI front-end for the planner (teacher's own `[[bin]] name = "planner"`
//! target in Cargo.toml): loads a scenario from a JSON file and drives
//! `Planner::get_next_step` for a bounded number of ticks, logging each
//! `Command` via `log`/`pretty_env_logger`.

use std::collections::HashMap;
use std::fs;
use std::process;

use clap::{App, Arg};
use log::{error, info};
use serde::Deserialize;

use spatial_request_planner::automaton::build::{ap, build_dfa, finally, globally, BoolExpr, Formula};
use spatial_request_planner::automaton::AutomatonDriver;
use spatial_request_planner::grid::WorkspaceBounds;
use spatial_request_planner::scene::ObjectObservation;
use spatial_request_planner::spatial::SpatialExpr;
use spatial_request_planner::{Command, Planner, PlannerError, Result};

#[derive(Deserialize)]
#[serde(tag = "kind")]
enum PredicateSpec {
    LeftOf { a: String, b: String },
    RightOf { a: String, b: String },
    Above { a: String, b: String },
    Below { a: String, b: String },
    Overlaps { a: String, b: String },
    DistLe { a: String, b: String, k: f64 },
}

impl PredicateSpec {
    fn into_expr(self) -> SpatialExpr {
        match self {
            PredicateSpec::LeftOf { a, b } => SpatialExpr::LeftOf(a, b),
            PredicateSpec::RightOf { a, b } => SpatialExpr::RightOf(a, b),
            PredicateSpec::Above { a, b } => SpatialExpr::Above(a, b),
            PredicateSpec::Below { a, b } => SpatialExpr::Below(a, b),
            PredicateSpec::Overlaps { a, b } => SpatialExpr::Overlaps(a, b),
            PredicateSpec::DistLe { a, b, k } => SpatialExpr::DistLe(a, b, k),
        }
    }
}

#[derive(Deserialize)]
struct ScenarioAtom {
    temporal: String,
    predicate: PredicateSpec,
}

fn default_max_ticks() -> usize {
    20
}

#[derive(Deserialize)]
struct Scenario {
    bounds: [f64; 4],
    samples: usize,
    objects: Vec<ObjectObservation>,
    atoms: Vec<ScenarioAtom>,
    #[serde(default = "default_max_ticks")]
    max_ticks: usize,
}

/// Builds the (conjunctive) `Formula` and the `trace_ap`/`var_to_tree`
/// bookkeeping the planner needs from a scenario's flat atom list. Only
/// conjunction of top-level atoms is exposed at this CLI boundary; richer
/// boolean combinations can still be built programmatically against
/// `automaton::build` directly.
///
/// An empty `atoms` list is external input, not a programming error (spec.md
/// §7's `SpecParseFailure`: "upstream parse/automaton construction refused
/// the spec"), so it's surfaced as an `Err` rather than a panic.
fn build_formula_and_trees(atoms: Vec<ScenarioAtom>) -> Result<(Formula, Vec<String>, HashMap<String, SpatialExpr>)> {
    let mut trace_ap = Vec::new();
    let mut var_to_tree = HashMap::new();
    let mut formula: Option<Formula> = None;

    for (i, atom) in atoms.into_iter().enumerate() {
        let name = format!("a{}", i);
        trace_ap.push(name.clone());
        var_to_tree.insert(name.clone(), atom.predicate.into_expr());
        let leaf = match atom.temporal.as_str() {
            "globally" => globally(ap(&name)),
            _ => finally(ap(&name)),
        };
        formula = Some(match formula {
            None => leaf,
            Some(f) => BoolExpr::and(f, leaf),
        });
    }

    let formula = formula.ok_or_else(|| PlannerError::SpecParseFailure("scenario names no atoms".into()))?;
    Ok((formula, trace_ap, var_to_tree))
}

fn run(path: &str) -> Result<()> {
    let text = fs::read_to_string(path)?;
    let scenario: Scenario = serde_json::from_str(&text)?;

    let bounds = WorkspaceBounds::new(scenario.bounds[0], scenario.bounds[1], scenario.bounds[2], scenario.bounds[3])?;
    let (formula, trace_ap, var_to_tree) = build_formula_and_trees(scenario.atoms)?;
    let dfa = build_dfa(&formula);
    let driver = AutomatonDriver::new(dfa);

    let mut planner = Planner::new(bounds, scenario.samples, &scenario.objects, driver, trace_ap, var_to_tree)?;

    for tick in 0..scenario.max_ticks {
        match planner.get_next_step() {
            Command::None { spec_satisfied } => {
                info!("tick {}: done (spec_satisfied={})", tick, spec_satisfied);
                break;
            }
            Command::Execute { name, new_pos, edge } => {
                info!("tick {}: execute {} -> ({:.3}, {:.3}) via edge {:?}", tick, name, new_pos.0, new_pos.1, edge);
            }
            Command::Request { text } => {
                info!("tick {}: request:\n{}", tick, text);
                break;
            }
        }
    }

    Ok(())
}

fn main() {
    pretty_env_logger::init();

    let matches = App::new("planner")
        .version("0.1.0")
        .about("Spatial request planner: STL-guarded gradient search over a sampled workspace grid")
        .arg(Arg::with_name("scenario").help("path to a scenario JSON file").required(true).index(1))
        .get_matches();

    let path = matches.value_of("scenario").unwrap();
    if let Err(e) = run(path) {
        error!("{}", e);
        process::exit(1);
    }
}
