//! Error taxonomy for the planner core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    /// Upstream parse/automaton construction refused the formula. Surface; do not retry.
    #[error("formula failed to parse or compile into an automaton: {0}")]
    SpecParseFailure(String),

    /// An observation named an object not declared at init.
    #[error("observation referenced unknown object {0:?}")]
    UnknownObject(String),

    /// An observation's symbol matched no outgoing edge in orig_dfa.
    #[error("protocol violation: symbol {symbol:?} matches no edge out of state {state}")]
    ProtocolViolation { state: usize, symbol: String },

    /// Degenerate workspace bounds or too few samples.
    #[error("degenerate workspace bounds or sample count: {0}")]
    DegenerateBounds(String),

    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario json: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlannerError>;
