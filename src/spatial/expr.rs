//! Atomic spatial predicates over named scene objects — the leaves that
//! each Atomic Proposition (spec.md §3) resolves to.
//!
//! Out of scope per spec.md ("the parser ... of the spatial-temporal
//! logic"): there is no text grammar here, only the tree a parser would have
//! produced. Callers build `SpatialExpr` values directly (see
//! `automaton::build` for how a full formula is assembled from them).

use std::fmt;

#[derive(Clone, Debug, PartialEq)]
pub enum SpatialExpr {
    /// `a.centroid.x < b.centroid.x`
    LeftOf(String, String),
    /// `a.centroid.x > b.centroid.x`
    RightOf(String, String),
    /// `a.centroid.y > b.centroid.y`
    Above(String, String),
    /// `a.centroid.y < b.centroid.y`
    Below(String, String),
    /// `a` and `b`'s footprints intersect.
    Overlaps(String, String),
    /// boundary distance between `a` and `b` is at most `k`.
    DistLe(String, String, f64),
    /// boolean conjunction of two spatial subformulas (quantitative
    /// robustness: pointwise min), e.g. `(blue leftof red) & (blue dist red <= 1.0)`.
    And(Box<SpatialExpr>, Box<SpatialExpr>),
    /// boolean disjunction (quantitative robustness: pointwise max).
    Or(Box<SpatialExpr>, Box<SpatialExpr>),
    /// boolean negation (quantitative robustness: sign flip).
    Not(Box<SpatialExpr>),
}

impl SpatialExpr {
    pub fn and(a: SpatialExpr, b: SpatialExpr) -> SpatialExpr {
        SpatialExpr::And(Box::new(a), Box::new(b))
    }
    pub fn or(a: SpatialExpr, b: SpatialExpr) -> SpatialExpr {
        SpatialExpr::Or(Box::new(a), Box::new(b))
    }
    pub fn not(a: SpatialExpr) -> SpatialExpr {
        SpatialExpr::Not(Box::new(a))
    }

    /// Every object name this predicate references (for `relevant_objects`,
    /// spec.md §4.5, and for the gradient map's "which object is virtually
    /// moved" bookkeeping).
    pub fn object_names(&self) -> Vec<&str> {
        match self {
            SpatialExpr::LeftOf(a, b)
            | SpatialExpr::RightOf(a, b)
            | SpatialExpr::Above(a, b)
            | SpatialExpr::Below(a, b)
            | SpatialExpr::Overlaps(a, b)
            | SpatialExpr::DistLe(a, b, _) => vec![a.as_str(), b.as_str()],
            SpatialExpr::And(a, b) | SpatialExpr::Or(a, b) => {
                let mut names = a.object_names();
                names.extend(b.object_names());
                names
            }
            SpatialExpr::Not(a) => a.object_names(),
        }
    }
}

impl fmt::Display for SpatialExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpatialExpr::LeftOf(a, b) => write!(f, "{} leftof {}", a, b),
            SpatialExpr::RightOf(a, b) => write!(f, "{} rightof {}", a, b),
            SpatialExpr::Above(a, b) => write!(f, "{} above {}", a, b),
            SpatialExpr::Below(a, b) => write!(f, "{} below {}", a, b),
            SpatialExpr::Overlaps(a, b) => write!(f, "{} ovlp {}", a, b),
            SpatialExpr::DistLe(a, b, k) => write!(f, "{} dist {} <= {}", a, b, k),
            SpatialExpr::And(a, b) => write!(f, "({}) & ({})", a, b),
            SpatialExpr::Or(a, b) => write!(f, "({}) | ({})", a, b),
            SpatialExpr::Not(a) => write!(f, "(not {})", a),
        }
    }
}
