//! Guard Algebra (spec.md §4.1) — ternary bit-strings over {'0','1','X'}
//! labeling DFA edges, stored as a fixed-width vector of a three-valued enum
//! (spec.md §9: "idiomatic to store as a fixed-width vector ... string
//! representation is reserved for logging").

use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Bit {
    Zero,
    One,
    DontCare,
}

impl Bit {
    fn from_char(c: char) -> Bit {
        match c {
            '0' => Bit::Zero,
            '1' => Bit::One,
            'X' | 'x' => Bit::DontCare,
            _ => panic!("invalid guard bit {:?}", c),
        }
    }

    fn to_char(self) -> char {
        match self {
            Bit::Zero => '0',
            Bit::One => '1',
            Bit::DontCare => 'X',
        }
    }
}

/// A single guard: one `Bit` per DFA atomic proposition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Guard(pub Vec<Bit>);

impl Guard {
    pub fn from_str(s: &str) -> Guard {
        Guard(s.chars().map(Bit::from_char).collect())
    }

    pub fn all_dont_care(width: usize) -> Guard {
        Guard(vec![Bit::DontCare; width])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn with_bit(&self, i: usize, b: Bit) -> Guard {
        let mut v = self.0.clone();
        v[i] = b;
        Guard(v)
    }

    /// The set of concrete assignments this guard covers (spec.md §4.1 `expand`).
    pub fn expand(&self) -> Vec<Vec<bool>> {
        let mut out = vec![Vec::new()];
        for bit in &self.0 {
            let mut next = Vec::with_capacity(out.len() * 2);
            match bit {
                Bit::Zero => {
                    for a in &out {
                        let mut a = a.clone();
                        a.push(false);
                        next.push(a);
                    }
                }
                Bit::One => {
                    for a in &out {
                        let mut a = a.clone();
                        a.push(true);
                        next.push(a);
                    }
                }
                Bit::DontCare => {
                    for a in &out {
                        let mut a0 = a.clone();
                        a0.push(false);
                        next.push(a0);
                        let mut a1 = a.clone();
                        a1.push(true);
                        next.push(a1);
                    }
                }
            }
            out = next;
        }
        out
    }

    /// True iff every non-`X` position of `self` equals the corresponding
    /// bit of `assignment` (spec.md §4.1 `matches`).
    pub fn matches(&self, assignment: &[bool]) -> bool {
        assert_eq!(self.len(), assignment.len());
        self.0.iter().zip(assignment).all(|(bit, &a)| match bit {
            Bit::DontCare => true,
            Bit::Zero => !a,
            Bit::One => a,
        })
    }

    /// True iff `self` subsumes `other`: every non-`X` bit of `self` matches
    /// `other`, and `other` has no `X` where `self` has a fixed bit.
    pub fn subsumes(&self, other: &Guard) -> bool {
        assert_eq!(self.len(), other.len());
        self.0.iter().zip(&other.0).all(|(s, o)| match s {
            Bit::DontCare => true,
            Bit::Zero => matches!(o, Bit::Zero),
            Bit::One => matches!(o, Bit::One),
        })
    }

    /// Bitwise conjunction of two guards over the same AP order: `None` if
    /// they disagree on some position, else the more specific guard.
    /// Not named in spec.md's Guard Algebra explicitly; used internally by
    /// `automaton::build`'s product construction to combine two component
    /// automata's per-transition guards.
    pub fn meet(&self, other: &Guard) -> Option<Guard> {
        assert_eq!(self.len(), other.len());
        let mut out = Vec::with_capacity(self.len());
        for (a, b) in self.0.iter().zip(&other.0) {
            out.push(match (a, b) {
                (Bit::DontCare, x) => *x,
                (x, Bit::DontCare) => *x,
                (x, y) if x == y => *x,
                _ => return None,
            });
        }
        Some(Guard(out))
    }

    /// Hamming distance counting only positions where both sides are fixed
    /// (non-`X`) and differ (spec.md §3, Pruned-Edge Record cost).
    pub fn hamming_distance_on_shared_fixed_bits(&self, other: &Guard) -> usize {
        assert_eq!(self.len(), other.len());
        self.0
            .iter()
            .zip(&other.0)
            .filter(|(a, b)| !matches!(a, Bit::DontCare) && !matches!(b, Bit::DontCare) && a != b)
            .count()
    }

    /// Reorders `self` (given in `from_ap` order) into `to_ap` order,
    /// filling `X` for any AP present in `to_ap` but absent from `from_ap`.
    /// This is the by-name translation spec.md §3 requires between
    /// `trace_ap` and `dfa_ap`.
    pub fn reorder(&self, from_ap: &[String], to_ap: &[String]) -> Guard {
        let mut out = vec![Bit::DontCare; to_ap.len()];
        for (i, name) in from_ap.iter().enumerate() {
            if let Some(j) = to_ap.iter().position(|n| n == name) {
                out[j] = self.0[i];
            }
        }
        Guard(out)
    }
}

impl fmt::Display for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{}", b.to_char())?;
        }
        Ok(())
    }
}

/// A Set Of Guards labeling one DFA edge. Order is insertion order
/// (spec.md §4.5: "iteration in insertion order").
pub type Sog = Vec<Guard>;

/// Subset of `assignment_ap`-ordered `assignment` against `sog` given in
/// `sog_ap` order (spec.md §4.1 `select`): any guard in `sog` consistent
/// with the (possibly partial, via `X`) assignment is kept.
pub fn select(sog: &Sog, assignment_guard: &Guard, assignment_ap: &[String], sog_ap: &[String]) -> Sog {
    let translated = assignment_guard.reorder(assignment_ap, sog_ap);
    sog.iter()
        .filter(|g| {
            g.0.iter().zip(&translated.0).all(|(gb, ab)| match ab {
                Bit::DontCare => true,
                _ => matches!(gb, Bit::DontCare) || gb == ab,
            })
        })
        .cloned()
        .collect()
}

/// Whether a concrete assignment (in `assignment_ap` order) is covered by
/// any guard of `sog` (given in `sog_ap` order).
pub fn sog_matches(sog: &Sog, assignment: &[bool], assignment_ap: &[String], sog_ap: &[String]) -> bool {
    let reordered = reorder_assignment(assignment, assignment_ap, sog_ap);
    sog.iter().any(|g| g.matches(&reordered))
}

fn reorder_assignment(assignment: &[bool], from_ap: &[String], to_ap: &[String]) -> Vec<bool> {
    let mut out = vec![false; to_ap.len()];
    for (i, name) in from_ap.iter().enumerate() {
        if let Some(j) = to_ap.iter().position(|n| n == name) {
            out[j] = assignment[i];
        }
    }
    out
}

/// Quine-McCluskey-style prime-implicant reduction (spec.md §4.1 `reduce`):
/// need not be optimal, only correct and monotonically shrinking. Tie-break
/// is deterministic iteration order (lexicographic on the guard strings).
pub fn reduce(sog: &Sog) -> Sog {
    if sog.is_empty() {
        return Vec::new();
    }

    let width = sog[0].len();
    let mut current: std::collections::BTreeSet<Vec<Bit>> = std::collections::BTreeSet::new();
    for g in sog {
        for a in g.expand() {
            current.insert(a.into_iter().map(|b| if b { Bit::One } else { Bit::Zero }).collect());
        }
    }

    loop {
        let snapshot: Vec<Vec<Bit>> = current.iter().cloned().collect();
        let mut additions: Vec<Vec<Bit>> = Vec::new();
        for guard in &snapshot {
            for i in 0..width {
                if guard[i] == Bit::DontCare {
                    continue;
                }
                let flipped = flip_bit(guard, i);
                if current.contains(&flipped) {
                    let mut reduced = guard.clone();
                    reduced[i] = Bit::DontCare;
                    additions.push(reduced);
                }
            }
        }
        let before = current.len();
        for a in additions {
            current.insert(a);
        }
        if current.len() == before {
            break;
        }
    }

    let all: Vec<Guard> = current.into_iter().map(Guard).collect();
    let mut kept: Vec<Guard> = Vec::new();
    'outer: for (i, g) in all.iter().enumerate() {
        for (j, h) in all.iter().enumerate() {
            if i != j && h.subsumes(g) && !g.subsumes(h) {
                continue 'outer;
            }
            // equal guards: keep only the lexicographically first copy
            if i != j && h.subsumes(g) && g.subsumes(h) && format!("{}", h) < format!("{}", g) {
                continue 'outer;
            }
        }
        kept.push(g.clone());
    }
    kept.sort_by_key(|g| format!("{}", g));
    kept.dedup();
    kept
}

fn flip_bit(guard: &[Bit], i: usize) -> Vec<Bit> {
    let mut out = guard.to_vec();
    out[i] = match out[i] {
        Bit::Zero => Bit::One,
        Bit::One => Bit::Zero,
        Bit::DontCare => Bit::DontCare,
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn expand_counts_two_to_the_x() {
        let g = Guard::from_str("X0X");
        assert_eq!(g.expand().len(), 4);
    }

    #[test]
    fn matches_respects_dont_care() {
        let g = Guard::from_str("X01");
        assert!(g.matches(&[true, false, true]));
        assert!(g.matches(&[false, false, true]));
        assert!(!g.matches(&[false, true, true]));
    }

    #[test]
    fn subsumes_is_strict_generality() {
        let g = Guard::from_str("X0");
        let h = Guard::from_str("10");
        assert!(g.subsumes(&h));
        assert!(!h.subsumes(&g));
    }

    #[test]
    fn meet_detects_conflicts() {
        let a = Guard::from_str("1X");
        let b = Guard::from_str("10");
        assert_eq!(meet_str(&a, &b), Some("10".to_string()));
        let c = Guard::from_str("0X");
        assert_eq!(a.meet(&c), None);
    }

    fn meet_str(a: &Guard, b: &Guard) -> Option<String> {
        a.meet(b).map(|g| format!("{}", g))
    }

    #[test]
    fn reduce_merges_complementary_pair() {
        let sog = vec![Guard::from_str("00"), Guard::from_str("01")];
        let reduced = reduce(&sog);
        assert_eq!(reduced.len(), 1);
        assert_eq!(format!("{}", reduced[0]), "0X");
    }

    #[test]
    fn reduce_preserves_covered_assignments_randomized() {
        let mut rng = rand::thread_rng();
        for _ in 0..200 {
            let width = rng.gen_range(1, 7);
            let n_guards = rng.gen_range(1, 5);
            let mut sog = Vec::new();
            for _ in 0..n_guards {
                let bits: Vec<Bit> = (0..width)
                    .map(|_| match rng.gen_range(0, 3) {
                        0 => Bit::Zero,
                        1 => Bit::One,
                        _ => Bit::DontCare,
                    })
                    .collect();
                sog.push(Guard(bits));
            }
            let reduced = reduce(&sog);

            for mask in 0..(1u32 << width) {
                let assignment: Vec<bool> = (0..width).map(|i| (mask >> i) & 1 == 1).collect();
                let before = sog.iter().any(|g| g.matches(&assignment));
                let after = reduced.iter().any(|g| g.matches(&assignment));
                assert_eq!(before, after, "width={} sog={:?} reduced={:?} assignment={:?}", width, sog, reduced, assignment);
            }
        }
    }
}
