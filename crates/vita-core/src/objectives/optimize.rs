use std::cmp::Ordering;

/// Direction of improvement for a single objective slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Optimize {
    Minimize,
    Maximize,
}

impl Optimize {
    /// Orders two raw scalars so that `Ordering::Greater` always means "`a`
    /// is the better of the two", regardless of direction.
    ///
    /// `f64::NEG_INFINITY` is the fixed "unset" / "overflowed" sentinel
    /// (spec §3, §7): it always loses, even under `Minimize` where a
    /// smaller raw value would otherwise win. Without this, an unevaluated
    /// or overflowed individual would look *best* on every minimized
    /// objective instead of worst.
    pub fn cmp(&self, a: f64, b: f64) -> Ordering {
        match (a == f64::NEG_INFINITY, b == f64::NEG_INFINITY) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            (false, false) => {}
        }
        match self {
            Optimize::Minimize => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
            Optimize::Maximize => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        }
    }

    pub fn is_better(&self, a: f64, b: f64) -> bool {
        self.cmp(a, b) == Ordering::Greater
    }
}

/// A single slot of a multi-objective problem: its optimization direction
/// and a human name used in reporting (e.g. "error", "size").
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Objective {
    pub name: String,
    pub direction: Optimize,
}

impl Objective {
    pub fn new(name: impl Into<String>, direction: Optimize) -> Self {
        Self { name: name.into(), direction }
    }

    pub fn minimize(name: impl Into<String>) -> Self {
        Self::new(name, Optimize::Minimize)
    }

    pub fn maximize(name: impl Into<String>) -> Self {
        Self::new(name, Optimize::Maximize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimize_prefers_smaller() {
        assert!(Optimize::Minimize.is_better(1.0, 2.0));
        assert!(!Optimize::Minimize.is_better(2.0, 1.0));
    }

    #[test]
    fn maximize_prefers_larger() {
        assert!(Optimize::Maximize.is_better(2.0, 1.0));
        assert!(!Optimize::Maximize.is_better(1.0, 2.0));
    }

    #[test]
    fn unset_sentinel_always_loses_even_under_minimize() {
        // A smaller raw value normally wins under Minimize, but
        // f64::NEG_INFINITY is the fixed "unset"/"overflowed" sentinel
        // (spec §3, §7) and must lose regardless of direction.
        assert!(!Optimize::Minimize.is_better(f64::NEG_INFINITY, 1.0));
        assert!(Optimize::Minimize.is_better(1.0, f64::NEG_INFINITY));
    }

    #[test]
    fn two_unset_sentinels_are_equal_under_either_direction() {
        assert_eq!(Optimize::Minimize.cmp(f64::NEG_INFINITY, f64::NEG_INFINITY), Ordering::Equal);
        assert_eq!(Optimize::Maximize.cmp(f64::NEG_INFINITY, f64::NEG_INFINITY), Ordering::Equal);
    }
}
