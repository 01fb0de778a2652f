use super::optimize::Optimize;
use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

/// A fixed-length fitness vector compared lexicographically, slot by slot,
/// under a matching slice of [`Optimize`] directions (spec §4.4).
///
/// `f64::NEG_INFINITY` in any slot means "not yet evaluated" -- an unset
/// fitness always loses a comparison against a set one, and two unset
/// fitnesses compare equal, matching the `-inf` convention used throughout
/// spec.md for an individual that has not been scored this epoch.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Fitness(Vec<f64>);

impl Fitness {
    pub fn new(values: Vec<f64>) -> Self {
        Fitness(values)
    }

    pub fn unset(len: usize) -> Self {
        Fitness(vec![f64::NEG_INFINITY; len])
    }

    pub fn scalar(value: f64) -> Self {
        Fitness(vec![value])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn is_set(&self) -> bool {
        !self.0.iter().any(|v| *v == f64::NEG_INFINITY)
    }

    pub fn get(&self, index: usize) -> f64 {
        self.0[index]
    }

    /// Lexicographic comparison under per-slot optimization direction.
    /// `Ordering::Greater` means `self` is the fitter of the two.
    pub fn compare(&self, other: &Fitness, directions: &[Optimize]) -> Ordering {
        debug_assert_eq!(self.0.len(), other.0.len());
        debug_assert_eq!(self.0.len(), directions.len());

        for ((a, b), dir) in self.0.iter().zip(other.0.iter()).zip(directions.iter()) {
            match dir.cmp(*a, *b) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    pub fn better_of<'a>(
        &'a self,
        other: &'a Fitness,
        directions: &[Optimize],
    ) -> &'a Fitness {
        match self.compare(other, directions) {
            Ordering::Less => other,
            _ => self,
        }
    }
}

impl Display for Fitness {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{v}")?;
        }
        write!(f, "]")
    }
}

impl From<Vec<f64>> for Fitness {
    fn from(v: Vec<f64>) -> Self {
        Fitness(v)
    }
}

impl From<f64> for Fitness {
    fn from(v: f64) -> Self {
        Fitness::scalar(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_loses_to_set() {
        let unset = Fitness::unset(1);
        let set = Fitness::scalar(1.0);
        assert_eq!(
            unset.compare(&set, &[Optimize::Maximize]),
            Ordering::Less
        );
    }

    #[test]
    fn two_unset_compare_equal() {
        let a = Fitness::unset(2);
        let b = Fitness::unset(2);
        assert_eq!(
            a.compare(&b, &[Optimize::Maximize, Optimize::Minimize]),
            Ordering::Equal
        );
    }

    #[test]
    fn lexicographic_order_respects_first_differing_slot() {
        let a = Fitness::new(vec![1.0, 5.0]);
        let b = Fitness::new(vec![1.0, 3.0]);
        let dirs = [Optimize::Maximize, Optimize::Maximize];
        assert_eq!(a.compare(&b, &dirs), Ordering::Greater);
    }

    #[test]
    fn mixed_directions_compose() {
        let a = Fitness::new(vec![2.0, 10.0]);
        let b = Fitness::new(vec![1.0, 10.0]);
        let dirs = [Optimize::Minimize, Optimize::Maximize];
        assert_eq!(a.compare(&b, &dirs), Ordering::Less);
    }
}
