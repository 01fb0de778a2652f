//! GA genome: construction, mutation, crossover and the
//! [`vita_core::genome::Individual`] capability impl (spec §4.3).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use vita_core::genome::Individual;
use vita_core::objectives::Fitness;
use vita_core::random;
use vita_core::signature::{Signature, SignatureBuilder};
use vita_error::{VitaError, VitaResult};

/// A half-open bound `[lo, hi)` a single gene's value must stay within.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntRange {
    pub lo: i64,
    pub hi: i64,
}

impl IntRange {
    pub fn new(lo: i64, hi: i64) -> Self {
        IntRange { lo, hi }
    }

    fn sample(&self) -> i64 {
        random::range(self.lo..self.hi)
    }

    /// Draws a value uniformly from the range excluding `current`, per
    /// spec §4.3's mutation rule. Falls back to `current` when the range
    /// has no other value to offer.
    fn sample_excluding(&self, current: i64) -> i64 {
        if self.hi - self.lo <= 1 {
            return current;
        }
        loop {
            let candidate = self.sample();
            if candidate != current {
                return candidate;
            }
        }
    }
}

/// A combinatorial-optimization individual: a fixed-length vector of bounded
/// integers, one range per position (spec §4.3). Cheaply cloned like
/// [`crate::mep::MepIndividual`] -- genes and ranges are shared via `Arc`;
/// mutation/crossover produce genuinely distinct genomes.
#[derive(Clone)]
pub struct GaIndividual {
    genes: Arc<Vec<i64>>,
    ranges: Arc<Vec<IntRange>>,
    age: Arc<AtomicU32>,
    fitness: Arc<Mutex<Fitness>>,
}

impl GaIndividual {
    pub fn random(ranges: Arc<Vec<IntRange>>, num_objectives: usize) -> VitaResult<Self> {
        if ranges.is_empty() {
            return Err(VitaError::InvalidConfig {
                message: "GA genome needs at least one range".into(),
            });
        }
        if ranges.iter().any(|r| r.hi <= r.lo) {
            return Err(VitaError::InvalidConfig {
                message: "GA range must satisfy lo < hi".into(),
            });
        }

        let genes = ranges.iter().map(IntRange::sample).collect();
        Ok(GaIndividual {
            genes: Arc::new(genes),
            ranges,
            age: Arc::new(AtomicU32::new(0)),
            fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives.max(1)))),
        })
    }

    pub fn genes(&self) -> &[i64] {
        &self.genes
    }

    pub fn ranges(&self) -> &[IntRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// Count of positions where `self` and `other` differ (spec §4.3).
    pub fn distance(&self, other: &Self) -> usize {
        self.genes.iter().zip(other.genes.iter()).filter(|(a, b)| a != b).count()
    }

    fn with_genes(&self, genes: Vec<i64>, age: u32) -> Self {
        GaIndividual {
            genes: Arc::new(genes),
            ranges: self.ranges.clone(),
            age: Arc::new(AtomicU32::new(age)),
            fitness: Arc::new(Mutex::new(Fitness::unset(self.fitness().len().max(1)))),
        }
    }
}

impl Individual for GaIndividual {
    fn signature(&self) -> Signature {
        let mut builder = SignatureBuilder::new();
        for gene in self.genes.iter() {
            builder.push_bytes(&gene.to_le_bytes());
        }
        builder.finish()
    }

    fn age(&self) -> u32 {
        self.age.load(Ordering::Relaxed)
    }

    fn set_age(&self, age: u32) {
        self.age.store(age, Ordering::Relaxed);
    }

    fn size(&self) -> usize {
        self.genes.len()
    }

    fn fitness(&self) -> Fitness {
        self.fitness.lock().unwrap().clone()
    }

    fn set_fitness(&self, fitness: Fitness) {
        *self.fitness.lock().unwrap() = fitness;
    }

    fn mutate(&self, rate: f32) -> Self {
        let genes: Vec<i64> = self
            .genes
            .iter()
            .zip(self.ranges.iter())
            .map(|(&g, r)| if random::bool(rate) { r.sample_excluding(g) } else { g })
            .collect();
        self.with_genes(genes, self.age())
    }

    fn crossover(&self, other: &Self, rate: f32) -> (Self, Self) {
        debug_assert_eq!(self.genes.len(), other.genes.len());
        let n = self.genes.len();
        let age = self.age().max(other.age());

        if n < 2 || !random::bool(rate) {
            return (self.with_genes((*self.genes).clone(), age), other.with_genes((*other.genes).clone(), age));
        }

        let c1 = random::range(0..n - 1);
        let c2 = random::range(c1 + 1..n);

        let mut child0 = (*self.genes).clone();
        child0[c1..c2].copy_from_slice(&other.genes[c1..c2]);

        let mut child1 = (*other.genes).clone();
        child1[c1..c2].copy_from_slice(&self.genes[c1..c2]);

        (self.with_genes(child0, age), self.with_genes(child1, age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(n: usize, hi: i64) -> Arc<Vec<IntRange>> {
        Arc::new((0..n).map(|_| IntRange::new(0, hi)).collect())
    }

    #[test]
    fn random_genome_respects_ranges() {
        let ind = GaIndividual::random(ranges(8, 8), 1).unwrap();
        assert!(ind.genes().iter().all(|&g| (0..8).contains(&g)));
    }

    #[test]
    fn zero_mutation_rate_is_a_no_op() {
        let ind = GaIndividual::random(ranges(8, 8), 1).unwrap();
        let before = ind.signature();
        let mutated = ind.mutate(0.0);
        assert_eq!(mutated.signature(), before);
    }

    #[test]
    fn crossover_age_is_max_of_parents() {
        let a = GaIndividual::random(ranges(8, 8), 1).unwrap();
        let b = GaIndividual::random(ranges(8, 8), 1).unwrap();
        a.set_age(2);
        b.set_age(6);
        let (c0, c1) = a.crossover(&b, 1.0);
        assert_eq!(c0.age(), 6);
        assert_eq!(c1.age(), 6);
    }

    #[test]
    fn distance_counts_differing_positions() {
        let a = GaIndividual::random(ranges(8, 8), 1).unwrap();
        let mutated = a.mutate(1.0);
        let dist = a.distance(&mutated);
        assert!(dist <= 8);
    }
}
