//! DE genome: construction, the rand/1/bin variation operator and the
//! [`vita_core::genome::Individual`] capability impl (spec §4.4).

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use vita_core::genome::Individual;
use vita_core::objectives::Fitness;
use vita_core::random;
use vita_core::signature::{Signature, SignatureBuilder};
use vita_error::{VitaError, VitaResult};

/// A half-open real bound `[lo, hi)` a single gene's value must stay within.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RealRange {
    pub lo: f64,
    pub hi: f64,
}

impl RealRange {
    pub fn new(lo: f64, hi: f64) -> Self {
        RealRange { lo, hi }
    }

    fn sample(&self) -> f64 {
        random::range(self.lo..self.hi)
    }

    fn clamp(&self, v: f64) -> f64 {
        v.clamp(self.lo, self.hi)
    }
}

/// A real-valued optimization individual: a fixed-length vector of bounded
/// doubles, one range per position (spec §4.4). Cheaply cloned like its
/// [`crate::mep::MepIndividual`]/[`crate::ga::GaIndividual`] siblings.
#[derive(Clone)]
pub struct DeIndividual {
    genes: Arc<Vec<f64>>,
    ranges: Arc<Vec<RealRange>>,
    age: Arc<AtomicU32>,
    fitness: Arc<Mutex<Fitness>>,
}

impl DeIndividual {
    pub fn random(ranges: Arc<Vec<RealRange>>, num_objectives: usize) -> VitaResult<Self> {
        if ranges.is_empty() {
            return Err(VitaError::InvalidConfig {
                message: "DE genome needs at least one range".into(),
            });
        }
        if ranges.iter().any(|r| r.hi <= r.lo) {
            return Err(VitaError::InvalidConfig {
                message: "DE range must satisfy lo < hi".into(),
            });
        }

        let genes = ranges.iter().map(RealRange::sample).collect();
        Ok(DeIndividual {
            genes: Arc::new(genes),
            ranges,
            age: Arc::new(AtomicU32::new(0)),
            fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives.max(1)))),
        })
    }

    pub fn genes(&self) -> &[f64] {
        &self.genes
    }

    pub fn ranges(&self) -> &[RealRange] {
        &self.ranges
    }

    pub fn len(&self) -> usize {
        self.genes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.genes.is_empty()
    }

    /// L1 distance between two genomes (spec §4.4).
    pub fn distance(&self, other: &Self) -> f64 {
        self.genes.iter().zip(other.genes.iter()).map(|(a, b)| (a - b).abs()).sum()
    }

    fn with_genes(&self, genes: Vec<f64>, age: u32) -> Self {
        DeIndividual {
            genes: Arc::new(genes),
            ranges: self.ranges.clone(),
            age: Arc::new(AtomicU32::new(age)),
            fitness: Arc::new(Mutex::new(Fitness::unset(self.fitness().len().max(1)))),
        }
    }

    /// rand/1/bin differential evolution offspring (spec §4.4): `self` is
    /// the target `p`, and `a`, `b`, `c` supply the mutant vector
    /// `c + F * (a - b)`. For each gene, the mutant value is taken with
    /// probability `cr`; otherwise the target's own value is kept. Age is
    /// the max of all four parents, per `DESIGN.md`'s Open Question
    /// decision applying that rule uniformly across DE crossover variants.
    pub fn de_crossover(&self, a: &Self, b: &Self, c: &Self, cr: f32, f_range: (f64, f64)) -> Self {
        debug_assert_eq!(self.genes.len(), a.genes.len());
        debug_assert_eq!(self.genes.len(), b.genes.len());
        debug_assert_eq!(self.genes.len(), c.genes.len());

        let (f_lo, f_hi) = f_range;
        let genes: Vec<f64> = (0..self.genes.len())
            .map(|i| {
                if random::bool(cr) {
                    let weight = random::range(f_lo..f_hi);
                    let mutant = c.genes[i] + weight * (a.genes[i] - b.genes[i]);
                    self.ranges[i].clamp(mutant)
                } else {
                    self.genes[i]
                }
            })
            .collect();

        let age = [self.age(), a.age(), b.age(), c.age()].into_iter().max().unwrap_or(0);
        self.with_genes(genes, age)
    }
}

impl Individual for DeIndividual {
    fn signature(&self) -> Signature {
        let mut builder = SignatureBuilder::new();
        for gene in self.genes.iter() {
            builder.push_f64(*gene);
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

    /// Per-gene uniform resampling within bounds (spec §4.9's "perturbation
    /// within bounds for DE"). The rand/1/bin vector-difference operator
    /// that defines DE proper lives in [`Self::de_crossover`], which needs
    /// four parents rather than the two this trait method is given.
    fn mutate(&self, rate: f32) -> Self {
        let genes: Vec<f64> = self
            .genes
            .iter()
            .zip(self.ranges.iter())
            .map(|(&g, r)| if random::bool(rate) { r.sample() } else { g })
            .collect();
        self.with_genes(genes, self.age())
    }

    /// Uniform binary crossover fallback satisfying the shared two-parent
    /// contract; the evolution driver uses [`Self::de_crossover`] for DE's
    /// actual rand/1/bin variation (spec §4.4, §4.9).
    fn crossover(&self, other: &Self, rate: f32) -> (Self, Self) {
        debug_assert_eq!(self.genes.len(), other.genes.len());
        let age = self.age().max(other.age());

        let child = |a: &DeIndividual, b: &DeIndividual| -> Vec<f64> {
            a.genes.iter().zip(b.genes.iter()).map(|(&x, &y)| if random::bool(rate) { y } else { x }).collect()
        };

        (self.with_genes(child(self, other), age), self.with_genes(child(other, self), age))
    }
}
