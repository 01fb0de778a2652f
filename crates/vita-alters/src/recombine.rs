use vita_core::genome::Individual;
use vita_core::objectives::{Fitness, Optimize};

/// Produces offspring from a pair of parents. The evolution driver calls
/// this once per breeding event within a layer (spec §4.11 step 4).
pub trait Recombine<I: Individual> {
    fn recombine(&self, parents: (&I, &I), crossover_rate: f32, mutate_rate: f32) -> Vec<I>;
}

/// Crossover-then-per-gene-mutation, the default recombination (spec §4.9):
/// the two parents produce exactly two children, each independently
/// mutated. Grounded on `radiate-core`'s default `Alter` pipeline, which
/// chains a `Crossover` and a `Mutate` the same way.
#[derive(Debug, Clone, Default)]
pub struct StandardRecombination;

impl StandardRecombination {
    pub fn new() -> Self {
        StandardRecombination
    }
}

impl<I: Individual> Recombine<I> for StandardRecombination {
    fn recombine(&self, parents: (&I, &I), crossover_rate: f32, mutate_rate: f32) -> Vec<I> {
        let (a, b) = parents;
        let (c0, c1) = a.crossover(b, crossover_rate);
        vec![c0.mutate(mutate_rate), c1.mutate(mutate_rate)]
    }
}

/// Brood recombination (spec §4.9): generates `brood_size` candidate
/// offspring pairs from the same two parents and keeps only the fittest
/// individual among all of them, trading extra evaluations for a stronger
/// single child. `evaluate` is supplied by the caller (the evolution driver
/// owns the problem's fitness function and the shared cache); this type has
/// no notion of how to score an individual.
pub struct BroodRecombination {
    brood_size: usize,
}

impl BroodRecombination {
    pub fn new(brood_size: usize) -> Self {
        BroodRecombination { brood_size: brood_size.max(1) }
    }

    pub fn recombine_and_select<I, F>(
        &self,
        parents: (&I, &I),
        crossover_rate: f32,
        mutate_rate: f32,
        directions: &[Optimize],
        mut evaluate: F,
    ) -> I
    where
        I: Individual,
        F: FnMut(&I) -> Fitness,
    {
        let (a, b) = parents;
        let standard = StandardRecombination::new();

        let mut best: Option<(I, Fitness)> = None;
        for _ in 0..self.brood_size {
            for child in standard.recombine((a, b), crossover_rate, mutate_rate) {
                let fitness = evaluate(&child);
                let replace = match &best {
                    None => true,
                    Some((_, best_fitness)) => {
                        fitness.compare(best_fitness, directions) == std::cmp::Ordering::Greater
                    }
                };
                if replace {
                    best = Some((child, fitness));
                }
            }
        }

        let (winner, fitness) = best.expect("brood_size is at least 1");
        winner.set_fitness(fitness);
        winner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::signature::Signature;
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct Scored(Arc<AtomicI64>, Arc<AtomicU32>);

    impl Scored {
        fn new(v: i64) -> Self {
            Scored(Arc::new(AtomicI64::new(v)), Arc::new(AtomicU32::new(0)))
        }
    }

    impl Individual for Scored {
        fn signature(&self) -> Signature {
            Signature(self.0.load(Ordering::Relaxed) as u64, 0)
        }
        fn age(&self) -> u32 {
            self.1.load(Ordering::Relaxed)
        }
        fn set_age(&self, age: u32) {
            self.1.store(age, Ordering::Relaxed);
        }
        fn size(&self) -> usize {
            1
        }
        fn fitness(&self) -> Fitness {
            Fitness::scalar(self.0.load(Ordering::Relaxed) as f64)
        }
        fn set_fitness(&self, f: Fitness) {
            self.0.store(f.get(0) as i64, Ordering::Relaxed);
        }
        fn mutate(&self, _rate: f32) -> Self {
            self.clone()
        }
        fn crossover(&self, other: &Self, _rate: f32) -> (Self, Self) {
            let v = (self.0.load(Ordering::Relaxed) + other.0.load(Ordering::Relaxed)) / 2;
            (Scored::new(v), Scored::new(v + 1))
        }
    }

    #[test]
    fn standard_recombination_produces_two_children() {
        let a = Scored::new(1);
        let b = Scored::new(9);
        let children = StandardRecombination::new().recombine((&a, &b), 1.0, 0.0);
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn brood_keeps_the_fittest_child() {
        let a = Scored::new(1);
        let b = Scored::new(9);
        let brood = BroodRecombination::new(5);
        let winner = brood.recombine_and_select(
            (&a, &b),
            1.0,
            0.0,
            &[Optimize::Maximize],
            |child| child.fitness(),
        );
        assert!(winner.fitness().get(0) >= 5.0);
    }
}
