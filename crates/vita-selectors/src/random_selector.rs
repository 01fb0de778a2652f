use crate::{Selector, flatten};
use vita_core::genome::{Individual, Population};
use vita_core::objectives::Optimize;
use vita_core::random;

/// Draws `count` individuals uniformly at random, ignoring fitness
/// entirely. Grounded on `radiate-selectors`' `RandomSelector`; used as a
/// baseline and as the degenerate case of [`crate::TournamentSelector`] with
/// `tournament_size == 1`.
#[derive(Debug, Default)]
pub struct RandomSelector;

impl RandomSelector {
    pub fn new() -> Self {
        RandomSelector
    }
}

impl<I: Individual> Selector<I> for RandomSelector {
    fn select(&self, population: &Population<I>, _directions: &[Optimize], count: usize) -> Vec<I> {
        let pool = flatten(population);
        if pool.is_empty() {
            return Vec::new();
        }
        (0..count).map(|_| (*random::choose(&pool)).clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::objectives::Fitness;
    use vita_core::signature::Signature;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct Dummy(Arc<AtomicU32>);

    impl Individual for Dummy {
        fn signature(&self) -> Signature {
            Signature::ZERO
        }
        fn age(&self) -> u32 {
            self.0.load(Ordering::Relaxed)
        }
        fn set_age(&self, age: u32) {
            self.0.store(age, Ordering::Relaxed);
        }
        fn size(&self) -> usize {
            1
        }
        fn fitness(&self) -> Fitness {
            Fitness::unset(1)
        }
        fn set_fitness(&self, _f: Fitness) {}
        fn mutate(&self, _rate: f32) -> Self {
            self.clone()
        }
        fn crossover(&self, other: &Self, _rate: f32) -> (Self, Self) {
            (self.clone(), other.clone())
        }
    }

    #[test]
    fn draws_requested_count() {
        let mut pop: Population<Dummy> = Population::new(1, 10, 20);
        pop.layers_mut()[0].push(Dummy(Arc::new(AtomicU32::new(0))));
        pop.layers_mut()[0].push(Dummy(Arc::new(AtomicU32::new(1))));

        let selector = RandomSelector::new();
        let picked = selector.select(&pop, &[Optimize::Maximize], 7);
        assert_eq!(picked.len(), 7);
    }
}
