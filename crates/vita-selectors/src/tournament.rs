use crate::{Selector, flatten};
use vita_core::genome::{Individual, Population};
use vita_core::objectives::Optimize;
use vita_core::random;

/// Draws `tournament_size` individuals uniformly at random and keeps the
/// fittest; repeats `count` times. `tournament_size == 1` degenerates to
/// pure random selection (spec §4.9 boundary condition), since the "best of
/// one" is just that one.
#[derive(Debug, Clone)]
pub struct TournamentSelector {
    tournament_size: usize,
}

impl TournamentSelector {
    pub fn new(tournament_size: usize) -> Self {
        TournamentSelector { tournament_size: tournament_size.max(1) }
    }
}

impl<I: Individual> Selector<I> for TournamentSelector {
    fn select(&self, population: &Population<I>, directions: &[Optimize], count: usize) -> Vec<I> {
        let pool = flatten(population);
        if pool.is_empty() {
            return Vec::new();
        }

        (0..count)
            .map(|_| {
                let mut best = random::choose(&pool);
                for _ in 1..self.tournament_size {
                    let challenger = random::choose(&pool);
                    if challenger.fitness().compare(&best.fitness(), directions) == std::cmp::Ordering::Greater {
                        best = challenger;
                    }
                }
                (*best).clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::objectives::Fitness;
    use vita_core::signature::Signature;
    use std::sync::atomic::{AtomicU32, AtomicI64, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct Scored(Arc<AtomicI64>, Arc<AtomicU32>);

    impl Scored {
        fn new(score: i64) -> Self {
            Scored(Arc::new(AtomicI64::new(score)), Arc::new(AtomicU32::new(0)))
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
            (self.clone(), other.clone())
        }
    }

    #[test]
    fn tournament_size_one_is_uniform_random() {
        let mut pop: Population<Scored> = Population::new(1, 10, 20);
        for s in 0..10 {
            pop.layers_mut()[0].push(Scored::new(s));
        }
        let selector = TournamentSelector::new(1);
        let picked = selector.select(&pop, &[Optimize::Maximize], 5);
        assert_eq!(picked.len(), 5);
    }

    #[test]
    fn larger_tournament_prefers_higher_score() {
        let mut pop: Population<Scored> = Population::new(1, 10, 20);
        for s in 0..20 {
            pop.layers_mut()[0].push(Scored::new(s));
        }
        let selector = TournamentSelector::new(8);
        let picked = selector.select(&pop, &[Optimize::Maximize], 200);
        let mean: f64 = picked.iter().map(|p| p.fitness().get(0)).sum::<f64>() / picked.len() as f64;
        assert!(mean > 9.5);
    }
}
