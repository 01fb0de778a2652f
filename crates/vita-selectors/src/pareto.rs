use crate::{Selector, flatten};
use vita_core::genome::{Individual, Population};
use vita_core::objectives::{Fitness, Optimize, crowding_distance, dominates};
use vita_core::random;

/// NSGA-II style selection (spec §4.9): individuals are fast-non-dominated-
/// sorted into successive fronts, then drawn with a binary tournament that
/// prefers a lower front and, within the same front, a larger crowding
/// distance -- grounded on `radiate-selectors`' `NSGA2Selector`/
/// `TournamentNSGA2Selector` pair, collapsed into the single tournament form
/// since Vita's replacement stage (not selection) owns the final
/// non-dominated front.
#[derive(Debug, Clone, Default)]
pub struct ParetoSelector;

impl ParetoSelector {
    pub fn new() -> Self {
        ParetoSelector
    }

    fn rank_and_crowding(fitnesses: &[Fitness], directions: &[Optimize]) -> (Vec<u32>, Vec<f64>) {
        let n = fitnesses.len();
        let mut ranks = vec![0u32; n];
        let mut remaining: Vec<usize> = (0..n).collect();
        let mut distances = vec![0.0; n];
        let mut rank = 0u32;

        while !remaining.is_empty() {
            let front_indices: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&i| {
                    !remaining
                        .iter()
                        .any(|&j| j != i && dominates(&fitnesses[j], &fitnesses[i], directions))
                })
                .collect();

            let front_fitness: Vec<Fitness> = front_indices.iter().map(|&i| fitnesses[i].clone()).collect();
            let front_distances = crowding_distance(&front_fitness, directions);

            for (slot, &idx) in front_indices.iter().enumerate() {
                ranks[idx] = rank;
                distances[idx] = front_distances[slot];
            }

            remaining.retain(|i| !front_indices.contains(i));
            rank += 1;
        }

        (ranks, distances)
    }
}

impl<I: Individual> Selector<I> for ParetoSelector {
    fn select(&self, population: &Population<I>, directions: &[Optimize], count: usize) -> Vec<I> {
        let pool = flatten(population);
        if pool.is_empty() {
            return Vec::new();
        }

        let fitnesses: Vec<Fitness> = pool.iter().map(|i| i.fitness()).collect();
        let (ranks, distances) = Self::rank_and_crowding(&fitnesses, directions);

        let better = |a: usize, b: usize| -> bool {
            ranks[a] < ranks[b] || (ranks[a] == ranks[b] && distances[a] > distances[b])
        };

        (0..count)
            .map(|_| {
                let a = random::range(0..pool.len());
                let b = random::range(0..pool.len());
                let winner = if better(a, b) { a } else { b };
                pool[winner].clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::signature::Signature;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Multi(Arc<Mutex<Vec<f64>>>, Arc<AtomicU32>);

    impl Multi {
        fn new(scores: Vec<f64>) -> Self {
            Multi(Arc::new(Mutex::new(scores)), Arc::new(AtomicU32::new(0)))
        }
    }

    impl Individual for Multi {
        fn signature(&self) -> Signature {
            Signature::ZERO
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
            Fitness::new(self.0.lock().unwrap().clone())
        }
        fn set_fitness(&self, f: Fitness) {
            *self.0.lock().unwrap() = f.as_slice().to_vec();
        }
        fn mutate(&self, _rate: f32) -> Self {
            self.clone()
        }
        fn crossover(&self, other: &Self, _rate: f32) -> (Self, Self) {
            (self.clone(), other.clone())
        }
    }

    #[test]
    fn select_returns_requested_count() {
        let mut pop: Population<Multi> = Population::new(1, 10, 20);
        pop.layers_mut()[0].push(Multi::new(vec![1.0, 4.0]));
        pop.layers_mut()[0].push(Multi::new(vec![2.0, 2.0]));
        pop.layers_mut()[0].push(Multi::new(vec![3.0, 1.0]));

        let selector = ParetoSelector::new();
        let dirs = [Optimize::Minimize, Optimize::Minimize];
        let picked = selector.select(&pop, &dirs, 10);
        assert_eq!(picked.len(), 10);
    }
}
