//! Replacement strategies (spec §4.10): how offspring are folded back into
//! a layer once they exist.

use vita_core::genome::Individual;
use vita_core::objectives::{Fitness, Optimize, crowding_distance, dominates};
use vita_core::random;
use std::cmp::Ordering;

pub trait Replace<I: Individual> {
    /// Folds `offspring` into `layer` in place, respecting `layer`'s
    /// capacity invariant -- `layer.len()` must not grow past whatever it
    /// was before the call.
    fn replace(&self, layer: &mut Vec<I>, offspring: Vec<I>, directions: &[Optimize]);
}

/// Steady-state tournament replacement (spec §4.10): each offspring
/// replaces the single weakest member of a randomly drawn sub-tournament,
/// but only if the offspring is actually fitter. Grounded on `radiate-alters`'s
/// `TournamentSelector` sampling shape, applied to replacement instead of
/// selection.
#[derive(Debug, Clone)]
pub struct TournamentReplacement {
    tournament_size: usize,
}

impl TournamentReplacement {
    pub fn new(tournament_size: usize) -> Self {
        TournamentReplacement { tournament_size: tournament_size.max(1) }
    }
}

impl<I: Individual> Replace<I> for TournamentReplacement {
    fn replace(&self, layer: &mut Vec<I>, offspring: Vec<I>, directions: &[Optimize]) {
        if layer.is_empty() {
            return;
        }
        for child in offspring {
            let mut worst_idx = random::range(0..layer.len());
            let mut worst_fitness = layer[worst_idx].fitness();
            for _ in 1..self.tournament_size {
                let idx = random::range(0..layer.len());
                let fitness = layer[idx].fitness();
                if fitness.compare(&worst_fitness, directions) == Ordering::Less {
                    worst_idx = idx;
                    worst_fitness = fitness;
                }
            }
            if child.fitness().compare(&worst_fitness, directions) == Ordering::Greater {
                layer[worst_idx] = child;
            }
        }
    }
}

/// ALPS replacement (spec §4.10, grounded on `morinim/vita`'s
/// `kernel/evolution_replacement.h`): an offspring is inserted into the
/// layer outright while there's still room under the target size; once full,
/// it replaces the weakest current member of the *same* layer only if it
/// out-fits that member, so a layer can never fill up with individuals worse
/// than what it already had.
#[derive(Debug, Clone)]
pub struct AlpsReplacement {
    target_size: usize,
}

impl AlpsReplacement {
    pub fn new(target_size: usize) -> Self {
        AlpsReplacement { target_size }
    }
}

impl<I: Individual> Replace<I> for AlpsReplacement {
    fn replace(&self, layer: &mut Vec<I>, offspring: Vec<I>, directions: &[Optimize]) {
        for child in offspring {
            if layer.len() < self.target_size {
                layer.push(child);
                continue;
            }

            let (worst_idx, worst_fitness) = layer
                .iter()
                .enumerate()
                .map(|(i, ind)| (i, ind.fitness()))
                .min_by(|(_, a), (_, b)| a.compare(b, directions))
                .expect("layer is non-empty when at target size");

            if child.fitness().compare(&worst_fitness, directions) == Ordering::Greater {
                layer[worst_idx] = child;
            }
        }
    }
}

/// Family competition / deterministic crowding (spec §4.10): an offspring
/// only ever competes against the parent nearest its own signature (its
/// "family"), replacing that parent if fitter. Preserves diversity by
/// construction -- a strong offspring can't wipe out an unrelated weak
/// individual elsewhere in the layer.
#[derive(Debug, Clone, Default)]
pub struct FamilyCompetitionReplacement;

impl FamilyCompetitionReplacement {
    pub fn new() -> Self {
        FamilyCompetitionReplacement
    }
}

impl<I: Individual> Replace<I> for FamilyCompetitionReplacement {
    fn replace(&self, layer: &mut Vec<I>, offspring: Vec<I>, directions: &[Optimize]) {
        if layer.is_empty() {
            return;
        }
        for child in offspring {
            let child_sig = child.signature().fold64();
            let (nearest_idx, _) = layer
                .iter()
                .enumerate()
                .min_by_key(|(_, ind)| ind.signature().fold64().abs_diff(child_sig))
                .expect("layer is non-empty");

            if child.fitness().compare(&layer[nearest_idx].fitness(), directions) == Ordering::Greater {
                layer[nearest_idx] = child;
            }
        }
    }
}

/// Pareto replacement (spec §4.10): merges the layer with its offspring,
/// keeps only the non-dominated front(s) up to the layer's original size,
/// breaking ties within the last admitted front by crowding distance.
/// Grounded on `radiate-selectors`' NSGA2 rank/crowding computation, applied
/// to survivor selection instead of parent selection.
#[derive(Debug, Clone, Default)]
pub struct ParetoReplacement;

impl ParetoReplacement {
    pub fn new() -> Self {
        ParetoReplacement
    }
}

impl<I: Individual> Replace<I> for ParetoReplacement {
    fn replace(&self, layer: &mut Vec<I>, offspring: Vec<I>, directions: &[Optimize]) {
        let target_size = layer.len();
        if target_size == 0 {
            return;
        }

        let mut pool: Vec<I> = std::mem::take(layer);
        pool.extend(offspring);

        let fitnesses: Vec<Fitness> = pool.iter().map(Individual::fitness).collect();
        let mut remaining: Vec<usize> = (0..pool.len()).collect();
        let mut survivors: Vec<usize> = Vec::with_capacity(target_size);

        while survivors.len() < target_size && !remaining.is_empty() {
            let front: Vec<usize> = remaining
                .iter()
                .copied()
                .filter(|&i| {
                    !remaining
                        .iter()
                        .any(|&j| j != i && dominates(&fitnesses[j], &fitnesses[i], directions))
                })
                .collect();

            if survivors.len() + front.len() <= target_size {
                survivors.extend(&front);
            } else {
                let front_fitness: Vec<Fitness> = front.iter().map(|&i| fitnesses[i].clone()).collect();
                let distances = crowding_distance(&front_fitness, directions);
                let mut ranked: Vec<(usize, f64)> =
                    front.iter().copied().zip(distances).collect();
                ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));

                let needed = target_size - survivors.len();
                survivors.extend(ranked.into_iter().take(needed).map(|(i, _)| i));
            }

            remaining.retain(|i| !front.contains(i));
        }

        let mut pool: Vec<Option<I>> = pool.into_iter().map(Some).collect();
        for idx in survivors {
            if let Some(ind) = pool[idx].take() {
                layer.push(ind);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::signature::Signature;
    use std::sync::atomic::{AtomicI64, AtomicU32, Ordering as AtomicOrdering};
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
            Signature(self.0.load(AtomicOrdering::Relaxed) as u64, 0)
        }
        fn age(&self) -> u32 {
            self.1.load(AtomicOrdering::Relaxed)
        }
        fn set_age(&self, age: u32) {
            self.1.store(age, AtomicOrdering::Relaxed);
        }
        fn size(&self) -> usize {
            1
        }
        fn fitness(&self) -> Fitness {
            Fitness::scalar(self.0.load(AtomicOrdering::Relaxed) as f64)
        }
        fn set_fitness(&self, f: Fitness) {
            self.0.store(f.get(0) as i64, AtomicOrdering::Relaxed);
        }
        fn mutate(&self, _rate: f32) -> Self {
            self.clone()
        }
        fn crossover(&self, other: &Self, _rate: f32) -> (Self, Self) {
            (self.clone(), other.clone())
        }
    }

    #[test]
    fn tournament_replacement_never_demotes_layer_quality() {
        let mut layer = vec![Scored::new(1), Scored::new(2), Scored::new(3)];
        let replacer = TournamentReplacement::new(3);
        replacer.replace(&mut layer, vec![Scored::new(100)], &[Optimize::Maximize]);
        assert!(layer.iter().any(|s| s.fitness().get(0) == 100.0));
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn alps_replacement_fills_before_competing() {
        let mut layer = vec![Scored::new(1)];
        let replacer = AlpsReplacement::new(3);
        replacer.replace(&mut layer, vec![Scored::new(2), Scored::new(3)], &[Optimize::Maximize]);
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn alps_replacement_rejects_worse_offspring_once_full() {
        let mut layer = vec![Scored::new(10), Scored::new(20), Scored::new(30)];
        let replacer = AlpsReplacement::new(3);
        replacer.replace(&mut layer, vec![Scored::new(1)], &[Optimize::Maximize]);
        assert!(layer.iter().all(|s| s.fitness().get(0) >= 10.0));
    }

    #[test]
    fn pareto_replacement_preserves_layer_size() {
        let mut layer = vec![Scored::new(1), Scored::new(2), Scored::new(3)];
        let replacer = ParetoReplacement::new();
        replacer.replace(&mut layer, vec![Scored::new(4), Scored::new(5)], &[Optimize::Maximize]);
        assert_eq!(layer.len(), 3);
    }
}
