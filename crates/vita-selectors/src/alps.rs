use crate::Selector;
use vita_core::genome::{Individual, Population};
use vita_core::objectives::Optimize;
use vita_core::random;

/// Layered tournament selection (spec §4.9): parents are normally drawn from
/// within one age layer, but with probability `alpha` a parent is instead
/// drawn from any younger layer, so genetic material can migrate upward
/// through the age structure. Falls back to plain tournament selection
/// within the whole population when ALPS is disabled (a single-layer
/// population), matching `Population::alps_enabled`.
#[derive(Debug, Clone)]
pub struct AlpsSelector {
    tournament_size: usize,
    alpha: f64,
}

impl AlpsSelector {
    pub fn new(tournament_size: usize, alpha: f64) -> Self {
        AlpsSelector { tournament_size: tournament_size.max(1), alpha: alpha.clamp(0.0, 1.0) }
    }

    /// Selects `count` parents intended to breed within `layer_index`.
    pub fn select_for_layer<I: Individual>(
        &self,
        population: &Population<I>,
        layer_index: usize,
        directions: &[Optimize],
        count: usize,
    ) -> Vec<I> {
        if !population.alps_enabled() {
            return self.tournament_within(&population.iter().collect::<Vec<_>>(), directions, count);
        }

        let own_layer: Vec<&I> = population.layers()[layer_index].individuals().iter().collect();
        let younger_pool: Vec<&I> = population.layers()[..=layer_index]
            .iter()
            .flat_map(|l| l.individuals())
            .collect();

        (0..count)
            .map(|_| {
                let draw_cross_layer = layer_index > 0 && random::bool(self.alpha as f32);
                let pool = if draw_cross_layer || own_layer.is_empty() { &younger_pool } else { &own_layer };
                self.tournament_within(pool, directions, 1).remove(0)
            })
            .collect()
    }

    fn tournament_within<I: Individual>(
        &self,
        pool: &[&I],
        directions: &[Optimize],
        count: usize,
    ) -> Vec<I> {
        if pool.is_empty() {
            return Vec::new();
        }
        (0..count)
            .map(|_| {
                let mut best = *random::choose(pool);
                for _ in 1..self.tournament_size {
                    let challenger = *random::choose(pool);
                    if challenger.fitness().compare(&best.fitness(), directions) == std::cmp::Ordering::Greater {
                        best = challenger;
                    }
                }
                best.clone()
            })
            .collect()
    }
}

impl<I: Individual> Selector<I> for AlpsSelector {
    /// Whole-population entry point required by [`Selector`]; treats the
    /// population as flat. `Evolution` calls [`Self::select_for_layer`]
    /// directly for real ALPS breeding, per layer.
    fn select(&self, population: &Population<I>, directions: &[Optimize], count: usize) -> Vec<I> {
        let pool: Vec<&I> = population.iter().collect();
        self.tournament_within(&pool, directions, count)
    }
}
