use super::individual::Individual;
use super::layer::Layer;

/// An age-layered population (spec §4.3, §4.9): an array of [`Layer`]s,
/// layer 0 holding the youngest individuals. Generalizes `radiate-core`'s flat
/// `population.rs` vector-of-individuals by adding the ALPS layer dimension;
/// callers that don't need ALPS simply configure a single layer with an
/// unbounded age cap, which degenerates to `radiate-core`'s original shape.
pub struct Population<I: Individual> {
    layers: Vec<Layer<I>>,
    age_gap: u32,
}

impl<I: Individual> Population<I> {
    /// Builds `layer_count` layers, each sized `layer_target_size`, with age
    /// caps following the polynomial schedule seeded by `age_gap`. The last
    /// layer has no cap.
    pub fn new(layer_count: usize, layer_target_size: usize, age_gap: u32) -> Self {
        let layer_count = layer_count.max(1);
        let layers = (0..layer_count)
            .map(|i| {
                let cap = Layer::<I>::age_cap_for(i, age_gap, i == layer_count - 1);
                Layer::new(i, cap, layer_target_size)
            })
            .collect();
        Population { layers, age_gap }
    }

    pub fn layers(&self) -> &[Layer<I>] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer<I>] {
        &mut self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// ALPS is disabled with a single layer (spec §4.9 boundary condition).
    pub fn alps_enabled(&self) -> bool {
        self.layers.len() > 1
    }

    pub fn age_gap(&self) -> u32 {
        self.age_gap
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Layer::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &I> {
        self.layers.iter().flat_map(Layer::individuals)
    }

    /// Ages every individual in the population by one generation (spec
    /// §4.11 step 5).
    pub fn age_all(&self) {
        for layer in &self.layers {
            for ind in layer.individuals() {
                ind.inc_age();
            }
        }
    }

    /// Moves individuals that have outgrown their layer's age cap up into
    /// the next layer, inserting them at the back; the next layer's own
    /// replacement pass (spec §4.10 ALPS replacement) decides whether they
    /// survive there. Individuals already in the last layer never move.
    pub fn promote_overage(&mut self) {
        for i in 0..self.layers.len().saturating_sub(1) {
            let overage_indices = self.layers[i].overage();
            if overage_indices.is_empty() {
                continue;
            }
            let mut promoted = Vec::with_capacity(overage_indices.len());
            for &idx in overage_indices.iter().rev() {
                promoted.push(self.layers[i].individuals_mut().remove(idx));
            }
            self.layers[i + 1].individuals_mut().extend(promoted);
        }
    }

    pub fn best_by<'a, F>(&'a self, mut is_better: F) -> Option<&'a I>
    where
        F: FnMut(&I, &I) -> bool,
    {
        self.iter().fold(None, |acc, ind| match acc {
            None => Some(ind),
            Some(best) => {
                if is_better(ind, best) {
                    Some(ind)
                } else {
                    Some(best)
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objectives::Fitness;
    use crate::signature::Signature;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[derive(Clone)]
    struct Dummy(Arc<AtomicU32>);

    impl Dummy {
        fn new(age: u32) -> Self {
            Dummy(Arc::new(AtomicU32::new(age)))
        }
    }

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
        fn set_fitness(&self, _fitness: Fitness) {}
        fn mutate(&self, _rate: f32) -> Self {
            self.clone()
        }
        fn crossover(&self, other: &Self, _rate: f32) -> (Self, Self) {
            (self.clone(), other.clone())
        }
    }

    #[test]
    fn single_layer_disables_alps() {
        let pop: Population<Dummy> = Population::new(1, 10, 20);
        assert!(!pop.alps_enabled());
    }

    #[test]
    fn multi_layer_enables_alps() {
        let pop: Population<Dummy> = Population::new(3, 10, 20);
        assert!(pop.alps_enabled());
    }

    #[test]
    fn age_all_increments_every_individual() {
        let mut pop: Population<Dummy> = Population::new(1, 10, 20);
        pop.layers_mut()[0].push(Dummy::new(0));
        pop.layers_mut()[0].push(Dummy::new(5));
        pop.age_all();
        let ages: Vec<u32> = pop.iter().map(Individual::age).collect();
        assert_eq!(ages, vec![1, 6]);
    }

    #[test]
    fn promote_overage_moves_individuals_up_a_layer() {
        let mut pop: Population<Dummy> = Population::new(2, 10, 5);
        pop.layers_mut()[0].push(Dummy::new(2));
        pop.layers_mut()[0].push(Dummy::new(10));
        pop.promote_overage();
        assert_eq!(pop.layers()[0].len(), 1);
        assert_eq!(pop.layers()[1].len(), 1);
        assert_eq!(pop.layers()[1].individuals()[0].age(), 10);
    }
}
