use super::individual::Individual;

/// One age layer of an ALPS population. Layer 0 holds the youngest
/// individuals; higher layers accept progressively older ones. `age_cap`
/// follows the polynomial schedule from spec §4.3:
/// `cap(0) = age_gap`, `cap(1) = 2 * age_gap`, `cap(l) = l^2 * age_gap` for
/// `l >= 2`. `usize::MAX` on the last layer means "no cap" -- every
/// individual is eligible regardless of age, so the population always has
/// somewhere to put its oldest, fittest individuals.
#[derive(Clone)]
pub struct Layer<I: Individual> {
    pub index: usize,
    pub age_cap: u32,
    pub target_size: usize,
    individuals: Vec<I>,
}

impl<I: Individual> Layer<I> {
    pub fn new(index: usize, age_cap: u32, target_size: usize) -> Self {
        Layer { index, age_cap, target_size, individuals: Vec::with_capacity(target_size) }
    }

    pub fn age_cap_for(index: usize, age_gap: u32, is_last: bool) -> u32 {
        if is_last {
            return u32::MAX;
        }
        match index {
            0 => age_gap,
            1 => 2 * age_gap,
            l => (l as u32).pow(2) * age_gap,
        }
    }

    pub fn individuals(&self) -> &[I] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut Vec<I> {
        &mut self.individuals
    }

    pub fn len(&self) -> usize {
        self.individuals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.individuals.is_empty()
    }

    pub fn push(&mut self, individual: I) {
        self.individuals.push(individual);
    }

    /// `true` if `individual` is young enough to live in this layer.
    pub fn accepts(&self, individual: &I) -> bool {
        individual.age() <= self.age_cap
    }

    /// Members older than this layer's cap, ready to be promoted upward.
    pub fn overage(&self) -> Vec<usize> {
        self.individuals
            .iter()
            .enumerate()
            .filter(|(_, ind)| ind.age() > self.age_cap)
            .map(|(i, _)| i)
            .collect()
    }
}
