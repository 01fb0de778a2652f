//! Selection strategies (spec §4.9): the mechanism an [`Evolution`] loop
//! uses to pick which individuals get to breed.
//!
//! Grounded on `radiate-selectors`' per-strategy module layout (one file per
//! strategy, a thin shared `Select` trait) and its `ProbabilityWheelIterator`
//! helper, generalized from radiate's `Chromosome`-bound `Population<C>` to
//! Vita's [`vita_core::genome::Individual`]-bound, age-layered
//! [`vita_core::genome::Population`]. `[Evolution]` referenced in docs below
//! lives in `vita-engines`; this crate has no dependency on it.

mod alps;
mod pareto;
mod random_selector;
mod tournament;

pub use alps::AlpsSelector;
pub use pareto::ParetoSelector;
pub use random_selector::RandomSelector;
pub use tournament::TournamentSelector;

use vita_core::genome::{Individual, Population};
use vita_core::objectives::Optimize;

/// Picks `count` individuals (with replacement) from `population` to serve
/// as parents for the next generation's offspring.
pub trait Selector<I: Individual> {
    fn select(&self, population: &Population<I>, directions: &[Optimize], count: usize) -> Vec<I>;
}

/// Flattens a layered population into one slice, used by strategies that
/// are agnostic to ALPS layering (Tournament, Pareto, Random).
pub(crate) fn flatten<I: Individual>(population: &Population<I>) -> Vec<&I> {
    population.iter().collect()
}
