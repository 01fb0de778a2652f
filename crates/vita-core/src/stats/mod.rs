//! Per-generation statistics.
//!
//! Grounded on `radiate-core`'s `stats/metric.rs`, stripped of its `Tag`/
//! interning machinery -- a single evolution run doesn't need to intern
//! metric names across thousands of generations the way `radiate-core`'s
//! multi-engine dashboard does. [`Statistic`] is the Welford incremental
//! accumulator from `morinim/vita`'s `distribution.h`; [`Generation`] bundles
//! one per tracked quantity (fitness, age, effective size) the way spec
//! §4.11 asks for.

mod statistic;

pub use statistic::Statistic;

use std::collections::HashMap;

/// Snapshot of a population's state for one generation, handed to the
/// `after_generation` hook (spec §4.11).
#[derive(Debug, Clone)]
pub struct Generation {
    pub index: u64,
    pub fitness: Statistic,
    pub age: Statistic,
    pub effective_size: Statistic,
    pub unique_signatures: usize,
    /// How often each symbol (by name) was used across the population's
    /// individuals this generation -- spec §4.11's symbol usage histogram.
    pub symbol_usage: HashMap<String, u64>,
    pub cache_hit_rate: f64,
}

impl Generation {
    pub fn new(index: u64) -> Self {
        Generation {
            index,
            fitness: Statistic::new(),
            age: Statistic::new(),
            effective_size: Statistic::new(),
            unique_signatures: 0,
            symbol_usage: HashMap::new(),
            cache_hit_rate: 0.0,
        }
    }

    pub fn record_symbol_use(&mut self, name: &str) {
        *self.symbol_usage.entry(name.to_string()).or_insert(0) += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_symbol_use_tallies_by_name() {
        let mut gen = Generation::new(0);
        gen.record_symbol_use("add");
        gen.record_symbol_use("add");
        gen.record_symbol_use("sub");
        assert_eq!(gen.symbol_usage.get("add"), Some(&2));
        assert_eq!(gen.symbol_usage.get("sub"), Some(&1));
    }
}
