//! Dynamic Subset Selection (spec §4.13; `morinim/vita`'s
//! `kernel/distribution.h` difficulty/age bookkeeping, applied to
//! dataframe rows): periodically rebuild a training subset weighted toward
//! examples the population currently finds hard (`difficulty`) or that
//! have gone a long time unused (`age`), rather than training on the whole
//! dataframe every generation.

use crate::dataframe::Dataframe;
use vita_core::random;

/// Dynamic Subset Selection driver. `period` is the generation interval
/// between resamples (`0` disables DSS entirely, spec §6's `dss` option).
#[derive(Debug, Clone)]
pub struct Dss {
    period: u32,
    subset_size: usize,
}

impl Dss {
    pub fn new(period: u32, subset_size: usize) -> Self {
        Dss { period, subset_size }
    }

    pub fn is_enabled(&self) -> bool {
        self.period > 0
    }

    /// Whether a fresh subset should be drawn at generation `gen` (spec
    /// §4.13's periodic rebuild).
    pub fn should_resample(&self, gen: u32) -> bool {
        self.is_enabled() && gen % self.period == 0
    }

    /// Bumps `difficulty` for every example the current best individual's
    /// evaluator marked as hard via `is_hard`, and `age` for every example
    /// *not* selected this round -- examples that keep getting skipped
    /// become increasingly likely to be picked next time.
    pub fn update(&self, dataframe: &mut Dataframe, selected: &[usize], hard: &[usize]) {
        for &i in hard {
            if let Some(example) = dataframe.examples.get_mut(i) {
                example.difficulty = example.difficulty.saturating_add(1);
            }
        }
        for (i, example) in dataframe.examples.iter_mut().enumerate() {
            if !selected.contains(&i) {
                example.age = example.age.saturating_add(1);
            } else {
                example.age = 0;
            }
        }
    }

    /// Draws `subset_size` example indices, weighted by `difficulty + age`
    /// so harder and older-untrained-on examples are favored (spec
    /// §4.13's "harder/older examples preferred").
    pub fn sample(&self, dataframe: &Dataframe) -> Vec<usize> {
        let n = dataframe.len();
        if n == 0 {
            return Vec::new();
        }
        let take = self.subset_size.min(n);
        let weights: Vec<f32> = dataframe.examples.iter().map(|e| 1.0 + e.difficulty as f32 + e.age as f32).collect();

        let mut remaining: Vec<usize> = (0..n).collect();
        let mut chosen = Vec::with_capacity(take);
        let mut pool_weights = weights;

        for _ in 0..take {
            if remaining.is_empty() {
                break;
            }
            let idx_in_remaining = random::weighted_index(&pool_weights);
            chosen.push(remaining.swap_remove(idx_in_remaining));
            pool_weights.swap_remove(idx_in_remaining);
        }

        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::column::Column;
    use crate::dataframe::Problem;
    use crate::example::Example;
    use vita_core::value::{Value, ValueKind};

    fn df(n: usize) -> Dataframe {
        let mut df = Dataframe::new(vec![Column::new("x", ValueKind::Double)], Problem::Regression);
        for i in 0..n {
            df.push(Example::new(vec![Value::Double(i as f64)], Value::Double(0.0)));
        }
        df
    }

    #[test]
    fn zero_period_disables_dss() {
        let dss = Dss::new(0, 10);
        assert!(!dss.is_enabled());
        assert!(!dss.should_resample(0));
    }

    #[test]
    fn resamples_only_on_period_boundary() {
        let dss = Dss::new(5, 10);
        assert!(dss.should_resample(0));
        assert!(dss.should_resample(5));
        assert!(!dss.should_resample(3));
    }

    #[test]
    fn sample_never_exceeds_subset_size_or_row_count() {
        let dataframe = df(20);
        let dss = Dss::new(1, 8);
        let subset = dss.sample(&dataframe);
        assert_eq!(subset.len(), 8);
        assert!(subset.iter().all(|&i| i < 20));
    }

    #[test]
    fn update_ages_unselected_rows() {
        let mut dataframe = df(3);
        let dss = Dss::new(1, 2);
        dss.update(&mut dataframe, &[0], &[]);
        assert_eq!(dataframe.examples[0].age, 0);
        assert_eq!(dataframe.examples[1].age, 1);
    }
}
