//! Fitness evaluation (spec §4.6): a cached lookup in front of a
//! user-supplied scoring function, plus the derived evaluators spec.md
//! names explicitly -- `sum_of_errors` for regression and `dyn_slot`/
//! `gaussian`/`binary` for classification.
//!
//! Grounded on `morinim/vita`'s `kernel/gp/src/lambda_f.h`: the C++ project
//! separates the *interpreter* (produces a raw discriminant value) from the
//! *lambda* (turns that value into a class label and a persistent,
//! individual-independent classifier object). The split survives here as
//! the `raw` closure a caller supplies -- it is the only place this module
//! depends on how `I` is actually interpreted, so the same
//! `DynSlotEvaluator`/`GaussianEvaluator`/`BinaryEvaluator` work unchanged
//! for MEP, GA or DE individuals, or a `vita_gp::Team` of any of them.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use vita_core::genome::Individual;
use vita_core::objectives::{Fitness, Optimize};
use vita_core::signature::Signature;
use vita_core::stats::Statistic;
use vita_core::value::Value;
use vita_data::{ClassId, Dataframe, Example};

/// `Evaluator(individual) -> fitness` (spec §4.6). Every concrete evaluator
/// in this module also fixes the number and direction of its objectives.
pub trait Evaluator<I: Individual> {
    fn directions(&self) -> &[Optimize];
    fn evaluate(&self, individual: &I) -> Fitness;

    /// Fraction of lookups served from cache, for `Generation::cache_hit_rate`
    /// (spec §4.11). `0.0` for an uncached evaluator; [`CachedEvaluator`]
    /// overrides this with the real figure.
    fn hit_rate(&self) -> f64 {
        0.0
    }
}

/// Wraps any [`Evaluator`] with the fitness cache's fast lookup path (spec
/// §4.5, §4.6): a signature hit returns the cached fitness without calling
/// the inner evaluator at all.
pub struct CachedEvaluator<I, E> {
    inner: E,
    cache: vita_core::cache::FitnessCache<Vec<f64>>,
    _marker: PhantomData<I>,
}

impl<I, E> CachedEvaluator<I, E> {
    pub fn new(inner: E, shards_pow2: u32, slots_per_shard_pow2: u32) -> Self {
        CachedEvaluator { inner, cache: vita_core::cache::FitnessCache::new(shards_pow2, slots_per_shard_pow2), _marker: PhantomData }
    }

    /// Invalidates every cached entry -- called when the symbol set or an
    /// objective direction changes mid-process (spec §4.5).
    pub fn seal(&self) {
        self.cache.seal();
    }

    pub fn hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }
}

impl<I: Individual, E: Evaluator<I>> Evaluator<I> for CachedEvaluator<I, E> {
    fn directions(&self) -> &[Optimize] {
        self.inner.directions()
    }

    fn evaluate(&self, individual: &I) -> Fitness {
        let signature: Signature = individual.signature();
        if let Some(raw) = self.cache.get(&signature) {
            return Fitness::new(raw);
        }
        let fitness = self.inner.evaluate(individual);
        self.cache.insert(signature, fitness.as_slice().to_vec());
        fitness
    }

    fn hit_rate(&self) -> f64 {
        self.cache.hit_rate()
    }
}

/// Regression evaluator (spec §4.6): sums `error` over the active dataset
/// and minimizes it. `error` receives one example's input vector and output
/// value and returns that example's contribution (typically a squared or
/// absolute residual); this is the only place `I`'s representation-specific
/// interpretation happens.
pub struct SumOfErrors<I, F> {
    dataframe: Arc<Dataframe>,
    error: F,
    active: Mutex<Vec<usize>>,
    directions: [Optimize; 1],
    _marker: PhantomData<I>,
}

impl<I, F> SumOfErrors<I, F>
where
    F: Fn(&I, &Example) -> f64,
{
    pub fn new(dataframe: Arc<Dataframe>, error: F) -> Self {
        let active = (0..dataframe.len()).collect();
        SumOfErrors { dataframe, error, active: Mutex::new(active), directions: [Optimize::Minimize], _marker: PhantomData }
    }

    /// Swaps in a new training subset (spec §4.13's DSS periodic rebuild);
    /// subsequent `evaluate` calls sum only over these example indices.
    pub fn set_active_subset(&self, indices: Vec<usize>) {
        *self.active.lock().unwrap() = indices;
    }

    pub fn dataframe(&self) -> &Dataframe {
        &self.dataframe
    }
}

impl<I, F> Evaluator<I> for SumOfErrors<I, F>
where
    F: Fn(&I, &Example) -> f64,
{
    fn directions(&self) -> &[Optimize] {
        &self.directions
    }

    fn evaluate(&self, individual: &I) -> Fitness {
        let active = self.active.lock().unwrap();
        let sum: f64 = active.iter().filter_map(|&i| self.dataframe.examples.get(i)).map(|ex| (self.error)(individual, ex)).sum();
        Fitness::scalar(if sum.is_finite() { sum } else { f64::NEG_INFINITY })
    }
}

/// Squared-error hook for `SumOfErrors`: `(predicted - actual)^2`, with
/// "no value" (`Value::Void`) treated as an infinite penalty rather than a
/// silently dropped example, per spec §7's "no-value propagates" rule.
pub fn squared_error(predicted: &Value, actual: &Value) -> f64 {
    match (predicted.as_double(), actual.as_double()) {
        (Some(p), Some(a)) => (p - a).powi(2),
        _ => f64::INFINITY,
    }
}

/// `S`-shaped map of an unbounded discriminant onto `[0, 1]`, the arctangent
/// form `morinim/vita`'s `utility/discretization.h` uses for continuous
/// value discretization when no natural bound on the raw value is known.
fn sigmoid_01(x: f64) -> f64 {
    0.5 + x.atan() * std::f64::consts::FRAC_1_PI
}

fn discretize(x: f64, num_slots: usize) -> usize {
    let slot = (sigmoid_01(x) * (num_slots.max(1) - 1).max(0) as f64).round();
    (slot as usize).min(num_slots.saturating_sub(1))
}

/// A classifier bound to one already-evaluated individual: the "persistent
/// classifier object" spec §4.6 asks `lambdify` to produce, independent of
/// the evaluator and dataframe that built it.
pub struct Classifier {
    raw: Arc<dyn Fn(&[Value]) -> f64 + Send + Sync>,
    classify_raw: Arc<dyn Fn(f64) -> (ClassId, f64) + Send + Sync>,
}

impl Classifier {
    pub fn classify(&self, inputs: &[Value]) -> (ClassId, f64) {
        (self.classify_raw)((self.raw)(inputs))
    }
}

/// Slotted Dynamic Class Boundary Determination (spec §4.6's `dyn_slot`):
/// the raw discriminant is discretized into `num_slots` bins, each bin is
/// labeled with the majority training class that landed in it, and an
/// example is classified by whichever class owns its bin. Grounded on
/// `morinim/vita`'s `basic_dyn_slot_lambda_f`.
pub struct DynSlotEvaluator<I, F> {
    dataframe: Arc<Dataframe>,
    raw: F,
    num_slots: usize,
    directions: [Optimize; 1],
    _marker: PhantomData<I>,
}

impl<I, F> DynSlotEvaluator<I, F>
where
    F: Fn(&I, &[Value]) -> f64 + Clone + Send + Sync + 'static,
    I: Clone,
{
    pub fn new(dataframe: Arc<Dataframe>, raw: F, num_slots: usize) -> Self {
        DynSlotEvaluator { dataframe, raw, num_slots: num_slots.max(1), directions: [Optimize::Minimize], _marker: PhantomData }
    }

    /// `slot_matrix[slot][class]` training-example counts, and the
    /// majority class per slot, for `individual`.
    fn fill_matrix(&self, individual: &I) -> (Vec<Vec<u64>>, Vec<ClassId>) {
        let classes = self.dataframe.classes().max(1);
        let mut matrix = vec![vec![0u64; classes]; self.num_slots];

        for example in &self.dataframe.examples {
            let Some(label) = example.label() else { continue };
            let slot = discretize((self.raw)(individual, &example.input), self.num_slots);
            if let Some(row) = matrix.get_mut(slot) {
                if let Some(cell) = row.get_mut(label as usize) {
                    *cell += 1;
                }
            }
        }

        let slot_class: Vec<ClassId> = matrix
            .iter()
            .map(|row| row.iter().enumerate().max_by_key(|(_, &count)| count).map(|(class, _)| class).unwrap_or(0))
            .collect();

        (matrix, slot_class)
    }

    /// Builds a standalone [`Classifier`] for `individual` (spec §4.6's
    /// `lambdify`), independent of this evaluator's lifetime.
    pub fn lambdify(&self, individual: &I) -> Classifier {
        let (matrix, slot_class) = self.fill_matrix(individual);
        let num_slots = self.num_slots;
        let ind = individual.clone();
        let raw_fn = self.raw.clone();
        let raw: Arc<dyn Fn(&[Value]) -> f64 + Send + Sync> = Arc::new(move |inputs| raw_fn(&ind, inputs));

        let classify_raw: Arc<dyn Fn(f64) -> (ClassId, f64) + Send + Sync> = Arc::new(move |value| {
            let slot = discretize(value, num_slots);
            let class = slot_class.get(slot).copied().unwrap_or(0);
            let row = &matrix[slot.min(matrix.len().saturating_sub(1))];
            let total: u64 = row.iter().sum();
            let confidence = if total == 0 { 0.0 } else { row[class] as f64 / total as f64 };
            (class, confidence)
        });

        Classifier { raw, classify_raw }
    }
}

impl<I, F> Evaluator<I> for DynSlotEvaluator<I, F>
where
    F: Fn(&I, &[Value]) -> f64 + Clone + Send + Sync + 'static,
    I: Clone,
{
    fn directions(&self) -> &[Optimize] {
        &self.directions
    }

    fn evaluate(&self, individual: &I) -> Fitness {
        let (_matrix, slot_class) = self.fill_matrix(individual);
        let mut correct = 0u64;
        let mut total = 0u64;
        for example in &self.dataframe.examples {
            let Some(label) = example.label() else { continue };
            total += 1;
            let slot = discretize((self.raw)(individual, &example.input), self.num_slots);
            if slot_class.get(slot).copied() == Some(label as usize) {
                correct += 1;
            }
        }
        let error = if total == 0 { 1.0 } else { 1.0 - (correct as f64 / total as f64) };
        Fitness::scalar(error)
    }
}

/// Per-class distribution of the raw discriminant observed on the training
/// set, fit separately for every class (spec §4.6's `gaussian`). Grounded
/// on `morinim/vita`'s `basic_gaussian_lambda_f`, which fits one
/// `distribution<number>` per class and classifies by picking the class
/// whose distribution assigns the example's raw value the highest density.
pub struct GaussianEvaluator<I, F> {
    dataframe: Arc<Dataframe>,
    raw: F,
    directions: [Optimize; 1],
    _marker: PhantomData<I>,
}

fn gaussian_density(mean: f64, std_dev: f64, x: f64) -> f64 {
    if std_dev <= 0.0 {
        return if (x - mean).abs() < 1e-9 { f64::INFINITY } else { 0.0 };
    }
    let z = (x - mean) / std_dev;
    (-0.5 * z * z).exp() / (std_dev * (2.0 * std::f64::consts::PI).sqrt())
}

impl<I, F> GaussianEvaluator<I, F>
where
    F: Fn(&I, &[Value]) -> f64 + Clone + Send + Sync + 'static,
    I: Clone,
{
    pub fn new(dataframe: Arc<Dataframe>, raw: F) -> Self {
        GaussianEvaluator { dataframe, raw, directions: [Optimize::Minimize], _marker: PhantomData }
    }

    fn fit(&self, individual: &I) -> Vec<Statistic> {
        let classes = self.dataframe.classes().max(1);
        let mut stats = vec![Statistic::new(); classes];
        for example in &self.dataframe.examples {
            let Some(label) = example.label() else { continue };
            if let Some(stat) = stats.get_mut(label as usize) {
                stat.add((self.raw)(individual, &example.input));
            }
        }
        stats
    }

    pub fn lambdify(&self, individual: &I) -> Classifier {
        let stats = self.fit(individual);
        let ind = individual.clone();
        let raw_fn = self.raw.clone();
        let raw: Arc<dyn Fn(&[Value]) -> f64 + Send + Sync> = Arc::new(move |inputs| raw_fn(&ind, inputs));

        let classify_raw: Arc<dyn Fn(f64) -> (ClassId, f64) + Send + Sync> = Arc::new(move |value| {
            let densities: Vec<f64> = stats.iter().map(|s| gaussian_density(s.mean(), s.std_dev(), value)).collect();
            let total: f64 = densities.iter().sum();
            let (class, &density) = densities.iter().enumerate().max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal)).unwrap_or((0, &0.0));
            let confidence = if total > 0.0 { density / total } else { 0.0 };
            (class, confidence)
        });

        Classifier { raw, classify_raw }
    }
}

impl<I, F> Evaluator<I> for GaussianEvaluator<I, F>
where
    F: Fn(&I, &[Value]) -> f64 + Clone + Send + Sync + 'static,
    I: Clone,
{
    fn directions(&self) -> &[Optimize] {
        &self.directions
    }

    fn evaluate(&self, individual: &I) -> Fitness {
        let stats = self.fit(individual);
        let mut correct = 0u64;
        let mut total = 0u64;
        for example in &self.dataframe.examples {
            let Some(label) = example.label() else { continue };
            total += 1;
            let raw = (self.raw)(individual, &example.input);
            let predicted = stats
                .iter()
                .enumerate()
                .max_by(|a, b| {
                    gaussian_density(a.1.mean(), a.1.std_dev(), raw).partial_cmp(&gaussian_density(b.1.mean(), b.1.std_dev(), raw)).unwrap_or(std::cmp::Ordering::Equal)
                })
                .map(|(class, _)| class)
                .unwrap_or(0);
            if predicted == label as usize {
                correct += 1;
            }
        }
        let error = if total == 0 { 1.0 } else { 1.0 - (correct as f64 / total as f64) };
        Fitness::scalar(error)
    }
}

/// Single-class classification (spec §4.6's `binary`): the raw discriminant
/// is thresholded at zero, positive meaning "is a member of class 1".
/// Grounded on `morinim/vita`'s `basic_binary_lambda_f`.
pub struct BinaryEvaluator<I, F> {
    dataframe: Arc<Dataframe>,
    raw: F,
    directions: [Optimize; 1],
    _marker: PhantomData<I>,
}

impl<I, F> BinaryEvaluator<I, F>
where
    F: Fn(&I, &[Value]) -> f64 + Clone + Send + Sync + 'static,
    I: Clone,
{
    pub fn new(dataframe: Arc<Dataframe>, raw: F) -> Self {
        BinaryEvaluator { dataframe, raw, directions: [Optimize::Minimize], _marker: PhantomData }
    }

    pub fn lambdify(&self, individual: &I) -> Classifier {
        let ind = individual.clone();
        let raw_fn = self.raw.clone();
        let raw: Arc<dyn Fn(&[Value]) -> f64 + Send + Sync> = Arc::new(move |inputs| raw_fn(&ind, inputs));
        let classify_raw: Arc<dyn Fn(f64) -> (ClassId, f64) + Send + Sync> =
            Arc::new(|value| if value > 0.0 { (1, sigmoid_01(value)) } else { (0, sigmoid_01(-value)) });
        Classifier { raw, classify_raw }
    }
}

impl<I, F> Evaluator<I> for BinaryEvaluator<I, F>
where
    F: Fn(&I, &[Value]) -> f64 + Clone + Send + Sync + 'static,
    I: Clone,
{
    fn directions(&self) -> &[Optimize] {
        &self.directions
    }

    fn evaluate(&self, individual: &I) -> Fitness {
        let mut correct = 0u64;
        let mut total = 0u64;
        for example in &self.dataframe.examples {
            let Some(label) = example.label() else { continue };
            total += 1;
            let raw = (self.raw)(individual, &example.input);
            let predicted = if raw > 0.0 { 1 } else { 0 };
            if predicted == label as i64 {
                correct += 1;
            }
        }
        let error = if total == 0 { 1.0 } else { 1.0 - (correct as f64 / total as f64) };
        Fitness::scalar(error)
    }
}
