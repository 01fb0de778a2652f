//! Multi-run orchestration (spec §4.12): drive `N` independent [`Evolution`]/
//! [`DifferentialEvolution`] runs to completion in parallel, each seeded
//! deterministically, and reduce them to one answer.
//!
//! Grounded on `radiate-engines`' `EngineIterator`/`GeneticEngine::run`
//! pairing -- the engine itself only knows how to take one more step; a
//! thin outer driver decides when to stop and what to report -- generalized
//! from "one engine, one stopping predicate" to "many independent engines,
//! reduced by validation score". Parallelism is `rayon`, per spec §5's
//! "independent `Evolution` runs may run on a thread pool"; determinism
//! despite that parallelism comes from `vita_core::random::scoped_seed`
//! giving each run its own reseeded thread-local stream.

use std::marker::PhantomData;

use rayon::prelude::*;

use vita_core::genome::Individual;
use vita_core::objectives::{Fitness, Optimize, pareto_front};
use vita_core::random;
use vita_error::VitaResult;

use crate::evolution::{Driver, Outcome};

/// One run's full record: which seed it used, how it ended, and (if the
/// [`Search`] was built with a validation set) its re-evaluated score there
/// instead of its training score (spec §4.12's "report the validation
/// score when one exists").
pub struct RunReport<I: Individual> {
    pub seed: u64,
    pub outcome: Outcome<I>,
    pub validation_fitness: Option<Fitness>,
}

impl<I: Individual> RunReport<I> {
    /// The fitness this run is ranked by: validation score when present,
    /// otherwise the training score the driver already converged on.
    pub fn ranking_fitness(&self) -> &Fitness {
        self.validation_fitness.as_ref().unwrap_or(&self.outcome.fitness)
    }
}

/// The reduction of every run in a [`Search`]: the single best individual
/// (by validation score if one was computed, else training score), every
/// run's own report, and -- for multi-objective problems -- the indices
/// into `runs` that form the Pareto front across runs' best individuals
/// (spec §4.12's "optionally return the non-dominated set across runs").
pub struct SearchResult<I: Individual> {
    pub best: I,
    pub fitness: Fitness,
    pub runs: Vec<RunReport<I>>,
    pub pareto_front: Option<Vec<usize>>,
}

/// Runs `runs` independent, identically-configured evolutionary searches
/// and reduces them to one [`SearchResult`]. `factory` builds one fresh
/// [`Driver`] (an [`crate::evolution::Evolution`] or
/// [`DifferentialEvolution`]) from a run index -- freshly encoding its own
/// population -- and is called once per run inside that run's
/// [`random::scoped_seed`] scope, so every run's random draws are
/// reproducible independent of how many other runs share the thread pool.
pub struct Search<I, D, F>
where
    I: Individual,
    D: Driver<I>,
    F: Fn(u64) -> VitaResult<D> + Send + Sync,
{
    runs: usize,
    base_seed: u64,
    directions: Vec<Optimize>,
    factory: F,
    validate: Option<Box<dyn Fn(&I) -> Fitness + Send + Sync>>,
    _marker: PhantomData<fn() -> (I, D)>,
}

impl<I, D, F> Search<I, D, F>
where
    I: Individual,
    D: Driver<I>,
    F: Fn(u64) -> VitaResult<D> + Send + Sync,
{
    pub fn new(runs: usize, base_seed: u64, directions: Vec<Optimize>, factory: F) -> Self {
        Search { runs: runs.max(1), base_seed, directions, factory, validate: None, _marker: PhantomData }
    }

    /// Registers a held-out scorer (typically `Dataframe::split`'s second
    /// half, wrapped in the same evaluator family used for training) that
    /// every run's best individual is re-evaluated against before ranking
    /// (spec §6's `validation_percentage`).
    pub fn with_validation<V>(mut self, validate: V) -> Self
    where
        V: Fn(&I) -> Fitness + Send + Sync + 'static,
    {
        self.validate = Some(Box::new(validate));
        self
    }

    /// Runs every configured run to completion -- in parallel, one rayon
    /// task per run -- and reduces the results (spec §4.12).
    pub fn run(&self) -> VitaResult<SearchResult<I>> {
        let directions = &self.directions;

        let runs: Vec<RunReport<I>> = (0..self.runs)
            .into_par_iter()
            .map(|run_index| -> VitaResult<RunReport<I>> {
                let seed = self.base_seed.wrapping_add(run_index as u64);
                random::scoped_seed(seed, || {
                    let mut driver = (self.factory)(seed)?;
                    let outcome = driver.run();
                    let validation_fitness = self.validate.as_ref().map(|validate| validate(&outcome.best));
                    tracing::info!(
                        run = run_index,
                        seed,
                        generations = outcome.generations,
                        stop_reason = ?outcome.stop_reason,
                        "run finished"
                    );
                    Ok(RunReport { seed, outcome, validation_fitness })
                })
            })
            .collect::<VitaResult<Vec<_>>>()?;

        let best_index = (0..runs.len())
            .max_by(|&a, &b| runs[a].ranking_fitness().compare(runs[b].ranking_fitness(), directions))
            .expect("Search::new clamps runs to at least 1");

        let pareto_indices = if directions.len() > 1 {
            let fitnesses: Vec<Fitness> = runs.iter().map(|report| report.ranking_fitness().clone()).collect();
            Some(pareto_front(&fitnesses, directions))
        } else {
            None
        };

        let best = runs[best_index].outcome.best.clone();
        let fitness = runs[best_index].ranking_fitness().clone();

        Ok(SearchResult { best, fitness, runs, pareto_front: pareto_indices })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::evaluator::Evaluator;
    use crate::evolution::{Evolution, StopReason};
    use crate::problem::Problem;
    use vita_alters::TournamentReplacement;
    use vita_core::signature::Signature;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Scalar(Arc<AtomicU32>, Arc<Mutex<Fitness>>, f64);

    impl Individual for Scalar {
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
            self.1.lock().unwrap().clone()
        }
        fn set_fitness(&self, fitness: Fitness) {
            *self.1.lock().unwrap() = fitness;
        }
        fn mutate(&self, _rate: f32) -> Self {
            self.clone()
        }
        fn crossover(&self, other: &Self, _rate: f32) -> (Self, Self) {
            (self.clone(), other.clone())
        }
    }

    struct FixedEvaluator(Vec<Optimize>);

    impl Evaluator<Scalar> for FixedEvaluator {
        fn directions(&self) -> &[Optimize] {
            &self.0
        }
        fn evaluate(&self, individual: &Scalar) -> Fitness {
            Fitness::scalar(individual.2)
        }
    }

    fn make_problem(value: f64) -> Problem<Scalar, FixedEvaluator> {
        let mut environment = Environment::default();
        environment.individuals = 4;
        environment.generations = 2;
        environment.max_stuck_time = 100;
        Problem::new(
            environment,
            move || Ok(Scalar(Arc::new(AtomicU32::new(0)), Arc::new(Mutex::new(Fitness::unset(1))), value)),
            FixedEvaluator(vec![Optimize::Maximize]),
        )
    }

    #[test]
    fn search_picks_the_best_run_by_training_fitness() {
        let search = Search::new(3, 7, vec![Optimize::Maximize], |seed| {
            let value = 1.0 + seed as f64;
            Evolution::new(make_problem(value), Box::new(TournamentReplacement::new(2)))
        });

        let result = search.run().unwrap();
        assert_eq!(result.runs.len(), 3);
        assert!(result.runs.iter().all(|r| r.outcome.stop_reason == StopReason::GenerationLimit));
        let max_value = result.runs.iter().map(|r| r.outcome.fitness.get(0)).fold(f64::MIN, f64::max);
        assert_eq!(result.fitness.get(0), max_value);
    }

    #[test]
    fn search_prefers_validation_score_when_present() {
        let search = Search::new(2, 1, vec![Optimize::Maximize], |seed| {
            Evolution::new(make_problem(seed as f64), Box::new(TournamentReplacement::new(2)))
        })
        .with_validation(|_individual: &Scalar| Fitness::scalar(42.0));

        let result = search.run().unwrap();
        assert_eq!(result.fitness.get(0), 42.0);
    }
}
