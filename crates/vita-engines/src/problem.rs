//! A runnable unit of work: an [`Environment`], a way to generate fresh
//! individuals, and an [`Evaluator`] to score them (spec §2's "`Search` owns
//! `Problem` (environment + symbol set + optional data) and a user-provided
//! fitness function").
//!
//! Grounded on `radiate/src/problem.rs`'s `Problem<C, T>` trait
//! (`encode`/`decode`/`eval`), collapsed to two steps instead of three:
//! Vita's evaluators operate directly on an `Individual` rather than on a
//! decoded phenotype, so there is no separate `decode` stage. `encode` plays
//! the same role as radiate's `Codex::encode` -- producing one fresh,
//! random genome -- and `evaluate` plays the role of `eval`.

use std::sync::Arc;
use vita_core::genome::Individual;
use vita_core::objectives::{Fitness, Optimize};
use vita_error::VitaResult;

use crate::environment::Environment;
use crate::evaluator::Evaluator;

/// Everything an [`crate::evolution::Evolution`] run needs to start:
/// the knobs (`environment`), a factory for a fresh random individual
/// (`encode`), and a scorer (`evaluator`). Cheaply cloned -- `Arc` all the
/// way down -- so a single `Problem` can seed many independent `Evolution`
/// runs inside a `Search` fan-out.
pub struct Problem<I: Individual, E: Evaluator<I>> {
    environment: Environment,
    encode: Arc<dyn Fn() -> VitaResult<I> + Send + Sync>,
    evaluator: Arc<E>,
}

impl<I: Individual, E: Evaluator<I>> Clone for Problem<I, E> {
    fn clone(&self) -> Self {
        Problem {
            environment: self.environment.clone(),
            encode: self.encode.clone(),
            evaluator: self.evaluator.clone(),
        }
    }
}

impl<I: Individual, E: Evaluator<I>> Problem<I, E> {
    pub fn new(
        environment: Environment,
        encode: impl Fn() -> VitaResult<I> + Send + Sync + 'static,
        evaluator: E,
    ) -> Self {
        Problem { environment, encode: Arc::new(encode), evaluator: Arc::new(evaluator) }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    pub fn evaluator_arc(&self) -> Arc<E> {
        self.evaluator.clone()
    }

    pub fn directions(&self) -> &[Optimize] {
        self.evaluator.directions()
    }

    /// Produces one fresh, randomly constructed individual (spec §4.2-§4.4's
    /// `random` constructors, wrapped behind a representation-agnostic
    /// closure so `Evolution`/`Search` never need to know which of MEP, GA,
    /// DE or `Team` they are driving).
    pub fn encode(&self) -> VitaResult<I> {
        (self.encode)()
    }

    pub fn evaluate(&self, individual: &I) -> Fitness {
        self.evaluator.evaluate(individual)
    }
}
