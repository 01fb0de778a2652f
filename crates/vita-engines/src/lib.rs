//! The evaluator, evolution driver and multi-run search orchestration for
//! the Vita evolutionary search engine (spec §4.6, §4.11, §4.12).
//!
//! This crate sits above `vita-selectors`/`vita-alters`/`vita-gp`/
//! `vita-data`: it is where selection, recombination, replacement and a
//! concrete `Individual` representation are finally wired into a runnable
//! generational loop, and where that loop is run `N` times in parallel and
//! reduced to a single answer.

pub mod environment;
pub mod evaluator;
pub mod evolution;
pub mod logging;
pub mod problem;
pub mod search;

pub use environment::{Elitism, Environment, WeightRange};
pub use evaluator::{
    BinaryEvaluator, CachedEvaluator, Classifier, DynSlotEvaluator, Evaluator, GaussianEvaluator,
    SumOfErrors, squared_error,
};
pub use evolution::{DifferentialEvolution, Driver, Evolution, Outcome, StopReason, Variation};
pub use logging::{LogLevel, init_logging};
pub use problem::Problem;
pub use search::{RunReport, Search, SearchResult};
