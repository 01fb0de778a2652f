//! Symbolic-regression and classification wiring (spec §4.13, §4.6): the
//! one piece of glue none of the component crates own on their own --
//! turning a [`Dataframe`] and a [`SymbolSet`] into a runnable
//! [`Problem`](vita_engines::Problem) over [`MepIndividual`] -- plus Dynamic
//! Subset Selection wired in as an [`Evolution::with_after_generation`]
//! hook, since DSS needs to reach into the evaluator's active subset
//! between generations and neither `Evolution` nor `SumOfErrors` otherwise
//! know about each other.
//!
//! Grounded on `radiate/src/problem.rs`'s facade-level `Problem` plumbing,
//! generalized from radiate's `Codex`/`Chromosome` pair to a raw MEP
//! `Interpreter` evaluation closure, and on `morinim/vita`'s
//! `kernel/distribution.h` subset-resampling loop for the DSS hook.

use std::sync::Arc;

use vita_core::symbol::{Category, SymbolSet};
use vita_core::value::Value;
use vita_data::{Dataframe, Dss, Example};
use vita_error::VitaResult;
use vita_gp::mep::{Interpreter, MepIndividual};

use vita_engines::{Environment, Problem, SumOfErrors, squared_error};

/// Runs `individual`'s program over one example's inputs and returns the
/// raw output value (spec §4.14); shared by every symbolic-regression and
/// classification evaluator below so they evaluate identically.
pub fn interpret(individual: &MepIndividual, inputs: &[Value]) -> Value {
    Interpreter::new(individual, inputs).run()
}

/// A `(&MepIndividual, &Example) -> f64` error function wrapping
/// [`squared_error`] around [`interpret`] -- the default symbolic-regression
/// error hook (spec §4.6's `sum_of_errors`).
pub fn mep_squared_error(individual: &MepIndividual, example: &Example) -> f64 {
    squared_error(&interpret(individual, &example.input), &example.output)
}

/// A discriminant `(&MepIndividual, &[Value]) -> f64` for the classification
/// evaluators (`dyn_slot`/`gaussian`/`binary`), which all want a bare `f64`
/// rather than a full [`Value`].
pub fn mep_discriminant(individual: &MepIndividual, inputs: &[Value]) -> f64 {
    interpret(individual, inputs).as_double().unwrap_or(0.0)
}

/// Builds a symbolic-regression [`Problem`] over [`MepIndividual`]: fresh
/// random genomes from `symbols`, scored by summed squared error against
/// `dataframe` (spec §4.2, §4.6, §4.13). `num_objectives` lets a caller run
/// multi-objective variants (e.g. error plus program size) by supplying
/// their own `error` instead of [`mep_squared_error`].
pub fn sum_of_errors_problem<F>(
    environment: Environment,
    symbols: Arc<SymbolSet>,
    dataframe: Arc<Dataframe>,
    num_objectives: usize,
    error: F,
) -> Problem<MepIndividual, SumOfErrors<MepIndividual, F>>
where
    F: Fn(&MepIndividual, &Example) -> f64 + Send + Sync + 'static,
{
    let categories: Vec<Category> = symbols.categories();
    let code_length = environment.code_length;
    let encode_symbols = symbols.clone();
    let encode_categories = categories.clone();

    Problem::new(
        environment,
        move || MepIndividual::random(encode_symbols.clone(), code_length, encode_categories.clone(), num_objectives),
        SumOfErrors::new(dataframe, error),
    )
}

/// The default symbolic-regression [`Problem`] (spec §4.6's `sum_of_errors`
/// with [`squared_error`]): one error term per example, minimized.
pub fn default_regression_problem(
    environment: Environment,
    symbols: Arc<SymbolSet>,
    dataframe: Arc<Dataframe>,
) -> Problem<MepIndividual, SumOfErrors<MepIndividual, fn(&MepIndividual, &Example) -> f64>> {
    sum_of_errors_problem(environment, symbols, dataframe, 1, mep_squared_error)
}

/// Wires Dynamic Subset Selection into an [`Evolution::with_after_generation`]
/// hook (spec §4.13): every `dss.period`-th generation, draws a fresh
/// weighted subset of `dataframe` and installs it as `evaluator`'s active
/// training set via [`SumOfErrors::set_active_subset`]. Returns `false`
/// always -- DSS never itself ends a run, it only reshapes what the next
/// generation trains against.
///
/// Difficulty/age bookkeeping (`Dss::update`) needs mutable access to the
/// dataframe backing `evaluator`, which is shared (`Arc`) with every
/// parallel `Search` run and therefore not safely mutable here; only the
/// periodic resample half of DSS is wired through. A dataframe that wants
/// difficulty-weighted resampling needs its own per-run `Dss` state outside
/// this hook.
pub fn dss_hook<F>(
    dss: Dss,
    dataframe: Arc<Dataframe>,
    evaluator: Arc<SumOfErrors<MepIndividual, F>>,
) -> impl FnMut(&vita_core::stats::Generation, &MepIndividual) -> bool
where
    F: Fn(&MepIndividual, &Example) -> f64 + Send + Sync,
{
    move |generation, _best| {
        if dss.should_resample(generation.index as u32) {
            let subset = dss.sample(&dataframe);
            evaluator.set_active_subset(subset);
        }
        false
    }
}

/// Validates that `environment` and `symbols` together describe a runnable
/// MEP search (spec §4.2's configuration checks, delegated to
/// [`Environment::validate`] since `symbols` is the one extra piece a
/// symbolic-regression `Problem` needs beyond the generic environment).
pub fn validate(environment: &Environment, symbols: &SymbolSet) -> VitaResult<()> {
    environment.validate(Some(symbols))
}
