//! The generational loop (spec §4.11): selection, variation, evaluation and
//! replacement, repeated until a stop condition fires.
//!
//! Grounded on `radiate-engines`' `GeneticEngine`/`Pipeline`/`Limit` triad:
//! a single struct owns the population and drives it forward one generation
//! at a time via `step`, and `run` repeats `step` against a predicate the
//! teacher's own `GeneticEngine::run(|output| ...)` takes as a closure.
//! `Population`'s age-layer dimension means the *same* driver handles both
//! the plain (μ+λ)-style loop and the ALPS loop -- a single-layer population
//! degenerates to the former, exactly as `vita_core::genome::Population`
//! already documents. Differential Evolution's rand/1/bin operator needs
//! four parents rather than two and a strictly greedy per-target
//! replacement rule, so it gets its own driver, [`DifferentialEvolution`],
//! rather than being squeezed through [`Selector`]/[`Recombine`]/[`Replace`].

use std::cmp::Ordering;
use std::collections::HashSet;

use vita_alters::{BroodRecombination, Recombine, Replace, StandardRecombination};
use vita_core::genome::{Individual, Population};
use vita_core::objectives::{Fitness, Optimize};
use vita_core::random;
use vita_core::stats::Generation;
use vita_gp::de::DeIndividual;
use vita_selectors::{AlpsSelector, Selector};

use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::problem::Problem;

/// Why a run stopped (spec §4.11's termination conditions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `generation >= environment.generations`.
    GenerationLimit,
    /// The current best met or exceeded `environment.threshold_fitness`.
    FitnessThreshold,
    /// No improvement to the best for `environment.max_stuck_time` generations.
    Stagnation,
    /// The caller's `after_generation` hook asked to stop.
    Hook,
}

/// The recombination strategy a generic [`Evolution`] run applies to every
/// breeding event (spec §4.9): either the default two-children crossover,
/// or brood recombination's "generate many, keep the fittest" rule. Named
/// `Variation` because, in evolutionary-computation terms, this is the
/// *variation operator* -- crossover plus mutation together -- as opposed
/// to the parent-selection or survivor-replacement stages around it.
pub enum Variation<I: Individual> {
    Standard(StandardRecombination),
    Brood(BroodRecombination),
}

impl<I: Individual> Variation<I> {
    fn produce<E: Evaluator<I>>(
        &self,
        parents: (&I, &I),
        environment: &Environment,
        directions: &[Optimize],
        evaluator: &E,
    ) -> Vec<I> {
        match self {
            Variation::Standard(strategy) => {
                let mut children = strategy.recombine(parents, environment.p_cross, environment.p_mutation);
                for child in &mut children {
                    child.set_fitness(evaluator.evaluate(child));
                }
                children
            }
            Variation::Brood(strategy) => {
                let winner = strategy.recombine_and_select(
                    parents,
                    environment.p_cross,
                    environment.p_mutation,
                    directions,
                    |candidate| evaluator.evaluate(candidate),
                );
                vec![winner]
            }
        }
    }
}

/// Where a generic [`Evolution`] run draws parents from: the age-layered
/// [`AlpsSelector`] (the default -- degrades to flat tournament selection
/// when the population has a single layer), or any other [`Selector`] the
/// caller supplies via [`Evolution::with_selector`] for a layer-agnostic
/// strategy such as [`vita_selectors::ParetoSelector`] or
/// [`vita_selectors::RandomSelector`].
enum ParentSource<I: Individual> {
    Layered(AlpsSelector),
    Flat(Box<dyn Selector<I> + Send + Sync>),
}

/// The result of driving one [`Evolution`] or [`DifferentialEvolution`] run
/// to termination (spec §4.11, consumed by `Search`'s per-run aggregation,
/// spec §4.12).
pub struct Outcome<I: Individual> {
    pub best: I,
    pub fitness: Fitness,
    pub generations: u64,
    pub stop_reason: StopReason,
    pub last_generation: Generation,
}

fn check_stop(
    environment: &Environment,
    generation: u64,
    best_fitness: Option<&Fitness>,
    directions: &[Optimize],
    stuck_since: u64,
) -> Option<StopReason> {
    if generation >= environment.generations {
        return Some(StopReason::GenerationLimit);
    }
    if let (Some(threshold), Some(best)) = (&environment.threshold_fitness, best_fitness) {
        let threshold = Fitness::new(threshold.clone());
        if best.compare(&threshold, directions) != Ordering::Less {
            return Some(StopReason::FitnessThreshold);
        }
    }
    if environment.max_stuck_time > 0 && stuck_since >= environment.max_stuck_time {
        return Some(StopReason::Stagnation);
    }
    None
}

/// A run that can be stepped one generation at a time and driven to
/// completion. Shared by [`Evolution`] (MEP/GA/`Team`) and
/// [`DifferentialEvolution`] (DE) so [`crate::search::Search`] can treat
/// either kind uniformly.
pub trait Driver<I: Individual> {
    fn step(&mut self) -> Generation;
    fn current_best(&self) -> Option<(I, Fitness)>;
    fn check_stop(&self, generation: &Generation) -> Option<StopReason>;
    fn invoke_hook(&mut self, generation: &Generation) -> bool;

    /// Steps until a stop condition fires, per spec §4.11's loop.
    fn run(&mut self) -> Outcome<I> {
        loop {
            let stats = self.step();
            tracing::debug!(
                generation = stats.index,
                unique_signatures = stats.unique_signatures,
                cache_hit_rate = stats.cache_hit_rate,
                "generation complete"
            );
            let hook_requested_stop = self.invoke_hook(&stats);
            let reason = if hook_requested_stop { Some(StopReason::Hook) } else { self.check_stop(&stats) };
            if let Some(reason) = reason {
                let (best, fitness) =
                    self.current_best().expect("population is seeded with at least one individual");
                tracing::info!(generations = stats.index + 1, ?reason, "run stopped");
                return Outcome { best, fitness, generations: stats.index + 1, stop_reason: reason, last_generation: stats };
            }
        }
    }
}

/// The generational driver for MEP, GA and `Team<I>` individuals (spec
/// §4.11): per layer, select parents, vary them, evaluate the offspring
/// through the problem's (possibly cached) evaluator, and fold them back in
/// via a [`Replace`] strategy.
pub struct Evolution<I: Individual, E: Evaluator<I>> {
    problem: Problem<I, E>,
    population: Population<I>,
    parent_source: ParentSource<I>,
    variation: Variation<I>,
    replacer: Box<dyn Replace<I> + Send + Sync>,
    generation: u64,
    best: Option<(I, Fitness)>,
    stuck_since: u64,
    hook: Option<Box<dyn FnMut(&Generation, &I) -> bool + Send>>,
}

impl<I: Individual, E: Evaluator<I>> Evolution<I, E> {
    /// Seeds a fresh population of `environment.individuals` per layer from
    /// `problem.encode()`, evaluates every founder, and picks a default
    /// recombination strategy (plain or brood, per `environment.brood_recombination`).
    pub fn new(problem: Problem<I, E>, replacer: Box<dyn Replace<I> + Send + Sync>) -> vita_error::VitaResult<Self> {
        let population = Self::seed_population(&problem)?;
        let environment = problem.environment();
        let variation = if environment.brood_recombination > 0 {
            Variation::Brood(BroodRecombination::new(environment.brood_recombination))
        } else {
            Variation::Standard(StandardRecombination::new())
        };
        let parent_source = ParentSource::Layered(AlpsSelector::new(environment.tournament_size, environment.alps_alpha));

        let mut evolution = Evolution {
            problem,
            population,
            parent_source,
            variation,
            replacer,
            generation: 0,
            best: None,
            stuck_since: 0,
            hook: None,
        };
        evolution.update_best();
        Ok(evolution)
    }

    fn seed_population(problem: &Problem<I, E>) -> vita_error::VitaResult<Population<I>> {
        let environment = problem.environment();
        let mut population = Population::new(environment.layers, environment.individuals, environment.alps_age_gap);
        for layer in population.layers_mut() {
            for _ in 0..layer.target_size {
                let individual = problem.encode()?;
                individual.set_fitness(problem.evaluate(&individual));
                layer.push(individual);
            }
        }
        Ok(population)
    }

    /// Overrides the default age-layered selector with any other
    /// [`Selector`] (spec §4.9's Pareto/Random/plain-Tournament strategies),
    /// selecting from the whole population regardless of layer.
    pub fn with_selector(mut self, selector: Box<dyn Selector<I> + Send + Sync>) -> Self {
        self.parent_source = ParentSource::Flat(selector);
        self
    }

    pub fn with_variation(mut self, variation: Variation<I>) -> Self {
        self.variation = variation;
        self
    }

    /// Registers a callback invoked after every generation with that
    /// generation's statistics and the current best individual; returning
    /// `true` stops the run early (spec §4.11's `after_generation` hook).
    pub fn with_after_generation<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Generation, &I) -> bool + Send + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn population(&self) -> &Population<I> {
        &self.population
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn snapshot(&self) -> Generation {
        let mut stats = Generation::new(self.generation);
        for individual in self.population.iter() {
            let fitness = individual.fitness();
            if fitness.is_set() {
                stats.fitness.add(fitness.get(0));
            }
            stats.age.add(individual.age() as f64);
            stats.effective_size.add(individual.effective_size() as f64);
            for name in individual.symbol_usage() {
                stats.record_symbol_use(&name);
            }
        }
        let signatures: HashSet<_> = self.population.iter().map(Individual::signature).collect();
        stats.unique_signatures = signatures.len();
        stats.cache_hit_rate = self.problem.evaluator().hit_rate();
        stats
    }

    fn update_best(&mut self) {
        let directions = self.problem.directions();
        for individual in self.population.iter() {
            let fitness = individual.fitness();
            if !fitness.is_set() {
                continue;
            }
            let better = match &self.best {
                None => true,
                Some((_, best_fitness)) => fitness.compare(best_fitness, directions) == Ordering::Greater,
            };
            if better {
                self.best = Some((individual.clone(), fitness));
            }
        }
    }
}

impl<I: Individual, E: Evaluator<I>> Driver<I> for Evolution<I, E> {
    /// One generation: breed every layer's target-size worth of offspring,
    /// promote overage individuals, age everyone, and refresh the running
    /// best (spec §4.11 steps 2-5). Statistics are snapshotted from the
    /// population as it stood *before* this generation's breeding, matching
    /// spec.md's "snapshot statistics" step at the top of the loop body.
    fn step(&mut self) -> Generation {
        let directions = self.problem.directions().to_vec();
        let stats = self.snapshot();
        let previous_best = self.best.as_ref().map(|(_, fitness)| fitness.clone());

        for layer_index in 0..self.population.layer_count() {
            let target_size = self.population.layers()[layer_index].target_size;
            for _ in 0..target_size {
                let parents = match &self.parent_source {
                    ParentSource::Layered(alps) => {
                        alps.select_for_layer(&self.population, layer_index, &directions, 2)
                    }
                    ParentSource::Flat(selector) => selector.select(&self.population, &directions, 2),
                };
                if parents.len() < 2 {
                    continue;
                }

                let children = self.variation.produce(
                    (&parents[0], &parents[1]),
                    self.problem.environment(),
                    &directions,
                    self.problem.evaluator(),
                );
                self.replacer.replace(self.population.layers_mut()[layer_index].individuals_mut(), children, &directions);
            }
        }

        self.population.promote_overage();
        self.population.age_all();
        self.update_best();

        let improved = match (&previous_best, &self.best) {
            (Some(prev), Some((_, cur))) => cur.compare(prev, &directions) == Ordering::Greater,
            (None, Some(_)) => true,
            _ => false,
        };
        self.stuck_since = if improved { 0 } else { self.stuck_since + 1 };

        self.generation += 1;
        stats
    }

    fn current_best(&self) -> Option<(I, Fitness)> {
        self.best.clone()
    }

    fn check_stop(&self, generation: &Generation) -> Option<StopReason> {
        check_stop(
            self.problem.environment(),
            generation.index + 1,
            self.best.as_ref().map(|(_, fitness)| fitness),
            self.problem.directions(),
            self.stuck_since,
        )
    }

    fn invoke_hook(&mut self, generation: &Generation) -> bool {
        let best = match &self.best {
            Some((best, _)) => best.clone(),
            None => return false,
        };
        match &mut self.hook {
            Some(hook) => hook(generation, &best),
            None => false,
        }
    }
}

/// The Differential Evolution driver (spec §4.4, §4.11): rand/1/bin
/// variation against three distinct donors plus a strictly greedy
/// per-target replacement, neither of which fit the two-parent
/// [`Recombine`]/population-wide [`Replace`] traits the MEP/GA loop uses.
/// Runs over a flat `Vec<DeIndividual>` rather than a layered
/// [`Population`]: DE's canonical form has no notion of age layering.
pub struct DifferentialEvolution<E: Evaluator<DeIndividual>> {
    problem: Problem<DeIndividual, E>,
    population: Vec<DeIndividual>,
    generation: u64,
    best: Option<(DeIndividual, Fitness)>,
    stuck_since: u64,
    hook: Option<Box<dyn FnMut(&Generation, &DeIndividual) -> bool + Send>>,
}

impl<E: Evaluator<DeIndividual>> DifferentialEvolution<E> {
    pub fn new(problem: Problem<DeIndividual, E>) -> vita_error::VitaResult<Self> {
        let environment = problem.environment();
        let mut population = Vec::with_capacity(environment.individuals);
        for _ in 0..environment.individuals {
            let individual = problem.encode()?;
            individual.set_fitness(problem.evaluate(&individual));
            population.push(individual);
        }

        let mut evolution =
            DifferentialEvolution { problem, population, generation: 0, best: None, stuck_since: 0, hook: None };
        evolution.update_best();
        Ok(evolution)
    }

    pub fn with_after_generation<F>(mut self, hook: F) -> Self
    where
        F: FnMut(&Generation, &DeIndividual) -> bool + Send + 'static,
    {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn population(&self) -> &[DeIndividual] {
        &self.population
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn snapshot(&self) -> Generation {
        let mut stats = Generation::new(self.generation);
        for individual in &self.population {
            let fitness = individual.fitness();
            if fitness.is_set() {
                stats.fitness.add(fitness.get(0));
            }
            stats.age.add(individual.age() as f64);
            stats.effective_size.add(individual.effective_size() as f64);
        }
        let signatures: HashSet<_> = self.population.iter().map(Individual::signature).collect();
        stats.unique_signatures = signatures.len();
        stats.cache_hit_rate = self.problem.evaluator().hit_rate();
        stats
    }

    fn update_best(&mut self) {
        let directions = self.problem.directions();
        for individual in &self.population {
            let fitness = individual.fitness();
            if !fitness.is_set() {
                continue;
            }
            let better = match &self.best {
                None => true,
                Some((_, best_fitness)) => fitness.compare(best_fitness, directions) == Ordering::Greater,
            };
            if better {
                self.best = Some((individual.clone(), fitness));
            }
        }
    }

    /// Picks 3 donor indices distinct from `target` and from each other.
    /// Returns fewer than 3 only when the population itself is too small,
    /// in which case the caller skips that target for this generation.
    fn pick_donors(target: usize, population_size: usize) -> Vec<usize> {
        let mut picks = Vec::with_capacity(3);
        let mut guard = 0;
        while picks.len() < 3 && population_size > 3 && guard < population_size * 8 {
            let candidate = random::range(0..population_size);
            if candidate != target && !picks.contains(&candidate) {
                picks.push(candidate);
            }
            guard += 1;
        }
        picks
    }
}

impl<E: Evaluator<DeIndividual>> Driver<DeIndividual> for DifferentialEvolution<E> {
    /// One generation of rand/1/bin: every current individual is a target
    /// `p`; its challenger is built from 3 other distinct population members
    /// via [`DeIndividual::de_crossover`] and replaces `p` only if it is not
    /// worse (spec §4.4's greedy DE selection, distinct from any
    /// population-wide [`Replace`] strategy).
    fn step(&mut self) -> Generation {
        let directions = self.problem.directions().to_vec();
        let stats = self.snapshot();
        let previous_best = self.best.as_ref().map(|(_, fitness)| fitness.clone());

        let environment = self.problem.environment();
        let cr = environment.p_cross;
        let f_range = (environment.de_weight.lo, environment.de_weight.hi);
        let size = self.population.len();

        let mut next_generation = self.population.clone();
        for target_idx in 0..size {
            let donors = Self::pick_donors(target_idx, size);
            if donors.len() < 3 {
                continue;
            }
            let target = &self.population[target_idx];
            let challenger =
                target.de_crossover(&self.population[donors[0]], &self.population[donors[1]], &self.population[donors[2]], cr, f_range);
            challenger.set_fitness(self.problem.evaluate(&challenger));

            if challenger.fitness().compare(&target.fitness(), &directions) != Ordering::Less {
                next_generation[target_idx] = challenger;
            }
        }
        self.population = next_generation;
        for individual in &self.population {
            individual.inc_age();
        }

        self.update_best();
        let improved = match (&previous_best, &self.best) {
            (Some(prev), Some((_, cur))) => cur.compare(prev, &directions) == Ordering::Greater,
            (None, Some(_)) => true,
            _ => false,
        };
        self.stuck_since = if improved { 0 } else { self.stuck_since + 1 };

        self.generation += 1;
        stats
    }

    fn current_best(&self) -> Option<(DeIndividual, Fitness)> {
        self.best.clone()
    }

    fn check_stop(&self, generation: &Generation) -> Option<StopReason> {
        check_stop(
            self.problem.environment(),
            generation.index + 1,
            self.best.as_ref().map(|(_, fitness)| fitness),
            self.problem.directions(),
            self.stuck_since,
        )
    }

    fn invoke_hook(&mut self, generation: &Generation) -> bool {
        let best = match &self.best {
            Some((best, _)) => best.clone(),
            None => return false,
        };
        match &mut self.hook {
            Some(hook) => hook(generation, &best),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use crate::evaluator::Evaluator;
    use vita_alters::TournamentReplacement;
    use vita_core::objectives::Optimize;
    use vita_gp::de::RealRange;
    use std::sync::Arc;

    struct ConstantEvaluator(Vec<Optimize>);

    impl Evaluator<DeIndividual> for ConstantEvaluator {
        fn directions(&self) -> &[Optimize] {
            &self.0
        }

        fn evaluate(&self, individual: &DeIndividual) -> Fitness {
            // Minimize distance of every gene from zero.
            Fitness::scalar(-individual.genes().iter().map(|g| g.abs()).sum::<f64>())
        }
    }

    fn de_problem(individuals: usize, generations: u64) -> Problem<DeIndividual, ConstantEvaluator> {
        let mut environment = Environment::default();
        environment.individuals = individuals;
        environment.generations = generations;
        environment.max_stuck_time = generations + 1;

        let ranges = Arc::new(vec![RealRange::new(-5.0, 5.0); 4]);
        Problem::new(
            environment,
            move || DeIndividual::random(ranges.clone(), 1),
            ConstantEvaluator(vec![Optimize::Maximize]),
        )
    }

    #[test]
    fn de_run_stops_at_generation_limit() {
        let problem = de_problem(12, 5);
        let mut evolution = DifferentialEvolution::new(problem).unwrap();
        let outcome = evolution.run();
        assert_eq!(outcome.stop_reason, StopReason::GenerationLimit);
        assert_eq!(outcome.generations, 5);
    }

    #[test]
    fn evolution_run_improves_or_holds_best_fitness() {
        let mut environment = Environment::default();
        environment.individuals = 20;
        environment.layers = 1;
        environment.generations = 10;
        environment.max_stuck_time = 100;

        #[derive(Clone)]
        struct ScalarIndividual(Arc<std::sync::atomic::AtomicU32>, Arc<std::sync::Mutex<Fitness>>);

        impl Individual for ScalarIndividual {
            fn signature(&self) -> vita_core::signature::Signature {
                vita_core::signature::Signature::ZERO
            }
            fn age(&self) -> u32 {
                self.0.load(std::sync::atomic::Ordering::Relaxed)
            }
            fn set_age(&self, age: u32) {
                self.0.store(age, std::sync::atomic::Ordering::Relaxed);
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

        struct ZeroEvaluator(Vec<Optimize>);
        impl Evaluator<ScalarIndividual> for ZeroEvaluator {
            fn directions(&self) -> &[Optimize] {
                &self.0
            }
            fn evaluate(&self, _individual: &ScalarIndividual) -> Fitness {
                Fitness::scalar(0.0)
            }
        }

        let problem = Problem::new(
            environment,
            || {
                Ok(ScalarIndividual(
                    Arc::new(std::sync::atomic::AtomicU32::new(0)),
                    Arc::new(std::sync::Mutex::new(Fitness::unset(1))),
                ))
            },
            ZeroEvaluator(vec![Optimize::Maximize]),
        );

        let mut evolution = Evolution::new(problem, Box::new(TournamentReplacement::new(3))).unwrap();
        let outcome = evolution.run();
        assert_eq!(outcome.stop_reason, StopReason::GenerationLimit);
        assert_eq!(outcome.fitness.get(0), 0.0);
    }
}
