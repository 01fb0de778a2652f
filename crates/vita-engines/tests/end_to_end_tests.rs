//! End-to-end searches over whole, hand-specified fitness landscapes rather
//! than mocked evaluators -- the same role `radiate-engines/tests/engine_tests.rs`
//! plays for `radiate-engines`'s `GeneticEngine`.

use std::sync::Arc;

use vita_alters::TournamentReplacement;
use vita_core::objectives::{Fitness, Optimize};
use vita_engines::{DifferentialEvolution, Driver, Environment, Evaluator, Evolution, Problem};
use vita_gp::de::{DeIndividual, RealRange};
use vita_gp::ga::{GaIndividual, IntRange};

/// Number of same-row or same-diagonal conflicts among 8 queens, one per
/// column, placed at `rows[column]`.
fn attacks(rows: &[i64]) -> i64 {
    let mut conflicts = 0;
    for i in 0..rows.len() {
        for j in (i + 1)..rows.len() {
            let (ri, rj) = (rows[i], rows[j]);
            let col_gap = (j - i) as i64;
            if ri == rj || (ri - rj).abs() == col_gap {
                conflicts += 1;
            }
        }
    }
    conflicts
}

struct QueensEvaluator(Vec<Optimize>);

impl Evaluator<GaIndividual> for QueensEvaluator {
    fn directions(&self) -> &[Optimize] {
        &self.0
    }

    fn evaluate(&self, individual: &GaIndividual) -> Fitness {
        Fitness::scalar(-attacks(individual.genes()) as f64)
    }
}

#[test]
fn eight_queens_ga_finds_a_non_attacking_placement() {
    let mut environment = Environment::default();
    environment.individuals = 100;
    environment.generations = 200;
    environment.max_stuck_time = 200;
    environment.tournament_size = 3;

    let ranges = Arc::new(vec![IntRange::new(0, 8); 8]);
    let problem = Problem::new(
        environment,
        move || GaIndividual::random(ranges.clone(), 1),
        QueensEvaluator(vec![Optimize::Maximize]),
    );

    let mut evolution = Evolution::new(problem, Box::new(TournamentReplacement::new(3))).unwrap();
    let outcome = evolution.run();

    assert_eq!(outcome.fitness.get(0), 0.0, "expected a placement with zero conflicts, got {:?}", outcome.best.genes());
    assert_eq!(attacks(outcome.best.genes()), 0);
}

fn rastrigin(xs: &[f64]) -> f64 {
    let n = xs.len() as f64;
    10.0 * n + xs.iter().map(|x| x * x - 10.0 * (2.0 * std::f64::consts::PI * x).cos()).sum::<f64>()
}

struct RastriginEvaluator(Vec<Optimize>);

impl Evaluator<DeIndividual> for RastriginEvaluator {
    fn directions(&self) -> &[Optimize] {
        &self.0
    }

    fn evaluate(&self, individual: &DeIndividual) -> Fitness {
        Fitness::scalar(-rastrigin(individual.genes()))
    }
}

#[test]
fn rastrigin_5d_de_converges_near_the_origin() {
    let mut environment = Environment::default();
    environment.individuals = 50;
    environment.generations = 1000;
    environment.max_stuck_time = 1000;
    environment.p_cross = 0.9;
    environment.de_weight = vita_engines::WeightRange::new(0.4, 0.9);

    let ranges = Arc::new(vec![RealRange::new(-5.12, 5.12); 5]);
    let problem = Problem::new(
        environment,
        move || DeIndividual::random(ranges.clone(), 1),
        RastriginEvaluator(vec![Optimize::Maximize]),
    );

    let mut evolution = DifferentialEvolution::new(problem).unwrap();
    let outcome = evolution.run();

    assert!(outcome.fitness.get(0) > -1.0, "expected near-zero Rastrigin value, got {}", outcome.fitness.get(0));
}

/// Deb's first constrained test problem: maximize
/// `f(x1,x2) = -((x1²+x2-11)² + (x1+x2²-7)²)` subject to two inequalities,
/// penalized into the objective so an unconstrained DE driver can search it
/// directly (spec §8's "Deb test problem 1").
fn deb_objective(x1: f64, x2: f64) -> f64 {
    -((x1 * x1 + x2 - 11.0).powi(2) + (x1 + x2 * x2 - 7.0).powi(2))
}

fn deb_penalty(x1: f64, x2: f64) -> f64 {
    let g1 = (x1 - 5.0).powi(2) + x2 * x2 - 26.0;
    let g2 = -(x1 - 5.0).powi(2) - x2 * x2 + 1.0;
    let violation = g1.max(0.0) + g2.max(0.0);
    1_000.0 * violation
}

struct DebEvaluator(Vec<Optimize>);

impl Evaluator<DeIndividual> for DebEvaluator {
    fn directions(&self) -> &[Optimize] {
        &self.0
    }

    fn evaluate(&self, individual: &DeIndividual) -> Fitness {
        let genes = individual.genes();
        let (x1, x2) = (genes[0], genes[1]);
        Fitness::scalar(deb_objective(x1, x2) - deb_penalty(x1, x2))
    }
}

#[test]
fn deb_constrained_problem_approaches_the_known_optimum() {
    let mut environment = Environment::default();
    environment.individuals = 80;
    environment.generations = 2000;
    environment.max_stuck_time = 2000;
    environment.p_cross = 0.9;
    environment.de_weight = vita_engines::WeightRange::new(0.4, 0.9);

    let ranges = Arc::new(vec![RealRange::new(0.0, 10.0); 2]);
    let problem = Problem::new(
        environment,
        move || DeIndividual::random(ranges.clone(), 1),
        DebEvaluator(vec![Optimize::Maximize]),
    );

    let mut evolution = DifferentialEvolution::new(problem).unwrap();
    let outcome = evolution.run();

    assert!(outcome.fitness.get(0) > -14.0, "expected close to the known optimum -13.59086, got {}", outcome.fitness.get(0));
}
