//! Fitness vectors, optimization direction and Pareto dominance.
//!
//! Grounded on `radiate-core`'s `objectives/score.rs` and `objectives/optimize.rs`:
//! a fitness is compared, never read as a single number, because spec §4.4
//! requires lexicographic multi-objective comparison and Pareto dominance
//! across the same vector. Generalized from `radiate-core`'s `f32` score to
//! `f64`, and from a single global `Optimize` to one direction per objective
//! slot so `{Min, Max}` can mix within one run (e.g. minimize error, maximize
//! parsimony).

mod fitness;
mod optimize;
mod pareto;

pub use fitness::Fitness;
pub use optimize::{Objective, Optimize};
pub use pareto::{crowding_distance, dominates, pareto_front};
