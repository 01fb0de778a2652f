//! Differential Evolution individual (spec §4.4): a fixed-length vector of
//! bounded reals, varied by the rand/1/bin operator.

mod genome;

pub use genome::{DeIndividual, RealRange};
