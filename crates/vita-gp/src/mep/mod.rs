//! Multi-Expression Programming (spec §4.2): a linear genome of genes,
//! decoded as a DAG from a designated `best` entry locus, stored as a flat
//! rectangular array rather than owned/pointer-linked nodes (see the "DAG in
//! a flat array" design note).

mod adf;
mod cse;
mod gene;
mod genome;
mod interpreter;
mod program;

pub use adf::{Block, generalize};
pub use cse::eliminate;
pub use gene::{Gene, Locus};
pub use genome::MepIndividual;
pub use interpreter::Interpreter;
pub use program::MepProgram;
