//! Core traits and data model shared by every Vita individual
//! representation and engine crate.
//!
//! Covers the pieces that don't belong to any one representation: the
//! thread-local RNG (`random`), the tagged evaluation value (`value`), the
//! symbol catalogue (`symbol`), structural signatures (`signature`), the
//! sharded fitness cache (`cache`), fitness vectors and Pareto dominance
//! (`objectives`), the age-layered population and its `Individual`
//! capability trait (`genome`), and per-generation statistics (`stats`).

pub mod cache;
pub mod genome;
pub mod objectives;
pub mod random;
pub mod signature;
pub mod stats;
pub mod symbol;
pub mod value;

pub mod prelude {
    pub use crate::cache::FitnessCache;
    pub use crate::genome::{Individual, Layer, Population};
    pub use crate::objectives::{
        Fitness, Objective, Optimize, crowding_distance, dominates, pareto_front,
    };
    pub use crate::signature::{Signature, SignatureBuilder};
    pub use crate::stats::{Generation, Statistic};
    pub use crate::symbol::{Opcode, Symbol, SymbolSet, TerminalKind};
    pub use crate::value::{Value, ValueKind};
    pub use vita_error::{ResultExt, VitaError, VitaResult};
}
