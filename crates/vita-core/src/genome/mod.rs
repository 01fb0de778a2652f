//! The individual capability trait and the age-layered population built on
//! top of it.
//!
//! Spec §2's Design Note asks for a single interface each of MEP, GA and DE
//! implements, rather than `radiate-core`'s generic-over-`Gene` `Chromosome`/
//! `Genotype` family -- the three representations' internal storage is too
//! different (a flat instruction array vs. a bounded-integer vector vs. a
//! bounded-real vector) for a shared gene type to pay for itself. `Individual`
//! is that interface; `Population` and `Layer` are generic over it and are
//! otherwise a direct generalization of `radiate-core`'s `population.rs`, with
//! age-layering folded in from `morinim/vita`'s `kernel/alps.h`.

mod individual;
mod layer;
mod population;

pub use individual::Individual;
pub use layer::Layer;
pub use population::Population;
