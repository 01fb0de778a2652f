//! Recombination and replacement (spec §4.9, §4.10).
//!
//! Grounded on `radiate-core`'s `Alter`/`Mutate`/`Crossover` trait family and
//! `radiate-alters`' per-strategy modules, but collapsed around the
//! `Individual::mutate`/`crossover` capability methods rather than a
//! `Chromosome`/`Gene` pair, since each Vita representation owns its own
//! mutation/crossover semantics (see `vita-core::genome::Individual`).
//! ALPS promotion is grounded on `morinim/vita`'s
//! `kernel/evolution_replacement.h`, which has no teacher analogue.

pub mod recombine;
pub mod replace;

pub use recombine::{BroodRecombination, Recombine, StandardRecombination};
pub use replace::{AlpsReplacement, FamilyCompetitionReplacement, ParetoReplacement, Replace, TournamentReplacement};
