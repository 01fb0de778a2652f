//! The three individual representations the Vita search engines evolve --
//! MEP, GA and DE (spec §4.2-§4.4) -- plus the `Team` wrapper that groups
//! any one of them into a cooperating unit (spec §9).
//!
//! Every representation implements [`vita_core::genome::Individual`], the
//! single capability trait the rest of the workspace (selection,
//! recombination, replacement, the evolution driver) is generic over.

pub mod de;
pub mod ga;
pub mod mep;
mod team;

pub use team::Team;
