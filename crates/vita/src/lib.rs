//! Vita: an evolutionary search engine.
//!
//! Re-exports the workspace's component crates -- individual
//! representations, selection, recombination/replacement, dataframe ingest
//! and the evolution/search drivers -- behind one dependency, the way a
//! caller assembling a run actually wants to `use vita::*;` rather than
//! pull in six crates by hand. Grounded on `radiate`'s own facade crate
//! (`crates/radiate/src/lib.rs`), which does the same flat re-export over
//! `radiate-core`/`radiate-alters`/`radiate-selectors`/`radiate-gp`.
//!
//! [`regression`] adds the one thing none of those crates own outright: the
//! glue that turns a [`vita_data::Dataframe`] and a symbol set into a
//! runnable symbolic-regression [`vita_engines::Problem`].

pub mod regression;

pub use vita_alters::*;
pub use vita_core::prelude::*;
// `vita_data::Problem` (regression/classification) and `vita_engines::Problem`
// (a runnable unit of work) share a name; re-export the dataframe one under
// `DatasetKind` rather than let a glob re-export collision pick a winner.
pub use vita_data::Problem as DatasetKind;
pub use vita_data::{ClassEncoder, ClassId, Column, CsvParams, Dataframe, Dss, Example, Typing, read_csv, read_xrff};
pub use vita_engines::*;
pub use vita_gp::{Team, de, ga, mep};
pub use vita_selectors::*;
