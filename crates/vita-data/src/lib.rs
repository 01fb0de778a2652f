//! Dataframe ingest and categorization for Vita's symbolic-regression
//! specialization (spec §4.13): CSV and XRFF readers producing a typed,
//! labeled example stream, plus Dynamic Subset Selection over it.
//!
//! Deliberately out of scope here (spec §1): byte-level CSV/XRFF parsing
//! beyond the semantic product it yields -- that work is delegated to the
//! `csv` and `quick-xml` crates.

pub mod class_encoder;
pub mod column;
pub mod csv;
pub mod dataframe;
pub mod dss;
pub mod example;
pub mod xrff;

pub use class_encoder::{ClassEncoder, ClassId};
pub use column::{Column, Typing};
pub use csv::{CsvParams, read_csv};
pub use dataframe::{Dataframe, Problem};
pub use dss::Dss;
pub use example::Example;
pub use xrff::read_xrff;
