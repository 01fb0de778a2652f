//! A single labeled row (spec §4.13, §3).

use vita_core::value::Value;

/// One example: an input vector and an output value, plus the `difficulty`
/// and `age` counters Dynamic Subset Selection uses to prefer harder, older
/// examples (spec §4.13; `morinim/vita`'s `dataframe::example`).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Example {
    pub input: Vec<Value>,
    pub output: Value,
    pub difficulty: u64,
    pub age: u32,
}

impl Example {
    pub fn new(input: Vec<Value>, output: Value) -> Self {
        Example { input, output, difficulty: 0, age: 0 }
    }

    /// The `class_t` label, for classification examples whose output has
    /// already been encoded to an integer id.
    pub fn label(&self) -> Option<i64> {
        self.output.as_int()
    }
}
