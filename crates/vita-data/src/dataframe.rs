//! The 2-dimensional labeled data structure CSV/XRFF ingest produces (spec
//! §3, §4.13). Grounded on `morinim/vita`'s `kernel/gp/src/dataframe.h`
//! (`dataframe`/`columns_info`/`example`), expressed without that class's
//! mutable `columns_info` cursor -- columns are fixed once ingest finishes.

use crate::class_encoder::ClassEncoder;
use crate::column::{Column, Typing};
use crate::example::Example;
use vita_core::symbol::Category;
use vita_core::value::ValueKind;
use vita_error::{VitaError, VitaResult};

/// Whether the output column holds a numeric target (regression) or a
/// textual/encoded label (classification) -- spec §4.13.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Problem {
    Regression,
    Classification,
}

/// A fully ingested dataset: typed columns, the example rows, and (for
/// classification) the stable label encoding.
#[derive(Debug, Clone)]
pub struct Dataframe {
    pub columns: Vec<Column>,
    pub examples: Vec<Example>,
    pub classes: ClassEncoder,
    pub problem: Problem,
    pub output_index: Option<usize>,
}

impl Dataframe {
    pub fn new(columns: Vec<Column>, problem: Problem) -> Self {
        Dataframe { columns, examples: Vec::new(), classes: ClassEncoder::new(), problem, output_index: None }
    }

    pub fn push(&mut self, example: Example) {
        self.examples.push(example);
    }

    pub fn len(&self) -> usize {
        self.examples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.examples.is_empty()
    }

    pub fn classes(&self) -> usize {
        self.classes.classes()
    }

    /// Number of input variables per example (spec §3's `variables()`).
    pub fn variables(&self) -> usize {
        self.examples.first().map(|e| e.input.len()).unwrap_or(0)
    }

    /// Original column indices that feed the input vector, in the order
    /// they appear there (every column except the output column, if any).
    fn input_column_indices(&self) -> Vec<usize> {
        (0..self.columns.len()).filter(|&i| Some(i) != self.output_index).collect()
    }

    /// Populates each string-domain column's `states` by scanning the
    /// ingested examples. CSV/XRFF readers call this once after all rows
    /// are pushed, since a column's complete label set is only known after
    /// the whole file has been read.
    pub fn finalize_states(&mut self) {
        let input_cols = self.input_column_indices();
        for example in &self.examples {
            for (pos, &col_idx) in input_cols.iter().enumerate() {
                if self.columns[col_idx].domain != ValueKind::String {
                    continue;
                }
                if let Some(value) = example.input.get(pos) {
                    if let Some(s) = value.as_str() {
                        self.columns[col_idx].observe_state(s);
                    }
                }
            }
        }
    }

    /// The category each column presents to the GP symbol layer (spec
    /// §4.13).
    pub fn categories(&self, typing: Typing) -> Vec<Category> {
        self.columns.iter().map(|c| c.category(typing)).collect()
    }

    pub fn class_name(&self, id: usize) -> Option<&str> {
        self.classes.class_name(id)
    }

    /// Validates spec §4.13's invariants: every example's input arity
    /// matches the declared input column count, and (for classification)
    /// every non-void output lies in the declared class range.
    pub fn validate(&self) -> VitaResult<()> {
        let expected_arity = self.input_column_indices().len();
        for (i, example) in self.examples.iter().enumerate() {
            if example.input.len() != expected_arity {
                return Err(VitaError::MalformedInput {
                    message: format!("example {i} has arity {}, expected {expected_arity}", example.input.len()).into(),
                });
            }
            if self.problem == Problem::Classification {
                if let Some(class) = example.label() {
                    if class < 0 || class as usize >= self.classes.classes().max(1) {
                        return Err(VitaError::MalformedInput {
                            message: format!("example {i} output class {class} out of range").into(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Splits into training/validation partitions by `validation_percentage`
    /// (spec §6), preserving row order. Expects the caller to have already
    /// shuffled if a random split is desired.
    pub fn split(mut self, validation_percentage: f64) -> (Dataframe, Dataframe) {
        let cut = ((self.examples.len() as f64) * (1.0 - validation_percentage)).round() as usize;
        let cut = cut.min(self.examples.len());
        let validation_examples = self.examples.split_off(cut);

        let validation = Dataframe {
            columns: self.columns.clone(),
            examples: validation_examples,
            classes: self.classes.clone(),
            problem: self.problem,
            output_index: self.output_index,
        };
        (self, validation)
    }

    pub fn shuffle(&mut self) {
        vita_core::random::shuffle(&mut self.examples);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::value::Value;

    fn sample() -> Dataframe {
        let mut df = Dataframe::new(vec![Column::new("x", ValueKind::Double), Column::new("y", ValueKind::Double)], Problem::Regression);
        df.output_index = Some(1);
        for i in 0..10 {
            df.push(Example::new(vec![Value::Double(i as f64)], Value::Double((i * 2) as f64)));
        }
        df
    }

    #[test]
    fn split_preserves_total_row_count() {
        let df = sample();
        let total = df.len();
        let (train, valid) = df.split(0.2);
        assert_eq!(train.len() + valid.len(), total);
    }

    #[test]
    fn validate_accepts_consistent_arity() {
        let df = sample();
        assert!(df.validate().is_ok());
    }

    #[test]
    fn validate_rejects_arity_mismatch() {
        let mut df = sample();
        df.examples[0].input.push(Value::Double(0.0));
        assert!(df.validate().is_err());
    }
}
