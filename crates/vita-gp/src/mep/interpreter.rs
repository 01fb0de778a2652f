//! MEP interpreter (spec §4.14): evaluates a genome starting from its
//! `best` locus, memoizing per-locus results within one evaluation call so a
//! DAG's shared sub-expressions are computed once. Grounded on
//! `morinim/vita`'s `kernel/gp/mep/interpreter.h`; the memo table there is a
//! per-call `matrix<elem_>` keyed by locus, which this mirrors with a
//! `HashMap<Locus, Value>`.

use super::gene::Locus;
use super::genome::MepIndividual;
use std::collections::HashMap;
use vita_core::value::Value;

pub struct Interpreter<'a> {
    genome: &'a MepIndividual,
    inputs: &'a [Value],
    memo: HashMap<Locus, Value>,
    penalty: f64,
}

impl<'a> Interpreter<'a> {
    pub fn new(genome: &'a MepIndividual, inputs: &'a [Value]) -> Self {
        Interpreter { genome, inputs, memo: HashMap::new(), penalty: 0.0 }
    }

    /// Runs the program from its `best` locus and returns the resulting
    /// value (possibly `Value::Void` -- "no value").
    pub fn run(&mut self) -> Value {
        self.run_locus(self.genome.best())
    }

    /// Sum of per-symbol constraint-violation penalties accrued by the most
    /// recent `run`, used by constrained-search problems (spec §4.14).
    pub fn penalty(&self) -> f64 {
        self.penalty
    }

    fn run_locus(&mut self, locus: Locus) -> Value {
        if let Some(cached) = self.memo.get(&locus) {
            return cached.clone();
        }

        let Some(gene) = self.genome.gene_at(locus) else {
            return Value::Void;
        };
        let Some(symbol) = self.genome.symbols().get(gene.opcode) else {
            return Value::Void;
        };

        let value = if symbol.is_input() {
            let index = match symbol.terminal {
                Some(vita_core::symbol::TerminalKind::Input { index }) => index,
                _ => unreachable!("is_input implies Input terminal kind"),
            };
            self.inputs.get(index).cloned().unwrap_or(Value::Void)
        } else if symbol.is_terminal() {
            gene.param.clone().unwrap_or_else(|| symbol.eval(&[]))
        } else {
            let arg_loci: Vec<Locus> = gene
                .args
                .iter()
                .zip(symbol.arg_categories.iter())
                .map(|(idx, cat)| Locus::new(*idx, *cat))
                .collect();
            let args: Vec<Value> = arg_loci.into_iter().map(|l| self.run_locus(l)).collect();

            if args.iter().any(Value::is_void) {
                self.penalty += symbol.penalty;
            }
            symbol.eval(&args)
        };

        self.memo.insert(locus, value.clone());
        value
    }
}
