//! MEP program serialization (spec §6): a header of `{age, length,
//! categories}` followed by `length * categories` `{opcode, stored
//! parameter}` records. The structural signature is never persisted --
//! spec §6 calls for it to be recomputed on load, since it is a pure
//! function of the active genes and carrying it along would only invite
//! drift between the stored value and reality.

use super::gene::{Gene, Locus};
use super::genome::MepIndividual;
use std::collections::HashMap;
use std::sync::Arc;
use vita_core::genome::Individual;
use vita_core::symbol::{Category, Opcode, SymbolSet};
use vita_core::value::Value;
use vita_error::VitaResult;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
enum ParamDto {
    None,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
}

impl ParamDto {
    fn from_value(v: &Option<Value>) -> Self {
        match v {
            None | Some(Value::Void) => ParamDto::None,
            Some(Value::Bool(b)) => ParamDto::Bool(*b),
            Some(Value::Int(i)) => ParamDto::Int(*i),
            Some(Value::Double(d)) => ParamDto::Double(*d),
            Some(Value::String(s)) => ParamDto::String(s.clone()),
        }
    }

    fn into_value(self) -> Option<Value> {
        match self {
            ParamDto::None => None,
            ParamDto::Bool(b) => Some(Value::Bool(b)),
            ParamDto::Int(i) => Some(Value::Int(i)),
            ParamDto::Double(d) => Some(Value::Double(d)),
            ParamDto::String(s) => Some(Value::String(s)),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
struct GeneRecord {
    opcode: u32,
    args: Vec<usize>,
    param: ParamDto,
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
struct ColumnRecord {
    category: Category,
    genes: Vec<GeneRecord>,
}

/// The on-the-wire representation of a [`MepIndividual`]: plain data with no
/// dependency on a live [`SymbolSet`], so it can be written and read back
/// without the catalogue that produced it in scope -- only reconstructing a
/// genome via [`MepProgram::into_individual`] requires one, so opcodes can
/// be validated against it (spec §7 `MalformedProgram`).
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct MepProgram {
    age: u32,
    length: usize,
    columns: Vec<ColumnRecord>,
    best_category: Category,
    best_index: usize,
}

impl MepProgram {
    pub fn from_individual(ind: &MepIndividual) -> Self {
        let columns = ind
            .categories()
            .iter()
            .map(|category| {
                let genes = ind.rows()[category]
                    .iter()
                    .map(|g| GeneRecord {
                        opcode: g.opcode.0,
                        args: g.args.clone(),
                        param: ParamDto::from_value(&g.param),
                    })
                    .collect();
                ColumnRecord { category: *category, genes }
            })
            .collect();

        let best = ind.best();
        MepProgram {
            age: ind.age(),
            length: ind.length(),
            columns,
            best_category: best.category,
            best_index: best.index,
        }
    }

    pub fn into_individual(self, symbols: Arc<SymbolSet>, num_objectives: usize) -> VitaResult<MepIndividual> {
        let mut categories = Vec::with_capacity(self.columns.len());
        let mut rows: HashMap<Category, Vec<Gene>> = HashMap::new();

        for column in self.columns {
            categories.push(column.category);
            let genes = column
                .genes
                .into_iter()
                .map(|g| Gene::new(Opcode(g.opcode), g.args, g.param.into_value()))
                .collect();
            rows.insert(column.category, genes);
        }

        let best = Locus::new(self.best_index, self.best_category);

        MepIndividual::from_rows(symbols, self.length, categories, rows, best, self.age, num_objectives)
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::*;
    use vita_core::genome::Individual;
    use vita_core::symbol::Symbol;
    use vita_core::value::ValueKind;

    fn numeric_symbols() -> Arc<SymbolSet> {
        let mut set = SymbolSet::new();
        set.insert(Symbol::input("x", ValueKind::Double, 0, 1.0));
        set.insert(Symbol::constant("one", Value::Double(1.0), 1.0));
        set.insert(Symbol::function(
            "add",
            ValueKind::Double,
            vec![ValueKind::Double, ValueKind::Double],
            1.0,
            |args| match (args[0].as_double(), args[1].as_double()) {
                (Some(a), Some(b)) => Value::Double(a + b),
                _ => Value::Void,
            },
        ));
        Arc::new(set)
    }

    #[test]
    fn round_trips_through_json() {
        let symbols = numeric_symbols();
        let genome = MepIndividual::random(symbols.clone(), 10, vec![ValueKind::Double], 1).unwrap();
        genome.set_age(4);

        let program = MepProgram::from_individual(&genome);
        let json = serde_json::to_string(&program).unwrap();
        let decoded: MepProgram = serde_json::from_str(&json).unwrap();
        let restored = decoded.into_individual(symbols, 1).unwrap();

        assert_eq!(restored.signature(), genome.signature());
        assert_eq!(restored.age(), genome.age());
    }

    #[test]
    fn unknown_opcode_is_malformed() {
        let symbols = numeric_symbols();
        let genome = MepIndividual::random(symbols.clone(), 6, vec![ValueKind::Double], 1).unwrap();
        let mut program = MepProgram::from_individual(&genome);
        program.columns[0].genes[0].opcode = 9_999_999;

        let empty: Arc<SymbolSet> = Arc::new(SymbolSet::new());
        let _ = symbols;
        assert!(program.into_individual(empty, 1).is_err());
    }
}
