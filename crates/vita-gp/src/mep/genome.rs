//! MEP genome: construction, mutation, crossover and the
//! [`vita_core::genome::Individual`] capability impl.
//!
//! Grounded on spec §4.2, with the flat-array DAG style borrowed from the
//! teacher's `radiate-gp/src/collections/graphs/*.rs` (argument positions as
//! integer indices into a shared array rather than owned child nodes or
//! pointers, per the "DAG in a flat array" redesign flag).

use super::gene::{Gene, Locus};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use vita_core::genome::Individual;
use vita_core::objectives::Fitness;
use vita_core::random;
use vita_core::signature::{Signature, SignatureBuilder};
use vita_core::symbol::{Category, SymbolSet};
use vita_error::{VitaError, VitaResult};

struct MepData {
    length: usize,
    categories: Vec<Category>,
    rows: HashMap<Category, Vec<Gene>>,
    best: Locus,
}

/// A Multi-Expression Programming individual: a rectangular genome of genes
/// decoding a DAG, with a `best` entry-point locus. Cheaply cloned -- the
/// grid and the symbol set are shared via `Arc`; only the mutable age/fitness
/// cells are distinct per clone's logical lineage. Cloning this type (as
/// `Individual: Clone` requires) therefore aliases the *same* individual
/// rather than producing a structurally independent copy; use `mutate`/
/// `crossover` to derive genuinely new individuals.
#[derive(Clone)]
pub struct MepIndividual {
    data: Arc<MepData>,
    age: Arc<AtomicU32>,
    fitness: Arc<Mutex<Fitness>>,
    symbols: Arc<SymbolSet>,
}

impl MepIndividual {
    pub fn best(&self) -> Locus {
        self.data.best
    }

    pub fn length(&self) -> usize {
        self.data.length
    }

    pub fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub fn gene_at(&self, locus: Locus) -> Option<&Gene> {
        self.data.rows.get(&locus.category)?.get(locus.index)
    }

    pub fn symbols(&self) -> &SymbolSet {
        &self.symbols
    }

    pub fn symbols_arc(&self) -> Arc<SymbolSet> {
        self.symbols.clone()
    }

    pub fn rows(&self) -> &HashMap<Category, Vec<Gene>> {
        &self.data.rows
    }

    /// Random construction (spec §4.2): builds the grid from the last index
    /// toward zero so that every function's argument indices, which must
    /// exceed the function's own index, already exist. Index 0 is
    /// terminal-only. Retries `best` until it anchors a non-trivial
    /// (≥1 function node) sub-graph.
    pub fn random<C: Into<Category>>(
        symbols: Arc<SymbolSet>,
        length: usize,
        categories: impl IntoIterator<Item = C>,
        num_objectives: usize,
    ) -> VitaResult<Self> {
        let categories: Vec<Category> = categories.into_iter().map(Into::into).collect();
        if length == 0 || categories.is_empty() {
            return Err(VitaError::InvalidConfig {
                message: "MEP genome needs length > 0 and at least one category".into(),
            });
        }

        let mut rows: HashMap<Category, Vec<Gene>> = categories
            .iter()
            .map(|c| (*c, Vec::with_capacity(length)))
            .collect();

        for category in &categories {
            let mut column = vec![None; length];
            for index in (0..length).rev() {
                let gene = if index == 0 {
                    Self::random_terminal(&symbols, *category)?
                } else {
                    Self::random_gene(&symbols, *category, index, length)?
                };
                column[index] = Some(gene);
            }
            rows.insert(*category, column.into_iter().map(Option::unwrap).collect());
        }

        let data = MepData { length, categories: categories.clone(), rows, best: Locus::new(0, categories[0]) };
        let mut built = MepIndividual {
            data: Arc::new(data),
            age: Arc::new(AtomicU32::new(0)),
            fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives))),
            symbols,
        };

        built = built.with_nontrivial_best()?;
        Ok(built)
    }

    fn random_terminal(symbols: &SymbolSet, category: Category) -> VitaResult<Gene> {
        let symbol = symbols.choose_terminal(category).ok_or_else(|| VitaError::InvalidConfig {
            message: format!("no terminal available for category {category}").into(),
        })?;
        let param = if symbol.is_parametric() { Some(symbol.eval(&[])) } else { None };
        Ok(Gene::new(symbol.opcode, Vec::new(), param))
    }

    /// Builds a gene at `index` (one of `0..length`). Function arguments are
    /// drawn from `index+1..length`, the set of loci already constructed by
    /// the top-down build order, preserving the feed-forward invariant.
    fn random_gene(symbols: &SymbolSet, category: Category, index: usize, length: usize) -> VitaResult<Gene> {
        // No locus above `index` exists to serve as a function argument, so
        // the topmost index is terminal-only, mirroring the index-0 rule
        // from the other end of the genome.
        if index + 1 >= length {
            return Self::random_terminal(symbols, category);
        }

        let symbol = symbols.choose_any(category).ok_or_else(|| VitaError::InvalidConfig {
            message: format!("no symbol available for category {category}").into(),
        })?;

        if symbol.is_terminal() {
            let param = if symbol.is_parametric() { Some(symbol.eval(&[])) } else { None };
            return Ok(Gene::new(symbol.opcode, Vec::new(), param));
        }

        let opcode = symbol.opcode;
        let args = symbol
            .arg_categories
            .iter()
            .map(|_| random::range((index + 1)..length))
            .collect::<Vec<_>>();

        Ok(Gene::new(opcode, args, None))
    }

    fn with_nontrivial_best(mut self) -> VitaResult<Self> {
        for _ in 0..64 {
            let category = *random::choose(&self.data.categories);
            let index = random::range(0..self.data.length);
            let locus = Locus::new(index, category);
            if self.reaches_function(locus) {
                let mut data = (*self.data).clone_shallow();
                data.best = locus;
                self.data = Arc::new(data);
                return Ok(self);
            }
        }
        Err(VitaError::InvalidConfig {
            message: "could not find a non-trivial best locus; symbol set may lack functions".into(),
        })
    }

    fn reaches_function(&self, locus: Locus) -> bool {
        self.active_loci_from(locus).iter().any(|l| {
            self.gene_at(*l)
                .map(|g| self.symbols.get(g.opcode).map(|s| !s.is_terminal()).unwrap_or(false))
                .unwrap_or(false)
        })
    }

    /// Every locus reachable from `from`, via a depth-first walk over
    /// argument indices. Used by the interpreter, signature computation and
    /// `effective_size`.
    pub fn active_loci_from(&self, from: Locus) -> Vec<Locus> {
        let mut seen = std::collections::HashSet::new();
        let mut stack = vec![from];
        let mut order = Vec::new();

        while let Some(locus) = stack.pop() {
            if !seen.insert(locus) {
                continue;
            }
            order.push(locus);

            let Some(gene) = self.gene_at(locus) else { continue };
            let Some(symbol) = self.symbols.get(gene.opcode) else { continue };

            for (arg_idx, arg_category) in gene.args.iter().zip(symbol.arg_categories.iter()) {
                stack.push(Locus::new(*arg_idx, *arg_category));
            }
        }

        order
    }

    pub fn active_loci(&self) -> Vec<Locus> {
        self.active_loci_from(self.data.best)
    }

    pub fn effective_size(&self) -> usize {
        self.active_loci().len()
    }

    pub fn total_size(&self) -> usize {
        self.data.length * self.data.categories.len()
    }

    /// Rebuilds a genome from already-decoded rows (spec §6 program
    /// serialization): validates every gene's opcode resolves against
    /// `symbols`, that its arity and argument categories match the
    /// symbol's declaration, and that the feed-forward invariant holds
    /// (every argument index either exceeds its own locus's index, or the
    /// locus is index 0 and the gene is a terminal). A loader that skips
    /// this constructor risks reintroducing a cyclic or ill-typed genome.
    pub fn from_rows(
        symbols: Arc<SymbolSet>,
        length: usize,
        categories: Vec<Category>,
        rows: HashMap<Category, Vec<Gene>>,
        best: Locus,
        age: u32,
        num_objectives: usize,
    ) -> VitaResult<Self> {
        if length == 0 || categories.is_empty() {
            return Err(VitaError::MalformedProgram {
                message: "genome needs length > 0 and at least one category".into(),
            });
        }

        for category in &categories {
            let column = rows.get(category).ok_or_else(|| VitaError::MalformedProgram {
                message: format!("missing column for category {category}").into(),
            })?;
            if column.len() != length {
                return Err(VitaError::MalformedProgram {
                    message: format!("column for category {category} has wrong length").into(),
                });
            }
            for (index, gene) in column.iter().enumerate() {
                let symbol = symbols.get(gene.opcode).ok_or_else(|| VitaError::MalformedProgram {
                    message: format!("unknown opcode {} at index {index}", gene.opcode).into(),
                })?;
                if symbol.category != *category {
                    return Err(VitaError::MalformedProgram {
                        message: format!("opcode {} category mismatch at index {index}", gene.opcode).into(),
                    });
                }
                if symbol.arity() != gene.args.len() {
                    return Err(VitaError::MalformedProgram {
                        message: format!("opcode {} arity mismatch at index {index}", gene.opcode).into(),
                    });
                }
                if index == 0 && !symbol.is_terminal() {
                    return Err(VitaError::MalformedProgram {
                        message: "index 0 must hold a terminal".into(),
                    });
                }
                for &arg_idx in &gene.args {
                    if arg_idx <= index {
                        return Err(VitaError::MalformedProgram {
                            message: format!("argument index {arg_idx} violates feed-forward invariant at {index}").into(),
                        });
                    }
                }
            }
        }

        if !rows.get(&best.category).is_some_and(|c| best.index < c.len()) {
            return Err(VitaError::MalformedProgram {
                message: "best locus out of range".into(),
            });
        }

        let data = MepData { length, categories, rows, best };
        Ok(MepIndividual {
            data: Arc::new(data),
            age: Arc::new(AtomicU32::new(age)),
            fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives.max(1)))),
            symbols,
        })
    }
}

impl MepData {
    fn clone_shallow(&self) -> MepData {
        MepData {
            length: self.length,
            categories: self.categories.clone(),
            rows: self.rows.clone(),
            best: self.best,
        }
    }
}

impl MepIndividual {
    /// Structural hash of `locus`'s sub-expression: opcode, stored parameter
    /// and the recursively hashed arguments, memoized per locus so a DAG
    /// with shared structure is only hashed once per distinct node.
    /// Two loci computing the same sub-program always hash identically,
    /// which is what lets [`super::cse::eliminate`] redirect argument
    /// references to an earlier locus without perturbing `signature()`.
    fn structural_hash(&self, locus: Locus, cache: &mut HashMap<Locus, u64>) -> u64 {
        if let Some(h) = cache.get(&locus) {
            return *h;
        }
        let Some(gene) = self.gene_at(locus) else { return 0 };
        let Some(symbol) = self.symbols.get(gene.opcode) else { return 0 };

        let mut builder = SignatureBuilder::new();
        builder.push_u32(gene.opcode.0);
        match &gene.param {
            Some(v) => {
                builder.push_bytes(v.to_string().as_bytes());
            }
            None => {
                builder.push_u8(0);
            }
        }
        for (arg_idx, arg_category) in gene.args.iter().zip(symbol.arg_categories.iter()) {
            let arg_locus = Locus::new(*arg_idx, *arg_category);
            let arg_hash = self.structural_hash(arg_locus, cache);
            builder.push_u64(arg_hash);
        }

        let hash = builder.finish().fold64();
        cache.insert(locus, hash);
        hash
    }

    /// Rewrites every active gene's argument indices per `redirect` (old
    /// locus -> canonical locus), producing a new genome with the same
    /// `best` and the same semantics. Used by [`super::cse::eliminate`].
    pub(crate) fn rewrite_args(&self, redirect: &HashMap<Locus, Locus>) -> MepIndividual {
        let mut rows = self.data.rows.clone();
        for category in &self.data.categories {
            let column = rows.get_mut(category).unwrap();
            for gene in column.iter_mut() {
                let Some(symbol) = self.symbols.get(gene.opcode) else { continue };
                for (arg_idx, arg_category) in gene.args.iter_mut().zip(symbol.arg_categories.iter()) {
                    let arg_locus = Locus::new(*arg_idx, *arg_category);
                    if let Some(target) = redirect.get(&arg_locus) {
                        *arg_idx = target.index;
                    }
                }
            }
        }

        let data = MepData { length: self.data.length, categories: self.data.categories.clone(), rows, best: self.data.best };
        MepIndividual {
            data: Arc::new(data),
            age: Arc::new(AtomicU32::new(self.age())),
            fitness: Arc::new(Mutex::new(self.fitness())),
            symbols: self.symbols.clone(),
        }
    }
}

impl Individual for MepIndividual {
    fn signature(&self) -> Signature {
        let mut cache = HashMap::new();
        let root_hash = self.structural_hash(self.data.best, &mut cache);
        let mut builder = SignatureBuilder::new();
        builder.push_u64(root_hash);
        builder.finish()
    }

    fn age(&self) -> u32 {
        self.age.load(Ordering::Relaxed)
    }

    fn set_age(&self, age: u32) {
        self.age.store(age, Ordering::Relaxed);
    }

    fn size(&self) -> usize {
        self.total_size()
    }

    fn fitness(&self) -> Fitness {
        self.fitness.lock().unwrap().clone()
    }

    fn set_fitness(&self, fitness: Fitness) {
        *self.fitness.lock().unwrap() = fitness;
    }

    fn mutate(&self, rate: f32) -> Self {
        let mut rows = self.data.rows.clone();

        for category in &self.data.categories {
            let column = rows.get_mut(category).unwrap();
            for index in 0..column.len() {
                if random::bool(rate) {
                    let replacement = if index == 0 {
                        Self::random_terminal(&self.symbols, *category)
                    } else {
                        Self::random_gene(&self.symbols, *category, index, self.data.length)
                    };
                    if let Ok(gene) = replacement {
                        column[index] = gene;
                    }
                }
            }
        }

        let num_objectives = self.fitness().len().max(1);
        let data = MepData { length: self.data.length, categories: self.data.categories.clone(), rows, best: self.data.best };

        MepIndividual {
            data: Arc::new(data),
            age: Arc::new(AtomicU32::new(self.age())),
            fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives))),
            symbols: self.symbols.clone(),
        }
    }

    /// Overrides the default (spec §4.11): MEP is the only representation
    /// with introns, so its effective size excludes them.
    fn effective_size(&self) -> usize {
        MepIndividual::effective_size(self)
    }

    /// Names of the symbols reachable from `best`, one entry per active
    /// locus (repeats if a symbol is used more than once).
    fn symbol_usage(&self) -> Vec<String> {
        self.active_loci()
            .iter()
            .filter_map(|locus| self.gene_at(*locus))
            .filter_map(|gene| self.symbols.get(gene.opcode))
            .map(|symbol| symbol.name.clone())
            .collect()
    }

    /// Applies uniform crossover with probability `rate` (spec §4.9's
    /// `p_cross`); on the complementary draw the parents pass through
    /// unchanged. When crossover does fire, each locus is copied from
    /// either parent independently on a fixed 50/50 draw (spec §4.2) --
    /// `rate` gates whether crossover happens at all, it is not itself the
    /// per-locus mixing bias.
    fn crossover(&self, other: &Self, rate: f32) -> (Self, Self) {
        if !random::bool(rate) {
            return (self.clone(), other.clone());
        }

        let child = |a: &MepIndividual, b: &MepIndividual| -> MepIndividual {
            let mut rows: HashMap<Category, Vec<Gene>> = HashMap::new();
            for category in &a.data.categories {
                let ga = a.data.rows.get(category).unwrap();
                let gb = b.data.rows.get(category).unwrap();
                let mut column = Vec::with_capacity(ga.len());
                for i in 0..ga.len() {
                    if random::bool(0.5) {
                        column.push(gb[i].clone());
                    } else {
                        column.push(ga[i].clone());
                    }
                }
                rows.insert(*category, column);
            }

            let num_objectives = a.fitness().len().max(b.fitness().len()).max(1);
            let age = a.age().max(b.age());
            let data = MepData { length: a.data.length, categories: a.data.categories.clone(), rows, best: a.data.best };

            let mut built = MepIndividual {
                data: Arc::new(data),
                age: Arc::new(AtomicU32::new(age)),
                fitness: Arc::new(Mutex::new(Fitness::unset(num_objectives))),
                symbols: a.symbols.clone(),
            };

            if !built.reaches_function(built.data.best) {
                built = built.with_nontrivial_best().unwrap_or(built);
            }
            built
        };

        (child(self, other), child(other, self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_core::symbol::Symbol;
    use vita_core::value::{Value, ValueKind};

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
    fn random_genome_has_nontrivial_best() {
        let symbols = numeric_symbols();
        let genome = MepIndividual::random(symbols, 8, vec![ValueKind::Double], 1).unwrap();
        assert!(genome.effective_size() >= 1);
    }

    #[test]
    fn effective_size_never_exceeds_total_size() {
        let symbols = numeric_symbols();
        let genome = MepIndividual::random(symbols, 10, vec![ValueKind::Double], 1).unwrap();
        assert!(genome.effective_size() <= genome.total_size());
    }

    #[test]
    fn mutate_preserves_age() {
        let symbols = numeric_symbols();
        let genome = MepIndividual::random(symbols, 10, vec![ValueKind::Double], 1).unwrap();
        genome.set_age(7);
        let mutated = genome.mutate(0.5);
        assert_eq!(mutated.age(), 7);
    }

    #[test]
    fn crossover_age_is_max_of_parents() {
        let symbols = numeric_symbols();
        let a = MepIndividual::random(symbols.clone(), 10, vec![ValueKind::Double], 1).unwrap();
        let b = MepIndividual::random(symbols, 10, vec![ValueKind::Double], 1).unwrap();
        a.set_age(3);
        b.set_age(9);
        let (c0, c1) = a.crossover(&b, 1.0);
        assert_eq!(c0.age(), 9);
        assert_eq!(c1.age(), 9);
    }

    #[test]
    fn zero_rate_crossover_passes_parents_through_unchanged() {
        let symbols = numeric_symbols();
        let a = MepIndividual::random(symbols.clone(), 10, vec![ValueKind::Double], 1).unwrap();
        let b = MepIndividual::random(symbols, 10, vec![ValueKind::Double], 1).unwrap();
        a.set_age(3);
        b.set_age(9);
        let (c0, c1) = a.crossover(&b, 0.0);
        assert_eq!(c0.signature(), a.signature());
        assert_eq!(c1.signature(), b.signature());
        assert_eq!(c0.age(), 3);
        assert_eq!(c1.age(), 9);
    }
}
