//! The symbol catalogue shared by every MEP individual in a run.
//!
//! Grounded on spec §4.1 and `morinim/vita`'s `kernel/symbol.h`/
//! `kernel/symbol_set.h`: a symbol is either a function (non-zero arity,
//! evaluates its arguments) or a terminal (arity zero -- a constant, an
//! input variable, or an ephemeral random constant), tagged with the
//! [`crate::value::ValueKind`] category it produces and, for functions, the
//! categories it expects for each argument. The set buckets symbols by
//! return category and supports weighted roulette sampling so "add" can be
//! drawn more often than "tan" without the caller hand-rolling a
//! distribution.

use crate::random;
use crate::value::ValueKind;
use std::collections::HashMap;
use std::fmt::{self, Display, Formatter};
use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
use std::sync::{Mutex, OnceLock};

/// Process-unique identifier handed out when a [`Symbol`] is registered.
/// Stable for the lifetime of the process; never reused, so it can key a
/// `HashMap` without also carrying the symbol's name around.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Opcode(pub u32);

static NEXT_OPCODE: AtomicU32 = AtomicU32::new(0);

impl Opcode {
    fn next() -> Opcode {
        Opcode(NEXT_OPCODE.fetch_add(1, AtomicOrdering::Relaxed))
    }
}

impl Display for Opcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An unsigned tag identifying a GP type (spec §4.1): `0..K-1`, distinct
/// from [`ValueKind`] because `K` can exceed the handful of runtime value
/// representations -- two string-domain columns can each get their own
/// category under strong typing (spec §4.13) even though both still carry
/// `Value::String` payloads.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Category(pub u32);

static NEXT_CATEGORY: AtomicU32 = AtomicU32::new(0);

impl Category {
    /// Allocates a fresh category from the shared counter, distinct from
    /// every other category ever allocated in this process.
    pub fn fresh() -> Category {
        Category(NEXT_CATEGORY.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The canonical category for `kind`, memoized so every caller asking
    /// for "the category of `Double`" gets the same one back -- the default,
    /// weakly-typed mapping where a value's runtime representation doubles
    /// as its GP category. Strong typing bypasses this via [`Category::fresh`].
    pub fn of(kind: ValueKind) -> Category {
        static REGISTRY: OnceLock<Mutex<HashMap<ValueKind, Category>>> = OnceLock::new();
        let registry = REGISTRY.get_or_init(|| Mutex::new(HashMap::new()));
        *registry.lock().unwrap().entry(kind).or_insert_with(Category::fresh)
    }
}

impl From<ValueKind> for Category {
    fn from(kind: ValueKind) -> Category {
        Category::of(kind)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "cat{}", self.0)
    }
}

/// What kind of terminal a zero-arity symbol is, if it is one. Functions
/// carry `None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TerminalKind {
    /// An input variable (a dataframe column, or a problem's free variable).
    /// `index` selects which input slot this terminal reads.
    Input { index: usize },
    /// A fixed constant baked in at symbol-set construction time.
    Constant,
    /// An ephemeral random constant: a fresh value drawn from the symbol's
    /// range every time it is instantiated into a genome (spec §4.1).
    Ephemeral,
}

/// One entry in a [`SymbolSet`]: an opcode, a human name, the category it
/// produces, its arity and the category each argument must satisfy, a
/// roulette weight, and -- for terminals -- which kind of terminal it is.
/// `penalty` is this symbol's own contribution to a constrained search's
/// penalty term (spec §4.14): the interpreter sums each reached symbol's
/// `penalty` rather than charging a single flat cost for any violation.
#[derive(Clone)]
pub struct Symbol {
    pub opcode: Opcode,
    pub name: String,
    pub category: Category,
    pub arg_categories: Vec<Category>,
    pub weight: f32,
    pub penalty: f64,
    pub terminal: Option<TerminalKind>,
    eval: SymbolFn,
}

type SymbolFn = std::sync::Arc<dyn Fn(&[crate::value::Value]) -> crate::value::Value + Send + Sync>;

impl Symbol {
    pub fn function<C: Into<Category>>(
        name: impl Into<String>,
        category: impl Into<Category>,
        arg_categories: impl IntoIterator<Item = C>,
        weight: f32,
        eval: impl Fn(&[crate::value::Value]) -> crate::value::Value + Send + Sync + 'static,
    ) -> Symbol {
        Symbol {
            opcode: Opcode::next(),
            name: name.into(),
            category: category.into(),
            arg_categories: arg_categories.into_iter().map(Into::into).collect(),
            weight,
            penalty: 0.0,
            terminal: None,
            eval: std::sync::Arc::new(eval),
        }
    }

    pub fn input(name: impl Into<String>, category: impl Into<Category>, index: usize, weight: f32) -> Symbol {
        Symbol {
            opcode: Opcode::next(),
            name: name.into(),
            category: category.into(),
            arg_categories: Vec::new(),
            weight,
            penalty: 0.0,
            terminal: Some(TerminalKind::Input { index }),
            eval: std::sync::Arc::new(move |_| crate::value::Value::Void),
        }
    }

    /// A symbol's category defaults to the canonical category of its value's
    /// kind (spec §4.1's "if the caller did not supply one, a category from
    /// a shared counter"); use [`Symbol::with_category`] to override it.
    pub fn constant(name: impl Into<String>, value: crate::value::Value, weight: f32) -> Symbol {
        let category = Category::of(value.category());
        Symbol {
            opcode: Opcode::next(),
            name: name.into(),
            category,
            arg_categories: Vec::new(),
            weight,
            penalty: 0.0,
            terminal: Some(TerminalKind::Constant),
            eval: std::sync::Arc::new(move |_| value.clone()),
        }
    }

    pub fn ephemeral(
        name: impl Into<String>,
        category: impl Into<Category>,
        weight: f32,
        draw: impl Fn() -> crate::value::Value + Send + Sync + 'static,
    ) -> Symbol {
        Symbol {
            opcode: Opcode::next(),
            name: name.into(),
            category: category.into(),
            arg_categories: Vec::new(),
            weight,
            penalty: 0.0,
            terminal: Some(TerminalKind::Ephemeral),
            eval: std::sync::Arc::new(move |_| draw()),
        }
    }

    /// Overrides the category assigned at construction -- e.g. to put two
    /// symbols that would otherwise land in different canonical categories
    /// into the same one, or to give a constant its own fresh category
    /// under strong typing.
    pub fn with_category(mut self, category: impl Into<Category>) -> Symbol {
        self.category = category.into();
        self
    }

    /// Sets this symbol's per-symbol constraint-violation penalty (spec
    /// §4.14), accumulated by the interpreter whenever the symbol's
    /// constraint is violated (e.g. one of its arguments evaluated to
    /// `Value::Void`).
    pub fn with_penalty(mut self, penalty: f64) -> Symbol {
        self.penalty = penalty;
        self
    }

    pub fn arity(&self) -> usize {
        self.arg_categories.len()
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal.is_some()
    }

    pub fn is_input(&self) -> bool {
        matches!(self.terminal, Some(TerminalKind::Input { .. }))
    }

    pub fn is_parametric(&self) -> bool {
        matches!(self.terminal, Some(TerminalKind::Ephemeral))
    }

    pub fn eval(&self, args: &[crate::value::Value]) -> crate::value::Value {
        (self.eval)(args)
    }
}

impl std::fmt::Debug for Symbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Symbol")
            .field("opcode", &self.opcode)
            .field("name", &self.name)
            .field("category", &self.category)
            .field("arity", &self.arity())
            .finish()
    }
}

/// A symbol catalogue bucketed by return category, with separate function
/// and terminal buckets per category so genome construction can draw "any
/// terminal of category X" or "any function of category X" without
/// filtering the whole set each time.
#[derive(Default)]
pub struct SymbolSet {
    functions: HashMap<Category, Vec<Symbol>>,
    terminals: HashMap<Category, Vec<Symbol>>,
    by_opcode: HashMap<Opcode, Symbol>,
}

impl SymbolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, symbol: Symbol) {
        self.by_opcode.insert(symbol.opcode, symbol.clone());
        let bucket = if symbol.is_terminal() {
            &mut self.terminals
        } else {
            &mut self.functions
        };
        bucket.entry(symbol.category).or_default().push(symbol);
    }

    pub fn get(&self, opcode: Opcode) -> Option<&Symbol> {
        self.by_opcode.get(&opcode)
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut cats: Vec<Category> = self
            .functions
            .keys()
            .chain(self.terminals.keys())
            .copied()
            .collect();
        cats.sort();
        cats.dedup();
        cats
    }

    pub fn functions_of(&self, category: impl Into<Category>) -> &[Symbol] {
        self.functions.get(&category.into()).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn terminals_of(&self, category: impl Into<Category>) -> &[Symbol] {
        self.terminals.get(&category.into()).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every category used by a function argument must have at least one
    /// terminal, or no feed-forward program can ever terminate (spec §4.1,
    /// §7 `InvalidConfig`).
    pub fn enough_terminals(&self) -> bool {
        for symbols in self.functions.values() {
            for symbol in symbols {
                for arg_cat in &symbol.arg_categories {
                    if self.terminals_of(*arg_cat).is_empty() {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Weighted roulette draw of a function returning `category`.
    pub fn choose_function(&self, category: impl Into<Category>) -> Option<&Symbol> {
        self.choose_weighted(self.functions_of(category.into()))
    }

    /// Weighted roulette draw of a terminal returning `category`.
    pub fn choose_terminal(&self, category: impl Into<Category>) -> Option<&Symbol> {
        self.choose_weighted(self.terminals_of(category.into()))
    }

    /// Weighted roulette draw of either a function or a terminal of
    /// `category`, combining both buckets with their relative weights --
    /// used when generating an arbitrary node of a random program tree.
    pub fn choose_any(&self, category: impl Into<Category>) -> Option<&Symbol> {
        let category = category.into();
        let mut combined: Vec<&Symbol> = self.functions_of(category).iter().collect();
        combined.extend(self.terminals_of(category).iter());
        if combined.is_empty() {
            return None;
        }
        let weights: Vec<f32> = combined.iter().map(|s| s.weight).collect();
        let idx = random::weighted_index(&weights);
        Some(combined[idx])
    }

    fn choose_weighted<'a>(&self, symbols: &'a [Symbol]) -> Option<&'a Symbol> {
        if symbols.is_empty() {
            return None;
        }
        let weights: Vec<f32> = symbols.iter().map(|s| s.weight).collect();
        let idx = random::weighted_index(&weights);
        Some(&symbols[idx])
    }

    pub fn len(&self) -> usize {
        self.by_opcode.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_opcode.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn build_numeric_set() -> SymbolSet {
        let mut set = SymbolSet::new();
        set.insert(Symbol::input("x", ValueKind::Double, 0, 1.0));
        set.insert(Symbol::constant("one", Value::Double(1.0), 1.0));
        set.insert(Symbol::function(
            "add",
            ValueKind::Double,
            vec![ValueKind::Double, ValueKind::Double],
            1.0,
            |args| {
                match (args[0].as_double(), args[1].as_double()) {
                    (Some(a), Some(b)) => Value::Double(a + b),
                    _ => Value::Void,
                }
            },
        ));
        set
    }

    #[test]
    fn enough_terminals_true_when_args_covered() {
        let set = build_numeric_set();
        assert!(set.enough_terminals());
    }

    #[test]
    fn enough_terminals_false_for_missing_category() {
        let mut set = SymbolSet::new();
        set.insert(Symbol::function(
            "not",
            ValueKind::Bool,
            vec![ValueKind::Bool],
            1.0,
            |args| Value::Bool(!args[0].as_bool().unwrap_or(false)),
        ));
        assert!(!set.enough_terminals());
    }

    #[test]
    fn add_evaluates_correctly() {
        let set = build_numeric_set();
        let add = set.choose_function(ValueKind::Double).unwrap();
        let result = add.eval(&[Value::Double(2.0), Value::Double(3.0)]);
        assert_eq!(result, Value::Double(5.0));
    }

    #[test]
    fn choose_terminal_only_returns_terminals() {
        let set = build_numeric_set();
        for _ in 0..20 {
            let t = set.choose_terminal(ValueKind::Double).unwrap();
            assert!(t.is_terminal());
        }
    }
}
