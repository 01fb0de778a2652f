use vita_core::symbol::Category;
use vita_core::value::Value;

/// `(index, category)` address into a [`super::genome::MepGenome`]'s grid.
/// Spec §4.2: the genome is rectangular, one row per locus index, one
/// column per category.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Locus {
    pub index: usize,
    pub category: Category,
}

impl Locus {
    pub fn new(index: usize, category: impl Into<Category>) -> Self {
        Locus { index, category: category.into() }
    }
}

/// One cell of the grid: which symbol occupies this locus, and which loci
/// (at larger indices, per the feed-forward invariant) supply its arguments.
/// `param` holds an ephemeral terminal's drawn value, fixed at construction
/// time and carried along unchanged by mutation/crossover of *other* loci.
#[derive(Debug, Clone)]
pub struct Gene {
    pub opcode: vita_core::symbol::Opcode,
    pub args: Vec<usize>,
    pub param: Option<Value>,
}

impl Gene {
    pub fn new(opcode: vita_core::symbol::Opcode, args: Vec<usize>, param: Option<Value>) -> Self {
        Gene { opcode, args, param }
    }
}
