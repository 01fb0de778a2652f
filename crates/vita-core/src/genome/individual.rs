use crate::objectives::Fitness;
use crate::signature::Signature;

/// The capability surface every individual representation (MEP, GA, DE)
/// implements. Selection, replacement and the evolution driver operate
/// purely in terms of this trait; they never know whether an individual is
/// a flat instruction array, an integer vector, or a real vector.
pub trait Individual: Clone + Send + Sync {
    /// Structural signature used for cache lookups and convergence stats.
    /// Two individuals with the same signature are expected (not
    /// guaranteed, see spec §4.5) to evaluate to the same fitness.
    fn signature(&self) -> Signature;

    /// Generations this individual -- or, after crossover, its oldest
    /// contributing ancestor -- has survived (spec §4.3, §4.9 ALPS).
    fn age(&self) -> u32;

    fn set_age(&self, age: u32);

    fn inc_age(&self) {
        self.set_age(self.age() + 1);
    }

    /// Representation-specific notion of size: MEP's total genome length,
    /// GA's/DE's vector length. Used for parsimony objectives and reporting.
    fn size(&self) -> usize;

    /// The currently assigned fitness, or an unset [`Fitness`] if this
    /// individual has not been evaluated since its last structural change.
    fn fitness(&self) -> Fitness;

    fn set_fitness(&self, fitness: Fitness);

    fn is_evaluated(&self) -> bool {
        self.fitness().is_set()
    }

    /// Produces a mutated copy of `self`; each representation decides what
    /// "mutate with probability `rate` per gene" means for its own genome --
    /// locus replacement for MEP, bounded resampling for GA, perturbation
    /// within bounds for DE (spec §4.9).
    fn mutate(&self, rate: f32) -> Self;

    /// Recombines two parents into two offspring. The offspring's age is the
    /// max of the two parents' ages (`DESIGN.md`'s Open Question decision on
    /// DE crossover age), so a lineage's age tracks its oldest surviving
    /// material rather than resetting to zero.
    fn crossover(&self, other: &Self, rate: f32) -> (Self, Self)
    where
        Self: Sized;

    /// Active (non-intron) size, for spec §4.11's per-generation "effective
    /// length" statistic. Defaults to [`Self::size`]; only MEP has a notion
    /// of introns, so it is the only representation that overrides this.
    fn effective_size(&self) -> usize {
        self.size()
    }

    /// Names of the symbols this individual actually uses, for spec
    /// §4.11's symbol usage histogram. GA/DE have no symbol catalogue, so
    /// the default is empty; MEP overrides it with its active loci's
    /// opcodes.
    fn symbol_usage(&self) -> Vec<String> {
        Vec::new()
    }
}
