//! Block extraction and generalization (spec §4.2): identifies reusable
//! sub-graphs of a genome that could become an automatically defined
//! function (ADF), and marks candidate terminal positions within such a
//! block for replacement by fresh argument placeholders. Synthesizing the
//! actual ADF symbol and splicing it back into a symbol set belongs to the
//! problem layer that owns the live catalogue (spec §1's "concrete
//! catalogue of primitive operators" is explicitly out of scope here); this
//! module only does the structural analysis that feeds that step.

use super::gene::Locus;
use super::genome::MepIndividual;
use vita_core::random;

/// A candidate subroutine: the sub-DAG reachable from `root`, expressed as
/// the set of loci it touches. `self_contained` blocks reference nothing
/// outside `loci`, so they can be lifted out and called with the
/// replaced positions as arguments without any change in behavior.
#[derive(Debug, Clone)]
pub struct Block {
    pub root: Locus,
    pub loci: Vec<Locus>,
}

impl MepIndividual {
    /// Every reachable locus whose induced sub-graph is self-contained and
    /// has at least `min_size` genes -- candidates for ADF extraction.
    pub fn blocks(&self, min_size: usize) -> Vec<Block> {
        self.active_loci()
            .into_iter()
            .filter_map(|root| {
                let loci = self.active_loci_from(root);
                if loci.len() < min_size {
                    return None;
                }
                let contained: std::collections::HashSet<Locus> = loci.iter().copied().collect();
                let self_contained = loci.iter().all(|&l| {
                    let Some(gene) = self.gene_at(l) else { return false };
                    let Some(symbol) = self.symbols().get(gene.opcode) else { return false };
                    gene.args
                        .iter()
                        .zip(symbol.arg_categories.iter())
                        .all(|(idx, cat)| contained.contains(&Locus::new(*idx, *cat)))
                });
                self_contained.then_some(Block { root, loci })
            })
            .collect()
    }
}

/// Replaces up to `k` terminal loci within `block` by fresh argument
/// placeholders, returning the (unchanged) block alongside the positions
/// chosen. Terminals are sampled without replacement so repeated calls with
/// the same block and a growing `k` are consistent with each other's choice
/// up to the smaller `k`.
pub fn generalize(genome: &MepIndividual, block: &Block, k: usize) -> (Block, Vec<Locus>) {
    let terminal_loci: Vec<Locus> = block
        .loci
        .iter()
        .copied()
        .filter(|&l| {
            genome
                .gene_at(l)
                .and_then(|g| genome.symbols().get(g.opcode))
                .map(|s| s.is_terminal())
                .unwrap_or(false)
        })
        .collect();

    if terminal_loci.is_empty() || k == 0 {
        return (block.clone(), Vec::new());
    }

    let take = k.min(terminal_loci.len());
    let indices = random::sample_indices(0..terminal_loci.len(), take);
    let replaced = indices.into_iter().map(|i| terminal_loci[i]).collect();

    (block.clone(), replaced)
}
