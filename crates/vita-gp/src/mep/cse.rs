//! Common subexpression elimination (spec §4.2, §8): two loci that compute
//! identical sub-programs are merged into one, shrinking `effective_size`
//! without changing what the genome computes. Grounded on
//! `morinim/vita`'s note that MEP's flat-array DAG already shares structure
//! by construction -- CSE here simply detects loci whose sub-signature
//! already matches another reachable locus and rewrites argument references
//! to point at the earlier one, rather than rebuilding an expression tree.

use super::gene::Locus;
use super::genome::MepIndividual;
use std::collections::HashMap;
use vita_core::signature::SignatureBuilder;

/// Returns a new genome with every locus reachable from `best` rewritten so
/// that argument references point at the first-seen locus producing that
/// exact sub-expression. Preserves semantics (same signature, same
/// interpreted output) and never increases `effective_size`.
pub fn eliminate(genome: &MepIndividual) -> MepIndividual {
    let active = genome.active_loci();
    let mut canon: HashMap<u128, Locus> = HashMap::new();
    let mut redirect: HashMap<Locus, Locus> = HashMap::new();

    // Process deepest (most-terminal) loci first so a function's argument
    // redirection is already settled by the time we compute the function's
    // own sub-signature.
    let mut ordered = active.clone();
    ordered.sort_by_key(|l| std::cmp::Reverse(l.index));

    for locus in ordered {
        let Some(gene) = genome.gene_at(locus) else { continue };
        let Some(symbol) = genome.symbols().get(gene.opcode) else { continue };

        let mut builder = SignatureBuilder::new();
        builder.push_u32(gene.opcode.0);
        for (arg_idx, arg_cat) in gene.args.iter().zip(symbol.arg_categories.iter()) {
            let arg_locus = Locus::new(*arg_idx, *arg_cat);
            let resolved = redirect.get(&arg_locus).copied().unwrap_or(arg_locus);
            builder.push_u32(resolved.index as u32);
        }
        match &gene.param {
            Some(v) => builder.push_bytes(v.to_string().as_bytes()),
            None => builder.push_u8(0),
        }
        let sub_sig = builder.finish().fold64() as u128;

        match canon.get(&sub_sig) {
            Some(&earlier) if earlier != locus => {
                redirect.insert(locus, earlier);
            }
            _ => {
                canon.insert(sub_sig, locus);
            }
        }
    }

    if redirect.is_empty() {
        return genome.clone();
    }

    genome.rewrite_args(&redirect)
}
