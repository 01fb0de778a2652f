//! 128-bit structural signatures.
//!
//! Every individual exposes a `signature()` used both to deduplicate the
//! fitness cache (spec §4.5) and to detect phenotypic convergence (the
//! unique-signature count in per-generation statistics, spec §4.11). No
//! crate in the retrieved corpus provides a MurmurHash3 x64-128
//! implementation, so this is a direct, from-scratch port of the public
//! domain reference algorithm, seeded with a fixed constant so signatures
//! are stable across runs and processes.

use std::fmt::{self, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Fixed seed so two processes hashing the same byte stream always agree.
/// Arbitrary but stable -- changing it invalidates every persisted cache.
const SEED: u64 = 0xc0ffee_1234_5678;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Signature(pub u64, pub u64);

impl Signature {
    pub const ZERO: Signature = Signature(0, 0);

    pub fn of(bytes: &[u8]) -> Signature {
        let (h1, h2) = murmur3_x64_128(bytes, SEED);
        Signature(h1, h2)
    }

    /// Folds the two 64-bit halves into a single `u64`, used where a cache
    /// implementation needs a cheap shard/bucket index rather than full
    /// 128-bit equality.
    pub fn fold64(&self) -> u64 {
        self.0 ^ self.1
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}{:016x}", self.0, self.1)
    }
}

impl Display for Signature {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// A convenience hasher-backed builder: anything that can feed bytes
/// incrementally (genome encoders) appends here, then calls `finish`.
pub struct SignatureBuilder {
    buf: Vec<u8>,
}

impl Default for SignatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SignatureBuilder {
    pub fn new() -> Self {
        Self { buf: Vec::with_capacity(128) }
    }

    pub fn push_u8(&mut self, b: u8) -> &mut Self {
        self.buf.push(b);
        self
    }

    pub fn push_u32(&mut self, v: u32) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn push_u64(&mut self, v: u64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn push_f64(&mut self, v: f64) -> &mut Self {
        self.buf.extend_from_slice(&v.to_bits().to_le_bytes());
        self
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    pub fn finish(&self) -> Signature {
        Signature::of(&self.buf)
    }
}

impl Hash for Signature {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.0);
        state.write_u64(self.1);
    }
}

/// Public-domain MurmurHash3 x64-128 (Austin Appleby), operating on the full
/// input in 16-byte blocks with a tail mix for the remainder.
fn murmur3_x64_128(data: &[u8], seed: u64) -> (u64, u64) {
    const C1: u64 = 0x87c3_7b91_1142_53d5;
    const C2: u64 = 0x4cf5_ad43_2745_937f;

    let len = data.len();
    let n_blocks = len / 16;

    let mut h1: u64 = seed;
    let mut h2: u64 = seed;

    for i in 0..n_blocks {
        let off = i * 16;
        let mut k1 = u64::from_le_bytes(data[off..off + 8].try_into().unwrap());
        let mut k2 = u64::from_le_bytes(data[off + 8..off + 16].try_into().unwrap());

        k1 = k1.wrapping_mul(C1);
        k1 = k1.rotate_left(31);
        k1 = k1.wrapping_mul(C2);
        h1 ^= k1;

        h1 = h1.rotate_left(27);
        h1 = h1.wrapping_add(h2);
        h1 = h1.wrapping_mul(5).wrapping_add(0x52dc_e729);

        k2 = k2.wrapping_mul(C2);
        k2 = k2.rotate_left(33);
        k2 = k2.wrapping_mul(C1);
        h2 ^= k2;

        h2 = h2.rotate_left(31);
        h2 = h2.wrapping_add(h1);
        h2 = h2.wrapping_mul(5).wrapping_add(0x3849_5ab5);
    }

    let tail = &data[n_blocks * 16..];
    let mut k1: u64 = 0;
    let mut k2: u64 = 0;

    if tail.len() > 8 {
        for (i, b) in tail[8..].iter().enumerate() {
            k2 ^= (*b as u64) << (8 * i);
        }
        k2 = k2.wrapping_mul(C2).rotate_left(33).wrapping_mul(C1);
        h2 ^= k2;
    }

    if !tail.is_empty() {
        for (i, b) in tail[..tail.len().min(8)].iter().enumerate() {
            k1 ^= (*b as u64) << (8 * i);
        }
        k1 = k1.wrapping_mul(C1).rotate_left(31).wrapping_mul(C2);
        h1 ^= k1;
    }

    h1 ^= len as u64;
    h2 ^= len as u64;

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    h1 = fmix64(h1);
    h2 = fmix64(h2);

    h1 = h1.wrapping_add(h2);
    h2 = h2.wrapping_add(h1);

    (h1, h2)
}

fn fmix64(mut k: u64) -> u64 {
    k ^= k >> 33;
    k = k.wrapping_mul(0xff51_afd7_ed55_8ccd);
    k ^= k >> 33;
    k = k.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    k ^= k >> 33;
    k
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_deterministic() {
        assert_eq!(Signature::of(&[]), Signature::of(&[]));
    }

    #[test]
    fn differing_inputs_differ() {
        assert_ne!(Signature::of(b"abc"), Signature::of(b"abd"));
    }

    #[test]
    fn builder_matches_direct_hash_of_concatenated_bytes() {
        let mut b = SignatureBuilder::new();
        b.push_u32(7).push_f64(1.5).push_bytes(b"x");

        let mut raw = Vec::new();
        raw.extend_from_slice(&7u32.to_le_bytes());
        raw.extend_from_slice(&1.5f64.to_bits().to_le_bytes());
        raw.extend_from_slice(b"x");

        assert_eq!(b.finish(), Signature::of(&raw));
    }

    #[test]
    fn long_inputs_use_all_blocks() {
        let a: Vec<u8> = (0..200u32).map(|v| v as u8).collect();
        let mut b = a.clone();
        b[199] ^= 0xff;
        assert_ne!(Signature::of(&a), Signature::of(&b));
    }
}
