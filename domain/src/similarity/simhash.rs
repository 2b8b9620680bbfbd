//! Simhash fingerprints
//!
//! Each shingle is hashed (first 64 bits of SHA-256, big-endian); every bit
//! position votes +1 / -1 across all shingles and the fingerprint keeps the
//! positions with a positive tally. Similar shingle sets produce
//! fingerprints that differ in few bits.

use super::shingle::shingles;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Width of a fingerprint in bits
pub const FINGERPRINT_BITS: u32 = u64::BITS;

/// A 64-bit simhash fingerprint (Value Object)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(u64);

impl Fingerprint {
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Fingerprint of a set of shingles; an empty set yields all zeros
    pub fn from_shingles<I, S>(shingles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut votes = [0i64; FINGERPRINT_BITS as usize];
        for shingle in shingles {
            let hash = shingle_hash(shingle.as_ref());
            for (position, vote) in votes.iter_mut().enumerate() {
                if hash & (1u64 << (63 - position)) != 0 {
                    *vote += 1;
                } else {
                    *vote -= 1;
                }
            }
        }

        let bits = votes
            .iter()
            .enumerate()
            .filter(|(_, vote)| **vote > 0)
            .fold(0u64, |acc, (position, _)| acc | (1u64 << (63 - position)));
        Self(bits)
    }

    /// Fingerprint of a text, shingled with n-gram size `k`
    pub fn of_text(text: &str, k: usize) -> Self {
        Self::from_shingles(shingles(text, k))
    }

    /// Number of differing bits
    pub fn hamming_distance(self, other: Self) -> u32 {
        hamming_distance(self.0, other.0)
    }

    /// Similarity in `[0, 1]`
    ///
    /// `1 − (popcount(a ⊕ b) + 1) / (highest differing bit position + 2)`.
    /// The denominator only counts bits up to the highest differing one, so
    /// a few low-order differences still score high. Identical fingerprints
    /// return exactly `1.0`; any difference scores strictly below it.
    pub fn similarity(self, other: Self) -> f64 {
        let xor = self.0 ^ other.0;
        if xor == 0 {
            return 1.0;
        }

        let differing = xor.count_ones() as f64 + 1.0;
        let effective_width = (FINGERPRINT_BITS + 1 - xor.leading_zeros()) as f64;
        1.0 - differing / effective_width
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// `popcount(a ⊕ b)`
pub fn hamming_distance(a: u64, b: u64) -> u32 {
    (a ^ b).count_ones()
}

/// Simhash similarity of two texts
pub fn text_similarity(a: &str, b: &str, k: usize) -> f64 {
    Fingerprint::of_text(a, k).similarity(Fingerprint::of_text(b, k))
}

fn shingle_hash(shingle: &str) -> u64 {
    let digest = Sha256::digest(shingle.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_identical_texts() {
        assert_eq!(text_similarity("cats are great", "cats are great", 3), 1.0);
        assert_eq!(text_similarity("Cats Are Great", "catsaregreat", 3), 1.0);
    }

    #[test]
    fn test_different_texts_score_low() {
        let sim = text_similarity("cats are great", "dogs are better", 3);
        assert!(sim < 0.6, "similarity was {}", sim);
    }

    #[test]
    fn test_near_duplicate_scores_high() {
        let sim = text_similarity("cats are great", "CATS ARE GREAT!!", 3);
        assert!(sim > 0.8 && sim < 1.0, "similarity was {}", sim);
    }

    #[test]
    fn test_empty_shingles_give_zero_fingerprint() {
        assert_eq!(Fingerprint::of_text("ab", 3).bits(), 0);
        assert_eq!(Fingerprint::from_shingles(Vec::<String>::new()).bits(), 0);
    }

    #[test]
    fn test_similarity_low_bit_difference() {
        let a = Fingerprint::from_bits(0b1000);
        let b = Fingerprint::from_bits(0b1001);
        // one differing bit at position 0: 1 - 2/2
        assert_eq!(a.similarity(b), 0.0);

        let c = Fingerprint::from_bits(u64::MAX);
        let d = Fingerprint::from_bits(u64::MAX ^ 1);
        assert_eq!(c.similarity(d), 0.0);

        let e = Fingerprint::from_bits(1 << 63);
        let f = Fingerprint::from_bits(0);
        // one differing bit at the top: 1 - 2/65
        assert!((e.similarity(f) - (1.0 - 2.0 / 65.0)).abs() < 1e-12);
    }

    #[test]
    fn test_hamming_distance() {
        assert_eq!(hamming_distance(0b1011, 0b0001), 2);
        assert_eq!(hamming_distance(u64::MAX, 0), 64);
        assert_eq!(
            Fingerprint::from_bits(7).hamming_distance(Fingerprint::from_bits(7)),
            0
        );
    }

    #[test]
    fn test_display_is_hex() {
        assert_eq!(Fingerprint::from_bits(255).to_string(), "00000000000000ff");
    }

    proptest! {
        #[test]
        fn prop_self_similarity_is_one(s in ".{0,40}", k in 1usize..6) {
            let fp = Fingerprint::of_text(&s, k);
            prop_assert_eq!(fp.similarity(fp), 1.0);
        }

        #[test]
        fn prop_similarity_symmetric_and_bounded(a in any::<u64>(), b in any::<u64>()) {
            let fa = Fingerprint::from_bits(a);
            let fb = Fingerprint::from_bits(b);
            let sim = fa.similarity(fb);
            prop_assert_eq!(sim, fb.similarity(fa));
            prop_assert!((0.0..=1.0).contains(&sim));
            if a != b {
                prop_assert!(sim < 1.0);
            }
        }

        #[test]
        fn prop_hamming_symmetric(a in any::<u64>(), b in any::<u64>()) {
            prop_assert_eq!(hamming_distance(a, b), hamming_distance(b, a));
            prop_assert_eq!(hamming_distance(a, a), 0);
        }
    }
}
