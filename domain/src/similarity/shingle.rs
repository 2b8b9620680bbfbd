//! Text shingling
//!
//! A shingle is a character n-gram of the normalized text. Normalization
//! removes whitespace and lowercases, so "Cats are" and "catsare" produce
//! the same shingles.

use std::collections::HashSet;

/// Remove all whitespace and lowercase the remaining characters
pub fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// All distinct length-`k` character substrings of the normalized text
///
/// An empty text, `k == 0`, or `k` larger than the normalized length yields
/// an empty set.
pub fn shingles(text: &str, k: usize) -> HashSet<String> {
    let chars: Vec<char> = normalize(text).chars().collect();
    if k == 0 || chars.len() < k {
        return HashSet::new();
    }

    chars.windows(k).map(|window| window.iter().collect()).collect()
}

/// Jaccard coefficient of two shingle sets
///
/// J(A, B) = |A ∩ B| / |A ∪ B|. Two empty sets are identical (1.0).
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("Cats Are\tGreat"), "catsaregreat");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_shingles_basic() {
        let set = shingles("abcd", 3);
        assert_eq!(set.len(), 2);
        assert!(set.contains("abc"));
        assert!(set.contains("bcd"));
    }

    #[test]
    fn test_shingles_ignore_case_and_spaces() {
        assert_eq!(shingles("A B C D", 2), shingles("abcd", 2));
    }

    #[test]
    fn test_shingles_deduplicate() {
        let set = shingles("aaaa", 2);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_shingles_empty_cases() {
        assert!(shingles("", 3).is_empty());
        assert!(shingles("ab", 3).is_empty());
        assert!(shingles("   ", 1).is_empty());
        assert!(shingles("abc", 0).is_empty());
    }

    #[test]
    fn test_shingles_multibyte() {
        let set = shingles("ÄÖÜ", 2);
        assert!(set.contains("äö"));
        assert!(set.contains("öü"));
    }

    #[test]
    fn test_jaccard() {
        let a = shingles("abcd", 2);
        let b = shingles("abce", 2);
        // {ab, bc, cd} vs {ab, bc, ce}: 2 shared out of 4
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < 1e-9);
        assert_eq!(jaccard_similarity(&a, &a), 1.0);
        assert_eq!(jaccard_similarity(&HashSet::new(), &HashSet::new()), 1.0);
    }
}
