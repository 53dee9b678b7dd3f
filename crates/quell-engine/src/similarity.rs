//! Character-sequence similarity.
//!
//! SequenceMatcher-style ratio `2*M / (len(a) + len(b))` where `M` is the
//! longest-common-subsequence length over bytes. Deliberately tokenless:
//! tolerates small word-order and punctuation differences while still
//! penalizing substantively different subjects.

/// Similarity ratio between two strings in `[0.0, 1.0]`.
///
/// Symmetric; 1.0 for identical inputs (including two empty strings);
/// 0.0 when either side is empty or the strings share no common bytes.
pub fn similarity(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();
    let matches = lcs_length(a_bytes, b_bytes);
    2.0 * matches as f64 / (a_bytes.len() + b_bytes.len()) as f64
}

/// LCS length using two-row DP (space-optimised).
fn lcs_length(a: &[u8], b: &[u8]) -> usize {
    let n = b.len();
    let mut prev = vec![0usize; n + 1];
    let mut curr = vec![0usize; n + 1];

    for &ac in a {
        for (j, &bc) in b.iter().enumerate() {
            curr[j + 1] = if ac == bc {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[n]
}
