//! Close-match search for file names.
//!
//! Uses the Ratcliff/Obershelp ratio: `2 * M / (len(a) + len(b))`, where `M`
//! counts characters in the matching blocks found by repeatedly taking the
//! longest common substring and recursing on both sides of it.

/// Default cutoff below which a candidate is not a close match.
pub const DEFAULT_CUTOFF: f64 = 0.6;

/// Default number of close matches returned.
pub const DEFAULT_LIMIT: usize = 3;

/// Similarity of two strings in `[0.0, 1.0]`.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&a, &b) as f64 / total as f64
}

/// Up to `limit` candidates scoring at least `cutoff`, best first.
///
/// Ties keep candidate order.
pub fn close_matches<'a>(
    word: &str,
    candidates: &'a [String],
    limit: usize,
    cutoff: f64,
) -> Vec<&'a str> {
    let mut scored: Vec<(f64, &'a str)> = candidates
        .iter()
        .map(|candidate| (ratio(word, candidate), candidate.as_str()))
        .filter(|(score, _)| *score >= cutoff)
        .collect();

    scored.sort_by(|x, y| y.0.total_cmp(&x.0));
    scored.truncate(limit);
    scored.into_iter().map(|(_, candidate)| candidate).collect()
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];

    while let Some((a_lo, a_hi, b_lo, b_hi)) = pending.pop() {
        let (i, j, size) = longest_match(&a[a_lo..a_hi], &b[b_lo..b_hi]);
        if size == 0 {
            continue;
        }
        total += size;
        pending.push((a_lo, a_lo + i, b_lo, b_lo + j));
        pending.push((a_lo + i + size, a_hi, b_lo + j + size, b_hi));
    }

    total
}

/// Longest common substring as (start in a, start in b, length).
///
/// The earliest block in `a` wins among equally long ones.
fn longest_match(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            if ca == cb {
                let size = previous[j] + 1;
                current[j + 1] = size;
                if size > best.2 {
                    best = (i + 1 - size, j + 1 - size, size);
                }
            }
        }
        previous = current;
    }

    best
}
