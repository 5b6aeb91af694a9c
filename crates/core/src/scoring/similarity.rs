//! Character-level likeness between two strings.

/// Likeness ratio in `[0, 1]`.
///
/// Both inputs are lowercased first, so differences in case never change the
/// score. The ratio is `2 * M / (len(a) + len(b))` where `M` is the length of
/// the longest common subsequence of the two character sequences, which makes
/// the score symmetric. Punctuation is compared like any other character.
///
/// Two empty strings are identical and score `1.0`.
#[must_use]
pub fn score(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().flat_map(char::to_lowercase).collect();
    let b: Vec<char> = b.chars().flat_map(char::to_lowercase).collect();

    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = longest_common_subsequence(&a, &b);

    #[allow(clippy::cast_precision_loss)]
    let ratio = (2 * matched) as f64 / total as f64;
    ratio.clamp(0.0, 1.0)
}

/// Score as a whole percentage, rounded to nearest.
#[must_use]
pub fn percent(a: &str, b: &str) -> u8 {
    // score is clamped to [0, 1], so the product fits in u8.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let pct = (score(a, b) * 100.0).round() as u8;
    pct
}

fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let (short, long) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return 0;
    }

    let mut prev = vec![0_usize; short.len() + 1];
    let mut curr = vec![0_usize; short.len() + 1];
    for &lc in long {
        for (j, &sc) in short.iter().enumerate() {
            curr[j + 1] = if lc == sc {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[short.len()]
}
