// ============================================================
// Layer 3 — Corpus BLEU
// ============================================================
// BLEU compares machine translations against references using
// modified (clipped) n-gram precision and a brevity penalty.
//
//   BLEU = BP * exp( sum_n w_n * ln p_n )        n = 1..4
//
//   p_n = clipped n-gram matches / hypothesis n-gram count,
//         aggregated over the whole corpus (NOT averaged per
//         sentence — that is the common sentence-BLEU mistake)
//   BP  = 1 if hyp_len > ref_len, else exp(1 - ref_len/hyp_len)
//
// Clipping means a hypothesis n-gram is only credited as many
// times as it appears in the reference, so "the the the the"
// cannot farm unigram matches.
//
// Pure token counting — no tensors, runs in unit tests without
// a GPU, which is why it lives in the domain layer.
//
// Reference: Papineni et al. (2002) BLEU

use std::collections::HashMap;

/// Highest n-gram order used by the standard BLEU-4 score.
const MAX_NGRAM: usize = 4;

/// Corpus-level BLEU-4 with uniform weights over already
/// tokenised hypotheses and single references.
///
/// `hypotheses[i]` is scored against `references[i]`; both sides
/// must have the same length. Returns a value in [0.0, 1.0].
pub fn corpus_bleu(hypotheses: &[Vec<String>], references: &[Vec<String>]) -> f64 {
    assert_eq!(
        hypotheses.len(),
        references.len(),
        "each hypothesis needs exactly one reference"
    );
    if hypotheses.is_empty() {
        return 0.0;
    }

    let mut hyp_len = 0usize;
    let mut ref_len = 0usize;
    // matches[n-1] / totals[n-1] accumulate clipped counts per order
    let mut matches = [0usize; MAX_NGRAM];
    let mut totals = [0usize; MAX_NGRAM];

    for (hyp, reference) in hypotheses.iter().zip(references) {
        hyp_len += hyp.len();
        ref_len += reference.len();

        for n in 1..=MAX_NGRAM {
            let (m, t) = clipped_matches(hyp, reference, n);
            matches[n - 1] += m;
            totals[n - 1] += t;
        }
    }

    // Geometric mean of the modified precisions. A single empty
    // precision zeroes the whole score, matching reference BLEU.
    let mut log_sum = 0.0f64;
    for n in 0..MAX_NGRAM {
        if matches[n] == 0 || totals[n] == 0 {
            return 0.0;
        }
        log_sum += (matches[n] as f64 / totals[n] as f64).ln();
    }
    let precision = (log_sum / MAX_NGRAM as f64).exp();

    precision * brevity_penalty(hyp_len, ref_len)
}

/// Count hypothesis n-grams of order `n`, clipped by how often
/// each n-gram occurs in the reference.
/// Returns (clipped matches, total hypothesis n-grams).
fn clipped_matches(hyp: &[String], reference: &[String], n: usize) -> (usize, usize) {
    let hyp_counts = ngram_counts(hyp, n);
    let ref_counts = ngram_counts(reference, n);

    let total: usize = hyp_counts.values().sum();
    let matched: usize = hyp_counts
        .iter()
        .map(|(gram, &count)| count.min(*ref_counts.get(gram).unwrap_or(&0)))
        .sum();

    (matched, total)
}

/// Multiset of n-grams in a token sequence, keyed by the joined tokens.
fn ngram_counts(tokens: &[String], n: usize) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    if tokens.len() < n {
        return counts;
    }
    for window in tokens.windows(n) {
        *counts.entry(window.join(" ")).or_insert(0) += 1;
    }
    counts
}

/// Penalises hypotheses shorter than their references.
/// Precision alone would reward dropping hard-to-translate words.
fn brevity_penalty(hyp_len: usize, ref_len: usize) -> f64 {
    if hyp_len == 0 {
        return 0.0;
    }
    if hyp_len > ref_len {
        1.0
    } else {
        (1.0 - ref_len as f64 / hyp_len as f64).exp()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn test_perfect_match_scores_one() {
        let hyp = vec![toks("a cat sits on the mat")];
        let refs = vec![toks("a cat sits on the mat")];
        let score = corpus_bleu(&hyp, &refs);
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_tokens_score_zero() {
        let hyp = vec![toks("x y z w v u")];
        let refs = vec![toks("a b c d e f")];
        assert_eq!(corpus_bleu(&hyp, &refs), 0.0);
    }

    #[test]
    fn test_missing_fourgram_scores_zero() {
        // Unigrams match but there is no common 4-gram,
        // so the geometric mean collapses to zero.
        let hyp = vec![toks("a b c x d e f")];
        let refs = vec![toks("a b c y d e f")];
        assert_eq!(corpus_bleu(&hyp, &refs), 0.0);
    }

    #[test]
    fn test_repetition_is_clipped() {
        // "the" appears twice in the reference, so a hypothesis of
        // seven "the"s gets at most 2 unigram matches out of 7.
        let hyp = vec![toks("the the the the the the the")];
        let refs = vec![toks("the cat is on the mat")];
        let (m, t) = clipped_matches(&hyp[0], &refs[0], 1);
        assert_eq!((m, t), (2, 7));
    }

    #[test]
    fn test_short_hypothesis_is_penalised() {
        // Identical prefix, but the hypothesis drops half the reference.
        let hyp = vec![toks("a b c d")];
        let refs = vec![toks("a b c d e f g h")];
        let score = corpus_bleu(&hyp, &refs);
        assert!(score > 0.0);
        assert!(score < (1.0f64 - 8.0 / 4.0).exp() + 1e-9);
    }

    #[test]
    fn test_brevity_penalty_inactive_when_longer() {
        assert_eq!(brevity_penalty(10, 8), 1.0);
    }

    #[test]
    fn test_corpus_aggregation_beats_sentence_average() {
        // One perfect and one partial hypothesis — counts must pool
        // across the corpus before the precision ratio is taken.
        let hyp = vec![toks("a b c d e"), toks("a b c d x")];
        let refs = vec![toks("a b c d e"), toks("a b c d e")];
        let score = corpus_bleu(&hyp, &refs);
        assert!(score > 0.0 && score < 1.0);
    }

    #[test]
    fn test_empty_corpus() {
        let hyp: Vec<Vec<String>> = Vec::new();
        let refs: Vec<Vec<String>> = Vec::new();
        assert_eq!(corpus_bleu(&hyp, &refs), 0.0);
    }
}
