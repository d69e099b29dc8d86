// ============================================================
// Layer 4 — Length Bucketing
// ============================================================
// Groups samples with similar source lengths into the same
// mini-batch so that per-batch padding is minimal.
//
// Why does this matter?
//   Padding tokens are excluded from the loss but still cost a
//   full forward step each. A batch mixing a 4-token and a
//   40-token sentence pads the short one with 36 <pad> tokens —
//   90% wasted compute. Sorting by length first means neighbours
//   in a batch differ by at most a token or two.
//
// Procedure:
//   1. Sort sample indices by source length (stable, so the
//      plan is deterministic for a fixed dataset)
//   2. Chunk the sorted order into batch_size groups
//   3. Shuffle the ORDER OF BATCHES each epoch — the model must
//      not see strictly short→long batches, but shuffling inside
//      a batch would undo the bucketing
//
// Reference: Rust Book §8 (Vectors)
//            rand crate documentation

use rand::seq::SliceRandom;

/// Deterministic bucketing plan: indices sorted by length,
/// chunked into batches of `batch_size` (last one may be short).
pub fn length_sorted_batches(lengths: &[usize], batch_size: usize) -> Vec<Vec<usize>> {
    assert!(batch_size > 0, "batch_size must be positive");

    let mut order: Vec<usize> = (0..lengths.len()).collect();
    // Tie-break on the index itself to stay fully deterministic
    order.sort_by_key(|&i| (lengths[i], i));

    order.chunks(batch_size).map(<[usize]>::to_vec).collect()
}

/// Epoch schedule: the deterministic plan with batch order shuffled.
pub fn shuffled_epoch_batches(lengths: &[usize], batch_size: usize) -> Vec<Vec<usize>> {
    let mut batches = length_sorted_batches(lengths, batch_size);
    batches.shuffle(&mut rand::thread_rng());
    batches
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_index_appears_exactly_once() {
        let lengths = vec![7, 3, 9, 1, 4, 4, 8, 2];
        let batches = length_sorted_batches(&lengths, 3);

        let mut seen: Vec<usize> = batches.into_iter().flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..lengths.len()).collect::<Vec<_>>());
    }

    #[test]
    fn test_batches_hold_similar_lengths() {
        // 4 short and 4 long sentences, batch_size 4: after sorting,
        // no batch should mix the two populations.
        let lengths = vec![30, 4, 31, 5, 32, 6, 33, 7];
        let batches = length_sorted_batches(&lengths, 4);

        assert_eq!(batches.len(), 2);
        assert!(batches[0].iter().all(|&i| lengths[i] < 10));
        assert!(batches[1].iter().all(|&i| lengths[i] >= 30));
    }

    #[test]
    fn test_last_batch_may_be_short() {
        let lengths = vec![1, 2, 3, 4, 5];
        let batches = length_sorted_batches(&lengths, 2);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[2].len(), 1);
    }

    #[test]
    fn test_plan_is_deterministic() {
        let lengths = vec![5, 5, 5, 2, 2, 9];
        assert_eq!(
            length_sorted_batches(&lengths, 2),
            length_sorted_batches(&lengths, 2),
        );
    }

    #[test]
    fn test_shuffle_keeps_batch_contents() {
        let lengths: Vec<usize> = (0..20).map(|i| i % 7).collect();
        let plan = length_sorted_batches(&lengths, 4);
        let mut shuffled = shuffled_epoch_batches(&lengths, 4);

        // Same batches, possibly different order
        shuffled.sort();
        let mut plan = plan;
        plan.sort();
        assert_eq!(plan, shuffled);
    }

    #[test]
    fn test_empty_dataset() {
        let batches = length_sorted_batches(&[], 8);
        assert!(batches.is_empty());
    }
}
