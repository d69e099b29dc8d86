// ============================================================
// Layer 4 — Translation Batcher
// ============================================================
// Implements Burn's Batcher trait to convert a Vec of
// TranslationSamples into GPU-ready tensors.
//
// How batching works here:
//   Input:  Vec of N samples with varying sequence lengths
//   Output: TranslationBatch with tensors of shape [N, S]
//
// Unlike a pre-padded pipeline, padding happens HERE, per batch:
// the bucketing scheduler hands us samples of similar length, so
// padding each side to the batch maximum wastes almost nothing.
// Source and target are padded independently — a short German
// sentence can have a long English translation.
//
// Reference: Burn Book §4 (Batcher)
//            Rust Book §8 (Vectors)

use burn::{data::dataloader::batcher::Batcher, prelude::*};

use crate::data::dataset::TranslationSample;
use crate::data::vocab::PAD_IDX;

// ─── TranslationBatch ─────────────────────────────────────────────────────────
/// A batch of sentence pairs ready for the model forward pass.
/// All tensors have batch_size as their first dimension.
///
/// B is the Burn Backend (e.g. Wgpu, NdArray) —
/// generic so the same batcher works on any device.
#[derive(Debug, Clone)]
pub struct TranslationBatch<B: Backend> {
    /// Source token ids — shape: [batch_size, src_len]
    /// Each row: <sos> ids <eos> <pad>...
    pub source: Tensor<B, 2, Int>,

    /// Target token ids — shape: [batch_size, tgt_len]
    /// Same layout; the decoder consumes everything before <eos>
    pub target: Tensor<B, 2, Int>,
}

// ─── TranslationBatcher ───────────────────────────────────────────────────────
/// The batcher struct — holds the target device so tensors
/// are created on the correct GPU/CPU.
#[derive(Clone, Debug)]
pub struct TranslationBatcher<B: Backend> {
    /// The device to create tensors on (e.g. GPU index 0)
    pub device: B::Device,
}

impl<B: Backend> TranslationBatcher<B> {
    /// Create a new batcher for the given device
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Pad every row to the batch maximum and flatten for reshape.
    fn pad_flatten(rows: Vec<&Vec<u32>>) -> (Vec<i32>, usize) {
        let max_len = rows.iter().map(|r| r.len()).max().unwrap_or(0);
        let mut flat = Vec::with_capacity(rows.len() * max_len);
        for row in rows {
            flat.extend(row.iter().map(|&id| id as i32));
            flat.extend(std::iter::repeat(PAD_IDX as i32).take(max_len - row.len()));
        }
        (flat, max_len)
    }
}

// ─── Burn Batcher Trait Implementation ────────────────────────────────────────
// The training loop feeds each bucketed group of samples through
// .batch() to get the pair of Int tensors.
impl<B: Backend> Batcher<TranslationSample, TranslationBatch<B>> for TranslationBatcher<B> {
    fn batch(&self, items: Vec<TranslationSample>) -> TranslationBatch<B> {
        let batch_size = items.len();

        let (src_flat, src_len) =
            Self::pad_flatten(items.iter().map(|s| &s.source_ids).collect());
        let (tgt_flat, tgt_len) =
            Self::pad_flatten(items.iter().map(|s| &s.target_ids).collect());

        // Tensor::from_ints creates a 1D tensor from a slice,
        // then .reshape() gives it the correct 2D shape [batch, seq]
        let source = Tensor::<B, 1, Int>::from_ints(src_flat.as_slice(), &self.device)
            .reshape([batch_size, src_len]);
        let target = Tensor::<B, 1, Int>::from_ints(tgt_flat.as_slice(), &self.device)
            .reshape([batch_size, tgt_len]);

        TranslationBatch { source, target }
    }
}
