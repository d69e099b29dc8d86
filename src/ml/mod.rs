// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// This layer contains ALL Burn framework specific code.
// No other layer imports from burn directly — only this one
// and the data batcher.
//
// Why isolate Burn code here?
//   - If Burn's API changes, we only update this layer
//   - Other layers are testable without a GPU
//   - The model architecture is clearly separated from
//     data loading and application logic
//
// What's in this layer:
//
//   model.rs      — The recurrent encoder/decoder architecture
//                   • Encoder: embedding → dropout → stacked
//                     LSTMs → final hidden/cell state
//                   • Decoder: one LSTM step per call, seeded
//                     with the previous state, projected to
//                     target-vocabulary logits
//                   • Seq2SeqModel: encode once, decode step by
//                     step with the teacher-forcing coin flip
//
//   trainer.rs    — The training loop
//                   Bucketed batches, padding-aware cross-entropy,
//                   Adam with gradient-norm clipping, a validation
//                   pass per epoch, checkpoint saving
//
//   translator.rs — Greedy decoding
//                   Loads a checkpoint, encodes a source sentence,
//                   feeds the argmax back in until <eos>
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)
//            Sutskever et al. (2014) Sequence to Sequence Learning
//            Hochreiter & Schmidhuber (1997) LSTM

/// LSTM encoder/decoder model architecture
pub mod model;

/// Full training loop with validation and checkpointing
pub mod trainer;

/// Greedy decoding from a trained checkpoint
pub mod translator;
