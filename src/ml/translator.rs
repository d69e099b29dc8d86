// ============================================================
// Layer 5 — Translator
// ============================================================
// Greedy decoding from a trained checkpoint. Inference never
// needs gradients, so everything runs on the plain Wgpu backend.

use anyhow::Result;
use burn::prelude::*;

use crate::data::vocab::{EOS_IDX, SOS_IDX};
use crate::infra::checkpoint::CheckpointManager;
use crate::ml::model::{Seq2SeqConfig, Seq2SeqModel};

type InferBackend = burn::backend::Wgpu;

pub struct Translator {
    model:          Seq2SeqModel<InferBackend>,
    max_decode_len: usize,
    device:         burn::backend::wgpu::WgpuDevice,
}

impl Translator {
    /// Rebuild the trained architecture from the saved config and
    /// load the latest checkpoint into it. Dropout is zeroed —
    /// it only exists for regularisation during training.
    pub fn from_checkpoint(ckpt_manager: &CheckpointManager) -> Result<Self> {
        let device = burn::backend::wgpu::WgpuDevice::default();
        let cfg = ckpt_manager.load_config()?;
        let model_cfg = Seq2SeqConfig::new(
            cfg.src_vocab_size,
            cfg.tgt_vocab_size,
            cfg.embedding_size,
            cfg.hidden_size,
            cfg.num_layers,
            0.0,
            0.0,
        );
        let model: Seq2SeqModel<InferBackend> = model_cfg.init(&device);
        let model = ckpt_manager.load_model(model, &device)?;
        tracing::info!("Model loaded from checkpoint");
        Ok(Self {
            model,
            max_decode_len: cfg.max_decode_len,
            device,
        })
    }

    /// Greedy-decode one sentence.
    ///
    /// `source_ids` are raw token ids without special tokens; the
    /// <sos>/<eos> wrapping happens here. Encodes once, then feeds
    /// each argmax back in until <eos> or the length cap. Returns
    /// the generated ids without special tokens.
    pub fn translate(&self, source_ids: &[u32]) -> Vec<u32> {
        let mut wrapped: Vec<i32> = Vec::with_capacity(source_ids.len() + 2);
        wrapped.push(SOS_IDX as i32);
        wrapped.extend(source_ids.iter().map(|&id| id as i32));
        wrapped.push(EOS_IDX as i32);
        let src_len = wrapped.len();

        let source = Tensor::<InferBackend, 1, Int>::from_ints(wrapped.as_slice(), &self.device)
            .reshape([1, src_len]);
        let mut state = self.model.encoder.forward(source);

        let mut input = Tensor::<InferBackend, 1, Int>::from_ints(
            [SOS_IDX as i32].as_slice(),
            &self.device,
        );
        let mut output_ids = Vec::new();

        for _ in 0..self.max_decode_len {
            let (logits, next_state) = self.model.decoder.forward(input, &state);
            state = next_state;

            let best_guess = logits.argmax(1).reshape([1]);
            let id = best_guess.clone().into_scalar().elem::<i64>() as u32;
            if id == EOS_IDX {
                break;
            }
            output_ids.push(id);
            input = best_guess;
        }

        output_ids
    }
}
