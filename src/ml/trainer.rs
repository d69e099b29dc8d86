// ============================================================
// Layer 5 — Training Loop
// ============================================================
// Full train + validation loop over length-bucketed batches.
//
// Backend split:
//   - Training uses MyBackend (Autodiff<Wgpu>) for gradients
//   - model.valid() returns the model on MyInnerBackend (Wgpu):
//     dropout off, no autodiff overhead
//
// Per batch: forward with teacher forcing, drop the zero
// placeholder at time step 0, flatten time × batch, padding-aware
// cross-entropy, backward, Adam step. Gradient-norm clipping is
// configured on the optimizer so every step clips before the
// update — the standard fix for exploding LSTM gradients.
//
// Reference: Burn Book §5, Kingma & Ba (2015) Adam,
//            Pascanu et al. (2013) gradient clipping

use anyhow::Result;
use burn::{
    data::dataloader::batcher::Batcher,
    data::dataset::Dataset,
    grad_clipping::GradientClippingConfig,
    module::AutodiffModule,
    nn::loss::CrossEntropyLossConfig,
    optim::{AdamConfig, GradientsParams, Optimizer},
    prelude::*,
};

use crate::application::train_use_case::TrainConfig;
use crate::data::{
    batcher::{TranslationBatch, TranslationBatcher},
    bucketing,
    dataset::TranslationDataset,
    vocab::PAD_IDX,
};
use crate::infra::checkpoint::CheckpointManager;
use crate::infra::metrics::{EpochMetrics, MetricsLogger};
use crate::ml::model::{Seq2SeqConfig, Seq2SeqModel};

type MyBackend      = burn::backend::Autodiff<burn::backend::Wgpu>;
type MyInnerBackend = burn::backend::Wgpu;

pub fn run_training(
    cfg:           &TrainConfig,
    train_dataset: TranslationDataset,
    val_dataset:   TranslationDataset,
    ckpt_manager:  CheckpointManager,
) -> Result<()> {
    let device = burn::backend::wgpu::WgpuDevice::default();
    tracing::info!("Using WGPU device: {:?}", device);
    train_loop(cfg, train_dataset, val_dataset, ckpt_manager, device)
}

fn train_loop(
    cfg:           &TrainConfig,
    train_dataset: TranslationDataset,
    val_dataset:   TranslationDataset,
    ckpt_manager:  CheckpointManager,
    device:        burn::backend::wgpu::WgpuDevice,
) -> Result<()> {
    // ── Build model ───────────────────────────────────────────────────────────
    let model_cfg = Seq2SeqConfig::new(
        cfg.src_vocab_size,
        cfg.tgt_vocab_size,
        cfg.embedding_size,
        cfg.hidden_size,
        cfg.num_layers,
        cfg.encoder_dropout,
        cfg.decoder_dropout,
    );
    let mut model: Seq2SeqModel<MyBackend> = model_cfg.init(&device);
    let mut optim = clipped_adam(cfg.grad_clip).init();

    if cfg.resume {
        model = ckpt_manager.load_model(model, &device)?;
        optim = ckpt_manager.load_optimizer(optim, &device)?;
        tracing::info!("Resumed model and optimizer from latest checkpoint");
    }
    tracing::info!(
        "Model ready: {} layers, hidden={}, vocabs {}→{}",
        cfg.num_layers, cfg.hidden_size, cfg.src_vocab_size, cfg.tgt_vocab_size,
    );

    // ── Batchers for both backends ────────────────────────────────────────────
    let train_batcher = TranslationBatcher::<MyBackend>::new(device.clone());
    let val_batcher   = TranslationBatcher::<MyInnerBackend>::new(device.clone());

    let metrics = MetricsLogger::new(&cfg.checkpoint_dir)?;

    // Validation order never changes, so its plan is built once
    let train_lengths = train_dataset.source_lengths();
    let val_plan =
        bucketing::length_sorted_batches(&val_dataset.source_lengths(), cfg.batch_size);

    // ── Epoch loop ────────────────────────────────────────────────────────────
    for epoch in 1..=cfg.epochs {
        // ── Training phase ────────────────────────────────────────────────────
        let mut train_loss_sum = 0.0f64;
        let mut train_batches  = 0usize;

        for group in bucketing::shuffled_epoch_batches(&train_lengths, cfg.batch_size) {
            let items: Vec<_> = group.iter().filter_map(|&i| train_dataset.get(i)).collect();
            let batch = train_batcher.batch(items);

            let loss = batch_loss(&model, &batch, cfg.teacher_forcing);
            train_loss_sum += loss.clone().into_scalar().elem::<f64>();
            train_batches  += 1;

            // Backward pass + clipped Adam update
            let grads = loss.backward();
            let grads = GradientsParams::from_grads(grads, &model);
            model = optim.step(cfg.lr, model, grads);
        }

        let avg_train_loss = if train_batches > 0 {
            train_loss_sum / train_batches as f64
        } else {
            f64::NAN
        };

        // ── Validation phase ──────────────────────────────────────────────────
        // model.valid() → Seq2SeqModel<MyInnerBackend>; no gradient
        // tracking, dropout disabled. Teacher forcing off so the
        // loss reflects what greedy decoding would actually see —
        // the classic recipe keeps the 0.5 forcing ratio during
        // validation, a deliberate deviation here.
        let model_valid = model.valid();

        let mut val_loss_sum = 0.0f64;
        let mut val_batches  = 0usize;

        for group in &val_plan {
            let items: Vec<_> = group.iter().filter_map(|&i| val_dataset.get(i)).collect();
            let batch = val_batcher.batch(items);

            let loss = batch_loss(&model_valid, &batch, 0.0);
            val_loss_sum += loss.into_scalar().elem::<f64>();
            val_batches  += 1;
        }

        let avg_val_loss = if val_batches > 0 {
            val_loss_sum / val_batches as f64
        } else {
            f64::NAN
        };

        println!(
            "Epoch {:>3}/{} | train_loss={:.4} | val_loss={:.4} | val_ppl={:.2}",
            epoch, cfg.epochs, avg_train_loss, avg_val_loss, avg_val_loss.exp(),
        );

        metrics.log(&EpochMetrics::new(epoch, avg_train_loss, avg_val_loss))?;
        // Optimizer first: save_model writes the latest-epoch
        // pointer, which must only name fully written checkpoints
        ckpt_manager.save_optimizer(&optim, epoch)?;
        ckpt_manager.save_model(&model, epoch)?;
        tracing::info!("Checkpoint saved for epoch {}", epoch);
    }

    tracing::info!("Training complete!");
    Ok(())
}

/// Adam with gradient-norm clipping baked into the optimizer,
/// so every step clips before applying the update.
///
///   m = β1*m + (1-β1)*g        (mean)
///   v = β2*v + (1-β2)*g²       (variance)
///   θ = θ - lr * m / (√v + ε)  (update)
fn clipped_adam(grad_clip: f32) -> AdamConfig {
    AdamConfig::new()
        .with_epsilon(1e-8)
        .with_grad_clipping(Some(GradientClippingConfig::Norm(grad_clip)))
}

/// Cross-entropy over one batch, excluding padding.
///
/// The first output step is the zero placeholder for the consumed
/// <sos> token — it is sliced away before the loss, together with
/// the matching target column, then time and batch dimensions are
/// flattened into one axis of [batch*(tgt_len-1)] predictions.
fn batch_loss<B: Backend>(
    model: &Seq2SeqModel<B>,
    batch: &TranslationBatch<B>,
    teacher_forcing: f64,
) -> Tensor<B, 1> {
    let output = model.forward(batch.source.clone(), batch.target.clone(), teacher_forcing);
    let [batch_size, tgt_len, vocab] = output.dims();

    let logits = output
        .slice([0..batch_size, 1..tgt_len, 0..vocab])
        .reshape([batch_size * (tgt_len - 1), vocab]);
    let targets = batch
        .target
        .clone()
        .slice([0..batch_size, 1..tgt_len])
        .reshape([batch_size * (tgt_len - 1)]);

    CrossEntropyLossConfig::new()
        .with_pad_tokens(Some(vec![PAD_IDX as usize]))
        .init(&logits.device())
        .forward(logits, targets)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset::TranslationSample;
    use crate::data::vocab::{EOS_IDX, SOS_IDX};

    type TestBackend = burn::backend::NdArray;

    fn tiny_batch() -> TranslationBatch<TestBackend> {
        let batcher = TranslationBatcher::<TestBackend>::new(Default::default());
        batcher.batch(vec![
            TranslationSample {
                source_ids: vec![SOS_IDX, 5, 6, EOS_IDX],
                target_ids: vec![SOS_IDX, 4, 5, EOS_IDX],
            },
            TranslationSample {
                source_ids: vec![SOS_IDX, 7, EOS_IDX],
                target_ids: vec![SOS_IDX, 6, EOS_IDX],
            },
        ])
    }

    #[test]
    fn test_batch_loss_is_finite_scalar() {
        let model = Seq2SeqConfig::new(12, 14, 8, 16, 2, 0.0, 0.0)
            .init::<TestBackend>(&Default::default());
        let loss = batch_loss(&model, &tiny_batch(), 1.0);

        assert_eq!(loss.dims(), [1]);
        let value: f32 = loss.into_scalar().elem();
        assert!(value.is_finite());
        assert!(value > 0.0);
    }

    #[test]
    fn test_padding_columns_are_excluded_from_loss() {
        // Appending pure-padding target columns must leave the loss
        // untouched: masked positions never enter the mean. Dropout 0
        // and full teacher forcing keep both passes deterministic.
        use crate::data::vocab::PAD_IDX;

        let device = Default::default();
        let model =
            Seq2SeqConfig::new(12, 14, 8, 16, 1, 0.0, 0.0).init::<TestBackend>(&device);

        let source = Tensor::<TestBackend, 1, Int>::from_ints(
            [SOS_IDX as i32, 5, EOS_IDX as i32].as_slice(),
            &device,
        )
        .reshape([1, 3]);
        let target = Tensor::<TestBackend, 1, Int>::from_ints(
            [SOS_IDX as i32, 4, EOS_IDX as i32].as_slice(),
            &device,
        )
        .reshape([1, 3]);
        let target_padded = Tensor::<TestBackend, 1, Int>::from_ints(
            [SOS_IDX as i32, 4, EOS_IDX as i32, PAD_IDX as i32, PAD_IDX as i32].as_slice(),
            &device,
        )
        .reshape([1, 5]);

        let plain = TranslationBatch {
            source: source.clone(),
            target,
        };
        let padded = TranslationBatch {
            source,
            target: target_padded,
        };

        let a: f32 = batch_loss(&model, &plain, 1.0).into_scalar().elem();
        let b: f32 = batch_loss(&model, &padded, 1.0).into_scalar().elem();
        assert!((a - b).abs() < 1e-5, "padding leaked into the loss: {a} vs {b}");
    }

    #[test]
    fn test_optimizer_clips_gradients_at_configured_norm() {
        let cfg = clipped_adam(1.0);
        assert!(matches!(
            cfg.grad_clipping,
            Some(GradientClippingConfig::Norm(n)) if n == 1.0
        ));
    }

    #[test]
    fn test_resumed_optimizer_steps_like_a_continuous_run() {
        // Adam's moment estimates must survive the checkpoint: a
        // reloaded optimizer and the one that kept running have to
        // produce identical parameters from identical gradients.
        type AutodiffTest = burn::backend::Autodiff<burn::backend::NdArray>;

        let dir = std::env::temp_dir().join("nmt-trainer-optim-resume");
        std::fs::create_dir_all(&dir).unwrap();
        let ckpt = CheckpointManager::new(dir.to_str().unwrap());

        let device = Default::default();
        let model: Seq2SeqModel<AutodiffTest> =
            Seq2SeqConfig::new(12, 14, 8, 16, 1, 0.0, 0.0).init(&device);
        let batcher = TranslationBatcher::<AutodiffTest>::new(Default::default());
        let batch = batcher.batch(vec![TranslationSample {
            source_ids: vec![SOS_IDX, 5, 6, EOS_IDX],
            target_ids: vec![SOS_IDX, 4, 5, EOS_IDX],
        }]);

        // One real step so the moment estimates are non-zero
        let mut optim = clipped_adam(1.0).init();
        let grads = GradientsParams::from_grads(
            batch_loss(&model, &batch, 1.0).backward(),
            &model,
        );
        let model = optim.step(1e-3, model, grads);

        ckpt.save_model(&model, 1).unwrap();
        ckpt.save_optimizer(&optim, 1).unwrap();
        let mut resumed = ckpt
            .load_optimizer(clipped_adam(1.0).init(), &device)
            .unwrap();

        // Same gradients through both optimizers
        let grads_a = GradientsParams::from_grads(
            batch_loss(&model, &batch, 1.0).backward(),
            &model,
        );
        let grads_b = GradientsParams::from_grads(
            batch_loss(&model, &batch, 1.0).backward(),
            &model,
        );
        let stepped_a = optim.step(1e-3, model.clone(), grads_a);
        let stepped_b = resumed.step(1e-3, model, grads_b);

        let out_a = stepped_a.forward(batch.source.clone(), batch.target.clone(), 1.0);
        let out_b = stepped_b.forward(batch.source.clone(), batch.target.clone(), 1.0);
        out_a.into_data().assert_approx_eq(&out_b.into_data(), 5);
    }
}
