// ============================================================
// Layer 2 — TrainUseCase
// ============================================================
// Orchestrates the full training pipeline in order:
//
//   Step 1: Load train/val corpus splits   (Layer 4 - data)
//   Step 2: Clean and tokenise the text    (Layer 4 - data)
//   Step 3: Build both vocabularies        (Layer 4 - data)
//   Step 4: Build/persist tokenizers       (Layer 6 - infra)
//   Step 5: Numericalise into samples      (Layer 4 - data)
//   Step 6: Build datasets                 (Layer 4 - data)
//   Step 7: Save config + vocabularies     (Layer 6 - infra)
//   Step 8: Run training loop              (Layer 5 - ml)
//
// Reference: Rust Book §13 (Iterators and Closures)
//            Burn Book §5 (Training)

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer;

use crate::data::{
    dataset::{TranslationDataset, TranslationSample},
    loader::ParallelCorpusLoader,
    preprocessor::Preprocessor,
    vocab::Vocabulary,
};
use crate::domain::sentence_pair::SentencePair;
use crate::domain::traits::CorpusSource;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::trainer::run_training;

// ─── Training Configuration ──────────────────────────────────────────────────
// All hyperparameters for a training run.
// Serialisable so it can be saved to disk and reloaded for
// translation/evaluation. The #[derive(Serialize, Deserialize)]
// macros from serde handle reading/writing this struct to JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    pub data_dir:        String,
    pub checkpoint_dir:  String,
    pub src_ext:         String,
    pub tgt_ext:         String,
    pub epochs:          usize,
    pub lr:              f64,
    pub batch_size:      usize,
    pub embedding_size:  usize,
    pub hidden_size:     usize,
    pub num_layers:      usize,
    pub encoder_dropout: f64,
    pub decoder_dropout: f64,
    pub teacher_forcing: f64,
    pub min_freq:        usize,
    pub max_vocab:       usize,
    pub grad_clip:       f32,
    pub resume:          bool,
    /// Filled in after the vocabularies are built — translation
    /// needs these to rebuild the embedding and projection sizes
    pub src_vocab_size:  usize,
    pub tgt_vocab_size:  usize,
    /// Hard stop for greedy decoding when <eos> never appears
    pub max_decode_len:  usize,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            data_dir:        "data/multi30k".to_string(),
            checkpoint_dir:  "checkpoints".to_string(),
            src_ext:         "de".to_string(),
            tgt_ext:         "en".to_string(),
            epochs:          20,
            lr:              1e-3,
            batch_size:      64,
            embedding_size:  300,
            hidden_size:     1024,
            num_layers:      2,
            encoder_dropout: 0.5,
            decoder_dropout: 0.5,
            teacher_forcing: 0.5,
            min_freq:        2,
            max_vocab:       10_000,
            grad_clip:       1.0,
            resume:          false,
            src_vocab_size:  0,
            tgt_vocab_size:  0,
            max_decode_len:  50,
        }
    }
}

// ─── TrainUseCase ─────────────────────────────────────────────────────────────
// Owns the config and runs the full training pipeline.
pub struct TrainUseCase {
    config: TrainConfig,
}

impl TrainUseCase {
    /// Create a new TrainUseCase with the given configuration
    pub fn new(config: TrainConfig) -> Self {
        Self { config }
    }

    /// Execute the full training pipeline end to end
    pub fn execute(&self) -> Result<()> {
        let cfg = &self.config;

        // Reject impossible hyperparameters up front, before any
        // corpus I/O happens
        if cfg.batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        // ── Step 1: Load the corpus splits ────────────────────────────────────
        tracing::info!("Loading parallel corpus from '{}'", cfg.data_dir);
        let loader = ParallelCorpusLoader::new(&cfg.data_dir, &cfg.src_ext, &cfg.tgt_ext);
        let train_pairs = loader.load_split("train")?;
        let val_pairs = loader.load_split("val")?;

        // ── Step 2: Clean and tokenise the TRAINING split ─────────────────────
        // Vocabularies are built from training data only — the
        // validation/test sets must stay unseen, down to their words.
        let prep = Preprocessor::new();
        let src_tokens: Vec<Vec<String>> = train_pairs
            .iter()
            .map(|p| prep.word_tokens(&prep.clean(&p.source)))
            .collect();
        let tgt_tokens: Vec<Vec<String>> = train_pairs
            .iter()
            .map(|p| prep.word_tokens(&prep.clean(&p.target)))
            .collect();

        // ── Step 3: Build both vocabularies ───────────────────────────────────
        let src_vocab = Vocabulary::build(&src_tokens, cfg.min_freq, cfg.max_vocab);
        let tgt_vocab = Vocabulary::build(&tgt_tokens, cfg.min_freq, cfg.max_vocab);
        tracing::info!(
            "Vocabularies: {} {} tokens, {} {} tokens",
            src_vocab.len(), cfg.src_ext, tgt_vocab.len(), cfg.tgt_ext,
        );

        // ── Step 4: Build / load tokenizers, persist vocabularies ─────────────
        // The tokenizer JSONs share the vocabulary ids, so training
        // and inference number text identically.
        let tok_store = TokenizerStore::new(&cfg.checkpoint_dir);
        tok_store.save_vocab(&cfg.src_ext, &src_vocab)?;
        tok_store.save_vocab(&cfg.tgt_ext, &tgt_vocab)?;
        let src_tokenizer = tok_store.load_or_build(&cfg.src_ext, &src_vocab)?;
        let tgt_tokenizer = tok_store.load_or_build(&cfg.tgt_ext, &tgt_vocab)?;

        // ── Step 5: Numericalise both splits into samples ─────────────────────
        let train_samples =
            build_samples(&train_pairs, &prep, &src_tokenizer, &tgt_tokenizer)?;
        let val_samples = build_samples(&val_pairs, &prep, &src_tokenizer, &tgt_tokenizer)?;
        tracing::info!(
            "Numericalised {} train and {} validation samples",
            train_samples.len(),
            val_samples.len()
        );

        // ── Step 6: Build Burn datasets ───────────────────────────────────────
        let train_dataset = TranslationDataset::new(train_samples);
        let val_dataset = TranslationDataset::new(val_samples);

        // ── Step 7: Save the completed config ─────────────────────────────────
        // The vocab sizes decide the embedding/projection dimensions,
        // so they must be in the JSON before anyone reloads the model.
        let mut cfg = cfg.clone();
        cfg.src_vocab_size = src_vocab.len();
        cfg.tgt_vocab_size = tgt_vocab.len();

        let ckpt_manager = CheckpointManager::new(&cfg.checkpoint_dir);
        ckpt_manager.save_config(&cfg)?;

        // ── Step 8: Run training loop (Layer 5) ───────────────────────────────
        run_training(&cfg, train_dataset, val_dataset, ckpt_manager)?;

        Ok(())
    }
}

/// Clean, tokenise and numericalise sentence pairs.
/// Each side becomes <sos> tokenizer-ids <eos>.
fn build_samples(
    pairs: &[SentencePair],
    prep: &Preprocessor,
    src_tokenizer: &Tokenizer,
    tgt_tokenizer: &Tokenizer,
) -> Result<Vec<TranslationSample>> {
    let mut samples = Vec::with_capacity(pairs.len());

    for pair in pairs {
        let src_enc = src_tokenizer
            .encode(prep.clean(&pair.source).as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;
        let tgt_enc = tgt_tokenizer
            .encode(prep.clean(&pair.target).as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        samples.push(TranslationSample {
            source_ids: Vocabulary::wrap_ids(src_enc.get_ids()),
            target_ids: Vocabulary::wrap_ids(tgt_enc.get_ids()),
        });
    }

    Ok(samples)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_matches_training_recipe() {
        let cfg = TrainConfig::default();
        assert_eq!(cfg.epochs, 20);
        assert_eq!(cfg.batch_size, 64);
        assert_eq!(cfg.embedding_size, 300);
        assert_eq!(cfg.hidden_size, 1024);
        assert_eq!(cfg.num_layers, 2);
        assert_eq!(cfg.teacher_forcing, 0.5);
        assert_eq!(cfg.grad_clip, 1.0);
        assert_eq!(cfg.min_freq, 2);
        assert_eq!(cfg.max_vocab, 10_000);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let mut cfg = TrainConfig::default();
        cfg.batch_size = 0;
        let err = TrainUseCase::new(cfg).execute().unwrap_err();
        assert!(err.to_string().contains("batch_size"));
    }

    #[test]
    fn test_config_roundtrips_through_json() {
        let mut cfg = TrainConfig::default();
        cfg.src_vocab_size = 7_853;
        cfg.tgt_vocab_size = 5_893;

        let json = serde_json::to_string(&cfg).unwrap();
        let back: TrainConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.src_vocab_size, 7_853);
        assert_eq!(back.tgt_vocab_size, 5_893);
        assert_eq!(back.hidden_size, cfg.hidden_size);
    }
}
