// ============================================================
// Layer 1 — CLI Commands and Arguments
// ============================================================
// Defines the three subcommands: `train`, `translate` and
// `evaluate`, and all their configurable flags.
//
// clap's derive macros automatically generate:
//   - help text (--help)
//   - error messages for missing args
//   - type conversion (string → usize, f64, etc.)
//
// Reference: Rust Book §12 (Building a CLI Program)

use clap::{Args, Subcommand};
use crate::application::train_use_case::TrainConfig;

/// The three top-level subcommands available to the user
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Train the translation model on a parallel sentence corpus
    Train(TrainArgs),

    /// Translate a single sentence using a trained checkpoint
    Translate(TranslateArgs),

    /// Compute corpus BLEU over the test split
    Evaluate(EvaluateArgs),
}

/// All arguments for the `train` command.
/// Each field becomes a --flag on the command line.
/// Defaults match the classic Multi30k seq2seq recipe.
#[derive(Args, Debug, Clone)]
pub struct TrainArgs {
    /// Directory holding the corpus splits: {train,val,test}.{de,en}
    #[arg(long, default_value = "data/multi30k")]
    pub data_dir: String,

    /// Directory to save model checkpoints, vocabularies and tokenizers
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,

    /// File extension identifying the source language
    #[arg(long, default_value = "de")]
    pub src_ext: String,

    /// File extension identifying the target language
    #[arg(long, default_value = "en")]
    pub tgt_ext: String,

    /// Number of full passes through the training data
    #[arg(long, default_value_t = 20)]
    pub epochs: usize,

    /// Adam learning rate
    #[arg(long, default_value_t = 1e-3)]
    pub lr: f64,

    /// Number of sentence pairs per mini-batch
    #[arg(long, default_value_t = 64)]
    pub batch_size: usize,

    /// Dimension of the source and target token embeddings
    #[arg(long, default_value_t = 300)]
    pub embedding_size: usize,

    /// Hidden dimension of every LSTM layer
    #[arg(long, default_value_t = 1024)]
    pub hidden_size: usize,

    /// Number of stacked LSTM layers in encoder and decoder
    #[arg(long, default_value_t = 2)]
    pub num_layers: usize,

    /// Encoder dropout probability (embeddings and between layers)
    #[arg(long, default_value_t = 0.5)]
    pub encoder_dropout: f64,

    /// Decoder dropout probability (embeddings and between layers)
    #[arg(long, default_value_t = 0.5)]
    pub decoder_dropout: f64,

    /// Probability of feeding the ground-truth previous token
    /// to the decoder instead of its own prediction
    #[arg(long, default_value_t = 0.5)]
    pub teacher_forcing: f64,

    /// Minimum corpus frequency for a token to enter the vocabulary
    #[arg(long, default_value_t = 2)]
    pub min_freq: usize,

    /// Maximum vocabulary size per language (special tokens included)
    #[arg(long, default_value_t = 10_000)]
    pub max_vocab: usize,

    /// Gradient norm clipping threshold — stabilises LSTM training
    /// against exploding gradients
    #[arg(long, default_value_t = 1.0)]
    pub grad_clip: f32,

    /// Resume from the latest checkpoint instead of fresh weights
    #[arg(long, default_value_t = false)]
    pub resume: bool,
}

/// Convert CLI TrainArgs into the application-layer TrainConfig.
/// This is the boundary between Layer 1 and Layer 2 —
/// the application layer never sees clap types.
impl From<TrainArgs> for TrainConfig {
    fn from(a: TrainArgs) -> Self {
        TrainConfig {
            data_dir:        a.data_dir,
            checkpoint_dir:  a.checkpoint_dir,
            src_ext:         a.src_ext,
            tgt_ext:         a.tgt_ext,
            epochs:          a.epochs,
            lr:              a.lr,
            batch_size:      a.batch_size,
            embedding_size:  a.embedding_size,
            hidden_size:     a.hidden_size,
            num_layers:      a.num_layers,
            encoder_dropout: a.encoder_dropout,
            decoder_dropout: a.decoder_dropout,
            teacher_forcing: a.teacher_forcing,
            min_freq:        a.min_freq,
            max_vocab:       a.max_vocab,
            grad_clip:       a.grad_clip,
            resume:          a.resume,
            // Filled in after the vocabularies are built
            src_vocab_size:  0,
            tgt_vocab_size:  0,
            max_decode_len:  50,
        }
    }
}

/// All arguments for the `translate` command
#[derive(Args, Debug, Clone)]
pub struct TranslateArgs {
    /// The source-language sentence to translate
    #[arg(long)]
    pub sentence: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}

/// All arguments for the `evaluate` command
#[derive(Args, Debug, Clone)]
pub struct EvaluateArgs {
    /// Directory holding the corpus splits (same as used during training)
    #[arg(long, default_value = "data/multi30k")]
    pub data_dir: String,

    /// Directory where checkpoints were saved during training
    #[arg(long, default_value = "checkpoints")]
    pub checkpoint_dir: String,
}
