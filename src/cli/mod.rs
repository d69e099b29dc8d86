// ============================================================
// Layer 1 — CLI / Presentation Layer
// ============================================================
// This is the entry point for all user interaction.
// It uses the `clap` crate to parse command line arguments.
// All business logic is delegated to Layer 2 (application).
//
// Three commands are supported:
//   1. `train`     — trains the translation model on a parallel corpus
//   2. `translate` — loads a checkpoint and translates one sentence
//   3. `evaluate`  — scores the test split with corpus BLEU
//
// Reference: Rust Book §7 (Modules), §12 (CLI programs)

// Declare the commands submodule
pub mod commands;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, EvaluateArgs, TrainArgs, TranslateArgs};

/// The main CLI struct — clap reads the fields and generates
/// argument parsing code automatically via the Parser derive macro.
#[derive(Parser, Debug)]
#[command(
    name = "seq2seq-nmt",
    version = "0.1.0",
    about = "Train an LSTM encoder/decoder on a German-English corpus, translate sentences, score with BLEU."
)]
pub struct Cli {
    /// The subcommand to run (train, translate or evaluate)
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Match on the subcommand and dispatch to the correct use case.
    /// This keeps the CLI layer thin — it only routes, never computes.
    pub fn run(self) -> Result<()> {
        match &self.command {
            Commands::Train(args) => self.run_train(args.clone()),
            Commands::Translate(args) => self.run_translate(args.clone()),
            Commands::Evaluate(args) => self.run_evaluate(args.clone()),
        }
    }

    /// Handles the `train` subcommand.
    /// Converts CLI args into a TrainConfig and hands off to Layer 2.
    fn run_train(&self, args: TrainArgs) -> Result<()> {
        use crate::application::train_use_case::TrainUseCase;

        tracing::info!("Starting training on corpus in: {}", args.data_dir);

        // Convert CLI args → application config (separates presentation from domain)
        let use_case = TrainUseCase::new(args.into());
        use_case.execute()?;

        println!("Training complete. Checkpoint saved.");
        Ok(())
    }

    /// Handles the `translate` subcommand.
    /// Loads the model from checkpoint and prints the translation.
    fn run_translate(&self, args: TranslateArgs) -> Result<()> {
        use crate::application::translate_use_case::TranslateUseCase;

        let use_case = TranslateUseCase::new(args.checkpoint_dir.clone())?;
        let translation = use_case.translate(&args.sentence)?;
        println!("\n{}", translation);
        Ok(())
    }

    /// Handles the `evaluate` subcommand.
    /// Greedily decodes the whole test split and prints the BLEU score.
    fn run_evaluate(&self, args: EvaluateArgs) -> Result<()> {
        use crate::application::evaluate_use_case::EvaluateUseCase;

        let use_case = EvaluateUseCase::new(
            args.checkpoint_dir.clone(),
            args.data_dir.clone(),
        )?;
        let score = use_case.execute()?;
        println!("Bleu score {:.4}", score);
        Ok(())
    }
}
