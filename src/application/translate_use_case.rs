// ============================================================
// Layer 2 — Translate Use Case
// ============================================================
// Single-sentence translation from a trained checkpoint:
//   1. Load the saved source tokenizer and target vocabulary
//   2. Rebuild the model and load the latest weights
//   3. Clean + tokenise the input, greedy-decode, detokenise

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::{preprocessor::Preprocessor, vocab::Vocabulary};
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::translator::Translator;

pub struct TranslateUseCase {
    src_tokenizer: Tokenizer,
    tgt_vocab:     Vocabulary,
    translator:    Translator,
}

impl TranslateUseCase {
    pub fn new(checkpoint_dir: String) -> Result<Self> {
        let ckpt = CheckpointManager::new(&checkpoint_dir);
        let cfg = ckpt.load_config()?;

        let tok_store = TokenizerStore::new(&checkpoint_dir);
        let src_tokenizer = tok_store.load(&cfg.src_ext)?;
        let tgt_vocab = tok_store.load_vocab(&cfg.tgt_ext)?;

        let translator = Translator::from_checkpoint(&ckpt)?;
        Ok(Self {
            src_tokenizer,
            tgt_vocab,
            translator,
        })
    }

    /// Translate one source-language sentence to the target language.
    pub fn translate(&self, sentence: &str) -> Result<String> {
        let prep = Preprocessor::new();
        let enc = self
            .src_tokenizer
            .encode(prep.clean(sentence).as_str(), false)
            .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

        let output_ids = self.translator.translate(enc.get_ids());
        let tokens = self.tgt_vocab.decode(&output_ids);

        tracing::debug!("Translated {} → {} tokens", enc.get_ids().len(), tokens.len());
        Ok(tokens.join(" "))
    }
}
