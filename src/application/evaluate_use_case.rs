// ============================================================
// Layer 2 — Evaluate Use Case
// ============================================================
// Corpus BLEU over the held-out test split:
//   1. Load the test pairs
//   2. Greedy-decode every source sentence
//   3. Score hypotheses against the reference translations
//
// References are tokenised with the same cleaning + splitting
// rules as training data but are NOT mapped through the
// vocabulary — mapping rare reference words to <unk> would
// hand the model free matches it never earned.

use anyhow::Result;
use tokenizers::Tokenizer;

use crate::data::{loader::ParallelCorpusLoader, preprocessor::Preprocessor, vocab::Vocabulary};
use crate::domain::bleu::corpus_bleu;
use crate::domain::traits::CorpusSource;
use crate::infra::{checkpoint::CheckpointManager, tokenizer_store::TokenizerStore};
use crate::ml::translator::Translator;

pub struct EvaluateUseCase {
    data_dir:      String,
    src_ext:       String,
    tgt_ext:       String,
    src_tokenizer: Tokenizer,
    tgt_vocab:     Vocabulary,
    translator:    Translator,
}

impl EvaluateUseCase {
    pub fn new(checkpoint_dir: String, data_dir: String) -> Result<Self> {
        let ckpt = CheckpointManager::new(&checkpoint_dir);
        let cfg = ckpt.load_config()?;

        let tok_store = TokenizerStore::new(&checkpoint_dir);
        let src_tokenizer = tok_store.load(&cfg.src_ext)?;
        let tgt_vocab = tok_store.load_vocab(&cfg.tgt_ext)?;
        let translator = Translator::from_checkpoint(&ckpt)?;

        Ok(Self {
            data_dir,
            src_ext: cfg.src_ext,
            tgt_ext: cfg.tgt_ext,
            src_tokenizer,
            tgt_vocab,
            translator,
        })
    }

    /// Translate the whole test split and return its corpus BLEU.
    pub fn execute(&self) -> Result<f64> {
        let loader = ParallelCorpusLoader::new(&self.data_dir, &self.src_ext, &self.tgt_ext);
        let pairs = loader.load_split("test")?;
        let prep = Preprocessor::new();

        let mut hypotheses = Vec::with_capacity(pairs.len());
        let mut references = Vec::with_capacity(pairs.len());

        for (i, pair) in pairs.iter().enumerate() {
            let enc = self
                .src_tokenizer
                .encode(prep.clean(&pair.source).as_str(), false)
                .map_err(|e| anyhow::anyhow!("Tokenisation error: {e}"))?;

            let output_ids = self.translator.translate(enc.get_ids());
            hypotheses.push(self.tgt_vocab.decode(&output_ids));
            references.push(prep.word_tokens(&prep.clean(&pair.target)));

            if (i + 1) % 200 == 0 {
                tracing::info!("Decoded {}/{} test sentences", i + 1, pairs.len());
            }
        }

        let score = corpus_bleu(&hypotheses, &references);
        tracing::info!("Corpus BLEU over {} sentences: {:.4}", pairs.len(), score);
        Ok(score)
    }
}
