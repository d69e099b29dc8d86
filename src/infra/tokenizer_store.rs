// ============================================================
// Layer 6 — Tokenizer Store
// ============================================================
// Builds, saves and loads one word-level tokenizer per language.
//
// The tokenizer JSON is written directly in the HuggingFace
// format that Tokenizer::from_file() expects: a Lowercase
// normalizer, a Whitespace pre-tokenizer (splits `\w+|[^\w\s]+`,
// so punctuation becomes its own token) and a WordLevel model
// whose vocabulary comes straight from our Vocabulary — the
// tokenizer and the model therefore always agree on every id.
//
// The per-language Vocabulary is persisted next to it, since the
// decode direction (ids → tokens) goes through the Vocabulary.
//
// Reference: tokenizers crate documentation

use anyhow::{Context, Result};
use std::path::PathBuf;
use tokenizers::Tokenizer;

use crate::data::vocab::{Vocabulary, EOS_TOKEN, PAD_TOKEN, SOS_TOKEN, UNK_TOKEN};
use crate::domain::traits::Persistable;

pub struct TokenizerStore {
    dir: PathBuf,
}

impl TokenizerStore {
    pub fn new(dir: impl Into<String>) -> Self {
        Self {
            dir: PathBuf::from(dir.into()),
        }
    }

    /// Load the existing tokenizer for `lang` or build one from
    /// the vocabulary and save both to disk.
    pub fn load_or_build(&self, lang: &str, vocab: &Vocabulary) -> Result<Tokenizer> {
        let tok_path = self.tokenizer_path(lang);
        if tok_path.exists() {
            tracing::info!("Loading existing '{}' tokenizer from disk", lang);
            self.load(lang)
        } else {
            tracing::info!(
                "Building '{}' tokenizer ({} vocabulary entries)",
                lang,
                vocab.len()
            );
            self.build_and_save(lang, vocab)
        }
    }

    /// Load a previously saved tokenizer from its JSON file
    pub fn load(&self, lang: &str) -> Result<Tokenizer> {
        let path = self.tokenizer_path(lang);
        Tokenizer::from_file(&path).map_err(|e| {
            anyhow::anyhow!("Cannot load tokenizer from '{}': {}", path.display(), e)
        })
    }

    /// Persist a language's vocabulary beside its tokenizer
    pub fn save_vocab(&self, lang: &str, vocab: &Vocabulary) -> Result<()> {
        std::fs::create_dir_all(&self.dir).ok();
        let path = self.vocab_path(lang);
        vocab.save(path.to_str().context("non-utf8 checkpoint path")?)
    }

    /// Load a language's vocabulary saved during training
    pub fn load_vocab(&self, lang: &str) -> Result<Vocabulary> {
        let path = self.vocab_path(lang);
        Vocabulary::load(path.to_str().context("non-utf8 checkpoint path")?)
    }

    fn tokenizer_path(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("tokenizer_{lang}.json"))
    }

    fn vocab_path(&self, lang: &str) -> PathBuf {
        self.dir.join(format!("vocab_{lang}.json"))
    }

    /// Write a valid tokenizer JSON directly from the vocabulary,
    /// then load it back as a proper Tokenizer instance.
    fn build_and_save(&self, lang: &str, vocab: &Vocabulary) -> Result<Tokenizer> {
        std::fs::create_dir_all(&self.dir).ok();

        // ── Step 1: vocab JSON — special tokens at their fixed ids ────────────
        let mut vocab_json = serde_json::json!({
            "<pad>": 0,
            "<unk>": 1,
            "<sos>": 2,
            "<eos>": 3,
        });
        for (token, id) in vocab.entries() {
            vocab_json[token] = serde_json::json!(id);
        }

        // ── Step 2: full tokenizer JSON in HuggingFace format ─────────────────
        let tokenizer_json = serde_json::json!({
            "version": "1.0",
            "truncation": null,
            "padding": null,
            "added_tokens": [
                {"id": 0, "content": PAD_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 1, "content": UNK_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 2, "content": SOS_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true},
                {"id": 3, "content": EOS_TOKEN, "single_word": false, "lstrip": false, "rstrip": false, "normalized": false, "special": true}
            ],
            "normalizer": {
                "type": "Lowercase"
            },
            "pre_tokenizer": {
                "type": "Whitespace"
            },
            "post_processor": null,
            "decoder": null,
            "model": {
                "type": "WordLevel",
                "vocab": vocab_json,
                "unk_token": UNK_TOKEN
            }
        });

        let tok_path = self.tokenizer_path(lang);
        std::fs::write(&tok_path, serde_json::to_string_pretty(&tokenizer_json)?)
            .with_context(|| format!("Cannot write tokenizer JSON for '{lang}'"))?;

        tracing::info!(
            "Tokenizer for '{}' saved to '{}'",
            lang,
            tok_path.display()
        );

        Tokenizer::from_file(&tok_path)
            .map_err(|e| anyhow::anyhow!("Cannot reload tokenizer: {e}"))
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::vocab::UNK_IDX;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn store(name: &str) -> TokenizerStore {
        let dir = std::env::temp_dir().join(format!("nmt-tok-store-{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        TokenizerStore::new(dir.to_str().unwrap())
    }

    #[test]
    fn test_tokenizer_ids_match_vocabulary() {
        let vocab = Vocabulary::build(&[toks("ein hund läuft"), toks("ein hund")], 1, 100);
        let store = store("ids");
        let tokenizer = store.build_and_save("de", &vocab).unwrap();

        let enc = tokenizer.encode("ein hund", false).unwrap();
        let expected: Vec<u32> = vec![vocab.index_of("ein"), vocab.index_of("hund")];
        assert_eq!(enc.get_ids(), expected.as_slice());
    }

    #[test]
    fn test_unknown_words_map_to_unk() {
        let vocab = Vocabulary::build(&[toks("ein hund")], 1, 100);
        let store = store("unk");
        let tokenizer = store.build_and_save("de", &vocab).unwrap();

        let enc = tokenizer.encode("eine katze", false).unwrap();
        assert!(enc.get_ids().iter().all(|&id| id == UNK_IDX));
    }

    #[test]
    fn test_lowercase_and_punctuation_split() {
        let vocab = Vocabulary::build(&[toks("ein hund .")], 1, 100);
        let store = store("norm");
        let tokenizer = store.build_and_save("de", &vocab).unwrap();

        let enc = tokenizer.encode("Ein Hund.", false).unwrap();
        assert_eq!(
            enc.get_tokens(),
            &["ein".to_string(), "hund".to_string(), ".".to_string()]
        );
    }

    #[test]
    fn test_vocab_roundtrip_through_store() {
        let vocab = Vocabulary::build(&[toks("ein hund läuft schnell")], 1, 100);
        let store = store("vocab");
        store.save_vocab("de", &vocab).unwrap();
        let loaded = store.load_vocab("de").unwrap();
        assert_eq!(loaded.len(), vocab.len());
        assert_eq!(loaded.index_of("hund"), vocab.index_of("hund"));
    }
}
