// ============================================================
// Layer 4 — Vocabulary
// ============================================================
// A bidirectional token ↔ index mapping for one language,
// built once from the training split and immutable afterwards.
//
// Construction rules:
//   - tokens below `min_freq` occurrences are dropped
//   - at most `max_size` entries survive, special tokens included
//   - surviving tokens are ordered by frequency descending,
//     ties broken lexicographically — so the same corpus and
//     cutoffs always yield the identical mapping
//
// Four reserved entries occupy the lowest indices:
//   <pad> = 0   fills short sequences up to the batch length
//   <unk> = 1   any token unseen at build time maps here
//   <sos> = 2   consumed as the decoder's first input
//   <eos> = 3   terminates decoding
//
// Reference: Rust Book §8 (HashMaps)

use std::collections::HashMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::traits::Persistable;

pub const PAD_TOKEN: &str = "<pad>";
pub const UNK_TOKEN: &str = "<unk>";
pub const SOS_TOKEN: &str = "<sos>";
pub const EOS_TOKEN: &str = "<eos>";

pub const PAD_IDX: u32 = 0;
pub const UNK_IDX: u32 = 1;
pub const SOS_IDX: u32 = 2;
pub const EOS_IDX: u32 = 3;

const SPECIALS: [&str; 4] = [PAD_TOKEN, UNK_TOKEN, SOS_TOKEN, EOS_TOKEN];

/// Immutable token ↔ index mapping for one language.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vocabulary {
    /// index → token; the index in this Vec IS the token id
    itos: Vec<String>,
    /// token → index; inverse of itos
    stoi: HashMap<String, u32>,
}

impl Vocabulary {
    /// Build a vocabulary from tokenised training sentences.
    ///
    /// `max_size` counts the four special tokens, mirroring the
    /// usual build_vocab(max_size=..., min_freq=...) semantics.
    pub fn build(sentences: &[Vec<String>], min_freq: usize, max_size: usize) -> Self {
        // ── Step 1: count token frequencies over the corpus ───────────────────
        let mut freq: HashMap<&str, usize> = HashMap::new();
        for sentence in sentences {
            for token in sentence {
                *freq.entry(token.as_str()).or_insert(0) += 1;
            }
        }

        // ── Step 2: apply the frequency cutoff ────────────────────────────────
        let mut words: Vec<(&str, usize)> = freq
            .into_iter()
            .filter(|&(_, count)| count >= min_freq)
            .collect();

        // ── Step 3: deterministic ordering ────────────────────────────────────
        // Frequency descending, ties lexicographic — HashMap iteration
        // order must never leak into the token ids.
        words.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        // ── Step 4: apply the size cutoff, reserving the special slots ────────
        words.truncate(max_size.saturating_sub(SPECIALS.len()));

        let mut itos: Vec<String> = SPECIALS.iter().map(|s| s.to_string()).collect();
        itos.extend(words.into_iter().map(|(w, _)| w.to_string()));

        let stoi = itos
            .iter()
            .enumerate()
            .map(|(i, tok)| (tok.clone(), i as u32))
            .collect();

        Self { itos, stoi }
    }

    /// Number of entries, special tokens included.
    /// This is the model's embedding-table / output-projection size.
    pub fn len(&self) -> usize {
        self.itos.len()
    }

    /// Look up a token's index; unknown tokens map to <unk>.
    pub fn index_of(&self, token: &str) -> u32 {
        self.stoi.get(token).copied().unwrap_or(UNK_IDX)
    }

    /// Look up the token at an index; out-of-range maps to <unk>.
    pub fn token_at(&self, index: u32) -> &str {
        self.itos
            .get(index as usize)
            .map(String::as_str)
            .unwrap_or(UNK_TOKEN)
    }

    /// Id sequence → tokens, stopping at <eos> and dropping
    /// <sos>/<pad> along the way.
    pub fn decode(&self, ids: &[u32]) -> Vec<String> {
        let mut tokens = Vec::new();
        for &id in ids {
            if id == EOS_IDX {
                break;
            }
            if id == SOS_IDX || id == PAD_IDX {
                continue;
            }
            tokens.push(self.token_at(id).to_string());
        }
        tokens
    }

    /// Id sequence → <sos> ids <eos>, for ids that came from a
    /// tokenizer rather than from `numericalize`.
    pub fn wrap_ids(ids: &[u32]) -> Vec<u32> {
        let mut wrapped = Vec::with_capacity(ids.len() + 2);
        wrapped.push(SOS_IDX);
        wrapped.extend_from_slice(ids);
        wrapped.push(EOS_IDX);
        wrapped
    }

    /// Iterate (token, id) over non-special entries in id order.
    /// Used by the tokenizer store to emit the word-level model.
    pub fn entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.itos
            .iter()
            .enumerate()
            .skip(SPECIALS.len())
            .map(|(i, tok)| (tok.as_str(), i as u32))
    }
}

/// JSON persistence so training and inference share one mapping.
impl Persistable for Vocabulary {
    fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("Cannot write vocabulary to '{path}'"))?;
        tracing::debug!("Saved vocabulary ({} tokens) to '{}'", self.len(), path);
        Ok(())
    }

    fn load(path: &str) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read vocabulary from '{path}'"))?;
        Ok(serde_json::from_str(&json)?)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn toks(s: &str) -> Vec<String> {
        s.split_whitespace().map(str::to_string).collect()
    }

    fn corpus() -> Vec<Vec<String>> {
        vec![
            toks("a dog runs"),
            toks("a cat runs"),
            toks("a dog sleeps"),
        ]
    }

    #[test]
    fn test_specials_occupy_reserved_indices() {
        let v = Vocabulary::build(&corpus(), 1, 100);
        assert_eq!(v.index_of(PAD_TOKEN), PAD_IDX);
        assert_eq!(v.index_of(UNK_TOKEN), UNK_IDX);
        assert_eq!(v.index_of(SOS_TOKEN), SOS_IDX);
        assert_eq!(v.index_of(EOS_TOKEN), EOS_IDX);
    }

    #[test]
    fn test_frequency_ordering_with_lexicographic_ties() {
        let v = Vocabulary::build(&corpus(), 1, 100);
        // "a" (3) before "dog"/"runs" (2), which tie and sort alphabetically,
        // then "cat"/"sleeps" (1)
        assert_eq!(v.token_at(4), "a");
        assert_eq!(v.token_at(5), "dog");
        assert_eq!(v.token_at(6), "runs");
        assert_eq!(v.token_at(7), "cat");
        assert_eq!(v.token_at(8), "sleeps");
    }

    #[test]
    fn test_min_freq_cutoff() {
        let v = Vocabulary::build(&corpus(), 2, 100);
        // "cat" and "sleeps" appear once — below the cutoff
        assert_eq!(v.index_of("cat"), UNK_IDX);
        assert_eq!(v.index_of("sleeps"), UNK_IDX);
        assert_ne!(v.index_of("dog"), UNK_IDX);
    }

    #[test]
    fn test_max_size_cutoff_includes_specials() {
        let v = Vocabulary::build(&corpus(), 1, 6);
        // 4 specials + the 2 best words
        assert_eq!(v.len(), 6);
        assert_ne!(v.index_of("a"), UNK_IDX);
        assert_eq!(v.index_of("sleeps"), UNK_IDX);
    }

    #[test]
    fn test_construction_is_deterministic() {
        let a = Vocabulary::build(&corpus(), 1, 100);
        let b = Vocabulary::build(&corpus(), 1, 100);
        for i in 0..a.len() as u32 {
            assert_eq!(a.token_at(i), b.token_at(i));
        }
    }

    #[test]
    fn test_wrap_ids_adds_sos_eos() {
        let ids = Vocabulary::wrap_ids(&[7, 9]);
        assert_eq!(ids, vec![SOS_IDX, 7, 9, EOS_IDX]);
    }

    #[test]
    fn test_decode_stops_at_eos_and_skips_specials() {
        let v = Vocabulary::build(&corpus(), 1, 100);
        let dog = v.index_of("dog");
        let runs = v.index_of("runs");
        let decoded = v.decode(&[SOS_IDX, dog, runs, EOS_IDX, dog, PAD_IDX]);
        assert_eq!(decoded, vec!["dog".to_string(), "runs".to_string()]);
    }

    #[test]
    fn test_unknown_token_maps_to_unk() {
        let v = Vocabulary::build(&corpus(), 1, 100);
        assert_eq!(v.index_of("zebra"), UNK_IDX);
    }

    #[test]
    fn test_roundtrip_through_disk() {
        let v = Vocabulary::build(&corpus(), 1, 100);
        let path = std::env::temp_dir().join("nmt-vocab-roundtrip.json");
        let path = path.to_str().unwrap().to_string();
        v.save(&path).unwrap();
        let loaded = Vocabulary::load(&path).unwrap();
        assert_eq!(loaded.len(), v.len());
        assert_eq!(loaded.index_of("dog"), v.index_of("dog"));
    }
}
