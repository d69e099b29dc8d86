// ============================================================
// Layer 3 — Core Traits (Abstractions)
// ============================================================
// Traits are Rust's way of defining shared behaviour.
// By programming against traits instead of concrete types,
// we can swap implementations without changing the code
// that uses them. For example:
//   - ParallelCorpusLoader implements CorpusSource
//   - A future TsvLoader could also implement CorpusSource
//   - The application layer only sees CorpusSource
//     and works with both without any changes
//
// This is the Dependency Inversion Principle from SOLID,
// applied using Rust's trait system.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)
//            Rust Book §17 (Object Oriented Patterns)

use anyhow::Result;
use crate::domain::sentence_pair::SentencePair;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can load one split of a parallel corpus.
///
/// Implementations:
///   - ParallelCorpusLoader → reads {split}.{src_ext} / {split}.{tgt_ext}
///     line files from a directory
pub trait CorpusSource {
    /// Load all sentence pairs of a named split ("train", "val", "test").
    fn load_split(&self, split: &str) -> Result<Vec<SentencePair>>;
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
///
/// Implementations:
///   - Vocabulary → saves/loads the token↔index mapping as JSON
pub trait Persistable: Sized {
    /// Save this component's state to the given path
    fn save(&self, path: &str) -> Result<()>;

    /// Load a component's state from the given path.
    /// Returns Self so callers can use the loaded instance directly.
    fn load(path: &str) -> Result<Self>;
}
