// ============================================================
// Layer 3 — SentencePair Domain Type
// ============================================================
// Represents one aligned example from the parallel corpus:
// a source-language sentence and its reference translation.
// This is a plain data struct with no behaviour — by the time
// a SentencePair exists, the raw corpus lines have already
// been read and paired up by the loader.
//
// Reference: Rust Book §5 (Structs and Methods)

use serde::{Deserialize, Serialize};

/// One aligned sentence pair from the parallel corpus.
/// Language-agnostic — "source" and "target" are whatever
/// the corpus file extensions said they were.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SentencePair {
    /// The source-language sentence (e.g. German)
    pub source: String,

    /// The reference translation (e.g. English)
    pub target: String,
}

impl SentencePair {
    /// Create a new SentencePair.
    /// Uses impl Into<String> so callers can pass &str or String —
    /// this is idiomatic Rust for flexible string arguments.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// True if either side is empty after trimming.
    /// Such pairs carry no training signal and are dropped by the loader.
    pub fn is_degenerate(&self) -> bool {
        self.source.trim().is_empty() || self.target.trim().is_empty()
    }
}
