// ============================================================
// Layer 4 — Parallel Corpus Loader
// ============================================================
// Loads one split of a line-aligned parallel corpus.
//
// The Multi30k layout looks like:
//   data/multi30k/
//     train.de   train.en
//     val.de     val.en
//     test.de    test.en
//
// Line N of the .de file is the German sentence whose reference
// translation is line N of the .en file. The file extension is
// what identifies the language — nothing inside the files does.
//
// Reference: Rust Book §8 (Collections)
//            Rust Book §9 (Error Handling)

use anyhow::{bail, Context, Result};
use std::{fs, path::Path};

use crate::domain::sentence_pair::SentencePair;
use crate::domain::traits::CorpusSource;

/// Loads aligned sentence pairs from a directory of line files.
/// Implements the CorpusSource trait from Layer 3.
pub struct ParallelCorpusLoader {
    /// Path to the directory containing the split files
    dir: String,
    /// Extension of the source-language files (e.g. "de")
    src_ext: String,
    /// Extension of the target-language files (e.g. "en")
    tgt_ext: String,
}

impl ParallelCorpusLoader {
    /// Create a new loader pointed at a corpus directory
    pub fn new(
        dir: impl Into<String>,
        src_ext: impl Into<String>,
        tgt_ext: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            src_ext: src_ext.into(),
            tgt_ext: tgt_ext.into(),
        }
    }

    fn read_lines(&self, split: &str, ext: &str) -> Result<Vec<String>> {
        let path = Path::new(&self.dir).join(format!("{split}.{ext}"));
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Cannot read corpus file '{}'", path.display()))?;
        Ok(text.lines().map(str::to_string).collect())
    }
}

/// Implement the CorpusSource trait so the application layer
/// can call load_split() without knowing about the file layout
impl CorpusSource for ParallelCorpusLoader {
    fn load_split(&self, split: &str) -> Result<Vec<SentencePair>> {
        let src_lines = self.read_lines(split, &self.src_ext)?;
        let tgt_lines = self.read_lines(split, &self.tgt_ext)?;

        // Misaligned files would silently pair wrong sentences —
        // fail loudly instead.
        if src_lines.len() != tgt_lines.len() {
            bail!(
                "Split '{}' is misaligned: {} {} lines vs {} {} lines",
                split,
                src_lines.len(),
                self.src_ext,
                tgt_lines.len(),
                self.tgt_ext,
            );
        }

        let mut pairs = Vec::with_capacity(src_lines.len());
        let mut dropped = 0usize;

        for (src, tgt) in src_lines.into_iter().zip(tgt_lines) {
            let pair = SentencePair::new(src, tgt);
            // Blank lines happen in real corpus dumps — skip, don't fail
            if pair.is_degenerate() {
                dropped += 1;
            } else {
                pairs.push(pair);
            }
        }

        if dropped > 0 {
            tracing::warn!("Split '{}': dropped {} empty pairs", split, dropped);
        }
        tracing::info!("Loaded {} sentence pairs from split '{}'", pairs.len(), split);
        Ok(pairs)
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_split(dir: &Path, split: &str, de: &str, en: &str) {
        fs::write(dir.join(format!("{split}.de")), de).unwrap();
        fs::write(dir.join(format!("{split}.en")), en).unwrap();
    }

    fn temp_dir(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("nmt-loader-{name}"));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_loads_aligned_pairs() {
        let dir = temp_dir("aligned");
        write_split(&dir, "train", "ein hund\nzwei katzen\n", "a dog\ntwo cats\n");

        let loader = ParallelCorpusLoader::new(dir.to_str().unwrap(), "de", "en");
        let pairs = loader.load_split("train").unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].source, "ein hund");
        assert_eq!(pairs[0].target, "a dog");
    }

    #[test]
    fn test_misaligned_split_fails() {
        let dir = temp_dir("misaligned");
        write_split(&dir, "train", "eins\nzwei\ndrei\n", "one\ntwo\n");

        let loader = ParallelCorpusLoader::new(dir.to_str().unwrap(), "de", "en");
        assert!(loader.load_split("train").is_err());
    }

    #[test]
    fn test_empty_pairs_are_dropped() {
        let dir = temp_dir("blanks");
        write_split(&dir, "val", "eins\n\nzwei\n", "one\n\ntwo\n");

        let loader = ParallelCorpusLoader::new(dir.to_str().unwrap(), "de", "en");
        let pairs = loader.load_split("val").unwrap();
        assert_eq!(pairs.len(), 2);
    }

    #[test]
    fn test_missing_file_errors() {
        let dir = temp_dir("missing");
        let loader = ParallelCorpusLoader::new(dir.to_str().unwrap(), "de", "en");
        assert!(loader.load_split("nonexistent").is_err());
    }
}
