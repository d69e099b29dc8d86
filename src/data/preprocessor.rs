// ============================================================
// Layer 4 — Text Preprocessor
// ============================================================
// Cleans raw corpus lines before tokenisation.
//
// Why do we need to clean text?
//   Corpus dumps often contain:
//   - Non-breaking spaces (U+00A0) from web scraping
//   - Zero-width spaces (U+200B) from copy-pasting
//   - Carriage returns (\r) from Windows line endings
//   - Tab characters and doubled spaces
//
// If we don't clean these, the tokenizer treats them as
// meaningful tokens and wastes vocabulary space on whitespace.
// Everything is also lowercased here so that "Dog" and "dog"
// share one vocabulary entry — case carries little signal at
// this corpus size and halving the vocabulary helps more.
//
// Reference: Rust Book §8 (Strings in Rust)
//            Rust Book §13 (Iterators)

pub struct Preprocessor;

impl Preprocessor {
    /// Create a new Preprocessor instance
    pub fn new() -> Self {
        Self
    }

    /// Clean one corpus line for downstream tokenisation.
    /// Takes a &str and returns an owned String.
    pub fn clean(&self, text: &str) -> String {
        // ── Step 1: normalise individual characters ───────────────────────────
        let mut normalised = String::with_capacity(text.len());
        for c in text.chars() {
            match c {
                // Whitespace variants → regular space
                '\t' | '\u{00A0}' | '\u{200B}' | '\u{FEFF}' | '\r' | '\n' => normalised.push(' '),
                // Invisible control characters → space
                c if c.is_control() => normalised.push(' '),
                // to_lowercase is an iterator: ß and friends may expand
                c => normalised.extend(c.to_lowercase()),
            }
        }

        // ── Step 2: collapse runs of spaces and trim the edges ────────────────
        let mut out = String::with_capacity(normalised.len());
        let mut last_space = false;
        for c in normalised.chars() {
            if c == ' ' {
                if !last_space && !out.is_empty() {
                    out.push(' ');
                }
                last_space = true;
            } else {
                out.push(c);
                last_space = false;
            }
        }
        out.trim_end().to_string()
    }

    /// Split a cleaned line into word and punctuation tokens.
    ///
    /// Mirrors the `Whitespace` pre-tokenizer of the `tokenizers`
    /// crate (`\w+|[^\w\s]+`): runs of word characters form one
    /// token, runs of punctuation form another, so "dog." becomes
    /// ["dog", "."]. Vocabulary construction and tokenizer
    /// encoding must split identically or the ids drift apart.
    pub fn word_tokens(&self, text: &str) -> Vec<String> {
        #[derive(PartialEq)]
        enum Run {
            Word,
            Punct,
        }

        let mut tokens = Vec::new();
        let mut current = String::new();
        let mut kind: Option<Run> = None;

        for c in text.chars() {
            let next = if c.is_whitespace() {
                None
            } else if c.is_alphanumeric() || c == '_' {
                Some(Run::Word)
            } else {
                Some(Run::Punct)
            };

            match next {
                None => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    kind = None;
                }
                Some(r) => {
                    if kind.as_ref() != Some(&r) && !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                    current.push(c);
                    kind = Some(r);
                }
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
        tokens
    }
}

/// Implement Default so Preprocessor can be created with Preprocessor::default()
impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
// These tests run with `cargo test` and verify the cleaning logic.
// Reference: Rust Book §11 (Writing Automated Tests)
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapses_multiple_spaces() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("hello   world"), "hello world");
    }

    #[test]
    fn test_trims_edges() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("  hello world  "), "hello world");
    }

    #[test]
    fn test_lowercases() {
        let p = Preprocessor::new();
        assert_eq!(p.clean("Zwei Hunde"), "zwei hunde");
    }

    #[test]
    fn test_removes_control_chars() {
        let p = Preprocessor::new();
        // \x01 is a control character that should become a space
        assert_eq!(p.clean("hello\x01world"), "hello world");
    }

    #[test]
    fn test_empty_string() {
        let p = Preprocessor::new();
        assert_eq!(p.clean(""), "");
    }

    #[test]
    fn test_word_tokens_split_punctuation() {
        let p = Preprocessor::new();
        assert_eq!(
            p.word_tokens("a dog runs."),
            vec!["a", "dog", "runs", "."]
        );
    }

    #[test]
    fn test_word_tokens_group_punctuation_runs() {
        let p = Preprocessor::new();
        assert_eq!(p.word_tokens("really?!"), vec!["really", "?!"]);
    }

    #[test]
    fn test_word_tokens_umlauts_stay_in_words() {
        let p = Preprocessor::new();
        assert_eq!(p.word_tokens("zwei männer"), vec!["zwei", "männer"]);
    }
}
