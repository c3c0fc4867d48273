use std::sync::OnceLock;

use crate::error::PrismaticResult;
use crate::registry::Registry;
use crate::tokens::{self, Token};

/// The boundary-facing facade: one-time grammar loading plus tokenization.
///
/// This is what a host bridge holds onto for the process lifetime. The
/// registry is populated at most once; `load_grammars` while already loaded
/// is a cheap no-op, so multiple call sites can trigger initialization
/// without duplicate work. `OnceLock` gives the complete-before-use ordering
/// on the hot path without a full lock.
#[derive(Debug, Default)]
pub struct SyntaxHighlighter {
    registry: OnceLock<Registry>,
}

impl SyntaxHighlighter {
    pub const fn new() -> Self {
        Self {
            registry: OnceLock::new(),
        }
    }

    /// Loads the packaged grammar blob (gzip around JSON definitions).
    ///
    /// Idempotent: once a load has succeeded, further calls return without
    /// touching the payload. A decode error leaves the highlighter unloaded,
    /// in which case every language falls back to plain text until a later
    /// load succeeds.
    pub fn load_grammars(&self, blob: &[u8]) -> PrismaticResult<()> {
        if self.is_loaded() {
            return Ok(());
        }
        let registry = Registry::from_bytes(blob)?;
        // A lost race means another load finished first, which is fine
        let _ = self.registry.set(registry);
        Ok(())
    }

    /// Same as [`load_grammars`](Self::load_grammars) for a base64-armored
    /// payload, the form used when the blob travels as text.
    pub fn load_grammars_base64(&self, data: &str) -> PrismaticResult<()> {
        if self.is_loaded() {
            return Ok(());
        }
        let registry = Registry::from_base64(data)?;
        let _ = self.registry.set(registry);
        Ok(())
    }

    pub fn is_loaded(&self) -> bool {
        self.registry.get().is_some()
    }

    /// Access to the loaded registry, e.g. to check available languages
    pub fn registry(&self) -> Option<&Registry> {
        self.registry.get()
    }

    /// Tokenizes `code` with the grammar registered for `language`.
    ///
    /// Never fails: before a successful load, or for an unknown language,
    /// the whole input comes back as one unclassified text token. Empty
    /// input yields an empty list.
    pub fn tokenize(&self, code: &str, language: &str) -> Vec<Token> {
        match self.registry.get() {
            Some(registry) => registry.tokenize(code, language),
            None if code.is_empty() => Vec::new(),
            None => vec![Token::text(code)],
        }
    }

    /// Tokenizes and renders to the wire format in one step, the shape the
    /// host bridge ships across its boundary.
    pub fn tokenize_to_json(&self, code: &str, language: &str) -> PrismaticResult<String> {
        tokens::tokens_to_json(&self.tokenize(code, language))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{gzip, toy_grammar_set};

    #[test]
    fn tokenize_before_load_falls_back_to_plain_text() {
        let highlighter = SyntaxHighlighter::new();
        let tokens = highlighter.tokenize("fn main() {}", "rust");
        assert_eq!(tokens, vec![Token::text("fn main() {}")]);
        assert!(highlighter.tokenize("", "rust").is_empty());
    }

    #[test]
    fn load_is_idempotent() {
        let highlighter = SyntaxHighlighter::new();
        let blob = gzip(toy_grammar_set().as_bytes());
        highlighter.load_grammars(&blob).unwrap();
        assert!(highlighter.is_loaded());

        // second call is a no-op: the payload is not even decoded
        highlighter.load_grammars(b"garbage").unwrap();
        assert!(highlighter.registry().unwrap().contains_grammar("toy"));
    }

    #[test]
    fn failed_load_leaves_highlighter_unloaded() {
        let highlighter = SyntaxHighlighter::new();
        assert!(highlighter.load_grammars(b"not a gzip stream").is_err());
        assert!(!highlighter.is_loaded());
        // still plain text
        let tokens = highlighter.tokenize("# c", "toy");
        assert_eq!(tokens, vec![Token::text("# c")]);

        // a later successful load recovers
        let blob = gzip(toy_grammar_set().as_bytes());
        highlighter.load_grammars(&blob).unwrap();
        assert!(highlighter.is_loaded());
    }

    #[test]
    fn tokenize_to_json_end_to_end() {
        let highlighter = SyntaxHighlighter::new();
        highlighter
            .load_grammars(&gzip(toy_grammar_set().as_bytes()))
            .unwrap();

        let json = highlighter.tokenize_to_json("# hi", "toy").unwrap();
        assert_eq!(json, r##"[{"type":"comment","content":"# hi"}]"##);

        let json = highlighter
            .tokenize_to_json("anything", "no-such-language-xyz")
            .unwrap();
        assert_eq!(json, r#"[{"type":"text","content":"anything"}]"#);
    }
}
