//! A Prism-compatible syntax tokenizer executed natively for speed.
//!
//! Grammars are ordered regex rule sets loaded once from a packaged blob;
//! [`SyntaxHighlighter::tokenize`] turns source text into a tree of typed
//! tokens whose leaf text always reconstructs the input exactly.

mod error;
mod grammars;
mod highlighter;
mod registry;
mod tokenizer;
mod tokens;

#[cfg(test)]
mod test_utils;

pub use error::Error;
pub use grammars::{
    Grammar, GrammarId, GrammarRef, GrammarToken, Pattern, PatternMatch, RawGrammar,
    RawGrammarSet, RawInside, RawPattern, RawToken, Regex,
};
pub use highlighter::SyntaxHighlighter;
pub use registry::Registry;
pub use tokenizer::Tokenizer;
pub use tokens::{
    TEXT_TOKEN_TYPE, Token, TokenContent, plain_text, tokens_from_json, tokens_to_json,
};
