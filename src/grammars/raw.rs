use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrismaticResult;

/// One pattern record as it appears in the grammar definition blob
///
/// # Examples
/// ```json
/// {
///   "pattern": "(^|[^\\\\])\\/\\*[\\s\\S]*?(?:\\*\\/|$)",
///   "lookbehind": true,
///   "greedy": true
/// }
/// ```
///
/// ```json
/// {
///   "pattern": "`(?:\\\\[\\s\\S]|[^\\\\`])*`",
///   "greedy": true,
///   "alias": "template-string",
///   "inside": "javascript"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawPattern {
    /// The regular expression source text
    /// Example: "\\b(?:if|else|while|for)\\b" for keywords
    pub pattern: String,
    /// Regex flag characters, JavaScript style
    /// Example: "i" for case-insensitive, "s" for dot-matches-newline
    #[serde(skip_serializing_if = "String::is_empty")]
    pub flags: String,
    /// When set, the first capture group is a prefix to discard from the
    /// effective match, emulating a lookbehind assertion
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub lookbehind: bool,
    /// When set, the match is re-attempted against the following text and
    /// extended before yielding to lower-priority rules
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub greedy: bool,
    /// Secondary classification label
    /// Example: "template-string" on a string pattern
    #[serde(skip_serializing_if = "String::is_empty")]
    pub alias: String,
    /// Optional grammar to apply recursively to the matched substring
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inside: Option<RawInside>,
}

/// Where the nested grammar of a pattern comes from
///
/// # Examples
/// ```json
/// "inside": "css"
/// ```
///
/// ```json
/// "inside": {
///   "tokens": [
///     { "name": "interpolation", "patterns": [{ "pattern": "\\$\\{[^}]*\\}" }] }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawInside {
    /// Reference to another language's grammar (or the same one, for
    /// self-recursive rules), resolved through the registry at tokenize time
    Language(String),
    /// An anonymous grammar defined inline
    /// *Must come after Language in the enum to be correct*
    Grammar(Box<RawGrammar>),
}

/// A token type: a name plus its ordered list of patterns
///
/// # Examples
/// ```json
/// {
///   "name": "string",
///   "patterns": [
///     { "pattern": "\"(?:\\\\.|[^\"\\\\])*\"", "greedy": true },
///     { "pattern": "'(?:\\\\.|[^'\\\\])*'", "greedy": true }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawToken {
    /// The token type name assigned to matches
    /// Example: "comment", "string", "keyword"
    pub name: String,
    /// Patterns tried in declaration order; first match wins
    #[serde(default)]
    pub patterns: Vec<RawPattern>,
}

/// One language's full rule set, in authored order
///
/// Order is significant both across token types and across the patterns of
/// one type: earlier entries take priority at a given scan position.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawGrammar {
    /// Ordered token types
    pub tokens: Vec<RawToken>,
}

/// Top-level structure of a decoded grammar definition blob
///
/// # Examples
/// ```json
/// {
///   "languages": {
///     "javascript": {
///       "tokens": [
///         { "name": "comment", "patterns": [{ "pattern": "\\/\\/.*" }] },
///         { "name": "keyword", "patterns": [{ "pattern": "\\b(?:var|let|const)\\b" }] }
///       ]
///     }
///   },
///   "aliases": { "js": "javascript" }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RawGrammarSet {
    /// language identifier -> grammar
    pub languages: HashMap<String, RawGrammar>,
    /// alias -> canonical language identifier
    /// Example: "js" -> "javascript"
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub aliases: HashMap<String, String>,
}

impl RawGrammarSet {
    pub fn load_from_file(path: impl AsRef<Path>) -> PrismaticResult<Self> {
        let file = File::open(&path)?;
        let raw = serde_json::from_reader(&file)?;
        Ok(raw)
    }
}
