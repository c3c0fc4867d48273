use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use flate2::read::GzDecoder;

use crate::error::PrismaticResult;
use crate::grammars::{
    Grammar, GrammarId, GrammarRef, GrammarToken, Pattern, RawGrammar, RawGrammarSet, RawInside,
    RawPattern, RawToken, Regex,
};
use crate::tokenizer::Tokenizer;
use crate::tokens::Token;

/// Holds all the grammars and resolves language identifiers to them.
///
/// Grammars live in a flat arena indexed by [`GrammarId`]; a pattern's nested
/// grammar is a handle into that arena (or a language name resolved lazily
/// against it), never an owning reference, so self-referential and mutually
/// embedding grammars need no special casing.
///
/// A registry is read-only once built. Concurrent `tokenize` calls on
/// separate threads need no coordination.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    // Arena of compiled grammars for ID-based access.
    // Inline nested grammars get their own slots but no name map entry.
    pub(crate) grammars: Vec<Grammar>,
    // language identifier (or alias) -> grammar ID
    grammar_id_by_name: HashMap<String, GrammarId>,
}

impl Registry {
    /// Builds a registry from already-deserialized grammar definitions.
    ///
    /// Languages are added in sorted name order so grammar IDs are stable
    /// across loads of the same definition set.
    pub fn from_raw(raw: RawGrammarSet) -> Self {
        let mut registry = Registry::default();

        let mut languages: Vec<(String, RawGrammar)> = raw.languages.into_iter().collect();
        languages.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (name, grammar) in languages {
            let id = registry.add_grammar(name.clone(), grammar);
            registry.grammar_id_by_name.insert(name, id);
        }

        for (alias, target) in raw.aliases {
            registry.add_alias(&target, &alias);
        }

        log::debug!(
            "registry built: {} grammars, {} names",
            registry.grammars.len(),
            registry.grammar_id_by_name.len()
        );
        registry
    }

    /// Decodes the packaged grammar blob: gzip framing around JSON-serialized
    /// definitions. A corrupt or incompatible blob is a hard error here, once,
    /// rather than per tokenize call.
    pub fn from_bytes(compressed_data: &[u8]) -> PrismaticResult<Self> {
        let mut decoder = GzDecoder::new(compressed_data);
        let mut json_data = Vec::new();
        decoder.read_to_end(&mut json_data)?;

        let raw: RawGrammarSet = serde_json::from_slice(&json_data)?;
        Ok(Self::from_raw(raw))
    }

    /// Decodes a base64-armored blob, the form used when the payload is
    /// transmitted as text rather than embedded as a binary asset.
    pub fn from_base64(data: &str) -> PrismaticResult<Self> {
        let compressed = BASE64.decode(data.trim())?;
        Self::from_bytes(&compressed)
    }

    /// Reads a blob file produced by the `pack-grammars` tool.
    pub fn from_file(path: impl AsRef<Path>) -> PrismaticResult<Self> {
        let compressed_data = std::fs::read(path)?;
        Self::from_bytes(&compressed_data)
    }

    fn add_grammar(&mut self, name: String, raw: RawGrammar) -> GrammarId {
        let id = GrammarId(self.grammars.len() as u16);
        // Reserve the slot first so inline nested grammars get later IDs
        self.grammars.push(Grammar::default());

        let tokens = raw
            .tokens
            .into_iter()
            .map(|token| self.compile_token(&name, token))
            .collect();

        self.grammars[id.as_index()] = Grammar { name, tokens };
        id
    }

    fn compile_token(&mut self, owner: &str, raw: RawToken) -> GrammarToken {
        let patterns = raw
            .patterns
            .into_iter()
            .map(|pattern| self.compile_pattern(owner, pattern))
            .collect();
        GrammarToken {
            name: raw.name,
            patterns,
        }
    }

    fn compile_pattern(&mut self, owner: &str, raw: RawPattern) -> Pattern {
        let inside = raw.inside.map(|inside| match inside {
            RawInside::Language(lang) => GrammarRef::Lang(lang),
            RawInside::Grammar(grammar) => {
                // The synthesized name only shows up in diagnostics
                let name = format!("{owner}#inline-{}", self.grammars.len());
                GrammarRef::Id(self.add_grammar(name, *grammar))
            }
        });

        Pattern {
            regex: Regex::new(raw.pattern, raw.flags),
            lookbehind: raw.lookbehind,
            greedy: raw.greedy,
            alias: (!raw.alias.is_empty()).then_some(raw.alias),
            inside,
        }
    }

    /// Adds an alias for the given grammar
    pub fn add_alias(&mut self, grammar_name: &str, alias: &str) {
        if let Some(grammar_id) = self.grammar_id_by_name.get(grammar_name) {
            self.grammar_id_by_name
                .insert(alias.to_string(), *grammar_id);
        }
    }

    /// O(1) lookup by language identifier or alias. Unknown identifiers are
    /// not an error; callers fall back to plain text.
    pub fn lookup(&self, language: &str) -> Option<GrammarId> {
        self.grammar_id_by_name.get(language).copied()
    }

    /// Checks whether the given language is available in the registry, by
    /// name or alias
    pub fn contains_grammar(&self, language: &str) -> bool {
        self.grammar_id_by_name.contains_key(language)
    }

    pub fn grammar(&self, id: GrammarId) -> &Grammar {
        &self.grammars[id]
    }

    /// All grammars in the arena, anonymous inline ones included
    pub fn grammars(&self) -> impl Iterator<Item = &Grammar> {
        self.grammars.iter()
    }

    /// Resolves a pattern's nested grammar handle. `None` when a language
    /// reference points at a grammar this registry does not have.
    pub(crate) fn resolve(&self, grammar_ref: &GrammarRef) -> Option<GrammarId> {
        match grammar_ref {
            GrammarRef::Id(id) => Some(*id),
            GrammarRef::Lang(lang) => self.lookup(lang),
        }
    }

    /// Tokenizes `code` with the grammar registered for `language`.
    ///
    /// Unknown languages yield the whole input as a single text token; empty
    /// input yields an empty list. This never fails: grammar problems degrade
    /// to unclassified text, not errors.
    pub fn tokenize(&self, code: &str, language: &str) -> Vec<Token> {
        if code.is_empty() {
            return Vec::new();
        }
        match self.lookup(language) {
            Some(grammar_id) => Tokenizer::new(self).tokenize(code, grammar_id),
            None => vec![Token::text(code)],
        }
    }
}
