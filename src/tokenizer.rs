use crate::Registry;
use crate::grammars::{GrammarId, GrammarToken, Pattern, PatternMatch};
use crate::tokens::{Token, TokenContent};

/// Nested-grammar recursion cap. Real grammars nest a handful of levels;
/// anything deeper means a self-referential grammar is re-tokenizing its own
/// output without consuming input, so the span stays flat text instead.
const MAX_NESTING_DEPTH: usize = 64;

/// The core recursive engine.
///
/// Scans the text left to right, trying the grammar's token types and their
/// patterns in declaration order at each position. The first rule that
/// matches anywhere at or after the cursor wins; this is priority-ordered
/// matching, not leftmost-longest. Unmatched gaps become text tokens.
///
/// Tokenizing is a pure computation over the input and the read-only
/// registry: no I/O, no shared mutable state, no failure mode. Pathological
/// grammars degrade to unclassified text.
#[derive(Debug)]
pub struct Tokenizer<'r> {
    registry: &'r Registry,
}

impl<'r> Tokenizer<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    pub fn tokenize(&self, text: &str, grammar_id: GrammarId) -> Vec<Token> {
        if text.is_empty() {
            return Vec::new();
        }
        self.tokenize_at_depth(text, grammar_id, 0)
    }

    fn tokenize_at_depth(&self, text: &str, grammar_id: GrammarId, depth: usize) -> Vec<Token> {
        let mut out: Vec<Token> = Vec::new();
        let mut cursor = 0;

        while cursor < text.len() {
            match self.find_next_match(grammar_id, text, cursor) {
                RuleScan::Matched {
                    token_type,
                    pattern,
                    mut found,
                } => {
                    if pattern.greedy {
                        self.extend_greedy(pattern, text, &mut found);
                    }

                    // The gap, including any lookbehind prefix, stays
                    // unclassified
                    if found.effective_start > cursor {
                        push_text(&mut out, &text[cursor..found.effective_start]);
                    }

                    let span = &text[found.effective_start..found.end];
                    out.push(Token::Syntax {
                        name: token_type.name.clone(),
                        alias: pattern.alias.clone(),
                        content: self.span_content(pattern, span, depth),
                    });

                    cursor = found.end;
                }
                RuleScan::OnlyEmpty => {
                    // Zero-length match guard: emit one character and move on
                    // so pathological grammars still terminate
                    let step = text[cursor..]
                        .chars()
                        .next()
                        .map_or(1, |c| c.len_utf8());
                    push_text(&mut out, &text[cursor..cursor + step]);
                    cursor += step;
                }
                RuleScan::NoMatch => {
                    push_text(&mut out, &text[cursor..]);
                    break;
                }
            }
        }

        out
    }

    /// Tries every rule in declaration order and returns the first match at
    /// or after `cursor`. Matches with an empty effective span are treated as
    /// no-match; they are reported separately so the caller can force
    /// forward progress.
    fn find_next_match<'g>(
        &'g self,
        grammar_id: GrammarId,
        text: &str,
        cursor: usize,
    ) -> RuleScan<'g> {
        let grammar = self.registry.grammar(grammar_id);
        let mut saw_empty = false;

        for token_type in &grammar.tokens {
            for pattern in &token_type.patterns {
                let Some(found) = pattern.find(text, cursor) else {
                    continue;
                };
                if found.effective_start >= found.end {
                    saw_empty = true;
                    continue;
                }
                return RuleScan::Matched {
                    token_type,
                    pattern,
                    found,
                };
            }
        }

        if saw_empty {
            RuleScan::OnlyEmpty
        } else {
            RuleScan::NoMatch
        }
    }

    /// Greedy handling: re-attempt the same pattern against the text
    /// immediately following the current match and absorb it while it keeps
    /// matching contiguously. Used for constructs like strings with escape
    /// continuations, where one logical token must not yield to
    /// lower-priority rules mid-token.
    fn extend_greedy(&self, pattern: &Pattern, text: &str, found: &mut PatternMatch) {
        while let Some(next) = pattern.find(text, found.end) {
            if next.effective_start != found.end || next.end <= found.end {
                break;
            }
            found.end = next.end;
        }
    }

    /// The content of a matched span: recursively tokenized when the pattern
    /// carries a nested grammar we can resolve, the literal substring
    /// otherwise. Greedy extension has already run by the time we get here,
    /// so the inside grammar sees the full extended span once.
    fn span_content(&self, pattern: &Pattern, span: &str, depth: usize) -> TokenContent {
        if depth < MAX_NESTING_DEPTH
            && let Some(inside) = &pattern.inside
            && let Some(inside_id) = self.registry.resolve(inside)
        {
            return TokenContent::Children(self.tokenize_at_depth(span, inside_id, depth + 1));
        }
        TokenContent::Text(span.to_string())
    }
}

enum RuleScan<'g> {
    Matched {
        token_type: &'g GrammarToken,
        pattern: &'g Pattern,
        found: PatternMatch,
    },
    /// Some rule matched, but only with an empty effective span
    OnlyEmpty,
    NoMatch,
}

/// Appends text output, coalescing with a trailing text token so gap
/// emission and the zero-length guard don't spray single-character tokens
fn push_text(out: &mut Vec<Token>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Token::Text { content }) = out.last_mut() {
        content.push_str(text);
        return;
    }
    out.push(Token::text(text));
}
