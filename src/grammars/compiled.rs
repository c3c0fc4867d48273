use std::ops::Index;

use onig::{Region, SearchOptions};

use crate::grammars::regex::Regex;

/// Handle to a grammar slot in the registry arena.
///
/// Grammars embed themselves and each other freely, so patterns never own
/// their nested grammar. They store a handle that is resolved through the
/// registry at tokenize time, which sidesteps ownership cycles entirely.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct GrammarId(pub(crate) u16);

impl GrammarId {
    pub(crate) fn as_index(self) -> usize {
        self.0 as usize
    }
}

impl Index<GrammarId> for Vec<Grammar> {
    type Output = Grammar;

    fn index(&self, id: GrammarId) -> &Self::Output {
        &self[id.as_index()]
    }
}

/// The nested grammar of a pattern.
///
/// Inline grammars are materialized into the arena at load time and referred
/// to by id. Language references stay by name and are looked up lazily at
/// first use: the target may be the grammar currently being loaded
/// (self-recursion) or one that loads later (cross-language embedding), so
/// resolving at load time would force a topological order across 200+
/// mutually referencing grammars.
#[derive(Debug, Clone)]
pub enum GrammarRef {
    Id(GrammarId),
    Lang(String),
}

/// A single match attempt result, in absolute byte offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatternMatch {
    /// Start of the full regex match
    pub start: usize,
    /// End of the match (exclusive)
    pub end: usize,
    /// Start of the meaningful match, after discarding the lookbehind prefix.
    /// Equal to `start` for patterns without lookbehind.
    pub effective_start: usize,
}

/// One compiled matching rule plus its metadata
#[derive(Debug, Clone)]
pub struct Pattern {
    pub(crate) regex: Regex,
    pub(crate) lookbehind: bool,
    pub(crate) greedy: bool,
    pub(crate) alias: Option<String>,
    pub(crate) inside: Option<GrammarRef>,
}

impl Pattern {
    pub(crate) fn new(regex: Regex) -> Self {
        Self {
            regex,
            lookbehind: false,
            greedy: false,
            alias: None,
            inside: None,
        }
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }

    pub fn inside(&self) -> Option<&GrammarRef> {
        self.inside.as_ref()
    }

    /// Searches for this pattern in `text`, starting at byte offset `pos`.
    ///
    /// This is a scan, not an anchored match: the returned span may begin
    /// anywhere at or after `pos`. With `lookbehind` set and the first
    /// capture group matched as a prefix of the match, the group is discarded
    /// from the front of the reported span, emulating a lookbehind assertion
    /// with lookahead-only primitives. A group that matched somewhere in the
    /// middle is not a prefix and leaves the span alone; its raw length could
    /// put the offset inside a multi-byte character.
    ///
    /// A pattern whose regex failed to compile never matches.
    pub fn find(&self, text: &str, pos: usize) -> Option<PatternMatch> {
        debug_assert!(pos <= text.len());
        let re = self.regex.compiled()?;

        let mut region = Region::new();
        re.search_with_options(
            text,
            pos,
            text.len(),
            SearchOptions::SEARCH_OPTION_NONE,
            Some(&mut region),
        )?;
        let (start, end) = region.pos(0)?;

        let mut effective_start = start;
        if self.lookbehind
            && let Some((group_start, group_end)) = region.pos(1)
            && group_start == start
        {
            effective_start = group_end;
        }

        Some(PatternMatch {
            start,
            end,
            effective_start,
        })
    }
}

/// A token type: name plus ordered patterns
#[derive(Debug, Clone)]
pub struct GrammarToken {
    pub name: String,
    pub patterns: Vec<Pattern>,
}

/// One language's full rule set.
///
/// Both the token types and the patterns within a type keep their authored
/// order: earlier entries take priority at a given scan position.
#[derive(Debug, Clone, Default)]
pub struct Grammar {
    pub name: String,
    pub tokens: Vec<GrammarToken>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(source: &str) -> Pattern {
        Pattern::new(Regex::new(source.to_string(), String::new()))
    }

    #[test]
    fn find_scans_ahead_of_pos() {
        let p = pattern(r"\d+");
        let m = p.find("ab 42 cd", 0).unwrap();
        assert_eq!((m.start, m.end, m.effective_start), (3, 5, 3));
    }

    #[test]
    fn find_respects_start_pos() {
        let p = pattern(r"\d+");
        let m = p.find("1 2", 1).unwrap();
        assert_eq!((m.start, m.end), (2, 3));
        assert!(p.find("1 2", 3).is_none());
    }

    #[test]
    fn lookbehind_discards_leading_group() {
        let mut p = pattern(r"(::)\w+");
        p.lookbehind = true;
        let m = p.find("::x", 0).unwrap();
        assert_eq!(m.start, 0);
        assert_eq!(m.effective_start, 2);
        assert_eq!(m.end, 3);
    }

    #[test]
    fn lookbehind_prefix_offset_counts_bytes_not_chars() {
        let mut p = pattern(r"(é)x");
        p.lookbehind = true;
        let m = p.find("éx", 0).unwrap();
        // é is two bytes; the discarded prefix must end on its boundary
        assert_eq!(m.effective_start, 2);
        assert_eq!(m.end, 3);
    }

    #[test]
    fn lookbehind_group_in_the_middle_is_not_a_prefix() {
        // group 1 matches mid-pattern; treating its length as a prefix would
        // put the offset inside the two-byte é
        let mut p = pattern(r"aé(bc)");
        p.lookbehind = true;
        let m = p.find("aébc", 0).unwrap();
        assert_eq!(m.effective_start, m.start);
        assert_eq!((m.start, m.end), (0, 5));
    }

    #[test]
    fn lookbehind_without_group_match_keeps_full_span() {
        let mut p = pattern(r"(?:(\+)|-)\w+");
        p.lookbehind = true;
        let m = p.find("-abc", 0).unwrap();
        assert_eq!(m.effective_start, m.start);
    }

    #[test]
    fn inert_pattern_never_matches() {
        let p = pattern(r"(broken");
        assert!(p.find("anything", 0).is_none());
    }
}
