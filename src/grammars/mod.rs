mod compiled;
mod raw;
mod regex;

pub use compiled::{Grammar, GrammarId, GrammarRef, GrammarToken, Pattern, PatternMatch};
pub use raw::{RawGrammar, RawGrammarSet, RawInside, RawPattern, RawToken};
pub use regex::Regex;
