use std::fmt;
use std::sync::{Arc, OnceLock};

use onig::{RegexOptions, Syntax};

/// A regex wrapper that keeps the source pattern around but compiles lazily
/// at runtime.
///
/// Grammars carry thousands of patterns and most of them are never exercised
/// for a given input, so eager compilation at load time would be wasted work.
/// A pattern whose source does not compile becomes a permanent non-matcher:
/// the failure is logged once and `compiled()` keeps returning `None`.
pub struct Regex {
    pattern: String,
    flags: String,
    compiled: OnceLock<Option<Arc<onig::Regex>>>,
}

impl Clone for Regex {
    fn clone(&self) -> Self {
        // Create a new regex with the same pattern but fresh lazy compilation
        Regex::new(self.pattern.clone(), self.flags.clone())
    }
}

impl fmt::Debug for Regex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "/{}/{}", self.pattern, self.flags)
    }
}

impl Regex {
    pub fn new(pattern: String, flags: String) -> Self {
        Self {
            pattern,
            flags,
            compiled: OnceLock::new(),
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn flags(&self) -> &str {
        &self.flags
    }

    /// Maps the flag characters carried by grammar definitions onto onig
    /// options. `i` is case-insensitivity, `s` is dot-matches-newline
    /// (`REGEX_OPTION_MULTI_LINE` in oniguruma terms). The JavaScript `m`
    /// flag needs no mapping: `^`/`$` already match at line boundaries in the
    /// default syntax. `g`/`u`/`y` only affect the JS matching loop, which we
    /// drive ourselves, so they are ignored.
    fn options(&self) -> RegexOptions {
        let mut options = RegexOptions::REGEX_OPTION_NONE;
        for flag in self.flags.chars() {
            match flag {
                'i' => options |= RegexOptions::REGEX_OPTION_IGNORECASE,
                's' => options |= RegexOptions::REGEX_OPTION_MULTILINE,
                _ => {}
            }
        }
        options
    }

    pub fn compiled(&self) -> Option<&Arc<onig::Regex>> {
        self.compiled
            .get_or_init(|| {
                match onig::Regex::with_options(&self.pattern, self.options(), Syntax::default()) {
                    Ok(re) => Some(Arc::new(re)),
                    Err(err) => {
                        log::warn!("invalid pattern {self:?}, rule will never match: {err}");
                        None
                    }
                }
            })
            .as_ref()
    }

    /// Validate that this regex pattern compiles successfully
    pub fn validate(&self) -> Result<(), onig::Error> {
        onig::Regex::with_options(&self.pattern, self.options(), Syntax::default()).map(|_| ())
    }
}
