//! URI acceptance rules for decoded QR payloads.
//!
//! A single camera frame can contain several QR codes, and the decoder may
//! also report empty strings for codes it located but could not read.  The
//! detector therefore runs every decoded string through [`select_candidate`]:
//!
//! 1. Empty strings are skipped.
//! 2. If a [`UriPattern`] is configured, strings that do not match it
//!    *completely* are skipped.
//! 3. The first string that survives is returned.
//!
//! # Full-match semantics
//!
//! `UriPattern` wraps the user's expression as `^(?:...)$`, so
//! `https://connpass\.com/.*` does not accept
//! `xhttps://connpass.com/event/1`.  Anchors the user already wrote
//! (`^...$`) are harmless.

use std::fmt;

use regex::Regex;
use thiserror::Error;

/// Error returned when a user-supplied pattern does not compile.
#[derive(Debug, Error)]
#[error("invalid URI pattern {pattern:?}: {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}

/// A compiled regular expression applied with full-match semantics.
#[derive(Debug, Clone)]
pub struct UriPattern {
    source: String,
    regex: Regex,
}

impl UriPattern {
    /// Compiles `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] when the expression is not valid `regex` syntax.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let anchored = format!("^(?:{pattern})$");
        let regex = Regex::new(&anchored).map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// The expression as the user wrote it.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if the whole of `candidate` matches.
    pub fn is_full_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

impl fmt::Display for UriPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for UriPattern {
    type Err = PatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Returns `true` if `candidate` is an acceptable decoded URI.
pub fn is_acceptable(candidate: &str, pattern: Option<&UriPattern>) -> bool {
    if candidate.is_empty() {
        return false;
    }
    match pattern {
        Some(p) => p.is_full_match(candidate),
        None => true,
    }
}

/// Picks the first acceptable string out of one frame's decode results.
pub fn select_candidate<I, S>(candidates: I, pattern: Option<&UriPattern>) -> Option<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    candidates
        .into_iter()
        .find(|c| is_acceptable(c.as_ref(), pattern))
        .map(|c| c.as_ref().to_string())
}
