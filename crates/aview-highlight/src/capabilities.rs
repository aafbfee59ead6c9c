//! Pattern primitives handed to language providers.

use crate::error::HighlightError;
use crate::grammar::Pattern;
use regex::RegexBuilder;

/// Capability object passed to every language provider at registration.
///
/// Patterns are compiled in multi-line CRLF mode, so `^` and `$` anchor at
/// line boundaries and `.` never takes the `\r` of a `\r\n`.
/// Case-insensitivity is requested per pattern with `(?i)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Capabilities;

impl Capabilities {
    /// Compile a pattern for use in a rule.
    pub fn pattern(&self, source: &str) -> Result<Pattern, HighlightError> {
        let regex = RegexBuilder::new(source)
            .multi_line(true)
            .crlf(true)
            .build()
            .map_err(|source_err| HighlightError::InvalidPattern {
                pattern: source.to_string(),
                source: source_err,
            })?;
        Ok(Pattern::new(regex))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_is_multi_line() {
        let pattern = Capabilities.pattern("^b$").unwrap();
        assert_eq!(pattern.find_from("a\nb\nc", 0, 0).unwrap().span, 2..3);
    }

    #[test]
    fn test_pattern_stops_before_carriage_return() {
        let pattern = Capabilities.pattern("^a.*$").unwrap();
        assert_eq!(pattern.find_from("ab\r\nc", 0, 0).unwrap().span, 0..2);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = Capabilities.pattern("(unclosed").unwrap_err();
        assert!(matches!(err, HighlightError::InvalidPattern { .. }));
    }
}
