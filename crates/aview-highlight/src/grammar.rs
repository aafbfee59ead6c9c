//! Grammar rule model shared by all registered languages.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Range;

/// Name of the capture group that narrows a pattern's classified span.
///
/// A pattern containing this group classifies only the group's text; the
/// rest of the match is context that must be present but is not claimed.
/// This stands in for look-behind, which `regex` does not support.
pub const BODY_GROUP: &str = "body";

/// Display class attached to a classified span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayClass {
    Numerics,
    Commands,
    Strong,
    Comment,
    Code,
    Messages,
    Addition,
    Deletion,
}

impl DisplayClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numerics => "numerics",
            Self::Commands => "commands",
            Self::Strong => "strong",
            Self::Comment => "comment",
            Self::Code => "code",
            Self::Messages => "messages",
            Self::Addition => "addition",
            Self::Deletion => "deletion",
        }
    }
}

impl fmt::Display for DisplayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled matching pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
    focused: bool,
}

/// Result of a pattern search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    /// Byte range of the whole match, context included
    pub whole: Range<usize>,
    /// Byte range that is classified
    pub span: Range<usize>,
}

impl Pattern {
    pub(crate) fn new(regex: Regex) -> Self {
        let focused = regex.capture_names().any(|name| name == Some(BODY_GROUP));
        Self { regex, focused }
    }

    /// Find the first match whose classified span starts at or after `pos`.
    ///
    /// Plain patterns search from `pos`. Focused patterns search from
    /// `scan_start` so their context may precede `pos`, the way a
    /// look-behind assertion would.
    pub fn find_from(&self, haystack: &str, scan_start: usize, pos: usize) -> Option<PatternMatch> {
        if !self.focused {
            let m = self.regex.find_at(haystack, pos)?;
            return Some(PatternMatch {
                whole: m.range(),
                span: m.range(),
            });
        }

        let mut at = scan_start.min(pos);
        while at <= haystack.len() {
            let caps = self.regex.captures_at(haystack, at)?;
            let whole = caps.get(0)?.range();
            let span = caps
                .name(BODY_GROUP)
                .map(|m| m.range())
                .unwrap_or_else(|| whole.clone());
            if span.start >= pos {
                return Some(PatternMatch { whole, span });
            }
            at = if whole.end > whole.start {
                whole.end
            } else {
                next_char_boundary(haystack, whole.end)
            };
        }
        None
    }
}

pub(crate) fn next_char_boundary(s: &str, i: usize) -> usize {
    let mut j = i + 1;
    while j < s.len() && !s.is_char_boundary(j) {
        j += 1;
    }
    j
}

/// A named region of a grammar.
///
/// A rule without a `begin` pattern is a container: its sub-rules compete
/// at the container's own level and their spans are wrapped in the
/// container's class.
#[derive(Debug, Clone)]
pub struct Rule {
    pub class: DisplayClass,
    pub begin: Option<Pattern>,
    pub end: Option<Pattern>,
    /// Stop the region before the end match instead of after it
    pub exclude_end: bool,
    /// Let sub-rules rescan the begin match
    pub return_begin: bool,
    pub contains: Vec<Rule>,
}

impl Rule {
    pub fn new(class: DisplayClass) -> Self {
        Self {
            class,
            begin: None,
            end: None,
            exclude_end: false,
            return_begin: false,
            contains: Vec::new(),
        }
    }

    pub fn begin(mut self, pattern: Pattern) -> Self {
        self.begin = Some(pattern);
        self
    }

    pub fn end(mut self, pattern: Pattern) -> Self {
        self.end = Some(pattern);
        self
    }

    pub fn exclude_end(mut self) -> Self {
        self.exclude_end = true;
        self
    }

    pub fn return_begin(mut self) -> Self {
        self.return_begin = true;
        self
    }

    pub fn contains(mut self, rules: Vec<Rule>) -> Self {
        self.contains = rules;
        self
    }

    pub fn is_container(&self) -> bool {
        self.begin.is_none()
    }
}

/// A language definition: display name, aliases and the top-level rules.
#[derive(Debug, Clone)]
pub struct Language {
    pub name: String,
    pub aliases: Vec<String>,
    pub rules: Vec<Rule>,
}

impl Language {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            aliases: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aliases = aliases.into_iter().map(Into::into).collect();
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}
