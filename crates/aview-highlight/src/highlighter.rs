//! Rule-driven highlighting engine.
//!
//! At each level the rules compete for the leftmost match; a tie goes to
//! the rule declared first. A matched region hides the text it covers from
//! its siblings and is rescanned only by its own sub-rules.

use crate::grammar::{next_char_boundary, DisplayClass, Language, PatternMatch, Rule};
use serde::Serialize;
use std::ops::Range;

/// A classified byte range of the source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub class: DisplayClass,
    /// Nesting level, 0 for top-level rules
    pub depth: usize,
}

impl HighlightSpan {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// A run of text with a single effective class (the innermost span).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub class: Option<DisplayClass>,
}

impl Segment {
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.start..self.end]
    }
}

/// Highlight `text` with `language`.
///
/// Spans come back in document order, each parent before its children.
pub fn highlight(language: &Language, text: &str) -> Vec<HighlightSpan> {
    let mut spans = Vec::new();
    scan(&language.rules, text, 0, 0, text.len(), 0, &mut spans);
    spans
}

/// A matchable rule plus the container classes wrapping it.
struct Alternative<'r> {
    rule: &'r Rule,
    wrappers: Vec<DisplayClass>,
}

fn alternatives<'r>(
    rules: &'r [Rule],
    wrappers: &[DisplayClass],
    out: &mut Vec<Alternative<'r>>,
) {
    for rule in rules {
        if rule.is_container() {
            let mut nested = wrappers.to_vec();
            nested.push(rule.class);
            alternatives(&rule.contains, &nested, out);
        } else {
            out.push(Alternative {
                rule,
                wrappers: wrappers.to_vec(),
            });
        }
    }
}

fn scan(
    rules: &[Rule],
    text: &str,
    scan_start: usize,
    from: usize,
    limit: usize,
    depth: usize,
    spans: &mut Vec<HighlightSpan>,
) {
    let haystack = &text[..limit];
    let mut alts = Vec::new();
    alternatives(rules, &[], &mut alts);
    if alts.is_empty() {
        return;
    }

    // Leftmost match per alternative, reused until the scan moves past it
    let mut cache: Vec<Option<Option<PatternMatch>>> = vec![None; alts.len()];
    let mut pos = from;

    while pos < limit {
        let mut best: Option<(usize, PatternMatch)> = None;
        for (i, alt) in alts.iter().enumerate() {
            let stale = match &cache[i] {
                None => true,
                Some(Some(m)) => m.span.start < pos,
                Some(None) => false,
            };
            if stale {
                cache[i] = Some(next_match(alt.rule, haystack, scan_start, pos));
            }
            if let Some(Some(m)) = &cache[i] {
                if best
                    .as_ref()
                    .is_none_or(|(_, current)| m.span.start < current.span.start)
                {
                    best = Some((i, m.clone()));
                }
            }
        }

        let Some((i, m)) = best else {
            break;
        };
        let alt = &alts[i];
        let (region_end, resume) = region(alt.rule, haystack, &m, limit);

        for (level, class) in alt.wrappers.iter().enumerate() {
            spans.push(HighlightSpan {
                start: m.span.start,
                end: region_end,
                class: *class,
                depth: depth + level,
            });
        }
        let inner = depth + alt.wrappers.len();
        spans.push(HighlightSpan {
            start: m.span.start,
            end: region_end,
            class: alt.rule.class,
            depth: inner,
        });

        if !alt.rule.contains.is_empty() {
            let child_from = if alt.rule.return_begin {
                m.span.start
            } else {
                m.whole.end.min(region_end)
            };
            scan(
                &alt.rule.contains,
                text,
                m.whole.start,
                child_from,
                region_end,
                inner + 1,
                spans,
            );
        }

        pos = resume;
    }
}

/// First non-empty begin match of `rule` at or after `pos`.
fn next_match(rule: &Rule, haystack: &str, scan_start: usize, pos: usize) -> Option<PatternMatch> {
    let begin = rule.begin.as_ref()?;
    let mut at = pos;
    loop {
        let m = begin.find_from(haystack, scan_start, at)?;
        if !m.span.is_empty() {
            return Some(m);
        }
        at = next_char_boundary(haystack, m.span.end);
        if at > haystack.len() {
            return None;
        }
    }
}

/// End of the region opened by `m`, and where scanning resumes after it.
fn region(rule: &Rule, haystack: &str, m: &PatternMatch, limit: usize) -> (usize, usize) {
    let after_begin = m.whole.end.max(m.span.end);
    let Some(end) = &rule.end else {
        return (m.span.end, after_begin);
    };

    match end.find_from(haystack, after_begin, after_begin) {
        Some(e) if rule.exclude_end => (e.span.start, e.span.start),
        Some(e) => (e.span.end, e.whole.end.max(e.span.end)),
        // Unterminated regions run to the end of the enclosing region
        None => (limit, limit),
    }
}

/// Flatten nested spans into non-overlapping segments covering all of `text`.
pub fn segments(text: &str, spans: &[HighlightSpan]) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut stack: Vec<&HighlightSpan> = Vec::new();
    let mut cursor = 0;

    for span in spans {
        fill(&mut out, &mut stack, &mut cursor, span.start);
        stack.push(span);
    }
    fill(&mut out, &mut stack, &mut cursor, text.len());
    out
}

fn fill(
    out: &mut Vec<Segment>,
    stack: &mut Vec<&HighlightSpan>,
    cursor: &mut usize,
    target: usize,
) {
    while *cursor < target {
        while stack.last().is_some_and(|s| s.end <= *cursor) {
            stack.pop();
        }
        let (end, class) = match stack.last() {
            Some(span) => (span.end.min(target), Some(span.class)),
            None => (target, None),
        };
        push_segment(out, *cursor, end, class);
        *cursor = end;
    }
    while stack.last().is_some_and(|s| s.end <= *cursor) {
        stack.pop();
    }
}

fn push_segment(out: &mut Vec<Segment>, start: usize, end: usize, class: Option<DisplayClass>) {
    if start >= end {
        return;
    }
    if let Some(last) = out.last_mut() {
        if last.end == start && last.class == class {
            last.end = end;
            return;
        }
    }
    out.push(Segment { start, end, class });
}

/// Split segments into lines, matching `str::lines`.
///
/// Line terminators (`\n`, `\r\n`) belong to no returned segment.
pub fn split_lines(text: &str, segments: &[Segment]) -> Vec<Vec<Segment>> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut lines: Vec<Vec<Segment>> = vec![Vec::new()];
    for seg in segments {
        let mut start = seg.start;
        for (offset, _) in text[seg.start..seg.end].match_indices('\n') {
            let newline = seg.start + offset;
            if let Some(line) = lines.last_mut() {
                push_segment(line, start, newline, seg.class);
                trim_carriage_return(text, line, newline);
            }
            lines.push(Vec::new());
            start = newline + 1;
        }
        if let Some(line) = lines.last_mut() {
            push_segment(line, start, seg.end, seg.class);
        }
    }

    if text.ends_with('\n') {
        lines.pop();
    }
    lines
}

/// Drop the `\r` of a `\r\n` terminator, whichever segment holds it.
fn trim_carriage_return(text: &str, line: &mut Vec<Segment>, newline: usize) {
    if newline == 0 || text.as_bytes()[newline - 1] != b'\r' {
        return;
    }
    if let Some(last) = line.last_mut() {
        if last.end == newline {
            last.end -= 1;
            if last.start == last.end {
                line.pop();
            }
        }
    }
}
