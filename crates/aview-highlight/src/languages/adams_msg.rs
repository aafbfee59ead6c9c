//! Adams solver message files (`.msg`).
//!
//! Highlights numbers, echoed ` command: ` lines (comments and code), error
//! blocks and convergence messages.

use crate::capabilities::Capabilities;
use crate::error::HighlightError;
use crate::grammar::{DisplayClass, Language, Rule};

/// Primary registry id.
pub const ID: &str = "adams_msg";

/// Optional sign, digits, fraction, exponent and a Fortran `d`/`D` precision marker.
const NUMBER: &str = r"[-+]?(?:\b[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][-+]?[0-9]+)?[dD]?\b";

pub fn adams_msg(caps: &Capabilities) -> Result<Language, HighlightError> {
    let numerics = Rule::new(DisplayClass::Numerics).begin(caps.pattern(NUMBER)?);

    let commands = Rule::new(DisplayClass::Commands)
        .begin(caps.pattern(r"(?i)^ command: .*$")?)
        .return_begin()
        .contains(vec![
            Rule::new(DisplayClass::Strong)
                .begin(caps.pattern(r"(?i) command")?)
                .end(caps.pattern(":")?)
                .exclude_end(),
            Rule::new(DisplayClass::Comment)
                .begin(caps.pattern(r"(?i)^ command: (?P<body>\s*!.*)$")?),
            Rule::new(DisplayClass::Code).begin(caps.pattern(r"(?i)^ command: (?P<body>.*)$")?),
        ]);

    let messages = Rule::new(DisplayClass::Messages).contains(vec![
        Rule::new(DisplayClass::Deletion)
            .begin(caps.pattern(r"(?i)-+ start: error -+")?)
            .end(caps.pattern(r"(?i)-+ end: error -+")?),
        Rule::new(DisplayClass::Addition).begin(caps.pattern(r"(?i)^.*solution converged.*$")?),
        Rule::new(DisplayClass::Deletion)
            .begin(caps.pattern(r"(?i)^.*solution failed to converge.*$")?),
    ]);

    Ok(Language::new("Adams msg")
        .aliases([ID, "msg"])
        .rule(numerics)
        .rule(commands)
        .rule(messages))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlighter::{highlight, segments, split_lines, HighlightSpan};

    fn language() -> Language {
        adams_msg(&Capabilities).unwrap()
    }

    fn spans_of<'a>(text: &'a str, spans: &[HighlightSpan], class: DisplayClass) -> Vec<&'a str> {
        spans
            .iter()
            .filter(|s| s.class == class)
            .map(|s| s.text(text))
            .collect()
    }

    #[test]
    fn test_command_comment() {
        let text = " command: !do nothing";
        let spans = highlight(&language(), text);
        assert_eq!(spans_of(text, &spans, DisplayClass::Commands), vec![text]);
        assert_eq!(spans_of(text, &spans, DisplayClass::Strong), vec![" command"]);
        assert_eq!(spans_of(text, &spans, DisplayClass::Comment), vec!["!do nothing"]);
        assert!(spans_of(text, &spans, DisplayClass::Code).is_empty());
    }

    #[test]
    fn test_command_code() {
        let text = " command: run solver";
        let spans = highlight(&language(), text);
        assert_eq!(spans_of(text, &spans, DisplayClass::Strong), vec![" command"]);
        assert_eq!(spans_of(text, &spans, DisplayClass::Code), vec!["run solver"]);
        assert!(spans_of(text, &spans, DisplayClass::Comment).is_empty());
    }

    #[test]
    fn test_command_case_insensitive_and_numbers_claimed() {
        let text = "step 1\n COMMAND: sim/dyn, end=10, steps=100\n";
        let spans = highlight(&language(), text);
        assert_eq!(spans_of(text, &spans, DisplayClass::Numerics), vec!["1"]);
        assert_eq!(spans_of(text, &spans, DisplayClass::Strong), vec![" COMMAND"]);
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Code),
            vec!["sim/dyn, end=10, steps=100"]
        );
    }

    #[test]
    fn test_command_must_start_line() {
        let text = "note: command: not echoed";
        let spans = highlight(&language(), text);
        assert!(spans_of(text, &spans, DisplayClass::Commands).is_empty());
    }

    #[test]
    fn test_convergence_lines() {
        let text = "solution converged at step 10\nsolution failed to converge\n";
        let spans = highlight(&language(), text);
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Addition),
            vec!["solution converged at step 10"]
        );
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Deletion),
            vec!["solution failed to converge"]
        );
        // Both are wrapped in the messages container
        assert_eq!(spans_of(text, &spans, DisplayClass::Messages).len(), 2);
        assert!(spans_of(text, &spans, DisplayClass::Numerics).is_empty());
    }

    #[test]
    fn test_error_block_spans_delimiters() {
        let text = "before 1\n\
                    ----- start: error -----\n\
                    Part 3 is missing a marker.\n\
                    ----- end: error -----\n\
                    after 2\n";
        let spans = highlight(&language(), text);
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Deletion),
            vec![
                "----- start: error -----\n\
                 Part 3 is missing a marker.\n\
                 ----- end: error -----"
            ]
        );
        assert_eq!(spans_of(text, &spans, DisplayClass::Numerics), vec!["1", "2"]);
    }

    #[test]
    fn test_error_block_case_insensitive() {
        let text = "--- START: ERROR ---\nx\n--- End: Error ---";
        let spans = highlight(&language(), text);
        assert_eq!(spans_of(text, &spans, DisplayClass::Deletion), vec![text]);
    }

    #[test]
    fn test_numerics() {
        let text = "t=1.5e-3 dt -2.0 x 42 tol .5 r 2.5D sig +7E+2 R2D2";
        let spans = highlight(&language(), text);
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Numerics),
            vec!["1.5e-3", "-2.0", "42", ".5", "2.5D", "+7E+2"]
        );
    }

    #[test]
    fn test_unterminated_error_block_runs_to_end() {
        let text = "step 4\n--- start: error ---\nPart 3 has no end marker\n";
        let spans = highlight(&language(), text);
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Deletion),
            vec!["--- start: error ---\nPart 3 has no end marker\n"]
        );
        assert_eq!(spans_of(text, &spans, DisplayClass::Numerics), vec!["4"]);
    }

    #[test]
    fn test_leading_number_beats_convergence_line() {
        // Both start at column 0; numerics is declared first
        let text = "1 solution converged";
        let spans = highlight(&language(), text);
        assert_eq!(spans_of(text, &spans, DisplayClass::Numerics), vec!["1"]);
        assert!(spans_of(text, &spans, DisplayClass::Addition).is_empty());
        assert!(spans_of(text, &spans, DisplayClass::Messages).is_empty());
    }

    #[test]
    fn test_crlf_lines() {
        let text = "solution converged\r\n command: run 1\r\nplain\r\n";
        let spans = highlight(&language(), text);
        assert_eq!(
            spans_of(text, &spans, DisplayClass::Addition),
            vec!["solution converged"]
        );
        assert_eq!(spans_of(text, &spans, DisplayClass::Code), vec!["run 1"]);

        let lines: Vec<String> = split_lines(text, &segments(text, &spans))
            .iter()
            .map(|line| line.iter().map(|s| s.text(text)).collect())
            .collect();
        assert_eq!(lines, text.lines().collect::<Vec<_>>());
    }
}
