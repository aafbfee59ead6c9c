//! HTML rendering of highlighted text.

use crate::highlighter::HighlightSpan;

/// Class prefix used for rendered spans.
const CLASS_PREFIX: &str = "hljs-";

/// Render `text` as HTML, wrapping every span in `<span class="hljs-CLASS">`.
///
/// Nested spans become nested elements. All text is HTML-escaped.
pub fn to_html(text: &str, spans: &[HighlightSpan]) -> String {
    let mut out = String::with_capacity(text.len() + spans.len() * 32);
    let mut open: Vec<&HighlightSpan> = Vec::new();
    let mut cursor = 0;

    for span in spans {
        close_until(text, &mut out, &mut open, &mut cursor, span.start);
        escape_into(&mut out, &text[cursor..span.start]);
        cursor = span.start;
        out.push_str("<span class=\"");
        out.push_str(CLASS_PREFIX);
        out.push_str(span.class.as_str());
        out.push_str("\">");
        open.push(span);
    }
    close_until(text, &mut out, &mut open, &mut cursor, text.len());
    escape_into(&mut out, &text[cursor..]);
    out
}

/// Close every open span that ends at or before `target`, emitting text up to each end.
fn close_until(
    text: &str,
    out: &mut String,
    open: &mut Vec<&HighlightSpan>,
    cursor: &mut usize,
    target: usize,
) {
    while let Some(top) = open.last() {
        if top.end > target {
            break;
        }
        escape_into(out, &text[*cursor..top.end]);
        *cursor = top.end;
        out.push_str("</span>");
        open.pop();
    }
}

fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
}
