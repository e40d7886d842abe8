//! Text cleanup applied to every string before it is measured or drawn.
//!
//! The built-in faces only carry the WinAnsi glyph set, so symbols outside it
//! are replaced by ASCII spellings here. Anything this pass does not know
//! about is left alone and rejected later by the layout context.

use crate::font::encodable;

/// Replaces currency and typographic symbols the built-in faces cannot
/// render. Whitespace outside the glyph set (tabs, form feeds, line
/// separators, thin spaces) becomes a plain space and other control
/// characters are dropped.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\u{20B9}' | '\u{20A8}' => {
                out.push_str("Rs.");
                if chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                    out.push(' ');
                }
            }
            '\u{2265}' => out.push_str(">="),
            '\u{2264}' => out.push_str("<="),
            '\u{2011}' | '\u{2212}' | '\u{2010}' => out.push('-'),
            '\u{2032}' => out.push('\''),
            '\u{2033}' => out.push('"'),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => {}
            '\t' | '\n' | '\r' | '\u{2028}' | '\u{2029}' => out.push(' '),
            c if c.is_whitespace() && !encodable(c) => out.push(' '),
            c if c.is_control() => {}
            _ => out.push(ch),
        }
    }
    out
}

/// Sanitized `value`, or `fallback` when the value is missing or blank.
pub fn or_fallback(value: Option<&str>, fallback: &str) -> String {
    match value.map(sanitize) {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => fallback.to_string(),
    }
}
