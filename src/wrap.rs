use crate::font::{FontSet, FontStyle};
use crate::types::Pt;

/// Breaks `text` into lines no wider than `max_width` when set in `style` at
/// `font_size`.
///
/// Words are the unit of breaking: a word wider than `max_width` is placed
/// on a line of its own and allowed to overflow rather than being split.
/// Runs of whitespace collapse to a single space. Empty or all-whitespace
/// input yields no lines.
pub fn wrap_text(
    fonts: &FontSet,
    text: &str,
    style: FontStyle,
    font_size: Pt,
    max_width: Pt,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let mut candidate = String::with_capacity(current.len() + word.len() + 1);
        candidate.push_str(&current);
        candidate.push(' ');
        candidate.push_str(word);
        if fonts.measure(style, font_size, &candidate) > max_width {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Cuts `text` to at most `max_chars` characters. Used for table cells whose
/// column is known to be narrow.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Longest prefix of `text` that measures no wider than `max_width`, cut on
/// character boundaries with trailing spaces removed.
pub fn truncate_to_width(
    fonts: &FontSet,
    text: &str,
    style: FontStyle,
    font_size: Pt,
    max_width: Pt,
) -> String {
    if fonts.measure(style, font_size, text) <= max_width {
        return text.to_string();
    }
    let mut count = text.chars().count();
    while count > 0 {
        count -= 1;
        let cut = truncate_chars(text, count);
        if fonts.measure(style, font_size, &cut) <= max_width {
            return cut.trim_end().to_string();
        }
    }
    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, max_width: f32) -> Vec<String> {
        wrap_text(
            &FontSet::standard(),
            text,
            FontStyle::Regular,
            Pt::from_i32(10),
            Pt::from_f32(max_width),
        )
    }

    #[test]
    fn empty_input_has_no_lines() {
        assert!(wrap("", 100.0).is_empty());
        assert!(wrap("   \n\t ", 100.0).is_empty());
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap("Acme Pvt Ltd", 495.0), vec!["Acme Pvt Ltd".to_string()]);
    }

    #[test]
    fn breaks_before_the_word_that_overflows() {
        // "aaaa" at 10pt is 22.24pt wide, a space is 2.78pt.
        let lines = wrap("aaaa aaaa aaaa", 50.0);
        assert_eq!(lines, vec!["aaaa aaaa".to_string(), "aaaa".to_string()]);
    }

    #[test]
    fn oversized_word_gets_its_own_line() {
        let word = "x".repeat(200);
        // Roughly twenty characters of room.
        let lines = wrap(&word, 100.0);
        assert_eq!(lines, vec![word]);
    }

    #[test]
    fn oversized_word_between_short_words() {
        let long = "W".repeat(40);
        let text = format!("to {long} be");
        let lines = wrap(&text, 120.0);
        assert_eq!(lines, vec!["to".to_string(), long, "be".to_string()]);
    }

    #[test]
    fn bold_wraps_earlier_than_regular() {
        let fonts = FontSet::standard();
        let text = "mandate mandate mandate mandate mandate mandate";
        let size = Pt::from_i32(10);
        let width = fonts.measure(FontStyle::Regular, size, text);
        let regular = wrap_text(&fonts, text, FontStyle::Regular, size, width);
        let bold = wrap_text(&fonts, text, FontStyle::Bold, size, width);
        assert_eq!(regular.len(), 1);
        assert!(bold.len() > 1);
    }

    #[test]
    fn truncate_to_width_keeps_the_longest_fitting_prefix() {
        let fonts = FontSet::standard();
        let size = Pt::from_i32(10);
        // "aaaa" is 22.24pt wide at 10pt.
        let cut = truncate_to_width(&fonts, "aaaa aaaa", FontStyle::Regular, size, Pt::from_f32(30.0));
        assert_eq!(cut, "aaaa");
        let fits = truncate_to_width(&fonts, "Acme", FontStyle::Bold, size, Pt::from_i32(225));
        assert_eq!(fits, "Acme");
        let none = truncate_to_width(&fonts, "W", FontStyle::Regular, size, Pt::ZERO);
        assert_eq!(none, "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("Reliance Industries Ltd", 15), "Reliance Indust");
        assert_eq!(truncate_chars("PeerCo", 15), "PeerCo");
        assert_eq!(truncate_chars("\u{e9}\u{e9}\u{e9}", 2), "\u{e9}\u{e9}");
    }
}
