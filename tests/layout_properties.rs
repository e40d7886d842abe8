mod common;

use common::{image_draws, page_count, png_base64, text_runs};
use dealpress::one_pager::ImageDescriptor;
use dealpress::{FontSet, FontStyle, OnePagerInput, Pt, wrap_text};
use proptest::prelude::*;

const BOTTOM_MARGIN: f32 = 50.0;
const FOOTER_Y: f32 = 30.0;
// Smallest line height any step uses (8pt text at 1.4).
const MIN_LINE: f32 = 11.2;

fn long_prose(words: usize) -> String {
    (0..words)
        .map(|i| format!("growth{}", i % 97))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn nothing_is_drawn_below_the_bottom_margin() {
    let mut input = OnePagerInput {
        business_overview: Some(long_prose(900)),
        products_services: Some(long_prose(400)),
        use_of_funds: Some(long_prose(300)),
        ..OnePagerInput::default()
    };
    for i in 0..4 {
        input.images.push(ImageDescriptor {
            data: Some(png_base64(400 + i * 10, 300)),
            original_name: Some(format!("shot{i}.png")),
            ..ImageDescriptor::default()
        });
    }
    let bytes = dealpress::generate_one_pager(&input).unwrap();
    assert!(page_count(&bytes) >= 3);

    for run in text_runs(&bytes) {
        if run.y == FOOTER_Y {
            continue;
        }
        assert!(
            run.y - MIN_LINE >= BOTTOM_MARGIN - 0.01,
            "{:?} crosses the bottom margin",
            run
        );
    }
    let draws = image_draws(&bytes);
    assert_eq!(draws.len(), 4);
    for draw in draws {
        assert!(draw.y >= BOTTOM_MARGIN);
        assert!(draw.y + draw.height <= 800.0);
    }
}

#[test]
fn oversized_word_is_one_line() {
    let fonts = FontSet::standard();
    let word = "x".repeat(200);
    let max_width = fonts.measure(FontStyle::Regular, Pt::from_i32(10), &"x".repeat(20));
    let lines = wrap_text(&fonts, &word, FontStyle::Regular, Pt::from_i32(10), max_width);
    assert_eq!(lines, vec![word]);
}

fn words() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[A-Za-z0-9,.]{1,40}", 0..60)
}

proptest! {
    #[test]
    fn wrapped_lines_fit_or_hold_one_oversized_word(
        words in words(),
        separators in prop::collection::vec(prop_oneof![Just(" "), Just("  "), Just("\n")], 60),
        max_width in 20i32..500,
        bold in any::<bool>(),
        size in prop_oneof![Just(8i32), Just(10), Just(12), Just(16)],
    ) {
        let fonts = FontSet::standard();
        let style = if bold { FontStyle::Bold } else { FontStyle::Regular };
        let mut text = String::new();
        for (word, sep) in words.iter().zip(separators.iter()) {
            text.push_str(word);
            text.push_str(sep);
        }
        let max_width = Pt::from_i32(max_width);
        let size = Pt::from_i32(size);
        let lines = wrap_text(&fonts, &text, style, size, max_width);

        for line in &lines {
            let width = fonts.measure(style, size, line);
            let single_word = !line.contains(' ');
            prop_assert!(
                width <= max_width || (single_word && width > max_width),
                "line {:?} is {:?} wide for {:?}", line, width, max_width
            );
        }

        let rejoined: Vec<&str> = lines.iter().flat_map(|l| l.split_whitespace()).collect();
        let original: Vec<&str> = words.iter().map(String::as_str).collect();
        prop_assert_eq!(rejoined, original);
    }

    #[test]
    fn wrapping_is_deterministic(text in "[a-z ]{0,200}", max_width in 10i32..300) {
        let fonts = FontSet::standard();
        let a = wrap_text(&fonts, &text, FontStyle::Regular, Pt::from_i32(10), Pt::from_i32(max_width));
        let b = wrap_text(&fonts, &text, FontStyle::Regular, Pt::from_i32(10), Pt::from_i32(max_width));
        prop_assert_eq!(a, b);
    }
}
