use crate::canvas::{Canvas, Document};
use crate::debug::DebugLogger;
use crate::error::{DocError, Result};
use crate::font::{FontSet, FontStyle, unencodable_chars};
use crate::image::ImageFetcher;
use crate::types::{Margins, Pt, Size};
use serde_json::json;

/// Vertical write head for one document. `y` is the baseline of the next
/// line in PDF space and only ever moves down until a page break resets it.
#[derive(Debug, Clone)]
pub struct Cursor {
    y: Pt,
    top: Pt,
    bottom: Pt,
}

impl Cursor {
    pub fn new(page_size: Size, margins: Margins) -> Self {
        let top = page_size.height - margins.top;
        Self {
            y: top,
            top,
            bottom: margins.bottom,
        }
    }

    pub fn y(&self) -> Pt {
        self.y
    }

    pub fn at_top(&self) -> bool {
        self.y >= self.top
    }

    /// Starts a new page when `required` does not fit above the bottom
    /// margin. Returns whether a page was started.
    pub fn ensure_space(&mut self, canvas: &mut Canvas, required: Pt) -> bool {
        if self.y - required < self.bottom {
            canvas.show_page();
            self.y = self.top;
            return true;
        }
        false
    }

    pub fn advance(&mut self, height: Pt) {
        self.y -= height;
    }

    /// Forces a new page unless the cursor already sits at the top of an
    /// empty one.
    pub fn break_page(&mut self, canvas: &mut Canvas) -> bool {
        if self.at_top() && canvas.current_command_count() == 0 {
            return false;
        }
        canvas.show_page();
        self.y = self.top;
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LayoutStats {
    pub page_breaks: usize,
    pub images_embedded: usize,
    pub image_fallbacks: usize,
}

/// Everything one build mutates, passed explicitly to each primitive. A
/// context belongs to a single document and is consumed by `finish`.
pub struct LayoutContext<'a> {
    pub(crate) canvas: Canvas,
    pub(crate) cursor: Cursor,
    pub(crate) fonts: &'a FontSet,
    pub(crate) fetcher: &'a dyn ImageFetcher,
    pub(crate) debug: Option<&'a DebugLogger>,
    margins: Margins,
    line_gap_ratio: f32,
    section: String,
    pub(crate) stats: LayoutStats,
}

impl<'a> LayoutContext<'a> {
    pub fn new(
        page_size: Size,
        margins: Margins,
        fonts: &'a FontSet,
        fetcher: &'a dyn ImageFetcher,
    ) -> Self {
        Self {
            canvas: Canvas::new(page_size),
            cursor: Cursor::new(page_size, margins),
            fonts,
            fetcher,
            debug: None,
            margins,
            line_gap_ratio: 0.3,
            section: String::new(),
            stats: LayoutStats::default(),
        }
    }

    pub(crate) fn with_debug(mut self, debug: Option<&'a DebugLogger>) -> Self {
        self.debug = debug;
        self
    }

    pub(crate) fn with_line_gap_ratio(mut self, ratio: f32) -> Self {
        self.line_gap_ratio = ratio;
        self
    }

    /// Space left after a block whose lines are `line_height` apart.
    pub fn line_gap(&self, line_height: Pt) -> Pt {
        line_height * self.line_gap_ratio
    }

    pub fn fonts(&self) -> &FontSet {
        self.fonts
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn left(&self) -> Pt {
        self.margins.left
    }

    pub fn content_width(&self) -> Pt {
        (self.canvas.page_size().width - self.margins.left - self.margins.right).max(Pt::ZERO)
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    pub fn set_section(&mut self, name: &str) {
        if self.section != name {
            self.section = name.to_string();
            log::debug!("layout: entering section '{}'", name);
        }
    }

    pub fn ensure_space(&mut self, required: Pt) {
        if self.cursor.ensure_space(&mut self.canvas, required) {
            self.note_page_break("overflow");
        }
    }

    pub fn advance(&mut self, height: Pt) {
        self.cursor.advance(height);
    }

    pub fn break_page(&mut self) {
        if self.cursor.break_page(&mut self.canvas) {
            self.note_page_break("forced");
        }
    }

    fn note_page_break(&mut self, reason: &str) {
        self.stats.page_breaks += 1;
        let page = self.canvas.page_number();
        log::debug!(
            "layout: page {} started ({}) in section '{}'",
            page,
            reason,
            self.section
        );
        if let Some(debug) = self.debug {
            debug.event(
                "layout.page_break",
                &[
                    ("page", json!(page)),
                    ("reason", json!(reason)),
                    ("section", json!(self.section)),
                ],
            );
        }
    }

    /// Draws one run of text with its baseline at `y`. This is the only path
    /// text takes onto a page, so every string is checked against the
    /// built-in glyph set here.
    pub fn draw_text(
        &mut self,
        x: Pt,
        y: Pt,
        style: FontStyle,
        size: Pt,
        text: &str,
    ) -> Result<()> {
        self.check_encodable(text)?;
        self.canvas.set_font(style, size);
        self.canvas.draw_string(x, y, text);
        Ok(())
    }

    pub(crate) fn check_encodable(&self, text: &str) -> Result<()> {
        let bad = unencodable_chars(text);
        if bad.is_empty() {
            return Ok(());
        }
        let listed: String = bad
            .iter()
            .map(|ch| format!("U+{:04X}", *ch as u32))
            .collect::<Vec<_>>()
            .join(" ");
        Err(DocError::Encoding {
            section: self.section.clone(),
            text: format!("{} in \"{}\"", listed, text),
        })
    }

    pub fn finish(self) -> (Document, LayoutStats) {
        (self.canvas.finish(), self.stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RejectRemote;

    #[test]
    fn ensure_space_breaks_only_below_bottom_margin() {
        let mut canvas = Canvas::new(Size::a4());
        let mut cursor = Cursor::new(Size::a4(), Margins::default());
        assert_eq!(cursor.y(), Pt::from_i32(800));

        cursor.advance(Pt::from_i32(738));
        // y = 62: 12pt still fits exactly above the 50pt margin.
        assert!(!cursor.ensure_space(&mut canvas, Pt::from_i32(12)));
        assert!(cursor.ensure_space(&mut canvas, Pt::from_i32(13)));
        assert_eq!(cursor.y(), Pt::from_i32(800));
        assert_eq!(canvas.page_number(), 2);
    }

    #[test]
    fn forced_break_on_fresh_page_is_a_no_op() {
        let fonts = FontSet::standard();
        let mut ctx = LayoutContext::new(Size::a4(), Margins::default(), &fonts, &RejectRemote);
        ctx.break_page();
        assert_eq!(ctx.stats.page_breaks, 0);
        ctx.draw_text(
            Pt::from_i32(50),
            Pt::from_i32(800),
            FontStyle::Regular,
            Pt::from_i32(10),
            "x",
        )
        .unwrap();
        ctx.break_page();
        assert_eq!(ctx.stats.page_breaks, 1);
        let (doc, _) = ctx.finish();
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn unencodable_text_names_the_section() {
        let fonts = FontSet::standard();
        let mut ctx = LayoutContext::new(Size::a4(), Margins::default(), &fonts, &RejectRemote);
        ctx.set_section("fees");
        let err = ctx
            .draw_text(
                Pt::from_i32(50),
                Pt::from_i32(700),
                FontStyle::Regular,
                Pt::from_i32(10),
                "\u{20B9}500",
            )
            .unwrap_err();
        assert_eq!(err.section(), Some("fees"));
        assert!(err.to_string().contains("U+20B9"));
    }

    #[test]
    fn content_width_excludes_side_margins() {
        let fonts = FontSet::standard();
        let ctx = LayoutContext::new(Size::a4(), Margins::default(), &fonts, &RejectRemote);
        assert_eq!(ctx.content_width(), Pt::from_i32(495));
    }
}
