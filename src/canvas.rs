use crate::font::FontStyle;
use crate::image::PdfImage;
use crate::types::{Color, Pt, Size};

/// One drawing operation on a page. Coordinates are PDF user space: origin
/// at the bottom-left corner, y growing upwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetFillColor(Color),
    SetStrokeColor(Color),
    SetLineWidth(Pt),
    SetFont { style: FontStyle, size: Pt },
    MoveTo { x: Pt, y: Pt },
    LineTo { x: Pt, y: Pt },
    Stroke,
    // Text with its baseline at y.
    DrawString { x: Pt, y: Pt, text: String },
    // Image placed with its bottom-left corner at (x, y).
    DrawImage {
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Page {
    pub commands: Vec<Command>,
}

impl Page {
    /// Every string drawn on the page, in drawing order.
    pub fn text_runs(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|cmd| match cmd {
            Command::DrawString { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

/// A laid-out document, ready to be serialized. Images are decoded once and
/// referenced from pages by resource id.
#[derive(Debug, Clone)]
pub struct Document {
    pub page_size: Size,
    pub pages: Vec<Page>,
    pub images: Vec<PdfImage>,
}

// `None` means the value is unknown and the next setter must emit it.
#[derive(Debug, Clone, PartialEq)]
struct GraphicsState {
    fill_color: Option<Color>,
    stroke_color: Option<Color>,
    line_width: Option<Pt>,
    font: Option<(FontStyle, Pt)>,
}

impl GraphicsState {
    fn unknown() -> Self {
        Self {
            fill_color: None,
            stroke_color: None,
            line_width: None,
            font: None,
        }
    }
}

impl Default for GraphicsState {
    // PDF initial state at the start of a page content stream.
    fn default() -> Self {
        Self {
            fill_color: Some(Color::BLACK),
            stroke_color: Some(Color::BLACK),
            line_width: Some(Pt::from_i32(1)),
            font: None,
        }
    }
}

/// Records drawing commands page by page. A page is started implicitly and
/// closed by `show_page`; dropping a canvas mid-build discards everything.
pub struct Canvas {
    page_size: Size,
    pages: Vec<Page>,
    current: Page,
    state: GraphicsState,
    images: Vec<PdfImage>,
}

impl Canvas {
    pub fn new(page_size: Size) -> Self {
        Self {
            page_size,
            pages: Vec::new(),
            current: Page::default(),
            state: GraphicsState::default(),
            images: Vec::new(),
        }
    }

    pub fn page_size(&self) -> Size {
        self.page_size
    }

    /// 1-based number of the page currently being drawn.
    pub fn page_number(&self) -> usize {
        self.pages.len() + 1
    }

    pub fn set_fill_color(&mut self, color: Color) {
        if self.state.fill_color == Some(color) {
            return;
        }
        self.state.fill_color = Some(color);
        self.current.commands.push(Command::SetFillColor(color));
    }

    pub fn set_stroke_color(&mut self, color: Color) {
        if self.state.stroke_color == Some(color) {
            return;
        }
        self.state.stroke_color = Some(color);
        self.current.commands.push(Command::SetStrokeColor(color));
    }

    pub fn set_line_width(&mut self, width: Pt) {
        let width = width.max(Pt::ZERO);
        if self.state.line_width == Some(width) {
            return;
        }
        self.state.line_width = Some(width);
        self.current.commands.push(Command::SetLineWidth(width));
    }

    pub fn set_font(&mut self, style: FontStyle, size: Pt) {
        if self.state.font == Some((style, size)) {
            return;
        }
        self.state.font = Some((style, size));
        self.current.commands.push(Command::SetFont { style, size });
    }

    pub fn line(&mut self, x1: Pt, y1: Pt, x2: Pt, y2: Pt) {
        self.current.commands.push(Command::MoveTo { x: x1, y: y1 });
        self.current.commands.push(Command::LineTo { x: x2, y: y2 });
        self.current.commands.push(Command::Stroke);
    }

    pub fn draw_string(&mut self, x: Pt, y: Pt, text: impl Into<String>) {
        self.current.commands.push(Command::DrawString {
            x,
            y,
            text: text.into(),
        });
    }

    pub fn draw_image(
        &mut self,
        x: Pt,
        y: Pt,
        width: Pt,
        height: Pt,
        resource_id: impl Into<String>,
    ) {
        self.current.commands.push(Command::DrawImage {
            x,
            y,
            width,
            height,
            resource_id: resource_id.into(),
        });
    }

    /// Registers a decoded image, returning the resource id of an identical
    /// image already registered when there is one.
    pub fn register_image(&mut self, image: PdfImage) -> String {
        if let Some(existing) = self
            .images
            .iter()
            .find(|known| known.content_hash == image.content_hash && known.data == image.data)
        {
            return existing.resource_id.clone();
        }
        let id = image.resource_id.clone();
        self.images.push(image);
        id
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn show_page(&mut self) {
        let current = std::mem::take(&mut self.current);
        self.pages.push(current);
        self.state = GraphicsState::default();
    }

    /// Closes the page in progress, then reopens every page in order and lets
    /// `stamp` draw over it with the 1-based page number and the page count.
    /// Used for content that depends on the final page count.
    pub fn stamp_pages(&mut self, mut stamp: impl FnMut(&mut Canvas, usize, usize)) {
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            self.show_page();
        }
        let pages = std::mem::take(&mut self.pages);
        let total = pages.len();
        for page in pages {
            self.current = page;
            // Whatever the page last set is still in effect.
            self.state = GraphicsState::unknown();
            let number = self.page_number();
            stamp(self, number, total);
            self.show_page();
        }
    }

    pub fn current_command_count(&self) -> usize {
        self.current.commands.len()
    }

    pub fn finish(mut self) -> Document {
        if !self.current.commands.is_empty() || self.pages.is_empty() {
            self.show_page();
        }
        Document {
            page_size: self.page_size,
            pages: self.pages,
            images: self.images,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redundant_state_changes_are_elided() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(FontStyle::Regular, Pt::from_i32(10));
        canvas.set_font(FontStyle::Regular, Pt::from_i32(10));
        canvas.set_fill_color(Color::BLACK);
        assert_eq!(canvas.current_command_count(), 1);
        canvas.set_font(FontStyle::Bold, Pt::from_i32(10));
        assert_eq!(canvas.current_command_count(), 2);
    }

    #[test]
    fn show_page_resets_font_state() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(FontStyle::Regular, Pt::from_i32(10));
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(800), "one");
        canvas.show_page();
        assert_eq!(canvas.page_number(), 2);
        canvas.set_font(FontStyle::Regular, Pt::from_i32(10));
        assert_eq!(canvas.current_command_count(), 1);
    }

    #[test]
    fn stamped_pages_restate_graphics_state() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.set_font(FontStyle::Regular, Pt::from_i32(8));
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(800), "one");
        canvas.show_page();
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(800), "two");

        let mut seen = Vec::new();
        canvas.stamp_pages(|canvas, page, total| {
            seen.push((page, total));
            canvas.set_fill_color(Color::BLACK);
            canvas.set_font(FontStyle::Regular, Pt::from_i32(8));
            canvas.draw_string(Pt::from_i32(50), Pt::from_i32(30), format!("{page}/{total}"));
        });
        assert_eq!(seen, vec![(1, 2), (2, 2)]);

        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].text_runs().collect::<Vec<_>>(), vec!["one", "1/2"]);
        let tail = &doc.pages[0].commands[2..];
        assert_eq!(tail[0], Command::SetFillColor(Color::BLACK));
        assert_eq!(
            tail[1],
            Command::SetFont {
                style: FontStyle::Regular,
                size: Pt::from_i32(8)
            }
        );
    }

    #[test]
    fn finish_always_yields_a_page() {
        let doc = Canvas::new(Size::a4()).finish();
        assert_eq!(doc.pages.len(), 1);
    }

    #[test]
    fn finish_drops_trailing_empty_page() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(800), "only");
        canvas.show_page();
        let doc = canvas.finish();
        assert_eq!(doc.pages.len(), 1);
        assert_eq!(doc.pages[0].text_runs().collect::<Vec<_>>(), vec!["only"]);
    }
}
