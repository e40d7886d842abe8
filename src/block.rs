use crate::error::Result;
use crate::font::FontStyle;
use crate::layout::LayoutContext;
use crate::types::Pt;
use crate::wrap::wrap_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A paragraph of text in one style. `max_width` defaults to the content
/// width minus the indent; `gap_after` defaults to the context's line gap.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
    pub style: FontStyle,
    pub size: Pt,
    pub line_height: Pt,
    pub max_width: Option<Pt>,
    pub indent: Pt,
    pub gap_after: Option<Pt>,
    pub align: Align,
}

impl TextBlock {
    pub fn new(text: impl Into<String>) -> Self {
        let size = Pt::from_i32(10);
        Self {
            text: text.into(),
            style: FontStyle::Regular,
            size,
            line_height: size.mul_ratio(7, 5),
            max_width: None,
            indent: Pt::ZERO,
            gap_after: None,
            align: Align::Left,
        }
    }

    pub fn bold(mut self) -> Self {
        self.style = FontStyle::Bold;
        self
    }

    /// Sets the font size and a line height of 1.4 times it.
    pub fn size(mut self, size: f32) -> Self {
        self.size = Pt::from_f32(size);
        self.line_height = self.size.mul_ratio(7, 5);
        self
    }

    pub fn line_height(mut self, line_height: f32) -> Self {
        self.line_height = Pt::from_f32(line_height);
        self
    }

    pub fn max_width(mut self, max_width: Pt) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn indent(mut self, indent: f32) -> Self {
        self.indent = Pt::from_f32(indent);
        self
    }

    pub fn gap_after(mut self, gap: f32) -> Self {
        self.gap_after = Some(Pt::from_f32(gap));
        self
    }

    pub fn centered(mut self) -> Self {
        self.align = Align::Center;
        self
    }
}

/// Writes `block` line by line at the cursor. Space is checked before every
/// line, so a block straddling the bottom margin continues on the next page.
/// Returns the number of lines written.
pub fn write_block(ctx: &mut LayoutContext<'_>, block: &TextBlock) -> Result<usize> {
    ctx.check_encodable(&block.text)?;
    let available = (ctx.content_width() - block.indent).max(Pt::ZERO);
    let max_width = block.max_width.unwrap_or(available);
    let lines = wrap_text(ctx.fonts, &block.text, block.style, block.size, max_width);
    let left = ctx.left() + block.indent;
    for line in &lines {
        ctx.ensure_space(block.line_height);
        let x = match block.align {
            Align::Left => left,
            Align::Center => {
                let width = ctx.fonts.measure(block.style, block.size, line);
                left + ((max_width - width) / 2).max(Pt::ZERO)
            }
        };
        let y = ctx.cursor.y();
        ctx.draw_text(x, y, block.style, block.size, line)?;
        ctx.advance(block.line_height);
    }
    if !lines.is_empty() {
        let gap = block
            .gap_after
            .unwrap_or_else(|| ctx.line_gap(block.line_height));
        ctx.advance(gap);
    }
    Ok(lines.len())
}

/// Writes a bold `label` followed by a regular `value` on the same baseline.
/// The value wraps with a hanging indent aligned to the end of the label.
pub fn write_label_value(
    ctx: &mut LayoutContext<'_>,
    label: &str,
    value: &str,
    size: Pt,
    line_height: Pt,
    indent: Pt,
) -> Result<()> {
    ctx.check_encodable(label)?;
    ctx.check_encodable(value)?;
    let label = label.trim_end();
    let label_width = ctx.fonts.measure(FontStyle::Bold, size, label)
        + ctx.fonts.measure(FontStyle::Regular, size, " ");
    let left = ctx.left() + indent;
    let value_x = left + label_width;
    let value_width = (ctx.content_width() - indent - label_width).max(Pt::ZERO);
    let lines = wrap_text(ctx.fonts, value, FontStyle::Regular, size, value_width);

    ctx.ensure_space(line_height);
    let y = ctx.cursor.y();
    ctx.draw_text(left, y, FontStyle::Bold, size, label)?;
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            ctx.ensure_space(line_height);
        }
        let y = ctx.cursor.y();
        ctx.draw_text(value_x, y, FontStyle::Regular, size, line)?;
        ctx.advance(line_height);
    }
    if lines.is_empty() {
        ctx.advance(line_height);
    }
    ctx.advance(ctx.line_gap(line_height));
    Ok(())
}

/// Draws a horizontal rule across the content width.
pub fn write_rule(ctx: &mut LayoutContext<'_>, gap: Pt) {
    ctx.ensure_space(gap * 2);
    let y = ctx.cursor.y() - gap;
    let left = ctx.left();
    let right = left + ctx.content_width();
    ctx.canvas.set_line_width(Pt::from_f32(0.5));
    ctx.canvas.line(left, y, right, y);
    ctx.advance(gap * 2);
}
