use crate::block::{TextBlock, write_block, write_label_value, write_rule};
use crate::error::Result;
use crate::font::FontStyle;
use crate::image::{ImageAsset, embed, place_image, placeholder_text};
use crate::layout::LayoutContext;
use crate::table::{TableSpec, write_table};
use crate::types::{Color, Pt};
use crate::wrap::truncate_to_width;

/// One party's signature block.
#[derive(Debug, Clone, PartialEq)]
pub struct SignatureParty {
    pub heading: String,
    pub name: String,
    pub title: String,
    pub date: Option<String>,
    pub signature: Option<ImageAsset>,
}

/// One step of a document script.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Title(String),
    Subtitle(String),
    Heading(String),
    Paragraph(TextBlock),
    Clause {
        number: String,
        heading: String,
        paragraphs: Vec<String>,
    },
    LabelValue {
        label: String,
        value: String,
    },
    Table(TableSpec),
    Image {
        asset: ImageAsset,
        max_width: Pt,
        max_height: Pt,
    },
    Signatures {
        left: SignatureParty,
        right: SignatureParty,
    },
    Rule,
    Spacer(Pt),
    PageBreak,
}

/// An ordered list of steps, each tagged with the section it belongs to so
/// failures can name where they happened.
#[derive(Debug, Clone, Default)]
pub struct Script {
    steps: Vec<(String, Step)>,
    section: String,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    /// Steps pushed after this call belong to `name`.
    pub fn section(&mut self, name: &str) -> &mut Self {
        self.section = name.to_string();
        self
    }

    pub fn push(&mut self, step: Step) -> &mut Self {
        self.steps.push((self.section.clone(), step));
        self
    }

    pub fn paragraph(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Step::Paragraph(TextBlock::new(text)))
    }

    pub fn heading(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(Step::Heading(text.into()))
    }

    pub fn label_value(&mut self, label: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.push(Step::LabelValue {
            label: label.into(),
            value: value.into(),
        })
    }

    pub fn steps(&self) -> impl Iterator<Item = (&str, &Step)> {
        self.steps.iter().map(|(section, step)| (section.as_str(), step))
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

const BODY_SIZE: i32 = 10;
const BODY_LINE: i32 = 14;

/// Runs every step of `script` in order against `ctx`.
pub fn run_script(ctx: &mut LayoutContext<'_>, script: &Script) -> Result<()> {
    for (section, step) in script.steps() {
        ctx.set_section(section);
        run_step(ctx, step)?;
    }
    Ok(())
}

fn run_step(ctx: &mut LayoutContext<'_>, step: &Step) -> Result<()> {
    match step {
        Step::Title(text) => {
            let block = TextBlock::new(text.as_str())
                .bold()
                .size(16.0)
                .line_height(22.0)
                .gap_after(6.0)
                .centered();
            write_block(ctx, &block)?;
        }
        Step::Subtitle(text) => {
            let block = TextBlock::new(text.as_str())
                .size(10.0)
                .line_height(14.0)
                .gap_after(10.0)
                .centered();
            write_block(ctx, &block)?;
        }
        Step::Heading(text) => {
            // Keep a heading with at least the first line of what follows.
            ctx.ensure_space(Pt::from_i32(18 + BODY_LINE));
            let block = TextBlock::new(text.as_str())
                .bold()
                .size(12.0)
                .line_height(18.0)
                .gap_after(4.0);
            write_block(ctx, &block)?;
        }
        Step::Paragraph(block) => {
            write_block(ctx, block)?;
        }
        Step::Clause {
            number,
            heading,
            paragraphs,
        } => {
            ctx.ensure_space(Pt::from_i32(BODY_LINE * 2));
            let title = format!("{} {}", number, heading);
            write_block(ctx, &TextBlock::new(title).bold().size(10.5).gap_after(2.0))?;
            for paragraph in paragraphs {
                write_block(ctx, &TextBlock::new(paragraph.as_str()).indent(18.0))?;
            }
        }
        Step::LabelValue { label, value } => {
            write_label_value(
                ctx,
                label,
                value,
                Pt::from_i32(BODY_SIZE),
                Pt::from_i32(BODY_LINE),
                Pt::ZERO,
            )?;
        }
        Step::Table(table) => {
            write_table(ctx, table)?;
        }
        Step::Image {
            asset,
            max_width,
            max_height,
        } => {
            let left = ctx.left();
            place_image(ctx, asset, left, *max_width, *max_height, Pt::from_i32(8))?;
        }
        Step::Signatures { left, right } => write_signatures(ctx, left, right)?,
        Step::Rule => write_rule(ctx, Pt::from_i32(6)),
        Step::Spacer(height) => {
            ctx.ensure_space(*height);
            ctx.advance(*height);
        }
        Step::PageBreak => ctx.break_page(),
    }
    Ok(())
}

const SIGNATURE_BOX_WIDTH: i32 = 150;
const SIGNATURE_BOX_HEIGHT: i32 = 50;
const SIGNATURE_RIGHT_X: i32 = 320;
const SIGNATURE_GUTTER: i32 = 10;

/// Two signature blocks side by side, kept together on one page.
fn write_signatures(
    ctx: &mut LayoutContext<'_>,
    left: &SignatureParty,
    right: &SignatureParty,
) -> Result<()> {
    let line = Pt::from_i32(BODY_LINE);
    let block_height = line * 5 + Pt::from_i32(SIGNATURE_BOX_HEIGHT + 10);
    ctx.ensure_space(block_height);

    let top = ctx.cursor.y();
    let right_x = Pt::from_i32(SIGNATURE_RIGHT_X);
    let right_edge = ctx.left() + ctx.content_width();
    let columns = [
        (ctx.left(), right_x - ctx.left() - Pt::from_i32(SIGNATURE_GUTTER), left),
        (right_x, right_edge - right_x, right),
    ];
    for (x, width, party) in columns {
        let width = width.max(Pt::ZERO);
        let mut y = top;
        draw_in_column(ctx, x, y, width, FontStyle::Bold, &party.heading)?;
        y -= line;

        let box_bottom = y - Pt::from_i32(SIGNATURE_BOX_HEIGHT);
        let embedded = match &party.signature {
            Some(asset) => match embed(ctx, asset) {
                Some(image) => Some(image),
                None => {
                    let text = placeholder_text(&asset.name);
                    draw_in_column(ctx, x, y - line, width, FontStyle::Regular, &text)?;
                    None
                }
            },
            None => None,
        };
        match embedded {
            Some(image) => {
                let (w, h) = image.fit(
                    Pt::from_i32(SIGNATURE_BOX_WIDTH),
                    Pt::from_i32(SIGNATURE_BOX_HEIGHT),
                );
                ctx.canvas.draw_image(x, y - h, w, h, image.resource_id);
            }
            None => {
                ctx.canvas.set_stroke_color(Color::BLACK);
                ctx.canvas.set_line_width(Pt::from_f32(0.5));
                ctx.canvas
                    .line(x, box_bottom, x + Pt::from_i32(SIGNATURE_BOX_WIDTH), box_bottom);
            }
        }
        y = box_bottom - line;

        let name = format!("Name: {}", party.name);
        draw_in_column(ctx, x, y, width, FontStyle::Regular, &name)?;
        y -= line;
        let title = format!("Title: {}", party.title);
        draw_in_column(ctx, x, y, width, FontStyle::Regular, &title)?;
        y -= line;
        if let Some(date) = &party.date {
            let date = format!("Date: {}", date);
            draw_in_column(ctx, x, y, width, FontStyle::Regular, &date)?;
        }
    }
    ctx.advance(block_height);
    Ok(())
}

// Signature lines are single lines; anything wider than the column is cut.
fn draw_in_column(
    ctx: &mut LayoutContext<'_>,
    x: Pt,
    y: Pt,
    width: Pt,
    style: FontStyle,
    text: &str,
) -> Result<()> {
    let size = Pt::from_i32(BODY_SIZE);
    let text = truncate_to_width(ctx.fonts, text, style, size, width);
    ctx.draw_text(x, y, style, size, &text)
}

/// Stamps "Page N of M" centred below the bottom margin of every page laid
/// out so far. Run it once the script is done.
pub fn apply_page_footer(ctx: &mut LayoutContext<'_>) {
    let fonts = ctx.fonts;
    let size = Pt::from_i32(8);
    ctx.canvas.stamp_pages(|canvas, page, total| {
        let text = format!("Page {} of {}", page, total);
        let text_width = fonts.measure(FontStyle::Regular, size, &text);
        let x = (canvas.page_size().width - text_width) / 2;
        canvas.set_fill_color(Color::gray(0.4));
        canvas.set_font(FontStyle::Regular, size);
        canvas.draw_string(x, Pt::from_i32(30), text);
    });
}
