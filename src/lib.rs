mod block;
mod canvas;
mod debug;
pub mod emandate;
mod error;
mod font;
mod image;
mod input;
mod layout;
mod metrics;
pub mod one_pager;
mod pdf;
mod sanitize;
mod script;
mod table;
mod types;
mod wrap;

pub use block::{Align, TextBlock, write_block, write_label_value, write_rule};
pub use canvas::{Canvas, Command, Document, Page};
use debug::DebugLogger;
pub use emandate::EMandateInput;
pub use error::{DocError, Result};
pub use font::{FontSet, FontStyle, encodable};
pub use crate::image::{
    EmbeddedImage, ImageAsset, ImageFetcher, ImageFormat, ImageSource, Placement, RejectRemote,
    embed, place_image, placeholder_text,
};
pub use layout::{Cursor, LayoutContext, LayoutStats};
pub use metrics::{DocumentMetrics, PageMetrics};
pub use one_pager::OnePagerInput;
use pdf::{PdfOptions, document_to_pdf};
pub use sanitize::sanitize;
pub use script::{Script, SignatureParty, Step, apply_page_footer, run_script};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
pub use table::{Column, TableSpec, write_table};
pub use types::{Color, Margins, Pt, Size};
pub use wrap::{truncate_chars, truncate_to_width, wrap_text};

/// Document generator for the fundraising contract and the IPO one-pager.
/// One engine can build any number of documents; each build owns its own
/// layout state.
pub struct DealPress {
    page_size: Size,
    margins: Margins,
    fonts: FontSet,
    title: Option<String>,
    fetcher: Arc<dyn ImageFetcher>,
    debug: Option<DebugLogger>,
    line_gap_ratio: f32,
    page_footer: bool,
}

#[derive(Clone)]
pub struct DealPressBuilder {
    margins: Margins,
    regular_font: String,
    bold_font: String,
    title: Option<String>,
    fetcher: Arc<dyn ImageFetcher>,
    debug_path: Option<PathBuf>,
    line_gap_ratio: f32,
    page_footer: bool,
}

impl DealPress {
    pub fn builder() -> DealPressBuilder {
        DealPressBuilder::new()
    }

    pub fn fonts(&self) -> &FontSet {
        &self.fonts
    }

    pub fn generate_emandate(&self, input: &EMandateInput) -> Result<Vec<u8>> {
        self.generate_emandate_with_metrics(input)
            .map(|(bytes, _)| bytes)
    }

    pub fn generate_emandate_with_metrics(
        &self,
        input: &EMandateInput,
    ) -> Result<(Vec<u8>, DocumentMetrics)> {
        let script = emandate::script(input);
        self.render(emandate::DOCUMENT_TITLE, &script)
    }

    pub fn generate_emandate_json(&self, json: &str) -> Result<Vec<u8>> {
        let input: EMandateInput = serde_json::from_str(json)?;
        self.generate_emandate(&input)
    }

    pub fn generate_one_pager(&self, input: &OnePagerInput) -> Result<Vec<u8>> {
        self.generate_one_pager_with_metrics(input)
            .map(|(bytes, _)| bytes)
    }

    pub fn generate_one_pager_with_metrics(
        &self,
        input: &OnePagerInput,
    ) -> Result<(Vec<u8>, DocumentMetrics)> {
        let script = one_pager::script(input);
        self.render(one_pager::DOCUMENT_TITLE, &script)
    }

    pub fn generate_one_pager_json(&self, json: &str) -> Result<Vec<u8>> {
        let input: OnePagerInput = serde_json::from_str(json)?;
        self.generate_one_pager(&input)
    }

    /// Lays out `script` without serializing it. The footer is applied when
    /// enabled.
    pub fn layout(&self, script: &Script) -> Result<(Document, LayoutStats)> {
        let mut ctx = LayoutContext::new(
            self.page_size,
            self.margins,
            &self.fonts,
            self.fetcher.as_ref(),
        )
        .with_debug(self.debug.as_ref())
        .with_line_gap_ratio(self.line_gap_ratio);
        run_script(&mut ctx, script)?;
        if self.page_footer {
            apply_page_footer(&mut ctx);
        }
        Ok(ctx.finish())
    }

    fn render(&self, kind: &str, script: &Script) -> Result<(Vec<u8>, DocumentMetrics)> {
        let started = Instant::now();
        let laid_out = self.layout(script);
        let (document, stats) = match laid_out {
            Ok(result) => result,
            Err(err) => {
                log::error!("{}: build aborted: {}", kind, err);
                self.emit_debug_summary(kind);
                return Err(err);
            }
        };
        let layout_ms = started.elapsed().as_secs_f64() * 1000.0;

        let options = PdfOptions {
            title: Some(self.title.clone().unwrap_or_else(|| kind.to_string())),
        };
        let bytes = document_to_pdf(&document, &self.fonts, &options);
        let metrics = DocumentMetrics::collect(&document, &stats, layout_ms, bytes.len());
        log::debug!(
            "{}: {} pages, {} images embedded, {} placeholders, {} bytes",
            kind,
            metrics.page_count,
            metrics.images_embedded,
            metrics.image_fallbacks,
            metrics.total_bytes
        );
        self.emit_debug_summary(kind);
        Ok((bytes, metrics))
    }

    fn emit_debug_summary(&self, context: &str) {
        if let Some(logger) = self.debug.as_ref() {
            logger.emit_summary(context);
            logger.flush();
        }
    }
}

impl DealPressBuilder {
    pub fn new() -> Self {
        Self {
            margins: Margins::default(),
            regular_font: "Helvetica".to_string(),
            bold_font: "Helvetica-Bold".to_string(),
            title: None,
            fetcher: Arc::new(RejectRemote),
            debug_path: None,
            line_gap_ratio: 0.3,
            page_footer: true,
        }
    }

    pub fn margins(mut self, margins: Margins) -> Self {
        self.margins = margins;
        self
    }

    pub fn regular_font(mut self, name: &str) -> Self {
        self.regular_font = name.to_string();
        self
    }

    pub fn bold_font(mut self, name: &str) -> Self {
        self.bold_font = name.to_string();
        self
    }

    /// Overrides the `/Title` written to the document info.
    pub fn title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn image_fetcher(mut self, fetcher: Arc<dyn ImageFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    // JSONL trace of page breaks and image decisions.
    pub fn debug_log(mut self, path: impl Into<PathBuf>) -> Self {
        self.debug_path = Some(path.into());
        self
    }

    /// Trailing gap after each block, as a fraction of its line height.
    pub fn line_gap_ratio(mut self, ratio: f32) -> Self {
        self.line_gap_ratio = ratio;
        self
    }

    pub fn page_footer(mut self, enabled: bool) -> Self {
        self.page_footer = enabled;
        self
    }

    pub fn build(self) -> Result<DealPress> {
        let page_size = Size::a4();
        let fonts = FontSet::resolve(&self.regular_font, &self.bold_font)?;
        let m = self.margins;
        if [m.top, m.right, m.bottom, m.left]
            .iter()
            .any(|v| *v < Pt::ZERO)
        {
            return Err(DocError::InvalidConfiguration(
                "margins must not be negative".to_string(),
            ));
        }
        if m.left + m.right >= page_size.width || m.top + m.bottom >= page_size.height {
            return Err(DocError::InvalidConfiguration(
                "margins leave no printable area".to_string(),
            ));
        }
        if !self.line_gap_ratio.is_finite() || self.line_gap_ratio < 0.0 {
            return Err(DocError::InvalidConfiguration(
                "line_gap_ratio must be a non-negative number".to_string(),
            ));
        }
        let debug = match self.debug_path {
            Some(path) => Some(DebugLogger::new(path)?),
            None => None,
        };
        Ok(DealPress {
            page_size,
            margins: self.margins,
            fonts,
            title: self.title.map(|t| sanitize(&t)),
            fetcher: self.fetcher,
            debug,
            line_gap_ratio: self.line_gap_ratio,
            page_footer: self.page_footer,
        })
    }
}

impl Default for DealPressBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the contract with default settings.
pub fn generate_emandate(input: &EMandateInput) -> Result<Vec<u8>> {
    DealPress::builder().build()?.generate_emandate(input)
}

/// Builds the one-pager with default settings.
pub fn generate_one_pager(input: &OnePagerInput) -> Result<Vec<u8>> {
    DealPress::builder().build()?.generate_one_pager(input)
}
