use crate::canvas::{Command, Document};
use crate::layout::LayoutStats;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageMetrics {
    pub page_number: usize,
    pub command_count: usize,
    pub text_runs: usize,
    pub image_draws: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentMetrics {
    pub page_count: usize,
    pub pages: Vec<PageMetrics>,
    pub page_breaks: usize,
    pub images_embedded: usize,
    pub image_fallbacks: usize,
    pub layout_ms: f64,
    pub total_bytes: usize,
}

impl DocumentMetrics {
    pub(crate) fn collect(
        document: &Document,
        stats: &LayoutStats,
        layout_ms: f64,
        total_bytes: usize,
    ) -> Self {
        let pages = document
            .pages
            .iter()
            .enumerate()
            .map(|(idx, page)| PageMetrics {
                page_number: idx + 1,
                command_count: page.commands.len(),
                text_runs: page.text_runs().count(),
                image_draws: page
                    .commands
                    .iter()
                    .filter(|cmd| matches!(cmd, Command::DrawImage { .. }))
                    .count(),
            })
            .collect::<Vec<_>>();
        Self {
            page_count: pages.len(),
            pages,
            page_breaks: stats.page_breaks,
            images_embedded: stats.images_embedded,
            image_fallbacks: stats.image_fallbacks,
            layout_ms,
            total_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Canvas;
    use crate::types::{Pt, Size};

    #[test]
    fn counts_pages_and_runs() {
        let mut canvas = Canvas::new(Size::a4());
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(800), "a");
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(786), "b");
        canvas.show_page();
        canvas.draw_string(Pt::from_i32(50), Pt::from_i32(800), "c");
        let doc = canvas.finish();
        let stats = LayoutStats {
            page_breaks: 1,
            ..LayoutStats::default()
        };
        let metrics = DocumentMetrics::collect(&doc, &stats, 0.0, 1234);
        assert_eq!(metrics.page_count, 2);
        assert_eq!(metrics.pages[0].text_runs, 2);
        assert_eq!(metrics.pages[1].page_number, 2);
        assert_eq!(metrics.page_breaks, 1);
        assert_eq!(metrics.total_bytes, 1234);
    }
}
