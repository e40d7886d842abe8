use crate::error::Result;
use crate::font::FontStyle;
use crate::layout::LayoutContext;
use crate::types::{Color, Pt};

/// A column header and the absolute x position its cells start at.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub label: String,
    pub x: Pt,
}

impl Column {
    pub fn new(label: impl Into<String>, x: f32) -> Self {
        Self {
            label: label.into(),
            x: Pt::from_f32(x),
        }
    }
}

/// A fixed-layout table. Cells are not wrapped or measured: text longer than
/// its column runs on under the next one.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSpec {
    pub columns: Vec<Column>,
    pub rows: Vec<Vec<String>>,
    pub font_size: Pt,
    pub row_height: Pt,
    pub header_rule: bool,
}

impl TableSpec {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            font_size: Pt::from_i32(9),
            row_height: Pt::from_i32(16),
            header_rule: true,
        }
    }

    pub fn row(mut self, cells: Vec<String>) -> Self {
        self.rows.push(cells);
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows.extend(rows);
        self
    }
}

/// Writes the bold header row and then each data row, checking space per
/// row so a table only ever splits between rows.
pub fn write_table(ctx: &mut LayoutContext<'_>, table: &TableSpec) -> Result<()> {
    ctx.ensure_space(table.row_height);
    let y = ctx.cursor.y();
    for column in &table.columns {
        ctx.draw_text(column.x, y, FontStyle::Bold, table.font_size, &column.label)?;
    }
    if table.header_rule {
        let rule_y = y - table.font_size.mul_ratio(2, 5);
        let left = table.columns.first().map(|c| c.x).unwrap_or_else(|| ctx.left());
        let right = ctx.left() + ctx.content_width();
        ctx.canvas.set_stroke_color(Color::gray(0.6));
        ctx.canvas.set_line_width(Pt::from_f32(0.5));
        ctx.canvas.line(left, rule_y, right, rule_y);
    }
    ctx.advance(table.row_height);

    for row in &table.rows {
        ctx.ensure_space(table.row_height);
        let y = ctx.cursor.y();
        for (column, cell) in table.columns.iter().zip(row.iter()) {
            if cell.is_empty() {
                continue;
            }
            ctx.draw_text(column.x, y, FontStyle::Regular, table.font_size, cell)?;
        }
        ctx.advance(table.row_height);
    }
    ctx.advance(table.row_height.mul_ratio(1, 2));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Command;
    use crate::font::FontSet;
    use crate::image::RejectRemote;
    use crate::types::{Margins, Size};

    fn peer_table(rows: usize) -> TableSpec {
        let mut table = TableSpec::new(vec![Column::new("Company", 50.0), Column::new("Revenue", 170.0)]);
        for i in 0..rows {
            table = table.row(vec![format!("Peer {i}"), format!("{}", i * 10)]);
        }
        table
    }

    #[test]
    fn cells_land_on_column_offsets() {
        let fonts = FontSet::standard();
        let mut ctx = LayoutContext::new(Size::a4(), Margins::default(), &fonts, &RejectRemote);
        write_table(&mut ctx, &peer_table(1)).unwrap();
        let (doc, _) = ctx.finish();
        let strings: Vec<(Pt, Pt, String)> = doc.pages[0]
            .commands
            .iter()
            .filter_map(|cmd| match cmd {
                Command::DrawString { x, y, text } => Some((*x, *y, text.clone())),
                _ => None,
            })
            .collect();
        assert_eq!(strings.len(), 4);
        assert_eq!(strings[2], (Pt::from_i32(50), Pt::from_i32(784), "Peer 0".to_string()));
        assert_eq!(strings[3], (Pt::from_i32(170), Pt::from_i32(784), "0".to_string()));
    }

    #[test]
    fn long_cell_is_not_wrapped() {
        let fonts = FontSet::standard();
        let mut ctx = LayoutContext::new(Size::a4(), Margins::default(), &fonts, &RejectRemote);
        let long = "A very long company name that overruns its column".to_string();
        let table = peer_table(0).row(vec![long.clone(), "1".into()]);
        write_table(&mut ctx, &table).unwrap();
        let (doc, _) = ctx.finish();
        assert!(doc.pages[0].text_runs().any(|t| t == long));
    }

    #[test]
    fn table_splits_between_rows() {
        let fonts = FontSet::standard();
        let mut ctx = LayoutContext::new(Size::a4(), Margins::default(), &fonts, &RejectRemote);
        ctx.advance(Pt::from_i32(700)); // y = 100
        write_table(&mut ctx, &peer_table(5)).unwrap();
        let (doc, stats) = ctx.finish();
        assert_eq!(stats.page_breaks, 1);
        // Header at 100, rows at 84 and 68; the third row needs a new page.
        let first: Vec<&str> = doc.pages[0].text_runs().collect();
        assert_eq!(first, vec!["Company", "Revenue", "Peer 0", "0", "Peer 1", "10"]);
        assert_eq!(doc.pages[1].text_runs().next(), Some("Peer 2"));
    }
}
