//! Table rendering: analysis table → HTML.
//!
//! Rows are rebuilt from the flat cell list by grouping on `row_index` and
//! stable-sorting each row on `column_index`, so cells reported out of order
//! still land in the right column while ties keep their reported order.

use crate::analysis::{DocumentTable, TableCell};
use crate::config::TableMarkup;

/// Render a table as HTML.
///
/// Header cells (`columnHeader`, `rowHeader`) become `<th>`, everything else
/// `<td>`. `colSpan`/`rowSpan` are emitted only when greater than one. Cell
/// text is escaped so document content can never break the markup.
pub fn render_table(table: &DocumentTable, markup: TableMarkup) -> String {
    let mut html = String::with_capacity(64 + table.cells.len() * 24);

    match markup {
        TableMarkup::Figure => html.push_str("<figure><table>"),
        TableMarkup::Bare => html.push_str("<table>"),
    }

    for row in rows(table) {
        html.push_str("<tr>");
        for cell in row {
            push_cell(&mut html, cell);
        }
        html.push_str("</tr>");
    }

    match markup {
        TableMarkup::Figure => html.push_str("</table></figure>"),
        TableMarkup::Bare => html.push_str("</table>"),
    }
    html
}

fn rows(table: &DocumentTable) -> Vec<Vec<&TableCell>> {
    (0..table.row_count)
        .map(|row_index| {
            let mut row: Vec<&TableCell> = table
                .cells
                .iter()
                .filter(|c| c.row_index == row_index)
                .collect();
            row.sort_by_key(|c| c.column_index);
            row
        })
        .collect()
}

fn push_cell(html: &mut String, cell: &TableCell) {
    let tag = if cell.kind.is_header() { "th" } else { "td" };
    html.push('<');
    html.push_str(tag);
    if let Some(n) = cell.column_span.filter(|&n| n > 1) {
        html.push_str(&format!(" colSpan={n}"));
    }
    if let Some(n) = cell.row_span.filter(|&n| n > 1) {
        html.push_str(&format!(" rowSpan={n}"));
    }
    html.push('>');
    html.push_str(&escape_html(&cell.content));
    html.push_str("</");
    html.push_str(tag);
    html.push('>');
}

/// Escape `&`, `<`, `>`, `"` and `'` for safe inclusion in HTML text.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}
