//! Post-processing: final cleanup of an assembled page.

/// Marker the layout model inserts between pages in Markdown output.
pub const PAGE_BREAK_MARKER: &str = "<!-- PageBreak -->";

/// Remove page-break markers, then trim surrounding whitespace.
pub fn clean_page_text(text: &str) -> String {
    if text.contains(PAGE_BREAK_MARKER) {
        text.replace(PAGE_BREAK_MARKER, "").trim().to_string()
    } else {
        text.trim().to_string()
    }
}
