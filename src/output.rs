//! Page records produced by the parsers.

use serde::{Deserialize, Serialize};

/// One page of parsed text, ready for downstream indexing.
///
/// `offset` counts *emitted* characters: it is the sum of the character
/// lengths of every earlier page's `text`, so inserted table and figure
/// markup shifts the offsets of later pages. It is not a position in the
/// original document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 0-indexed page number.
    pub page_num: usize,
    /// Cumulative character offset of this page's text.
    pub offset: usize,
    pub text: String,
}

impl Page {
    pub fn new(page_num: usize, offset: usize, text: impl Into<String>) -> Self {
        Self {
            page_num,
            offset,
            text: text.into(),
        }
    }

    /// Length of `text` in characters, the unit `offset` is measured in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Offset the next page must start at.
    pub fn end_offset(&self) -> usize {
        self.offset + self.char_len()
    }
}

/// Tracks the cumulative emitted-character offset across a document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct OffsetCounter(usize);

impl OffsetCounter {
    /// Stamp a page with the current offset and advance past its text.
    pub(crate) fn emit(&mut self, page_num: usize, text: String) -> Page {
        let page = Page::new(page_num, self.0, text);
        self.0 = page.end_offset();
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_accumulate_in_chars() {
        let mut counter = OffsetCounter::default();
        let a = counter.emit(0, "x".repeat(100));
        let b = counter.emit(1, "héllo".to_string());
        let c = counter.emit(2, String::new());
        assert_eq!(a.offset, 0);
        assert_eq!(b.offset, 100);
        assert_eq!(c.offset, 105);
    }

    #[test]
    fn serialises_with_snake_case_fields() {
        let json = serde_json::to_string(&Page::new(3, 10, "hi")).expect("serialise");
        assert_eq!(json, r#"{"page_num":3,"offset":10,"text":"hi"}"#);
    }
}
