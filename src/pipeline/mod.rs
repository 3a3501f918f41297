//! Pipeline stages for reconciling an analysis result into page text.
//!
//! Each submodule implements one step, so each is testable on its own and
//! the remote collaborators stay behind traits.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ mask ──▶ table / figure ──▶ assemble ──▶ postprocess
//! (bytes)   (slots)   (HTML / crop+describe)  (walk)     (cleanup)
//! ```
//!
//! 1. [`input`] : load the user-supplied path or URL into memory
//! 2. [`mask`]  : tag each page character as plain, table or figure
//! 3. [`table`] : render a table as HTML
//! 4. [`figure`]: crop a figure via [`render`] + [`encode`] and describe it
//! 5. [`assemble`]: splice region markup into the page text, once per region
//! 6. [`postprocess`]: strip page-break markers and trim

pub mod assemble;
pub mod encode;
pub mod figure;
pub mod input;
pub mod mask;
pub mod postprocess;
pub mod render;
pub mod table;
