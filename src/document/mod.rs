//! Document data model.
//!
//! This module handles:
//! - Block and document types (see [`ContentBlock`], [`Document`])
//! - The [`BlockStore`] that owns block order and the current-block cursor
//! - Loading and saving persisted documents
//! - Built-in templates

mod persist;
mod store;
mod templates;
mod types;

pub use persist::{DOCUMENT_EXTENSION, DocumentError, load, save, to_json};
pub use store::{BlockStore, StoreError};
pub use templates::{PLACEHOLDER_TITLE, Template, TemplateBlock, TemplateSet};
pub use types::{
    BlockId, BlockKind, ContentBlock, Document, FORMAT_VERSION, HEADING_MARKER, heading_level,
    heading_title,
};

/// Returns true if `path` has the persisted document extension.
pub fn is_document_file(path: &std::path::Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}
