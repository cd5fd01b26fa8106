// Only allow lints that are either transitive-dependency noise or
// genuinely opinionated style choices that don't indicate real issues.
#![allow(
    // Transitive dependency version mismatches we can't control
    clippy::multiple_crate_versions,
    // module_name_repetitions is pure style preference (e.g. render::RenderCache)
    clippy::module_name_repetitions
)]

//! # Quire
//!
//! A terminal editor for block-structured technical documents.
//!
//! A document is an ordered list of typed blocks (heading, text, math, code,
//! quote, list, raw typesetting markup). Quire provides:
//! - A live Unicode preview of math notation (`\alpha^2` renders as `α²`)
//! - Brace and math-delimiter diagnostics
//! - Macro completion while editing
//! - Export to PDF (through an external LaTeX toolchain), HTML, plain
//!   Unicode text, and Markdown
//!
//! ## Architecture
//!
//! Quire uses The Elm Architecture (TEA) pattern:
//! - **Model**: Application state
//! - **Message**: Events and actions
//! - **Update**: Pure state transitions, including the block edit state machine
//! - **View**: Render to terminal
//!
//! ## Modules
//!
//! - [`app`]: Main application loop and state
//! - [`document`]: Blocks, the block store, persistence, and templates
//! - [`render`]: Notation renderer with its cache and diagnostics
//! - [`complete`]: Macro completion
//! - [`export`]: Export targets and the typesetting toolchain
//! - [`editor`]: Text buffer for the block being edited
//! - [`browser`]: Directory listing
//! - [`config`]: Preferences and CLI flag files
//! - [`ui`]: Terminal UI components and themes

pub mod app;
pub mod browser;
pub mod complete;
pub mod config;
pub mod document;
pub mod editor;
pub mod export;
pub mod perf;
pub mod render;
pub mod ui;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::app::{App, Message, Model};
    pub use crate::document::{BlockKind, BlockStore, ContentBlock, Document};
    pub use crate::export::ExportFormat;
    pub use crate::render::NotationRenderer;
}
