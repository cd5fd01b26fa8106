//! Terminal UI components.
//!
//! This module contains all UI-related code including:
//! - [`style`]: Color themes and element styles
//! - the file browser, template menu, and document screens
//! - overlays for completion, export, and help

pub mod style;

mod overlays;
mod render;
mod status;

pub use render::{render, split_panes};

/// Indent of block content under its header in the source pane.
pub const BLOCK_GUTTER: &str = "  ";
