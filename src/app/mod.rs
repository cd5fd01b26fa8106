//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions, including the block
//!   edit state machine (browsing, editing, completion popover)
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{CompletionPopover, ExportDialog, Mode, Model, Screen, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::config::{ConfigFlags, Preferences};
use crate::export::Toolchain;

/// What to show once the terminal is up.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Start {
    Browser,
    Document(PathBuf),
    Template(String),
}

/// Main application struct that owns the startup options and runs the
/// event loop.
pub struct App {
    prefs: Preferences,
    start: Start,
    toolchain: Toolchain,
    config_path: Option<PathBuf>,
    base_flags: ConfigFlags,
}

impl App {
    /// Create an application that opens on the file browser.
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs,
            start: Start::Browser,
            toolchain: Toolchain::default(),
            config_path: None,
            base_flags: ConfigFlags::default(),
        }
    }

    /// Open `path` on startup.
    #[must_use]
    pub fn with_document(mut self, path: PathBuf) -> Self {
        self.start = Start::Document(path);
        self
    }

    /// Start a new document from the named template.
    #[must_use]
    pub fn with_template(mut self, name: impl Into<String>) -> Self {
        self.start = Start::Template(name.into());
        self
    }

    #[must_use]
    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    /// Save preferences to `path` on view changes and at shutdown, on top
    /// of `base_flags`.
    #[must_use]
    pub fn with_config(mut self, path: PathBuf, base_flags: ConfigFlags) -> Self {
        self.config_path = Some(path);
        self.base_flags = base_flags;
        self
    }
}

#[cfg(test)]
mod tests;
