use tracing::{info, warn};

use crate::app::model::Screen;
use crate::app::{App, Message, Model, ToastLevel};
use crate::config::save_config_flags;
use crate::document::is_document_file;
use crate::export::{self, ToolchainHandle};

impl App {
    /// Run the I/O that follows a state transition.
    ///
    /// `pending` holds the in-flight typesetting run, if any; the event loop
    /// polls it and feeds the outcome back as [`Message::ExportFinished`].
    pub(super) fn handle_message_side_effects(
        &self,
        model: &mut Model,
        pending: &mut Option<ToolchainHandle>,
        msg: &Message,
    ) {
        match msg {
            Message::BrowseActivate => Self::browse_activate_selected(model),
            Message::ToggleHidden | Message::ShowFiles if model.screen == Screen::Files => {
                let dir = model.browse_dir.clone();
                if let Err(err) = model.load_directory(&dir) {
                    model.show_toast(ToastLevel::Error, format!("Browse failed: {err:#}"));
                }
            }
            Message::Save => Self::save_document(model),
            Message::ExportConfirm => self.start_export(model, pending),
            Message::SetViewMode(_) | Message::AdjustSplit(_) | Message::CycleTheme => {
                self.save_preferences(model);
            }
            _ => {}
        }
    }

    fn browse_activate_selected(model: &mut Model) {
        let Some(entry) = model.browse_entries.get(model.browse_selected).cloned() else {
            return;
        };
        if entry.is_dir {
            if let Err(err) = model.load_directory(&entry.path) {
                model.show_toast(ToastLevel::Error, format!("Browse failed: {err:#}"));
            }
        } else if is_document_file(&entry.path) {
            if let Err(err) = model.load_document(&entry.path) {
                model.show_toast(ToastLevel::Error, format!("Open failed: {err:#}"));
                crate::perf::log_event(
                    "document.open.error",
                    format!("path={} err={err}", entry.path.display()),
                );
            }
        } else {
            model.show_toast(
                ToastLevel::Warning,
                format!("{} is not a quire document", entry.name),
            );
        }
    }

    fn save_document(model: &mut Model) {
        let path = model.save_path();
        match model.store.save_to(&path) {
            Ok(()) => {
                model.show_toast(ToastLevel::Info, format!("Saved {}", path.display()));
                model.doc_path = Some(path);
            }
            Err(err) => {
                model.show_toast(ToastLevel::Error, format!("Save failed: {err}"));
            }
        }
    }

    fn start_export(&self, model: &mut Model, pending: &mut Option<ToolchainHandle>) {
        let format = model.export.format();
        if format.needs_toolchain() && pending.is_some() {
            model.show_toast(ToastLevel::Warning, "A PDF export is already running");
            return;
        }
        let dir = model.export_dir();
        let base = model.export_basename();
        let written = export::write(format, model.store.blocks(), &mut model.renderer, &dir, &base);
        match written {
            Ok(path) if format.needs_toolchain() => {
                info!(program = self.toolchain.program(), source = %path.display(), "typesetting started");
                *pending = Some(self.toolchain.spawn(path));
                model.export_pending = true;
                model.show_toast(
                    ToastLevel::Info,
                    format!("Running {}...", self.toolchain.program()),
                );
            }
            Ok(path) => {
                model.show_toast(ToastLevel::Info, format!("Exported {}", path.display()));
            }
            Err(err) => model.show_toast(ToastLevel::Error, err.to_string()),
        }
    }

    /// Persist the runtime preferences over the flags they were loaded from.
    pub(super) fn save_preferences(&self, model: &Model) {
        let Some(path) = self.config_path.as_deref() else {
            return;
        };
        let flags = model.prefs.to_flags(&self.base_flags);
        if let Err(err) = save_config_flags(path, &flags) {
            warn!(path = %path.display(), "failed to save preferences: {err:#}");
        }
    }
}
