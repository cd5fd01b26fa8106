use std::path::PathBuf;

use crate::app::Model;
use crate::app::model::{Mode, Screen, ToastLevel};
use crate::config::{SPLIT_STEP, ViewMode, clamp_split_ratio};
use crate::document::{BlockKind, StoreError};
use crate::editor::Direction;
use crate::export::ExportFormat;

/// Language tags offered for code blocks, in cycling order.
const CODE_LANGUAGES: &[&str] = &["text", "rust", "python", "c", "go", "javascript", "bash"];

/// All possible events and actions in the application.
///
/// These represent user input, system events, and internal actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // File browser
    /// Move the listing selection up
    BrowseUp,
    /// Move the listing selection down
    BrowseDown,
    /// Descend into the selected directory or open the selected document
    BrowseActivate,
    /// Show or hide dotfiles
    ToggleHidden,
    /// Open the template menu
    ShowTemplates,
    /// Return to the file browser
    ShowFiles,

    // Template menu
    TemplateUp,
    TemplateDown,
    /// Start a new document from the selected template
    TemplateSelect,

    // Block browsing
    /// Move the current-block cursor by n (clamped)
    NavigateBlock(isize),
    /// Append a text block and start editing it
    NewBlock,
    /// Delete the current block
    DeleteBlock,
    /// Change the current block's type
    ConvertBlock(BlockKind),
    /// Toggle numbering on the current heading
    ToggleNumbered,
    /// Step the current code block to the next language tag
    CycleLanguage,
    /// Start editing the current block
    BeginEdit,
    /// Write the document to disk
    Save,
    /// Open the export dialog
    OpenExport,

    // Editing
    EditorInsertChar(char),
    EditorBackspace,
    EditorDelete,
    EditorNewline,
    EditorMoveCursor(Direction),
    EditorMoveHome,
    EditorMoveEnd,
    /// Select the previous completion candidate
    CompletionPrev,
    /// Select the next completion candidate
    CompletionNext,
    /// Replace the trigger token with the selected candidate
    AcceptCompletion,
    /// Close the popover if open, otherwise commit and stop editing
    ExitEdit,

    // Export dialog
    ExportPrevFormat,
    ExportNextFormat,
    ExportInput(char),
    ExportBackspace,
    /// Export with the chosen format and name
    ExportConfirm,
    ExportCancel,
    /// Background typesetting finished with the artifact path or an error
    ExportFinished(Result<PathBuf, String>),

    // View
    SetViewMode(ViewMode),
    /// Grow (+1) or shrink (-1) the editor pane by one step
    AdjustSplit(i8),
    CycleTheme,
    ToggleHelp,

    // Window
    /// Terminal resized
    Resize(u16, u16),

    // Application
    /// Quit the application
    Quit,
}

/// Pure function that updates the model based on a message.
///
/// This is the core of TEA - all state transitions happen here. File system
/// work (listing, loading, saving, exporting) happens afterwards in the side
/// effect handler.
pub fn update(mut model: Model, msg: Message) -> Model {
    match msg {
        // File browser
        Message::BrowseUp => {
            model.browse_selected = model.browse_selected.saturating_sub(1);
        }
        Message::BrowseDown => {
            if model.browse_selected + 1 < model.browse_entries.len() {
                model.browse_selected += 1;
            }
        }
        Message::ToggleHidden => {
            model.prefs.show_hidden = !model.prefs.show_hidden;
        }
        Message::ShowTemplates => {
            model.screen = Screen::Templates;
        }
        Message::ShowFiles => {
            model.screen = Screen::Files;
        }

        // Template menu
        Message::TemplateUp => {
            model.template_selected = model.template_selected.saturating_sub(1);
        }
        Message::TemplateDown => {
            if model.template_selected + 1 < model.templates.len() {
                model.template_selected += 1;
            }
        }
        Message::TemplateSelect => {
            if let Some(template) = model.templates.get(model.template_selected).copied() {
                model.open_document(template.instantiate(), None);
                model.show_toast(ToastLevel::Info, format!("New {} document", template.name));
            }
        }

        // Block browsing
        Message::NavigateBlock(delta) if model.mode == Mode::Browsing => {
            model.store.navigate(delta);
            model.refresh_diagnostics();
        }
        Message::NewBlock if model.mode == Mode::Browsing => {
            model.store.append(BlockKind::Text, "");
            model.begin_edit();
        }
        Message::DeleteBlock if model.mode == Mode::Browsing => {
            match model.store.delete_at(model.store.current_index()) {
                Ok(_) => model.refresh_diagnostics(),
                Err(StoreError::SoleBlock) => {
                    model.show_toast(ToastLevel::Info, "Cannot delete the only block");
                }
                Err(err) => model.show_toast(ToastLevel::Error, err.to_string()),
            }
        }
        Message::ConvertBlock(kind) if model.mode == Mode::Browsing => {
            if let Err(err) = model.store.convert_type(model.store.current_index(), kind) {
                model.show_toast(ToastLevel::Error, err.to_string());
            }
        }
        Message::ToggleNumbered if model.mode == Mode::Browsing => {
            if model.store.current().kind == BlockKind::Heading {
                match model.store.toggle_numbered(model.store.current_index()) {
                    Ok(true) => model.show_toast(ToastLevel::Info, "Heading numbered"),
                    Ok(false) => model.show_toast(ToastLevel::Info, "Heading unnumbered"),
                    Err(err) => model.show_toast(ToastLevel::Error, err.to_string()),
                }
            } else {
                model.show_toast(ToastLevel::Warning, "Numbering applies to headings only");
            }
        }
        Message::CycleLanguage if model.mode == Mode::Browsing => {
            let block = model.store.current();
            if block.kind == BlockKind::Code {
                let next = next_language(block.language.as_deref());
                let index = model.store.current_index();
                match model.store.set_language(index, Some(next.to_string())) {
                    Ok(()) => model.show_toast(ToastLevel::Info, format!("Language: {next}")),
                    Err(err) => model.show_toast(ToastLevel::Error, err.to_string()),
                }
            } else {
                model.show_toast(ToastLevel::Warning, "Languages apply to code blocks only");
            }
        }
        Message::BeginEdit if model.mode == Mode::Browsing => {
            model.begin_edit();
        }
        Message::OpenExport if model.mode == Mode::Browsing => {
            model.export.filename.clear();
            model.screen = Screen::Export;
        }

        // Editing
        Message::EditorInsertChar(ch) if model.mode == Mode::Editing => {
            model.editor.insert_char(ch);
            model.refresh_completions();
        }
        Message::EditorBackspace if model.mode == Mode::Editing => {
            model.editor.backspace();
            model.refresh_completions();
        }
        Message::EditorDelete if model.mode == Mode::Editing => {
            model.editor.delete();
            model.refresh_completions();
        }
        Message::EditorNewline if model.mode == Mode::Editing => {
            model.editor.newline();
            model.refresh_completions();
        }
        Message::EditorMoveCursor(direction) if model.mode == Mode::Editing => {
            model.editor.move_cursor(direction);
            model.refresh_completions();
        }
        Message::EditorMoveHome if model.mode == Mode::Editing => {
            model.editor.move_home();
            model.refresh_completions();
        }
        Message::EditorMoveEnd if model.mode == Mode::Editing => {
            model.editor.move_end();
            model.refresh_completions();
        }
        Message::CompletionPrev => {
            if let Some(popover) = model.completion.as_mut() {
                popover.selected = popover.selected.saturating_sub(1);
            }
        }
        Message::CompletionNext => {
            if let Some(popover) = model.completion.as_mut()
                && popover.selected + 1 < popover.candidates.len()
            {
                popover.selected += 1;
            }
        }
        Message::AcceptCompletion if model.mode == Mode::Editing => {
            model.accept_completion();
        }
        Message::ExitEdit if model.mode == Mode::Editing => {
            if model.completion.take().is_none() {
                model.commit_edit();
            }
        }

        // Export dialog
        Message::ExportPrevFormat => {
            model.export.selected = model.export.selected.saturating_sub(1);
        }
        Message::ExportNextFormat => {
            if model.export.selected + 1 < ExportFormat::ALL.len() {
                model.export.selected += 1;
            }
        }
        Message::ExportInput(ch) => {
            model.export.filename.push(ch);
        }
        Message::ExportBackspace => {
            model.export.filename.pop();
        }
        Message::ExportConfirm | Message::ExportCancel => {
            model.screen = Screen::Document;
        }
        Message::ExportFinished(result) => {
            model.export_pending = false;
            match result {
                Ok(path) => {
                    model.show_toast(ToastLevel::Info, format!("Exported {}", path.display()));
                }
                Err(err) => model.show_toast(ToastLevel::Error, err),
            }
        }

        // View
        Message::SetViewMode(view) => {
            model.prefs.view = view;
        }
        Message::AdjustSplit(steps) => {
            let ratio = model.prefs.split_ratio + f32::from(steps) * SPLIT_STEP;
            model.prefs.split_ratio = clamp_split_ratio(ratio);
        }
        Message::CycleTheme => {
            model.theme = model.theme.next();
            model.prefs.theme = model.theme.id.to_string();
            model.show_toast(ToastLevel::Info, format!("Theme: {}", model.theme.name));
        }
        Message::ToggleHelp => {
            model.help_visible = !model.help_visible;
        }

        Message::Quit => {
            model.should_quit = true;
        }

        // Handled in side effects, or not valid in the current mode
        _ => {}
    }
    model
}

/// The language after `current`; unknown or missing tags start the cycle.
fn next_language(current: Option<&str>) -> &'static str {
    let position = current.and_then(|lang| {
        CODE_LANGUAGES
            .iter()
            .position(|known| known.eq_ignore_ascii_case(lang))
    });
    match position {
        Some(i) => CODE_LANGUAGES[(i + 1) % CODE_LANGUAGES.len()],
        None => CODE_LANGUAGES[0],
    }
}
