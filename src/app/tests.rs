use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tempfile::tempdir;

use crate::config::{Preferences, ViewMode};
use crate::document::{BlockId, BlockKind, ContentBlock, Document};
use crate::editor::Direction;
use crate::export::Toolchain;
use crate::render::DiagnosticKind;

use super::{App, Message, Mode, Model, Screen, ToastLevel, update};

fn doc_model(blocks: &[(BlockKind, &str)]) -> Model {
    let blocks = blocks
        .iter()
        .zip(1..)
        .map(|((kind, content), id)| ContentBlock::new(BlockId(id), *kind, *content))
        .collect();
    let mut model = Model::default();
    model.open_document(Document::new("test", blocks), None);
    model
}

fn apply(model: Model, msgs: impl IntoIterator<Item = Message>) -> Model {
    msgs.into_iter().fold(model, update)
}

fn type_text(model: Model, text: &str) -> Model {
    apply(model, text.chars().map(Message::EditorInsertChar))
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

#[test]
fn test_navigate_clamps_at_both_ends() {
    let model = doc_model(&[(BlockKind::Text, "a"), (BlockKind::Text, "b")]);
    let model = apply(model, [Message::NavigateBlock(1), Message::NavigateBlock(1)]);
    assert_eq!(model.store.current_index(), 1);
    let model = apply(model, [Message::NavigateBlock(-5)]);
    assert_eq!(model.store.current_index(), 0);
}

#[test]
fn test_new_block_is_text_and_enters_editing() {
    let model = doc_model(&[(BlockKind::Heading, "# T")]);
    let model = update(model, Message::NewBlock);
    assert_eq!(model.mode, Mode::Editing);
    assert_eq!(model.store.len(), 2);
    assert_eq!(model.store.current_index(), 1);
    assert_eq!(model.store.current().kind, BlockKind::Text);
    assert!(model.editor.is_empty());
}

#[test]
fn test_delete_sole_block_is_rejected_with_toast() {
    let model = doc_model(&[(BlockKind::Text, "only")]);
    let model = update(model, Message::DeleteBlock);
    assert_eq!(model.store.len(), 1);
    assert_eq!(model.store.current().content, "only");
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Info);
    assert!(message.contains("only block"));
}

#[test]
fn test_delete_removes_current_block() {
    let model = doc_model(&[(BlockKind::Text, "a"), (BlockKind::Text, "b")]);
    let model = apply(model, [Message::NavigateBlock(1), Message::DeleteBlock]);
    assert_eq!(model.store.len(), 1);
    assert_eq!(model.store.current().content, "a");
}

#[test]
fn test_convert_stays_in_browsing() {
    let model = doc_model(&[(BlockKind::Text, "x^2")]);
    let model = update(model, Message::ConvertBlock(BlockKind::Math));
    assert_eq!(model.store.current().kind, BlockKind::Math);
    assert_eq!(model.store.current().content, "x^2");
    assert_eq!(model.mode, Mode::Browsing);
}

#[test]
fn test_browsing_messages_ignored_while_editing() {
    let model = doc_model(&[(BlockKind::Text, "a"), (BlockKind::Text, "b")]);
    let model = apply(
        model,
        [
            Message::BeginEdit,
            Message::NavigateBlock(1),
            Message::DeleteBlock,
            Message::ConvertBlock(BlockKind::Code),
        ],
    );
    assert_eq!(model.store.current_index(), 0);
    assert_eq!(model.store.len(), 2);
    assert_eq!(model.store.current().kind, BlockKind::Text);
}

#[test]
fn test_exit_edit_commits_and_renders() {
    let model = doc_model(&[(BlockKind::Text, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "x^2 ");
    assert_eq!(model.store.current().content, "", "buffer is not committed early");
    let model = update(model, Message::ExitEdit);
    assert_eq!(model.mode, Mode::Browsing);
    assert_eq!(model.store.current().content, "x^2 ");
    assert_eq!(model.store.current().rendered.as_deref(), Some("x² "));
    assert!(model.store.is_modified());
}

#[test]
fn test_commit_refreshes_diagnostics() {
    let model = doc_model(&[(BlockKind::Text, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "\\textbf{bold");
    let model = apply(model, [Message::ExitEdit, Message::ExitEdit]);
    assert_eq!(model.mode, Mode::Browsing);
    assert_eq!(model.diagnostics.len(), 1);
    assert_eq!(
        model.diagnostics[0].kind,
        DiagnosticKind::UnmatchedOpeningBrace
    );
}

#[test]
fn test_completion_opens_on_trigger_and_closes_on_space() {
    let model = doc_model(&[(BlockKind::Math, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "\\alp");
    let popover = model.completion.as_ref().unwrap();
    assert_eq!(popover.current().unwrap().name, "\\alpha");

    let model = update(model, Message::EditorInsertChar(' '));
    assert!(model.completion.is_none());
}

#[test]
fn test_completion_navigation_does_not_touch_buffer() {
    let model = doc_model(&[(BlockKind::Math, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "\\in");
    let before = model.editor.text();
    let model = apply(
        model,
        [
            Message::CompletionNext,
            Message::CompletionNext,
            Message::CompletionNext,
            Message::CompletionPrev,
        ],
    );
    assert_eq!(model.editor.text(), before);
    assert_eq!(model.completion.as_ref().unwrap().selected, 1);
}

#[test]
fn test_accept_replaces_trigger_token() {
    let model = doc_model(&[(BlockKind::Math, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "a + \\fr");
    let model = update(model, Message::AcceptCompletion);
    assert!(model.completion.is_none());
    assert_eq!(model.editor.text(), "a + \\frac{numerator}{denominator}");
    assert_eq!(model.mode, Mode::Editing);
}

#[test]
fn test_escape_with_popover_only_dismisses() {
    let model = doc_model(&[(BlockKind::Math, "old")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, " \\be");
    let model = update(model, Message::ExitEdit);
    assert!(model.completion.is_none());
    assert_eq!(model.mode, Mode::Editing);
    assert_eq!(model.editor.text(), "old \\be");
    assert_eq!(model.store.current().content, "old");

    let model = update(model, Message::ExitEdit);
    assert_eq!(model.mode, Mode::Browsing);
    assert_eq!(model.store.current().content, "old \\be");
}

#[test]
fn test_cursor_movement_recomputes_completion() {
    let model = doc_model(&[(BlockKind::Math, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "\\pi x");
    assert!(model.completion.is_none());
    let model = apply(
        model,
        [
            Message::EditorMoveCursor(Direction::Left),
            Message::EditorMoveCursor(Direction::Left),
        ],
    );
    assert_eq!(
        model.completion.as_ref().and_then(|p| p.current()).map(|c| c.name),
        Some("\\pi")
    );
}

#[test]
fn test_toggle_numbered_only_on_headings() {
    let model = doc_model(&[(BlockKind::Heading, "# Intro"), (BlockKind::Text, "t")]);
    let model = update(model, Message::ToggleNumbered);
    assert!(model.store.current().numbered);

    let model = apply(model, [Message::NavigateBlock(1), Message::ToggleNumbered]);
    assert!(!model.store.current().numbered);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
}

#[test]
fn test_cycle_language_steps_code_blocks() {
    let model = doc_model(&[(BlockKind::Code, "fn main() {}"), (BlockKind::Text, "t")]);
    let model = update(model, Message::CycleLanguage);
    assert_eq!(model.store.current().language.as_deref(), Some("text"));
    assert!(model.store.is_modified());

    let model = update(model, Message::CycleLanguage);
    assert_eq!(model.store.current().language.as_deref(), Some("rust"));
    assert_eq!(model.active_toast().unwrap().0, "Language: rust");

    let model = apply(model, [Message::NavigateBlock(1), Message::CycleLanguage]);
    assert_eq!(model.store.current().language, None);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Warning);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('L')), &model),
        Some(Message::CycleLanguage)
    );
}

#[test]
fn test_cycle_language_wraps_around() {
    let mut model = doc_model(&[(BlockKind::Code, "echo")]);
    model.store.set_language(0, Some("BASH".to_string())).unwrap();
    let model = update(model, Message::CycleLanguage);
    assert_eq!(model.store.current().language.as_deref(), Some("text"));
}

#[test]
fn test_split_ratio_is_clamped() {
    let mut model = doc_model(&[(BlockKind::Text, "")]);
    model.prefs.split_ratio = 0.7;
    let model = apply(model, [Message::AdjustSplit(1), Message::AdjustSplit(1)]);
    assert!((model.prefs.split_ratio - 0.8).abs() < 1e-6);
    let model = apply(model, std::iter::repeat_n(Message::AdjustSplit(-1), 10));
    assert!((model.prefs.split_ratio - 0.2).abs() < 1e-6);
}

#[test]
fn test_cycle_theme_updates_preference() {
    let model = Model::default();
    assert_eq!(model.theme.id, "default");
    let model = update(model, Message::CycleTheme);
    assert_eq!(model.theme.id, "gruvbox");
    assert_eq!(model.prefs.theme, "gruvbox");
}

#[test]
fn test_template_select_opens_document() {
    let model = Model::default();
    let model = apply(
        model,
        [
            Message::ShowTemplates,
            Message::TemplateDown,
            Message::TemplateSelect,
        ],
    );
    assert_eq!(model.screen, Screen::Document);
    assert_eq!(model.mode, Mode::Browsing);
    assert_eq!(model.store.document().template, model.templates.all()[1].name);
    assert!(model.doc_path.is_none());
}

#[test]
fn test_export_dialog_editing() {
    let model = doc_model(&[(BlockKind::Heading, "# Quarterly Report")]);
    let model = update(model, Message::OpenExport);
    assert_eq!(model.screen, Screen::Export);
    assert_eq!(model.export_basename(), "quarterly-report");

    let model = apply(
        model,
        [
            Message::ExportNextFormat,
            Message::ExportInput('q'),
            Message::ExportInput('3'),
            Message::ExportInput('x'),
            Message::ExportBackspace,
        ],
    );
    assert_eq!(model.export.format(), crate::export::ExportFormat::Html);
    assert_eq!(model.export_basename(), "q3");
    let model = update(model, Message::ExportCancel);
    assert_eq!(model.screen, Screen::Document);
}

#[test]
fn test_export_finished_reports_outcome() {
    let mut model = doc_model(&[(BlockKind::Text, "")]);
    model.export_pending = true;
    let model = update(
        model,
        Message::ExportFinished(Err("pdflatex not found".to_string())),
    );
    assert!(!model.export_pending);
    assert_eq!(
        model.active_toast(),
        Some(("pdflatex not found", ToastLevel::Error))
    );
}

#[test]
fn test_keys_while_editing_insert_text() {
    let model = doc_model(&[(BlockKind::Text, "")]);
    let model = update(model, Message::BeginEdit);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('q')), &model),
        Some(Message::EditorInsertChar('q'))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Enter), &model),
        Some(Message::EditorNewline)
    );
    assert_eq!(App::handle_key(key(KeyCode::Esc), &model), Some(Message::ExitEdit));
}

#[test]
fn test_keys_route_to_popover_when_open() {
    let model = doc_model(&[(BlockKind::Math, "")]);
    let model = update(model, Message::BeginEdit);
    let model = type_text(model, "\\al");
    assert_eq!(
        App::handle_key(key(KeyCode::Down), &model),
        Some(Message::CompletionNext)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Tab), &model),
        Some(Message::AcceptCompletion)
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Enter), &model),
        Some(Message::AcceptCompletion)
    );
}

#[test]
fn test_browsing_keys() {
    let model = doc_model(&[(BlockKind::Text, "")]);
    assert_eq!(
        App::handle_key(key(KeyCode::Char('m')), &model),
        Some(Message::ConvertBlock(BlockKind::Math))
    );
    assert_eq!(
        App::handle_key(key(KeyCode::Char('1')), &model),
        Some(Message::SetViewMode(ViewMode::Editor))
    );
    assert_eq!(
        App::handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL), &model),
        Some(Message::Quit)
    );
}

#[test]
fn test_initial_model_lists_directory_and_opens_template() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("notes.quire"), "{}").unwrap();
    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let app = App::new(prefs).with_template("resume");
    let model = app.initial_model();
    assert_eq!(model.screen, Screen::Document);
    assert!(model.browse_entries.iter().any(|e| e.name == "notes.quire"));
}

#[test]
fn test_open_bad_document_keeps_browser() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.quire");
    std::fs::write(&path, "not json").unwrap();
    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let model = App::new(prefs).with_document(path).initial_model();
    assert_eq!(model.screen, Screen::Files);
    assert_eq!(model.active_toast().unwrap().1, ToastLevel::Error);
}

#[test]
fn test_browse_activate_opens_document() {
    let dir = tempdir().unwrap();
    let doc = Document::new(
        "blank",
        vec![ContentBlock::new(BlockId(7), BlockKind::Text, "saved")],
    );
    let path = dir.path().join("saved.quire");
    std::fs::write(&path, crate::document::to_json(&doc).unwrap()).unwrap();

    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let app = App::new(prefs);
    let mut model = app.initial_model();
    let mut pending = None;
    let idx = model
        .browse_entries
        .iter()
        .position(|e| e.name == "saved.quire")
        .unwrap();
    model.browse_selected = idx;
    app.handle_message_side_effects(&mut model, &mut pending, &Message::BrowseActivate);

    assert_eq!(model.screen, Screen::Document);
    assert_eq!(model.store.current().content, "saved");
    let opened = model.doc_path.as_deref().and_then(std::path::Path::file_name);
    assert_eq!(opened, path.file_name());
}

#[test]
fn test_save_uses_smart_filename_then_existing_path() {
    let dir = tempdir().unwrap();
    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let app = App::new(prefs);
    let mut model = app.initial_model();
    model.open_document(
        Document::new(
            "blank",
            vec![ContentBlock::new(BlockId(1), BlockKind::Heading, "# Lab Notes")],
        ),
        None,
    );
    let mut pending = None;
    app.handle_message_side_effects(&mut model, &mut pending, &Message::Save);

    let expected: PathBuf = model.browse_dir.join("lab-notes.quire");
    assert_eq!(model.doc_path.as_deref(), Some(expected.as_path()));
    assert!(expected.exists());
    assert!(!model.store.is_modified());
}

#[test]
fn test_export_confirm_writes_file() {
    let dir = tempdir().unwrap();
    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let app = App::new(prefs);
    let mut model = app.initial_model();
    model.open_document(
        Document::new(
            "blank",
            vec![ContentBlock::new(BlockId(1), BlockKind::Text, "$\\alpha$")],
        ),
        None,
    );
    model.export.selected = 3;
    let mut pending = None;
    model = update(model, Message::ExportConfirm);
    app.handle_message_side_effects(&mut model, &mut pending, &Message::ExportConfirm);

    assert!(pending.is_none());
    let written = std::fs::read_to_string(model.browse_dir.join("document.md")).unwrap();
    assert_eq!(written, "$\\alpha$\n");
}

#[test]
fn test_pdf_export_runs_in_background() {
    let dir = tempdir().unwrap();
    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let app = App::new(prefs).with_toolchain(Toolchain::new("quire-no-such-typesetter"));
    let mut model = app.initial_model();
    model.open_document(
        Document::new(
            "blank",
            vec![ContentBlock::new(BlockId(1), BlockKind::Heading, "# Report")],
        ),
        None,
    );
    let mut pending = None;
    model = update(model, Message::ExportConfirm);
    app.handle_message_side_effects(&mut model, &mut pending, &Message::ExportConfirm);
    assert!(model.export_pending);

    let outcome = pending.take().unwrap().wait().unwrap();
    let err = outcome.unwrap_err();
    assert!(err.intermediate().unwrap().ends_with("report.tex"));
    assert!(model.browse_dir.join("report.tex").exists());
}

#[test]
fn test_view_change_saves_preferences() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config");
    let prefs = Preferences {
        last_dir: dir.path().to_path_buf(),
        ..Preferences::default()
    };
    let app = App::new(prefs).with_config(config.clone(), Default::default());
    let mut model = app.initial_model();
    let mut pending = None;
    model = update(model, Message::SetViewMode(ViewMode::Preview));
    app.handle_message_side_effects(
        &mut model,
        &mut pending,
        &Message::SetViewMode(ViewMode::Preview),
    );
    let saved = std::fs::read_to_string(config).unwrap();
    assert!(saved.contains("--view preview"));
}
