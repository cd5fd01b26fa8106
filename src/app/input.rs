use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Frame;

use crate::app::model::{Mode, Screen};
use crate::app::{App, Message, Model};
use crate::config::ViewMode;
use crate::document::BlockKind;
use crate::editor::Direction;

impl App {
    pub(super) fn handle_event(event: &Event, model: &Model) -> Option<Message> {
        match event {
            Event::Key(key) => Self::handle_key(*key, model),
            Event::Resize(w, h) => {
                crate::perf::log_event("event.resize", format!("width={w} height={h}"));
                Some(Message::Resize(*w, *h))
            }
            _ => None,
        }
    }

    /// Map a key press to a message for the current screen and mode.
    pub(super) fn handle_key(key: KeyEvent, model: &Model) -> Option<Message> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Some(Message::Quit);
        }
        if model.help_visible {
            return Some(Message::ToggleHelp);
        }

        match model.screen {
            Screen::Files => Self::handle_files_key(key),
            Screen::Templates => Self::handle_templates_key(key),
            Screen::Export => Self::handle_export_key(key),
            Screen::Document => match model.mode {
                Mode::Browsing => Self::handle_browsing_key(key),
                Mode::Editing => Self::handle_editing_key(key, model),
            },
        }
    }

    fn handle_files_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::BrowseDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::BrowseUp),
            KeyCode::Char('h') => Some(Message::ToggleHidden),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => Some(Message::BrowseActivate),
            KeyCode::Char(' ' | 'n') => Some(Message::ShowTemplates),
            KeyCode::Char('T') => Some(Message::CycleTheme),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            _ => None,
        }
    }

    fn handle_templates_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Message::ShowFiles),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::TemplateDown),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::TemplateUp),
            KeyCode::Enter => Some(Message::TemplateSelect),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            _ => None,
        }
    }

    fn handle_browsing_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Char('q') => Some(Message::ShowTemplates),
            KeyCode::Char('j') | KeyCode::Down => Some(Message::NavigateBlock(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(Message::NavigateBlock(-1)),
            KeyCode::Char('g') | KeyCode::Home => Some(Message::NavigateBlock(isize::MIN)),
            KeyCode::Char('G') | KeyCode::End => Some(Message::NavigateBlock(isize::MAX)),
            KeyCode::Enter | KeyCode::Char('i') => Some(Message::BeginEdit),
            KeyCode::Char('n') => Some(Message::NewBlock),
            KeyCode::Char('d') => Some(Message::DeleteBlock),
            KeyCode::Char('t') => Some(Message::ConvertBlock(BlockKind::Text)),
            KeyCode::Char('H') => Some(Message::ConvertBlock(BlockKind::Heading)),
            KeyCode::Char('m') => Some(Message::ConvertBlock(BlockKind::Math)),
            KeyCode::Char('c') => Some(Message::ConvertBlock(BlockKind::Code)),
            KeyCode::Char('l') => Some(Message::ConvertBlock(BlockKind::List)),
            KeyCode::Char('r') => Some(Message::ConvertBlock(BlockKind::Raw)),
            KeyCode::Char('b') => Some(Message::ConvertBlock(BlockKind::Quote)),
            KeyCode::Char('N') => Some(Message::ToggleNumbered),
            KeyCode::Char('L') => Some(Message::CycleLanguage),
            KeyCode::Char('s') => Some(Message::Save),
            KeyCode::Char('e') => Some(Message::OpenExport),
            KeyCode::Char('T') => Some(Message::CycleTheme),
            KeyCode::Char('1') => Some(Message::SetViewMode(ViewMode::Editor)),
            KeyCode::Char('2') => Some(Message::SetViewMode(ViewMode::Split)),
            KeyCode::Char('3') => Some(Message::SetViewMode(ViewMode::Preview)),
            KeyCode::Char('=' | '+') => Some(Message::AdjustSplit(1)),
            KeyCode::Char('-') => Some(Message::AdjustSplit(-1)),
            KeyCode::Char('?') => Some(Message::ToggleHelp),
            _ => None,
        }
    }

    fn handle_editing_key(key: KeyEvent, model: &Model) -> Option<Message> {
        let popover_open = model.completion.is_some();
        match key.code {
            KeyCode::Esc => Some(Message::ExitEdit),
            KeyCode::Up if popover_open => Some(Message::CompletionPrev),
            KeyCode::Down if popover_open => Some(Message::CompletionNext),
            KeyCode::Tab | KeyCode::Enter if popover_open => Some(Message::AcceptCompletion),
            KeyCode::Enter => Some(Message::EditorNewline),
            KeyCode::Tab => Some(Message::EditorInsertChar('\t')),
            KeyCode::Backspace => Some(Message::EditorBackspace),
            KeyCode::Delete => Some(Message::EditorDelete),
            KeyCode::Left => Some(Message::EditorMoveCursor(Direction::Left)),
            KeyCode::Right => Some(Message::EditorMoveCursor(Direction::Right)),
            KeyCode::Up => Some(Message::EditorMoveCursor(Direction::Up)),
            KeyCode::Down => Some(Message::EditorMoveCursor(Direction::Down)),
            KeyCode::Home => Some(Message::EditorMoveHome),
            KeyCode::End => Some(Message::EditorMoveEnd),
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Message::EditorInsertChar(c))
            }
            _ => None,
        }
    }

    fn handle_export_key(key: KeyEvent) -> Option<Message> {
        match key.code {
            KeyCode::Esc => Some(Message::ExportCancel),
            KeyCode::Enter => Some(Message::ExportConfirm),
            KeyCode::Up | KeyCode::BackTab => Some(Message::ExportPrevFormat),
            KeyCode::Down | KeyCode::Tab => Some(Message::ExportNextFormat),
            KeyCode::Backspace => Some(Message::ExportBackspace),
            KeyCode::Char(c)
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && !key.modifiers.contains(KeyModifiers::ALT) =>
            {
                Some(Message::ExportInput(c))
            }
            _ => None,
        }
    }

    pub(super) fn view(model: &mut Model, frame: &mut Frame) {
        crate::ui::render(model, frame);
    }
}
