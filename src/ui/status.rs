use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use crate::app::{Mode, Model, Screen, ToastLevel};

pub fn render_status_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let pending = if model.export_pending {
        "  [typesetting]"
    } else {
        ""
    };

    let (label, status) = match model.screen {
        Screen::Files => {
            let hidden = if model.prefs.show_hidden {
                " [hidden shown]"
            } else {
                ""
            };
            (
                " FILES ",
                format!(
                    " {} entries{hidden}  Enter:open  space:new  h:hidden  ?:help  q:quit",
                    model.browse_entries.len()
                ),
            )
        }
        Screen::Templates => (" NEW ", "  Enter:create  q:back".to_string()),
        Screen::Export => (" EXPORT ", format!("  {}", model.export.format().label())),
        Screen::Document => {
            let modified = if model.store.is_modified() {
                " [modified]"
            } else {
                ""
            };
            let position = format!(
                "block {}/{} {}",
                model.store.current_index() + 1,
                model.store.len(),
                model.store.current().kind
            );
            match model.mode {
                Mode::Browsing => (
                    " BLOCKS ",
                    format!(
                        " {}{modified}  {position}  {}  s:save  e:export  T:theme  1/2/3:view  +/-:split  ?:help  q:menu",
                        model.display_name(),
                        model.prefs.view.as_str(),
                    ),
                ),
                Mode::Editing => {
                    let (line, col) = model.editor.position();
                    (
                        " EDIT ",
                        format!(
                            " {}{modified}  {position}  Ln {}, Col {}  Esc:done  Tab:complete",
                            model.display_name(),
                            line + 1,
                            col + 1
                        ),
                    )
                }
            }
        }
    };

    let bar = Line::from(vec![
        Span::styled(label, theme.selection()),
        Span::raw(format!("{status}{pending}")),
    ]);
    let style = Style::default()
        .bg(theme.palette.border)
        .fg(theme.palette.foreground);
    frame.render_widget(Paragraph::new(bar).style(style), area);
}

pub fn render_toast_bar(model: &Model, frame: &mut Frame, area: Rect) {
    let Some((message, level)) = model.active_toast() else {
        return;
    };
    let palette = &model.theme.palette;
    let (prefix, style) = match level {
        ToastLevel::Info => (
            "[info]",
            Style::default().bg(palette.border).fg(palette.success),
        ),
        ToastLevel::Warning => (
            "[warn]",
            Style::default().bg(palette.warning).fg(palette.background),
        ),
        ToastLevel::Error => (
            "[error]",
            Style::default().bg(palette.error).fg(palette.background),
        ),
    };
    let toast = Paragraph::new(format!("{prefix} {message}")).style(style);
    frame.render_widget(toast, area);
}
