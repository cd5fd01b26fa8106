use chrono::{DateTime, Local};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};

use crate::app::{Mode, Model, Screen};
use crate::browser::format_size;
use crate::config::ViewMode;
use crate::document::{BlockKind, ContentBlock};
use crate::editor::EditorBuffer;
use crate::ui::style::Theme;

use super::{BLOCK_GUTTER, overlays, status};

/// Editor and preview pane areas for `view`; a hidden pane is `None`.
pub fn split_panes(area: Rect, view: ViewMode, ratio: f32) -> (Option<Rect>, Option<Rect>) {
    match view {
        ViewMode::Editor => (Some(area), None),
        ViewMode::Preview => (None, Some(area)),
        ViewMode::Split => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let editor_pct = (ratio * 100.0).round() as u16;
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Percentage(editor_pct),
                    Constraint::Percentage(100 - editor_pct.min(100)),
                ])
                .split(area);
            (Some(chunks[0]), Some(chunks[1]))
        }
    }
}

/// Render the complete UI.
pub fn render(model: &mut Model, frame: &mut Frame) {
    let area = frame.area();
    let theme = model.theme;
    frame.render_widget(Block::default().style(theme.base()), area);

    let toast_active = model.active_toast().is_some();
    let footer_rows = 1 + u16::from(toast_active);
    let body = Rect {
        height: area.height.saturating_sub(footer_rows),
        ..area
    };
    let toast_area = Rect {
        y: area.y + area.height.saturating_sub(2),
        height: 1,
        ..area
    };
    let status_area = Rect {
        y: area.y + area.height.saturating_sub(1),
        height: 1,
        ..area
    };

    match model.screen {
        Screen::Files => render_files(model, frame, body),
        Screen::Templates => render_templates(model, frame, body),
        Screen::Document | Screen::Export => render_document(model, frame, body),
    }
    if model.screen == Screen::Export {
        overlays::render_export_dialog(model, frame, body);
    }
    if model.help_visible {
        overlays::render_help_overlay(model, frame, body);
    }

    if toast_active {
        status::render_toast_bar(model, frame, toast_area);
    }
    status::render_status_bar(model, frame, status_area);
}

/// First row to show so that `row` stays inside a window of `height` rows.
fn scroll_to(row: usize, height: usize) -> usize {
    row.saturating_sub(height.saturating_sub(1))
}

fn render_files(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let visible_rows = area.height.saturating_sub(2) as usize;
    let start = scroll_to(model.browse_selected, visible_rows);

    let items: Vec<Line> = model
        .browse_entries
        .iter()
        .enumerate()
        .skip(start)
        .take(visible_rows)
        .map(|(i, entry)| {
            let selected = i == model.browse_selected;
            let marker = if selected { ">" } else { " " };
            let name = if entry.is_dir && !entry.is_parent() {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };
            let details = if entry.is_dir {
                String::new()
            } else {
                let modified = entry.modified.map_or_else(String::new, |t| {
                    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string()
                });
                format!("{:>6}  {modified}", format_size(entry.size))
            };
            let style = if selected {
                theme.selection()
            } else if entry.is_dir {
                theme.title()
            } else if crate::document::is_document_file(&entry.path) {
                Style::default().fg(theme.palette.foreground)
            } else {
                theme.muted()
            };
            Line::from(vec![
                Span::styled(format!("{marker} {name:<40}"), style),
                Span::styled(details, theme.muted()),
            ])
        })
        .collect();

    let block = Block::default()
        .title(format!(" {} ", model.browse_dir.display()))
        .borders(Borders::ALL)
        .border_style(theme.border(true));
    frame.render_widget(Paragraph::new(items).block(block), area);
}

fn render_templates(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let mut lines = Vec::new();
    for (i, template) in model.templates.all().iter().enumerate() {
        let selected = i == model.template_selected;
        let style = if selected {
            theme.selection()
        } else {
            theme.title()
        };
        let marker = if selected { ">" } else { " " };
        lines.push(Line::styled(format!("{marker} {}", template.name), style));
        lines.push(Line::styled(
            format!("    {}", template.description),
            theme.muted(),
        ));
        lines.push(Line::raw(""));
    }
    let block = Block::default()
        .title(" New document ")
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .padding(Padding::horizontal(1));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_document(model: &mut Model, frame: &mut Frame, area: Rect) {
    let (editor_area, preview_area) = split_panes(area, model.prefs.view, model.prefs.split_ratio);
    if let Some(editor_area) = editor_area {
        render_block_editor(model, frame, editor_area);
    }
    if let Some(preview_area) = preview_area {
        render_preview(model, frame, preview_area);
    }
}

/// Source pane: every block's raw content, the current one highlighted and,
/// while editing, replaced by the live buffer.
fn render_block_editor(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let editing = model.mode == Mode::Editing;
    let current = model.store.current_index();

    let diag_rows = u16::try_from(model.diagnostics.len().min(3)).unwrap_or(3);
    let outer = Block::default()
        .title(" Source ")
        .borders(Borders::ALL)
        .border_style(theme.border(editing));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);
    let text_area = Rect {
        height: inner.height.saturating_sub(diag_rows),
        ..inner
    };
    let diag_area = Rect {
        y: inner.y + text_area.height,
        height: diag_rows.min(inner.height),
        ..inner
    };

    let mut lines: Vec<Line> = Vec::new();
    let mut focus_row = 0;
    let mut cursor_cell: Option<(usize, usize)> = None;
    for (idx, block) in model.store.blocks().iter().enumerate() {
        let is_current = idx == current;
        if is_current {
            focus_row = lines.len();
        }
        lines.push(block_header(theme, block, idx, is_current));
        if is_current && editing {
            let (row, col) = push_buffer_lines(theme, &model.editor, &mut lines);
            cursor_cell = Some((row, col));
            focus_row = row;
        } else {
            let style = if is_current {
                Style::default().fg(theme.palette.foreground)
            } else {
                theme.muted()
            };
            for line in block.content.lines() {
                lines.push(Line::styled(format!("{BLOCK_GUTTER}{line}"), style));
            }
            if block.content.is_empty() {
                lines.push(Line::styled(format!("{BLOCK_GUTTER}(empty)"), theme.muted()));
            }
        }
        lines.push(Line::raw(""));
    }

    let height = text_area.height as usize;
    let offset = scroll_to(focus_row, height);
    let scroll = u16::try_from(offset).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(lines).scroll((scroll, 0)), text_area);

    let diagnostics: Vec<Line> = model
        .diagnostics
        .iter()
        .take(diag_area.height as usize)
        .map(|d| Line::styled(format!(" {d}"), theme.diagnostic(d.severity())))
        .collect();
    frame.render_widget(Paragraph::new(diagnostics), diag_area);

    if let (Some(popover), Some((row, col))) = (model.completion.as_ref(), cursor_cell)
        && row >= offset
        && row - offset < height
    {
        let anchor = Position {
            x: text_area
                .x
                .saturating_add(u16::try_from(col + BLOCK_GUTTER.len()).unwrap_or(u16::MAX)),
            y: text_area
                .y
                .saturating_add(u16::try_from(row - offset).unwrap_or(u16::MAX)),
        };
        overlays::render_completion_popover(theme, popover, frame, area, anchor);
    }
}

fn block_header(theme: &Theme, block: &ContentBlock, idx: usize, is_current: bool) -> Line<'static> {
    let mut tags = block.kind.label().to_string();
    if block.kind == BlockKind::Heading {
        tags.push_str(&format!(" h{}", block.heading_level()));
        if block.numbered {
            tags.push_str(" numbered");
        }
    }
    if let Some(language) = &block.language {
        tags.push(' ');
        tags.push_str(language);
    }
    let marker = if is_current { ">" } else { " " };
    let style = if is_current {
        theme.selection()
    } else {
        theme.border(false)
    };
    Line::styled(format!("{marker} [{}] {tags}", idx + 1), style)
}

/// Append the buffer's lines with a block cursor; returns the cursor's
/// (row in `lines`, char column).
fn push_buffer_lines(
    theme: &Theme,
    buffer: &EditorBuffer,
    lines: &mut Vec<Line<'static>>,
) -> (usize, usize) {
    let (cursor_line, cursor_col) = buffer.position();
    let mut cursor_row = lines.len();
    for (idx, text) in buffer.lines().enumerate() {
        if idx != cursor_line {
            lines.push(Line::raw(format!("{BLOCK_GUTTER}{text}")));
            continue;
        }
        cursor_row = lines.len();
        let before: String = text.chars().take(cursor_col).collect();
        let at = text.chars().nth(cursor_col).unwrap_or(' ');
        let after: String = text.chars().skip(cursor_col + 1).collect();
        lines.push(Line::from(vec![
            Span::raw(format!("{BLOCK_GUTTER}{before}")),
            Span::styled(at.to_string(), theme.cursor()),
            Span::raw(after),
        ]));
    }
    (cursor_row, cursor_col)
}

/// Rendered pane: each block's Unicode preview, styled by kind.
fn render_preview(model: &mut Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let current = model.store.current_index();
    let mut lines: Vec<Line> = Vec::new();
    let mut focus_row = 0;

    for (idx, block) in model.store.blocks().iter().enumerate() {
        if idx == current {
            focus_row = lines.len();
        }
        let style = theme.block(block.kind);
        let marker = if idx == current {
            Span::styled("▌", Style::default().fg(theme.palette.accent))
        } else {
            Span::raw(" ")
        };
        let text = match block.kind {
            BlockKind::Code | BlockKind::Raw => block.content.clone(),
            BlockKind::Heading => model.renderer.render(block.heading_title()).text,
            _ => model.renderer.render(&block.content).text,
        };
        let prefix = match block.kind {
            BlockKind::Quote => "│ ",
            BlockKind::Code | BlockKind::Raw => "  ",
            _ => "",
        };
        for line in text.lines() {
            lines.push(Line::from(vec![
                marker.clone(),
                Span::raw(" "),
                Span::styled(format!("{prefix}{line}"), style),
            ]));
        }
        lines.push(Line::raw(""));
    }

    let block = Block::default()
        .title(" Preview ")
        .borders(Borders::ALL)
        .border_style(theme.border(false));
    let inner_height = area.height.saturating_sub(2) as usize;
    let scroll = u16::try_from(scroll_to(focus_row, inner_height)).unwrap_or(u16::MAX);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .block(block)
            .style(theme.base())
            .scroll((scroll, 0)),
        area,
    );
}
