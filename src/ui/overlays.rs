use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::app::{CompletionPopover, Model};
use crate::export::ExportFormat;
use crate::ui::style::Theme;

/// Rows of candidates shown at once.
const POPOVER_ROWS: usize = 8;

pub fn render_completion_popover(
    theme: &Theme,
    popover: &CompletionPopover,
    frame: &mut Frame,
    bounds: Rect,
    anchor: Position,
) {
    let start = popover
        .selected
        .saturating_sub(POPOVER_ROWS.saturating_sub(1));
    let rows: Vec<_> = popover
        .candidates
        .iter()
        .enumerate()
        .skip(start)
        .take(POPOVER_ROWS)
        .collect();

    let name_width = rows
        .iter()
        .map(|(_, c)| UnicodeWidthStr::width(c.name))
        .max()
        .unwrap_or(0);
    let lines: Vec<Line> = rows
        .iter()
        .map(|(i, candidate)| {
            let style = if *i == popover.selected {
                theme.selection()
            } else {
                Style::default().fg(theme.palette.foreground)
            };
            let pad = name_width - UnicodeWidthStr::width(candidate.name);
            Line::from(vec![
                Span::styled(format!("{}{} ", candidate.name, " ".repeat(pad)), style),
                Span::styled(format!("{} ", candidate.description), theme.title()),
                Span::styled(candidate.category.tag(), theme.muted()),
            ])
        })
        .collect();

    let content_width = lines.iter().map(Line::width).max().unwrap_or(0);
    let width = u16::try_from(content_width + 2)
        .unwrap_or(u16::MAX)
        .min(bounds.width);
    let height = u16::try_from(lines.len() + 2).unwrap_or(u16::MAX).min(bounds.height);

    // Below the cursor when it fits, otherwise above.
    let below = anchor.y.saturating_add(1);
    let y = if below + height <= bounds.y + bounds.height {
        below
    } else {
        anchor.y.saturating_sub(height).max(bounds.y)
    };
    let x = anchor
        .x
        .min((bounds.x + bounds.width).saturating_sub(width))
        .max(bounds.x);
    let popup = Rect::new(x, y, width, height);

    let title = format!(" {}/{} ", popover.selected + 1, popover.candidates.len());
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .style(theme.base());
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_export_dialog(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let popup = centered_popup_rect(56, 14, area);

    let mut lines: Vec<Line> = Vec::new();
    for (i, format) in ExportFormat::ALL.iter().enumerate() {
        let selected = i == model.export.selected;
        let marker = if selected { ">" } else { " " };
        let style = if selected {
            theme.selection()
        } else {
            Style::default().fg(theme.palette.foreground)
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{marker} {:<18}", format.label()), style),
            Span::styled(format!(" .{}", format.extension()), theme.muted()),
        ]));
    }
    lines.push(Line::raw(""));

    let placeholder = model.export_basename();
    let name = if model.export.filename.is_empty() {
        Span::styled(placeholder, theme.muted())
    } else {
        Span::styled(
            model.export.filename.clone(),
            Style::default().fg(theme.palette.foreground),
        )
    };
    lines.push(Line::from(vec![
        Span::styled("Name: ", theme.title()),
        name,
        Span::styled(" ", theme.cursor()),
    ]));
    lines.push(Line::styled(
        format!("Into: {}", model.export_dir().display()),
        theme.muted(),
    ));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "↑/↓ format · type a name · Enter export · Esc cancel",
        theme.muted(),
    ));

    let block = Block::default()
        .title(" Export ")
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .padding(Padding::horizontal(1))
        .style(theme.base());
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

pub fn render_help_overlay(model: &Model, frame: &mut Frame, area: Rect) {
    let theme = model.theme;
    let popup_width = area.width.saturating_sub(12).max(48);
    let popup_height = area.height.saturating_sub(4).max(12);
    let popup = centered_popup_rect(popup_width, popup_height, area);

    let section_style = Style::default()
        .fg(theme.palette.warning)
        .add_modifier(Modifier::BOLD);
    let key_style = theme.title();
    let entry = |key: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {key:<12}"), key_style),
            Span::raw(desc),
        ])
    };

    let config = model
        .config_path
        .as_ref()
        .map_or_else(|| "<none>".to_string(), |p| p.display().to_string());

    let lines = vec![
        Line::styled("Files", section_style),
        entry("j/k Enter", "move, open document or directory"),
        entry("h", "show or hide dotfiles"),
        entry("space/n", "new document from a template"),
        Line::raw(""),
        Line::styled("Blocks", section_style),
        entry("j/k g/G", "previous / next / first / last block"),
        entry("Enter/i", "edit block (Esc to finish)"),
        entry("n  d", "new text block, delete block"),
        entry("t H m c l r b", "text heading math code list raw quote"),
        entry("N", "toggle heading numbering"),
        entry("L", "cycle code block language"),
        entry("s  e", "save, export"),
        Line::raw(""),
        Line::styled("Editing", section_style),
        entry("\\name", "macro completion; ↑/↓ pick, Tab accept"),
        entry("Esc", "close completion, then finish editing"),
        Line::raw(""),
        Line::styled("View", section_style),
        entry("1/2/3", "editor / split / preview"),
        entry("+/-", "resize split"),
        entry("T", "next theme"),
        entry("q  Ctrl+C", "back, quit"),
        Line::raw(""),
        Line::styled(format!("Preferences: {config}"), theme.muted()),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_style(theme.border(true))
        .padding(Padding::uniform(1))
        .style(theme.base());
    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(block), popup);
}

fn centered_popup_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w) / 2);
    let y = area.y + (area.height.saturating_sub(h) / 2);
    Rect::new(x, y, w, h)
}
