//! Color themes and element styles.
//!
//! Themes form a fixed table built at compile time; the model holds a
//! `&'static Theme` and cycles through the table in order.

use ratatui::style::{Color, Modifier, Style};

use crate::document::BlockKind;
use crate::render::Severity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub accent: Color,
    pub background: Color,
    pub foreground: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub muted: Color,
    pub border: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Identifier stored in preferences.
    pub id: &'static str,
    pub name: &'static str,
    pub palette: Palette,
}

#[allow(clippy::cast_possible_truncation)]
const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub static THEMES: [Theme; 4] = [
    Theme {
        id: "default",
        name: "Default",
        palette: Palette {
            primary: rgb(0x58a6ff),
            secondary: rgb(0x8b949e),
            accent: rgb(0xa5a5ff),
            background: rgb(0x0d1117),
            foreground: rgb(0xc9d1d9),
            success: rgb(0x3fb950),
            warning: rgb(0xd29922),
            error: rgb(0xf85149),
            muted: rgb(0x7d8590),
            border: rgb(0x30363d),
        },
    },
    Theme {
        id: "gruvbox",
        name: "Gruvbox",
        palette: Palette {
            primary: rgb(0x83a598),
            secondary: rgb(0xa89984),
            accent: rgb(0xd3869b),
            background: rgb(0x282828),
            foreground: rgb(0xebdbb2),
            success: rgb(0xb8bb26),
            warning: rgb(0xfabd2f),
            error: rgb(0xfb4934),
            muted: rgb(0x928374),
            border: rgb(0x504945),
        },
    },
    Theme {
        id: "nord",
        name: "Nord",
        palette: Palette {
            primary: rgb(0x81a1c1),
            secondary: rgb(0xd8dee9),
            accent: rgb(0xb48ead),
            background: rgb(0x2e3440),
            foreground: rgb(0xeceff4),
            success: rgb(0xa3be8c),
            warning: rgb(0xebcb8b),
            error: rgb(0xbf616a),
            muted: rgb(0x4c566a),
            border: rgb(0x3b4252),
        },
    },
    Theme {
        id: "dracula",
        name: "Dracula",
        palette: Palette {
            primary: rgb(0xbd93f9),
            secondary: rgb(0x6272a4),
            accent: rgb(0xff79c6),
            background: rgb(0x282a36),
            foreground: rgb(0xf8f8f2),
            success: rgb(0x50fa7b),
            warning: rgb(0xf1fa8c),
            error: rgb(0xff5555),
            muted: rgb(0x6272a4),
            border: rgb(0x44475a),
        },
    },
];

impl Theme {
    /// Look a theme up by id, falling back to the first theme.
    pub fn by_id(id: &str) -> &'static Self {
        THEMES
            .iter()
            .find(|t| t.id.eq_ignore_ascii_case(id))
            .unwrap_or(&THEMES[0])
    }

    /// The theme after this one, wrapping around.
    pub fn next(&self) -> &'static Self {
        let idx = THEMES.iter().position(|t| t.id == self.id).unwrap_or(0);
        &THEMES[(idx + 1) % THEMES.len()]
    }

    pub fn base(&self) -> Style {
        Style::default()
            .fg(self.palette.foreground)
            .bg(self.palette.background)
    }

    pub fn title(&self) -> Style {
        Style::default()
            .fg(self.palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border(&self, focused: bool) -> Style {
        let color = if focused {
            self.palette.primary
        } else {
            self.palette.border
        };
        Style::default().fg(color)
    }

    pub fn muted(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    pub fn selection(&self) -> Style {
        Style::default()
            .fg(self.palette.background)
            .bg(self.palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn cursor(&self) -> Style {
        Style::default()
            .fg(self.palette.background)
            .bg(self.palette.foreground)
    }

    /// Style of a block's preview text in the preview pane.
    pub fn block(&self, kind: BlockKind) -> Style {
        let p = &self.palette;
        match kind {
            BlockKind::Heading => Style::default()
                .fg(p.primary)
                .add_modifier(Modifier::BOLD),
            BlockKind::Math => Style::default().fg(p.accent),
            BlockKind::Code => Style::default().fg(p.success),
            BlockKind::Quote => Style::default()
                .fg(p.secondary)
                .add_modifier(Modifier::ITALIC),
            BlockKind::Raw => Style::default().fg(p.warning),
            BlockKind::Text | BlockKind::List => Style::default().fg(p.foreground),
        }
    }

    pub fn diagnostic(&self, severity: Severity) -> Style {
        match severity {
            Severity::Error => Style::default()
                .fg(self.palette.error)
                .add_modifier(Modifier::BOLD),
            Severity::Warning => Style::default().fg(self.palette.warning),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_id_is_case_insensitive_with_fallback() {
        assert_eq!(Theme::by_id("Nord").id, "nord");
        assert_eq!(Theme::by_id("solarized").id, "default");
    }

    #[test]
    fn test_next_cycles_through_table() {
        let mut theme = Theme::by_id("default");
        let mut seen = Vec::new();
        for _ in 0..THEMES.len() {
            theme = theme.next();
            seen.push(theme.id);
        }
        assert_eq!(seen, ["gruvbox", "nord", "dracula", "default"]);
    }

    #[test]
    fn test_rgb_splits_channels() {
        assert_eq!(rgb(0x58a6ff), Color::Rgb(0x58, 0xa6, 0xff));
    }

    #[test]
    fn test_error_diagnostics_stand_out() {
        let theme = Theme::by_id("dracula");
        let style = theme.diagnostic(Severity::Error);
        assert_eq!(style.fg, Some(rgb(0xff5555)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
    }
}
