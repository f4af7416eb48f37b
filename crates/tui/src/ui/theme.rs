//! Theme roles and style helpers.
//!
//! A single Nord-based palette mapped onto semantic roles, plus the style
//! builders the components share. Styling goes through these helpers so the
//! widgets never hardcode colors.

use ratatui::{
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Block, BorderType, Borders},
};

// Polar Night (base surfaces)
const N0: Color = Color::Rgb(0x2E, 0x34, 0x40);
const N1: Color = Color::Rgb(0x3B, 0x42, 0x52);
const N2: Color = Color::Rgb(0x43, 0x4C, 0x5E);
// Snow Storm (foregrounds)
const S0: Color = Color::Rgb(0xD8, 0xDE, 0xE9);
const S1: Color = Color::Rgb(0xE5, 0xE9, 0xF0);
const S2: Color = Color::Rgb(0xEC, 0xEF, 0xF4);
// Frost (accents)
const F1: Color = Color::Rgb(0x88, 0xC0, 0xD0);
const F3: Color = Color::Rgb(0x5E, 0x81, 0xAC);
// Aurora (semantic status)
const A_RED: Color = Color::Rgb(0xBF, 0x61, 0x6A);
const A_GREEN: Color = Color::Rgb(0xA3, 0xBE, 0x8C);
const TEXT_MUTED: Color = Color::Rgb(0x61, 0x6E, 0x88);

/// Semantic color roles used throughout the UI.
#[derive(Debug, Clone)]
pub struct ThemeRoles {
    pub background: Color,
    pub surface: Color,
    pub surface_muted: Color,
    pub border: Color,
    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,
    pub accent: Color,
    pub success: Color,
    pub error: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub focus: Color,
}

/// The application theme: semantic roles plus common style builders.
#[derive(Debug, Clone)]
pub struct Theme {
    roles: ThemeRoles,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            roles: ThemeRoles {
                background: N0,
                surface: N1,
                surface_muted: N2,
                border: N1,
                text: S0,
                text_secondary: S1,
                text_muted: TEXT_MUTED,
                accent: F1,
                success: A_GREEN,
                error: A_RED,
                selection_bg: F3,
                selection_fg: S2,
                focus: F1,
            },
        }
    }
}

impl Theme {
    pub fn roles(&self) -> &ThemeRoles {
        &self.roles
    }

    pub fn text_primary_style(&self) -> Style {
        Style::default().fg(self.roles.text)
    }

    pub fn text_secondary_style(&self) -> Style {
        Style::default().fg(self.roles.text_secondary)
    }

    pub fn text_muted_style(&self) -> Style {
        Style::default().fg(self.roles.text_muted)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        let color = if focused { self.roles.focus } else { self.roles.border };
        Style::default().fg(color)
    }

    pub fn selection_style(&self) -> Style {
        Style::default()
            .fg(self.roles.selection_fg)
            .bg(self.roles.selection_bg)
    }

    pub fn status_success(&self) -> Style {
        Style::default().fg(self.roles.success)
    }

    pub fn status_error(&self) -> Style {
        Style::default().fg(self.roles.error)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.roles.accent)
    }

    /// Style for the currently active navigation link.
    pub fn active_link_style(&self) -> Style {
        Style::default()
            .fg(self.roles.accent)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
    }
}

/// Style for panel-like containers.
pub fn panel_style(theme: &Theme) -> Style {
    let ThemeRoles { surface, text, .. } = *theme.roles();
    Style::default().bg(surface).fg(text)
}

/// Build a standard Block with theme surfaces and borders.
pub fn block<'a>(theme: &Theme, title: Option<&'a str>, focused: bool) -> Block<'a> {
    let mut block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Plain)
        .border_style(theme.border_style(focused))
        .style(panel_style(theme));
    if let Some(t) = title {
        block = block.title(Span::styled(
            t,
            theme.text_secondary_style().add_modifier(Modifier::BOLD),
        ));
    }
    block
}

/// Style for table headers: bold secondary text.
pub fn table_header_style(theme: &Theme) -> Style {
    theme.text_secondary_style().add_modifier(Modifier::BOLD)
}

/// Row style for a given row index, alternating surface tones.
pub fn table_row_style(theme: &Theme, row_index: usize) -> Style {
    let ThemeRoles {
        surface,
        surface_muted,
        text,
        ..
    } = *theme.roles();
    let bg = if row_index % 2 == 0 { surface } else { surface_muted };
    Style::default().bg(bg).fg(text)
}

/// Style for a selected row.
pub fn table_selected_style(theme: &Theme) -> Style {
    theme.selection_style().add_modifier(Modifier::BOLD)
}

/// Builds the `key: description` span pairs shown in the bottom hint bar.
pub fn build_hint_spans(theme: &Theme, hints: &[(&str, &str)]) -> Vec<Span<'static>> {
    let mut spans = Vec::with_capacity(hints.len() * 2);
    for (key, description) in hints {
        spans.push(Span::styled(
            (*key).to_string(),
            theme.accent_style().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::styled((*description).to_string(), theme.text_muted_style()));
    }
    spans
}
