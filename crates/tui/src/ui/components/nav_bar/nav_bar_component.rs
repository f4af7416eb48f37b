//! Navigation bar widget: drawing and mouse dispatch.

use std::time::Instant;

use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use haixin_types::Effect;
use ratatui::{
    layout::{Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::ui::components::component::Component;
use crate::ui::theme::panel_style;

use super::model::DropdownRow;

/// The bar itself is two rows: brand plus the action link on top, the current
/// tool's page strip underneath. The dropdown overlays the content below when
/// shown.
pub const NAV_BAR_HEIGHT: u16 = 2;

#[derive(Debug, Default)]
pub struct NavBarComponent;

impl Component for NavBarComponent {
    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => {
                let over_brand = app.nav.brand_area.contains(pos);
                let over_dropdown = app.nav.is_shown() && app.nav.dropdown_area.contains(pos);
                app.nav.pointer_moved(over_brand, over_dropdown, Instant::now());
                Vec::new()
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if app.nav.is_shown() && app.nav.dropdown_area.contains(pos) {
                    let hit = app
                        .nav
                        .dropdown_links
                        .iter()
                        .find(|(area, _)| area.contains(pos))
                        .map(|(_, link)| link.clone());
                    if let Some(link) = hit {
                        let effect = app.nav.link_action(&link);
                        app.nav.hide_dropdown();
                        return vec![effect];
                    }
                    return Vec::new();
                }
                if app.nav.brand_area.contains(pos) {
                    let link = app.nav.model.brand.link.clone();
                    app.nav.hide_dropdown();
                    return vec![Effect::NavigateSameTool(link)];
                }
                if let Some(index) = app.nav.strip_areas.iter().position(|a| a.contains(pos)) {
                    if let Some(link) = app.nav.model.strip.get(index).cloned() {
                        return vec![app.nav.link_action(&link)];
                    }
                }
                if app.nav.action_area.contains(pos) {
                    return vec![Effect::OpenExternal(app.nav.model.action.href.clone())];
                }
                if app.nav.is_shown() {
                    app.nav.hide_dropdown();
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        app.nav.brand_area = Rect::default();
        app.nav.action_area = Rect::default();
        app.nav.strip_areas.clear();
        app.nav.dropdown_area = Rect::default();
        app.nav.dropdown_links.clear();
        if rect.width == 0 || rect.height == 0 {
            return;
        }

        let theme = app.theme.clone();
        frame.render_widget(Block::default().style(panel_style(&theme)), rect);

        // Top row: brand at the left, the action link at the right edge.
        let brand_text = format!(" {} ▾ ", app.nav.model.brand.title);
        let brand_width = (brand_text.width() as u16).min(rect.width);
        app.nav.brand_area = Rect::new(rect.x, rect.y, brand_width, 1);
        frame.render_widget(
            Paragraph::new(Span::styled(
                brand_text,
                theme.accent_style().add_modifier(Modifier::BOLD),
            )),
            app.nav.brand_area,
        );

        let action_text = format!(" {} ", app.nav.model.action.title);
        let action_width = action_text.width() as u16;
        if brand_width + action_width < rect.width {
            app.nav.action_area = Rect::new(
                rect.right().saturating_sub(action_width),
                rect.y,
                action_width,
                1,
            );
            frame.render_widget(
                Paragraph::new(Span::styled(action_text, theme.text_secondary_style())),
                app.nav.action_area,
            );
        }

        // Second row: the current tool's page strip.
        if rect.height >= 2 {
            let mut x = rect.x + 1;
            let y = rect.y + 1;
            for link in app.nav.model.strip.clone() {
                let label = if link.icon.is_empty() {
                    format!(" {} ", link.title)
                } else {
                    format!(" {} {} ", link.icon, link.title)
                };
                let width = label.width() as u16;
                if x + width > rect.right() {
                    break;
                }
                let area = Rect::new(x, y, width, 1);
                let style = if link.active {
                    theme.active_link_style()
                } else {
                    theme.text_secondary_style()
                };
                frame.render_widget(Paragraph::new(Span::styled(label, style)), area);
                app.nav.strip_areas.push(area);
                x += width + 1;
            }
        }

        if app.nav.is_shown() {
            self.render_dropdown(frame, rect, app, &theme);
        }
    }
}

impl NavBarComponent {
    /// Draws the dropdown as an overlay anchored under the brand, recording
    /// one hit area per link row.
    fn render_dropdown(
        &self,
        frame: &mut Frame,
        nav_rect: Rect,
        app: &mut App,
        theme: &crate::ui::theme::Theme,
    ) {
        let frame_area = frame.area();
        let anchor_y = nav_rect.y.saturating_add(nav_rect.height);
        if anchor_y >= frame_area.bottom() {
            return;
        }

        let rows = app.nav.model.dropdown.clone();
        let mut lines: Vec<Line> = Vec::with_capacity(rows.len());
        let mut link_rows: Vec<(usize, super::model::PageLink)> = Vec::new();
        let mut content_width = 0usize;

        for (row_index, row) in rows.iter().enumerate() {
            let line = match row {
                DropdownRow::ToolHeader {
                    icon,
                    name,
                    description,
                } => {
                    let mut spans = Vec::new();
                    if !icon.is_empty() {
                        spans.push(Span::styled(format!("{icon} "), theme.text_primary_style()));
                    }
                    spans.push(Span::styled(
                        name.clone(),
                        theme.text_secondary_style().add_modifier(Modifier::BOLD),
                    ));
                    if let Some(description) = description {
                        spans.push(Span::styled(
                            format!("  {description}"),
                            theme.text_muted_style(),
                        ));
                    }
                    Line::from(spans)
                }
                DropdownRow::OwnerLine { segments } => {
                    let mut spans = vec![Span::styled("👤 ", theme.text_muted_style())];
                    for (i, segment) in segments.iter().enumerate() {
                        if i > 0 {
                            spans.push(Span::styled(" · ", theme.text_muted_style()));
                        }
                        let style = if segment.mailto {
                            theme.accent_style().add_modifier(Modifier::UNDERLINED)
                        } else {
                            theme.text_muted_style()
                        };
                        spans.push(Span::styled(segment.text.clone(), style));
                    }
                    Line::from(spans)
                }
                DropdownRow::Link(link) => {
                    link_rows.push((row_index, link.clone()));
                    let label = if link.icon.is_empty() {
                        format!("  {}", link.title)
                    } else {
                        format!("  {} {}", link.icon, link.title)
                    };
                    let style = if link.active {
                        theme.active_link_style()
                    } else {
                        theme.text_primary_style()
                    };
                    Line::from(Span::styled(label, style))
                }
                DropdownRow::Divider => Line::from(Span::styled(
                    "─".repeat(24),
                    theme.text_muted_style(),
                )),
            };
            content_width = content_width.max(line_width(&line));
            lines.push(line);
        }

        let width = ((content_width as u16).saturating_add(4))
            .min(frame_area.width.saturating_sub(nav_rect.x));
        let height = (lines.len() as u16)
            .saturating_add(2)
            .min(frame_area.bottom().saturating_sub(anchor_y));
        if width < 3 || height < 3 {
            return;
        }
        let area = Rect::new(nav_rect.x, anchor_y, width, height);

        frame.render_widget(Clear, area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .style(panel_style(theme));
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Paragraph::new(lines), inner);

        app.nav.dropdown_area = area;
        for (row_index, link) in link_rows {
            let y = inner.y.saturating_add(row_index as u16);
            if y >= inner.bottom() {
                continue;
            }
            app.nav
                .dropdown_links
                .push((Rect::new(inner.x, y, inner.width, 1), link));
        }
    }
}

fn line_width(line: &Line) -> usize {
    line.spans.iter().map(|s| s.content.width()).sum()
}
