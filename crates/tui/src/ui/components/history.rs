//! History view: past comparison runs, with a detail popup showing the
//! stored per-model results.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use haixin_types::Effect;
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::App;
use crate::ui::components::component::{find_target_index_by_mouse_position, Component};
use crate::ui::theme::{
    block, build_hint_spans, table_header_style, table_row_style, table_selected_style, Theme,
};

#[derive(Debug, Default)]
pub struct HistoryComponent {
    table_area: Rect,
    row_areas: Vec<Rect>,
    /// Scroll offset of the last render; hit indices are relative to it.
    row_offset: usize,
}

impl Component for HistoryComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if app.history.detail.is_some() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => {
                    app.history.detail = None;
                    app.mark_dirty();
                }
                KeyCode::Down => {
                    app.history.detail_scroll = app.history.detail_scroll.saturating_add(1);
                    app.mark_dirty();
                }
                KeyCode::Up => {
                    app.history.detail_scroll = app.history.detail_scroll.saturating_sub(1);
                    app.mark_dirty();
                }
                KeyCode::PageDown => {
                    app.history.detail_scroll = app.history.detail_scroll.saturating_add(8);
                    app.mark_dirty();
                }
                KeyCode::PageUp => {
                    app.history.detail_scroll = app.history.detail_scroll.saturating_sub(8);
                    app.mark_dirty();
                }
                _ => {}
            }
            return Vec::new();
        }

        match key.code {
            KeyCode::Up => {
                app.history.cursor = app.history.cursor.saturating_sub(1);
                app.mark_dirty();
            }
            KeyCode::Down => {
                if app.history.cursor + 1 < app.history.items.len() {
                    app.history.cursor += 1;
                    app.mark_dirty();
                }
            }
            KeyCode::Enter => {
                if let Some(item) = app.history.items.get(app.history.cursor) {
                    let id = item.id;
                    app.history.loading = true;
                    app.mark_dirty();
                    return vec![Effect::FetchHistoryDetail(id)];
                }
            }
            KeyCode::Char('n') => {
                // Next (older) page; the list is newest first.
                if app.history.items.len() == app.history.limit {
                    app.history.offset += app.history.limit;
                    app.history.loading = true;
                    app.history.cursor = 0;
                    app.mark_dirty();
                    return vec![Effect::FetchHistory];
                }
            }
            KeyCode::Char('p') => {
                if app.history.offset > 0 {
                    app.history.offset = app.history.offset.saturating_sub(app.history.limit);
                    app.history.loading = true;
                    app.history.cursor = 0;
                    app.mark_dirty();
                    return vec![Effect::FetchHistory];
                }
            }
            KeyCode::F(5) => {
                app.history.loading = true;
                app.mark_dirty();
                return vec![Effect::FetchHistory];
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if app.history.detail.is_some() {
            match mouse.kind {
                MouseEventKind::ScrollDown => {
                    app.history.detail_scroll = app.history.detail_scroll.saturating_add(2);
                    app.mark_dirty();
                }
                MouseEventKind::ScrollUp => {
                    app.history.detail_scroll = app.history.detail_scroll.saturating_sub(2);
                    app.mark_dirty();
                }
                _ => {}
            }
            return Vec::new();
        }
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = find_target_index_by_mouse_position(
                    &self.table_area,
                    &self.row_areas,
                    mouse.column,
                    mouse.row,
                ) {
                    let row = self.row_offset + index;
                    if app.history.cursor == row {
                        if let Some(item) = app.history.items.get(row) {
                            let id = item.id;
                            app.history.loading = true;
                            app.mark_dirty();
                            return vec![Effect::FetchHistoryDetail(id)];
                        }
                    }
                    if row < app.history.items.len() {
                        app.history.cursor = row;
                        app.mark_dirty();
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                app.history.cursor = app.history.cursor.saturating_sub(1);
                app.mark_dirty();
            }
            MouseEventKind::ScrollDown => {
                if app.history.cursor + 1 < app.history.items.len() {
                    app.history.cursor += 1;
                    app.mark_dirty();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        self.row_areas.clear();
        self.table_area = Rect::default();
        self.row_offset = 0;
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let theme = app.theme.clone();

        let page = app.history.offset / app.history.limit + 1;
        let title = if app.history.loading {
            format!("History, page {page} (loading...)")
        } else {
            format!("History, page {page}")
        };
        let container = block(&theme, Some(&title), true);
        let inner = container.inner(rect);
        frame.render_widget(container, rect);
        self.table_area = inner;

        let header =
            Row::new(["ID", "Created", "File", "Prompt"]).style(table_header_style(&theme));
        let rows: Vec<Row> = app
            .history
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Row::new(vec![
                    Cell::from(item.id.to_string()),
                    Cell::from(
                        item.created_at
                            .as_deref()
                            .map(format_timestamp)
                            .unwrap_or_default(),
                    ),
                    Cell::from(item.filename.clone().unwrap_or_default()),
                    Cell::from(item.prompt.clone().unwrap_or_default()),
                ])
                .style(table_row_style(&theme, i))
            })
            .collect();

        let widths = [
            Constraint::Length(6),
            Constraint::Length(20),
            Constraint::Min(14),
            Constraint::Min(20),
        ];
        let mut state = TableState::default();
        if !app.history.items.is_empty() {
            state.select(Some(app.history.cursor.min(app.history.items.len() - 1)));
        }
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(table_selected_style(&theme));
        frame.render_stateful_widget(table, inner, &mut state);

        // Row hit areas: the header occupies the first inner line and the
        // table may have scrolled, so areas map to items[offset..].
        self.row_offset = state.offset();
        let visible = app
            .history
            .items
            .len()
            .saturating_sub(self.row_offset)
            .min(inner.height.saturating_sub(1) as usize);
        for i in 0..visible {
            self.row_areas
                .push(Rect::new(inner.x, inner.y + 1 + i as u16, inner.width, 1));
        }

        if app.history.items.is_empty() && !app.history.loading {
            frame.render_widget(
                Paragraph::new(Span::styled("No history yet.", theme.text_muted_style())),
                Rect::new(inner.x, inner.y + 1, inner.width, 1),
            );
        }

        if app.history.detail.is_some() {
            render_detail(frame, rect, app, &theme);
        }
    }

    fn hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        if app.history.detail.is_some() {
            return build_hint_spans(
                &app.theme,
                &[("↑/↓", " scroll  "), ("Esc", " close  ")],
            );
        }
        build_hint_spans(
            &app.theme,
            &[
                ("Enter", " open  "),
                ("n/p", " page  "),
                ("F5", " refresh  "),
            ],
        )
    }
}

fn render_detail(frame: &mut Frame, rect: Rect, app: &mut App, theme: &Theme) {
    let Some(detail) = &app.history.detail else { return };

    let width = rect.width.saturating_sub(6).max(20).min(rect.width);
    let height = rect.height.saturating_sub(2).max(5).min(rect.height);
    if width < 10 || height < 4 {
        return;
    }
    let area = Rect::new(
        rect.x + (rect.width - width) / 2,
        rect.y + (rect.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, area);
    let title = format!("Run #{}", detail.id);
    let container = block(theme, Some(&title), true);
    let inner = container.inner(area);
    frame.render_widget(container, area);
    if inner.width == 0 || inner.height == 0 {
        return;
    }

    let mut lines: Vec<Line> = Vec::new();
    if let Some(created) = &detail.created_at {
        lines.push(Line::from(vec![
            Span::styled("Created  ", theme.text_muted_style()),
            Span::styled(format_timestamp(created), theme.text_primary_style()),
        ]));
    }
    if let Some(filename) = &detail.filename {
        lines.push(Line::from(vec![
            Span::styled("File     ", theme.text_muted_style()),
            Span::styled(filename.clone(), theme.text_primary_style()),
        ]));
    }
    if let Some(prompt) = &detail.prompt {
        lines.push(Line::from(vec![
            Span::styled("Prompt   ", theme.text_muted_style()),
            Span::styled(prompt.clone(), theme.text_primary_style()),
        ]));
    }

    let sections = detail.result_sections();
    if sections.is_empty() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            "No stored results for this run.",
            theme.text_muted_style(),
        )));
    }
    for (name, result) in &sections {
        lines.push(Line::default());
        let mut header = vec![Span::styled(
            name.clone(),
            theme.text_secondary_style().add_modifier(Modifier::BOLD),
        )];
        if !result.provider.is_empty() {
            header.push(Span::styled(
                format!("  {}", result.provider),
                theme.text_muted_style(),
            ));
        }
        if let Some(elapsed) = result.elapsed_ms {
            header.push(Span::styled(
                format!("  {elapsed} ms"),
                theme.text_muted_style(),
            ));
        }
        header.push(if result.ok {
            Span::styled("  ok", theme.status_success())
        } else {
            Span::styled("  failed", theme.status_error())
        });
        lines.push(Line::from(header));

        let body = if result.ok {
            result.text.clone().unwrap_or_default()
        } else {
            result.error.clone().unwrap_or_else(|| "unknown error".into())
        };
        let style = if result.ok {
            theme.text_primary_style()
        } else {
            theme.status_error()
        };
        for wrapped in textwrap::wrap(&body, inner.width as usize) {
            lines.push(Line::from(Span::styled(wrapped.into_owned(), style)));
        }
    }

    frame.render_widget(
        Paragraph::new(lines).scroll((app.history.detail_scroll, 0)),
        inner,
    );
}

/// Shortens backend timestamps to minute precision; unparseable values pass
/// through untouched.
fn format_timestamp(raw: &str) -> String {
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use haixin_api::HaixinClient;
    use haixin_types::HistoryItem;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app_with_items(count: usize) -> App {
        let client = Arc::new(
            HaixinClient::with_base_url("http://localhost:8000").expect("client"),
        );
        let mut app = App::new(client, false, "/ai-model-compare/history-ui".into());
        app.history.items = (0..count)
            .map(|i| HistoryItem {
                id: i as i64 + 1,
                created_at: Some("2025-06-01 09:00:00".into()),
                filename: Some(format!("img{i}.png")),
                prompt: Some("describe".into()),
            })
            .collect();
        app
    }

    #[test]
    fn enter_fetches_detail_for_the_selected_row() {
        let mut app = app_with_items(3);
        app.history.cursor = 2;
        let mut component = HistoryComponent::default();
        let effects = component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Enter));
        assert_eq!(effects, vec![Effect::FetchHistoryDetail(3)]);
        assert!(app.history.loading);
    }

    #[test]
    fn next_page_only_offered_on_a_full_page() {
        let mut component = HistoryComponent::default();

        let mut short = app_with_items(5);
        let effects = component.handle_key_events(&mut short, KeyEvent::from(KeyCode::Char('n')));
        assert!(effects.is_empty());

        let mut full = app_with_items(20);
        let effects = component.handle_key_events(&mut full, KeyEvent::from(KeyCode::Char('n')));
        assert_eq!(effects, vec![Effect::FetchHistory]);
        assert_eq!(full.history.offset, 20);
    }

    #[test]
    fn previous_page_stops_at_the_start() {
        let mut app = app_with_items(20);
        let mut component = HistoryComponent::default();
        assert!(component
            .handle_key_events(&mut app, KeyEvent::from(KeyCode::Char('p')))
            .is_empty());

        app.history.offset = 40;
        let effects = component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Char('p')));
        assert_eq!(effects, vec![Effect::FetchHistory]);
        assert_eq!(app.history.offset, 20);
    }

    #[test]
    fn clicks_map_through_the_table_scroll_offset() {
        let mut app = app_with_items(30);
        app.history.cursor = 29;

        let mut component = HistoryComponent::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 12)).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                component.render(frame, area, &mut app);
            })
            .expect("draw");
        assert!(component.row_offset > 0, "table should have scrolled");

        let first = component.row_areas[0];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: first.x,
            row: first.y,
            modifiers: KeyModifiers::empty(),
        };
        assert!(component.handle_mouse_events(&mut app, click).is_empty());
        assert_eq!(app.history.cursor, component.row_offset);

        // A second click on the now-selected row opens that run, not the first.
        let effects = component.handle_mouse_events(&mut app, click);
        let expected = app.history.items[component.row_offset].id;
        assert_eq!(effects, vec![Effect::FetchHistoryDetail(expected)]);
    }

    #[test]
    fn timestamps_shorten_to_minute_precision() {
        assert_eq!(format_timestamp("2025-06-01 09:30:12"), "2025-06-01 09:30");
        assert_eq!(
            format_timestamp("2025-06-01T09:30:12.123456"),
            "2025-06-01 09:30"
        );
        assert_eq!(format_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn escape_closes_the_detail_popup() {
        let mut app = app_with_items(1);
        app.history.detail = Some(haixin_types::HistoryDetail {
            id: 1,
            created_at: None,
            filename: None,
            prompt: None,
            results_json: None,
            kimi_json: None,
            qwen_json: None,
            doubao_json: None,
        });
        let mut component = HistoryComponent::default();
        let _ = component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Esc));
        assert!(app.history.detail.is_none());
    }
}
