//! Models view: the registered model configurations, plus registration,
//! toggling, and deletion when running in manager mode.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use haixin_types::{Effect, NewModel};
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Cell, Clear, Paragraph, Row, Table, TableState},
    Frame,
};

use crate::app::{App, ModelForm};
use crate::ui::components::component::{find_target_index_by_mouse_position, Component};
use crate::ui::theme::{
    block, build_hint_spans, table_header_style, table_row_style, table_selected_style, Theme,
};

const FORM_FIELDS: usize = 6;

#[derive(Debug, Default)]
pub struct ModelsComponent {
    table_area: Rect,
    row_areas: Vec<Rect>,
    /// Scroll offset of the last render; hit indices are relative to it.
    row_offset: usize,
}

impl Component for ModelsComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        if app.models.form.is_some() {
            return handle_form_key(app, key);
        }

        match key.code {
            KeyCode::Up => {
                app.models.cursor = app.models.cursor.saturating_sub(1);
                app.models.pending_delete = None;
                app.mark_dirty();
            }
            KeyCode::Down => {
                if app.models.cursor + 1 < app.models.entries.len() {
                    app.models.cursor += 1;
                    app.models.pending_delete = None;
                    app.mark_dirty();
                }
            }
            KeyCode::F(5) => {
                app.models.loading = true;
                app.mark_dirty();
                return vec![Effect::FetchModels];
            }
            KeyCode::Char('a') => {
                if require_manager(app) {
                    app.models.form = Some(ModelForm::default());
                    app.mark_dirty();
                }
            }
            KeyCode::Char('t') => {
                if require_manager(app) {
                    if let Some(entry) = app.models.selected() {
                        let id = entry.id;
                        app.mark_dirty();
                        return vec![Effect::ToggleModel(id)];
                    }
                }
            }
            KeyCode::Char('d') => {
                if require_manager(app) {
                    if let Some(entry) = app.models.selected() {
                        let id = entry.id;
                        let label = entry.display_label().to_string();
                        if app.models.pending_delete == Some(id) {
                            app.models.pending_delete = None;
                            app.mark_dirty();
                            return vec![Effect::DeleteModel(id)];
                        }
                        app.models.pending_delete = Some(id);
                        app.status_info(format!("Press d again to delete '{label}'"));
                    }
                }
            }
            KeyCode::Esc => {
                if app.models.pending_delete.take().is_some() {
                    app.mark_dirty();
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        if app.models.form.is_some() {
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
                    let entry = self.row_offset + index;
                    if entry < app.models.entries.len() {
                        app.models.cursor = entry;
                        app.models.pending_delete = None;
                        app.mark_dirty();
                    }
                }
            }
            MouseEventKind::ScrollUp => {
                app.models.cursor = app.models.cursor.saturating_sub(1);
                app.mark_dirty();
            }
            MouseEventKind::ScrollDown => {
                if app.models.cursor + 1 < app.models.entries.len() {
                    app.models.cursor += 1;
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

        let title = if app.models.loading {
            "Models (loading...)".to_string()
        } else {
            format!("Models ({})", app.models.entries.len())
        };
        let container = block(&theme, Some(&title), true);
        let inner = container.inner(rect);
        frame.render_widget(container, rect);
        self.table_area = inner;

        let header = Row::new(["ID", "Label", "Provider", "Model", "Base URL", "On"])
            .style(table_header_style(&theme));
        let rows: Vec<Row> = app
            .models
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let enabled = if entry.is_enabled() { "✓" } else { "✗" };
                let enabled_style = if entry.is_enabled() {
                    theme.status_success()
                } else {
                    theme.status_error()
                };
                Row::new(vec![
                    Cell::from(entry.id.to_string()),
                    Cell::from(entry.display_label().to_string()),
                    Cell::from(entry.provider.clone()),
                    Cell::from(entry.model.clone()),
                    Cell::from(entry.base_url.clone()),
                    Cell::from(Span::styled(enabled, enabled_style)),
                ])
                .style(table_row_style(&theme, i))
            })
            .collect();

        let widths = [
            Constraint::Length(4),
            Constraint::Min(12),
            Constraint::Length(8),
            Constraint::Min(12),
            Constraint::Min(18),
            Constraint::Length(3),
        ];
        let mut state = TableState::default();
        if !app.models.entries.is_empty() {
            state.select(Some(app.models.cursor.min(app.models.entries.len() - 1)));
        }
        let table = Table::new(rows, widths)
            .header(header)
            .row_highlight_style(table_selected_style(&theme));
        frame.render_stateful_widget(table, inner, &mut state);

        // Row hit areas: the header occupies the first inner line and the
        // table may have scrolled, so areas map to entries[offset..].
        self.row_offset = state.offset();
        let visible = app
            .models
            .entries
            .len()
            .saturating_sub(self.row_offset)
            .min(inner.height.saturating_sub(1) as usize);
        for i in 0..visible {
            self.row_areas
                .push(Rect::new(inner.x, inner.y + 1 + i as u16, inner.width, 1));
        }

        if app.models.entries.is_empty() && !app.models.loading {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    "No models registered.",
                    theme.text_muted_style(),
                )),
                Rect::new(inner.x, inner.y + 1, inner.width, 1),
            );
        }

        if app.models.form.is_some() {
            render_form(frame, rect, app, &theme);
        }
    }

    fn hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        if app.models.form.is_some() {
            return build_hint_spans(
                &app.theme,
                &[
                    ("Tab", " field  "),
                    ("Space", " cycle/toggle  "),
                    ("Enter", " save  "),
                    ("Esc", " cancel  "),
                ],
            );
        }
        let mut hints: Vec<(&str, &str)> = vec![("↑/↓", " select  "), ("F5", " refresh  ")];
        if app.ctx.manager_mode {
            hints.push(("a", " add  "));
            hints.push(("t", " toggle  "));
            hints.push(("d", " delete  "));
        }
        build_hint_spans(&app.theme, &hints)
    }
}

fn require_manager(app: &mut App) -> bool {
    if app.ctx.manager_mode {
        true
    } else {
        app.status_error("Restart with --manager to modify models");
        false
    }
}

fn handle_form_key(app: &mut App, key: KeyEvent) -> Vec<Effect> {
    match key.code {
        KeyCode::Esc => {
            app.models.form = None;
            app.mark_dirty();
            return Vec::new();
        }
        KeyCode::Enter => return submit_form(app),
        KeyCode::Tab => {
            if let Some(form) = app.models.form.as_mut() {
                form.focus = (form.focus + 1) % FORM_FIELDS;
                app.mark_dirty();
            }
            return Vec::new();
        }
        KeyCode::BackTab => {
            if let Some(form) = app.models.form.as_mut() {
                form.focus = (form.focus + FORM_FIELDS - 1) % FORM_FIELDS;
                app.mark_dirty();
            }
            return Vec::new();
        }
        _ => {}
    }

    if let Some(form) = app.models.form.as_mut() {
        let handled = match form.focus {
            0 => match key.code {
                KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                    form.cycle_provider();
                    true
                }
                _ => false,
            },
            1 => form.label.handle_key(key),
            2 => form.base_url.handle_key(key),
            3 => form.api_key.handle_key(key),
            4 => form.model.handle_key(key),
            5 => match key.code {
                KeyCode::Char(' ') => {
                    form.enabled = !form.enabled;
                    true
                }
                _ => false,
            },
            _ => false,
        };
        if handled {
            app.mark_dirty();
        }
    }
    Vec::new()
}

fn submit_form(app: &mut App) -> Vec<Effect> {
    let Some(form) = &app.models.form else {
        return Vec::new();
    };
    let new_model = NewModel {
        provider: form.provider().to_string(),
        label: form.label.input().trim().to_string(),
        base_url: form.base_url.input().trim().to_string(),
        api_key: form.api_key.input().trim().to_string(),
        model: form.model.input().trim().to_string(),
        enabled: form.enabled,
    };
    if new_model.base_url.is_empty() || new_model.api_key.is_empty() || new_model.model.is_empty()
    {
        app.status_error("Base URL, API key and model are required");
        return Vec::new();
    }
    if let Err(err) = new_model.validate() {
        app.status_error(err.to_string());
        return Vec::new();
    }
    app.models.form = None;
    app.mark_dirty();
    vec![Effect::CreateModel(new_model)]
}

fn render_form(frame: &mut Frame, rect: Rect, app: &mut App, theme: &Theme) {
    let Some(form) = &app.models.form else { return };

    let width = rect.width.saturating_sub(8).clamp(30, 64);
    let height = 10u16;
    if rect.width < width || rect.height < height {
        return;
    }
    let area = Rect::new(
        rect.x + (rect.width - width) / 2,
        rect.y + (rect.height - height) / 2,
        width,
        height,
    );
    frame.render_widget(Clear, area);
    let container = block(theme, Some("Register model"), true);
    let inner = container.inner(area);
    frame.render_widget(container, area);

    let field_line = |index: usize, name: &str, value: String| -> Line<'static> {
        let focused = form.focus == index;
        let marker = if focused { "› " } else { "  " };
        let name_style = if focused {
            theme.accent_style().add_modifier(Modifier::BOLD)
        } else {
            theme.text_secondary_style()
        };
        Line::from(vec![
            Span::styled(marker.to_string(), theme.accent_style()),
            Span::styled(format!("{name:<9}"), name_style),
            Span::styled(value, theme.text_primary_style()),
        ])
    };

    let lines = vec![
        field_line(0, "Provider", form.provider().to_string()),
        field_line(1, "Label", form.label.display_text()),
        field_line(2, "Base URL", form.base_url.display_text()),
        field_line(3, "API key", form.api_key.display_text()),
        field_line(4, "Model", form.model.display_text()),
        field_line(5, "Enabled", if form.enabled { "yes".into() } else { "no".into() }),
    ];
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use haixin_api::HaixinClient;
    use haixin_types::ModelEntry;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app(manager: bool) -> App {
        let client = Arc::new(
            HaixinClient::with_base_url("http://localhost:8000").expect("client"),
        );
        let mut app = App::new(client, manager, "/ai-model-compare/models-ui".into());
        app.models.entries = vec![ModelEntry {
            id: 9,
            created_at: None,
            provider: "doubao".into(),
            label: "D1".into(),
            base_url: "https://ark.example.com".into(),
            model: "vision-pro".into(),
            enabled: 1,
        }];
        app
    }

    #[test]
    fn mutations_require_manager_mode() {
        let mut app = app(false);
        let mut component = ModelsComponent::default();
        let effects = component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Char('t')));
        assert!(effects.is_empty());
        assert!(app.status.visible().is_some());
        assert!(app.models.form.is_none());
    }

    #[test]
    fn delete_requires_confirming_second_press() {
        let mut app = app(true);
        let mut component = ModelsComponent::default();
        let d = KeyEvent::from(KeyCode::Char('d'));

        assert!(component.handle_key_events(&mut app, d).is_empty());
        assert_eq!(app.models.pending_delete, Some(9));

        let effects = component.handle_key_events(&mut app, d);
        assert_eq!(effects, vec![Effect::DeleteModel(9)]);
        assert!(app.models.pending_delete.is_none());
    }

    #[test]
    fn moving_the_cursor_cancels_a_pending_delete() {
        let mut app = app(true);
        let mut component = ModelsComponent::default();
        let _ = component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Char('d')));
        let _ = component.handle_key_events(&mut app, KeyEvent::from(KeyCode::Up));
        assert!(app.models.pending_delete.is_none());
    }

    #[test]
    fn clicks_map_through_the_table_scroll_offset() {
        let mut app = app(true);
        app.models.entries = (0..30)
            .map(|i| ModelEntry {
                id: i + 1,
                created_at: None,
                provider: "kimi".into(),
                label: format!("M{i}"),
                base_url: "https://api.example.com".into(),
                model: "vision".into(),
                enabled: 1,
            })
            .collect();
        app.models.cursor = 29;

        let mut component = ModelsComponent::default();
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
        let _ = component.handle_mouse_events(&mut app, click);
        assert_eq!(app.models.cursor, component.row_offset);
    }

    #[test]
    fn form_submit_validates_required_fields() {
        let mut app = app(true);
        app.models.form = Some(ModelForm::default());
        assert!(submit_form(&mut app).is_empty());
        assert!(app.models.form.is_some(), "form stays open on validation error");

        if let Some(form) = app.models.form.as_mut() {
            form.base_url.set_input("https://api.moonshot.cn/v1");
            form.api_key.set_input("sk-test");
            form.model.set_input("moonshot-v1-8k");
        }
        let effects = submit_form(&mut app);
        assert_eq!(effects.len(), 1);
        assert!(matches!(
            &effects[0],
            Effect::CreateModel(m) if m.provider == "kimi" && m.enabled
        ));
        assert!(app.models.form.is_none());
    }
}
