//! Compare view: pick an image, a prompt, and a set of enabled models, then
//! run them side by side.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use haixin_types::{Effect, ModelResult};
use ratatui::{
    layout::{Constraint, Direction, Layout, Position, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::{App, CompareFocus, THROBBER_FRAMES};
use crate::ui::components::component::{find_target_index_by_mouse_position, Component};
use crate::ui::theme::{block, build_hint_spans, Theme};

#[derive(Debug, Default)]
pub struct CompareComponent {
    list_area: Rect,
    model_areas: Vec<Rect>,
    /// Scroll offset of the last render; hit indices are relative to it.
    model_offset: usize,
    results_area: Rect,
}

impl Component for CompareComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        match key.code {
            KeyCode::Tab => {
                app.compare.focus = match app.compare.focus {
                    CompareFocus::ImagePath => CompareFocus::Prompt,
                    CompareFocus::Prompt => CompareFocus::ModelList,
                    CompareFocus::ModelList => CompareFocus::ImagePath,
                };
                app.mark_dirty();
                return Vec::new();
            }
            KeyCode::BackTab => {
                app.compare.focus = match app.compare.focus {
                    CompareFocus::ImagePath => CompareFocus::ModelList,
                    CompareFocus::Prompt => CompareFocus::ImagePath,
                    CompareFocus::ModelList => CompareFocus::Prompt,
                };
                app.mark_dirty();
                return Vec::new();
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return run_compare(app);
            }
            KeyCode::F(5) => {
                app.models.loading = true;
                app.mark_dirty();
                return vec![Effect::FetchModels];
            }
            KeyCode::PageDown => {
                app.compare.result_scroll = app.compare.result_scroll.saturating_add(4);
                app.mark_dirty();
                return Vec::new();
            }
            KeyCode::PageUp => {
                app.compare.result_scroll = app.compare.result_scroll.saturating_sub(4);
                app.mark_dirty();
                return Vec::new();
            }
            _ => {}
        }

        match app.compare.focus {
            CompareFocus::ImagePath => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && app.compare.image_path.handle_key(key)
                {
                    app.mark_dirty();
                }
            }
            CompareFocus::Prompt => {
                if !key.modifiers.contains(KeyModifiers::CONTROL)
                    && app.compare.prompt.handle_key(key)
                {
                    app.mark_dirty();
                }
            }
            CompareFocus::ModelList => match key.code {
                KeyCode::Up => {
                    app.compare.cursor = app.compare.cursor.saturating_sub(1);
                    app.mark_dirty();
                }
                KeyCode::Down => {
                    if app.compare.cursor + 1 < app.compare.models.len() {
                        app.compare.cursor += 1;
                        app.mark_dirty();
                    }
                }
                KeyCode::Char(' ') => {
                    if let Some(model) = app.compare.models.get(app.compare.cursor) {
                        let id = model.id;
                        app.compare.toggle_selected(id);
                        app.mark_dirty();
                    }
                }
                _ => {}
            },
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let pos = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(index) = find_target_index_by_mouse_position(
                    &self.list_area,
                    &self.model_areas,
                    mouse.column,
                    mouse.row,
                ) {
                    let row = self.model_offset + index;
                    if let Some(model) = app.compare.models.get(row) {
                        let id = model.id;
                        app.compare.focus = CompareFocus::ModelList;
                        app.compare.cursor = row;
                        app.compare.toggle_selected(id);
                        app.mark_dirty();
                    }
                }
                Vec::new()
            }
            MouseEventKind::ScrollDown if self.results_area.contains(pos) => {
                app.compare.result_scroll = app.compare.result_scroll.saturating_add(2);
                app.mark_dirty();
                Vec::new()
            }
            MouseEventKind::ScrollUp if self.results_area.contains(pos) => {
                app.compare.result_scroll = app.compare.result_scroll.saturating_sub(2);
                app.mark_dirty();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        self.model_areas.clear();
        self.list_area = Rect::default();
        self.model_offset = 0;
        self.results_area = Rect::default();
        if rect.width == 0 || rect.height == 0 {
            return;
        }

        let theme = app.theme.clone();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(0),
            ])
            .split(rect);

        render_input(
            frame,
            rows[0],
            &theme,
            "Image file",
            &app.compare.image_path.display_text(),
            app.compare.focus == CompareFocus::ImagePath,
        );
        render_input(
            frame,
            rows[1],
            &theme,
            "Prompt",
            &app.compare.prompt.display_text(),
            app.compare.focus == CompareFocus::Prompt,
        );

        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(34), Constraint::Percentage(66)])
            .split(rows[2]);

        self.render_model_picker(frame, panes[0], app, &theme);
        self.render_results(frame, panes[1], app, &theme);
    }

    fn hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        build_hint_spans(
            &app.theme,
            &[
                ("Tab", " field  "),
                ("Space", " select model  "),
                ("Ctrl+R", " run  "),
                ("F5", " refresh models  "),
            ],
        )
    }
}

impl CompareComponent {
    fn render_model_picker(&mut self, frame: &mut Frame, rect: Rect, app: &mut App, theme: &Theme) {
        let focused = app.compare.focus == CompareFocus::ModelList;
        let title = format!("Models ({} selected)", app.compare.selected_ids.len());
        let container = block(theme, Some(&title), focused);
        let inner = container.inner(rect);
        frame.render_widget(container, rect);
        self.list_area = inner;

        let items: Vec<ListItem> = app
            .compare
            .models
            .iter()
            .map(|model| {
                let checked = app.compare.selected_ids.contains(&model.id);
                let marker = if checked { "[x]" } else { "[ ]" };
                let line = Line::from(vec![
                    Span::styled(
                        format!("{marker} "),
                        if checked {
                            theme.accent_style()
                        } else {
                            theme.text_muted_style()
                        },
                    ),
                    Span::styled(model.display_label().to_string(), theme.text_primary_style()),
                    Span::styled(format!("  {}", model.provider), theme.text_muted_style()),
                ]);
                ListItem::new(line)
            })
            .collect();

        let mut state = ListState::default();
        if !app.compare.models.is_empty() {
            state.select(Some(app.compare.cursor.min(app.compare.models.len() - 1)));
        }
        let list = List::new(items).highlight_style(if focused {
            theme.selection_style().add_modifier(Modifier::BOLD)
        } else {
            theme.text_secondary_style()
        });
        frame.render_stateful_widget(list, inner, &mut state);

        // The list may have scrolled, so hit areas map to models[offset..].
        self.model_offset = state.offset();
        let visible = app
            .compare
            .models
            .len()
            .saturating_sub(self.model_offset)
            .min(inner.height as usize);
        for i in 0..visible {
            self.model_areas
                .push(Rect::new(inner.x, inner.y + i as u16, inner.width, 1));
        }

        if app.compare.models.is_empty() && inner.height > 0 {
            let hint = if app.models.loading {
                "Loading models..."
            } else {
                "No enabled models. Register one on the Models page."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, theme.text_muted_style())),
                inner,
            );
        }
    }

    fn render_results(&mut self, frame: &mut Frame, rect: Rect, app: &mut App, theme: &Theme) {
        let title = if app.compare.running {
            format!(
                "Results {}",
                THROBBER_FRAMES[app.throbber_index % THROBBER_FRAMES.len()]
            )
        } else {
            "Results".to_string()
        };
        let container = block(theme, Some(&title), false);
        let inner = container.inner(rect);
        frame.render_widget(container, rect);
        self.results_area = inner;
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let Some(outcome) = &app.compare.outcome else {
            let hint = if app.compare.running {
                "Running comparison..."
            } else {
                "Results appear here after a run."
            };
            frame.render_widget(
                Paragraph::new(Span::styled(hint, theme.text_muted_style())),
                inner,
            );
            return;
        };

        let mut lines: Vec<Line> = Vec::new();
        for (model_id, result) in &outcome.results {
            if !lines.is_empty() {
                lines.push(Line::default());
            }
            lines.extend(result_lines(model_id, result, theme, inner.width as usize));
        }
        frame.render_widget(
            Paragraph::new(lines).scroll((app.compare.result_scroll, 0)),
            inner,
        );
    }
}

fn render_input(
    frame: &mut Frame,
    rect: Rect,
    theme: &Theme,
    title: &str,
    content: &str,
    focused: bool,
) {
    let container = block(theme, Some(title), focused);
    let inner = container.inner(rect);
    frame.render_widget(container, rect);
    let style = if focused {
        theme.text_primary_style()
    } else {
        theme.text_secondary_style()
    };
    frame.render_widget(Paragraph::new(Span::styled(content.to_string(), style)), inner);
}

/// Formats one model's outcome: a header line plus the wrapped answer or the
/// error message.
fn result_lines(
    model_id: &str,
    result: &ModelResult,
    theme: &Theme,
    width: usize,
) -> Vec<Line<'static>> {
    let name = if result.label.is_empty() {
        format!("model {model_id}")
    } else {
        result.label.clone()
    };
    let mut header = vec![
        Span::styled(
            name,
            theme.text_secondary_style().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {}", result.provider), theme.text_muted_style()),
    ];
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

    let mut lines = vec![Line::from(header)];
    let body_width = width.max(8);
    if result.ok {
        let text = result.text.clone().unwrap_or_default();
        for wrapped in textwrap::wrap(&text, body_width) {
            lines.push(Line::from(Span::styled(
                wrapped.into_owned(),
                theme.text_primary_style(),
            )));
        }
    } else {
        let error = result
            .error
            .clone()
            .unwrap_or_else(|| "unknown error".into());
        for wrapped in textwrap::wrap(&error, body_width) {
            lines.push(Line::from(Span::styled(
                wrapped.into_owned(),
                theme.status_error(),
            )));
        }
    }
    lines
}

/// Validates the inputs and kicks off a run.
fn run_compare(app: &mut App) -> Vec<Effect> {
    if app.compare.running {
        return Vec::new();
    }
    let image_path = app.compare.image_path.input().trim().to_string();
    let prompt = app.compare.prompt.input().trim().to_string();
    if image_path.is_empty() {
        app.status_error("Enter an image file path first");
        return Vec::new();
    }
    if prompt.is_empty() {
        app.status_error("Enter a prompt first");
        return Vec::new();
    }
    if app.compare.selected_ids.is_empty() {
        app.status_error("Select at least one model");
        return Vec::new();
    }
    app.compare.running = true;
    app.mark_dirty();
    vec![Effect::RunCompare {
        image_path,
        prompt,
        model_ids: app.compare.selected_ids.clone(),
    }]
}

#[cfg(test)]
mod tests {
    use super::*;
    use haixin_api::HaixinClient;
    use haixin_types::ModelEntry;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app_with_models() -> App {
        let client = Arc::new(
            HaixinClient::with_base_url("http://localhost:8000").expect("client"),
        );
        let mut app = App::new(client, false, "/ai-model-compare/ui".into());
        app.compare.models = vec![ModelEntry {
            id: 4,
            created_at: None,
            provider: "kimi".into(),
            label: "K1".into(),
            base_url: "https://api.example.com".into(),
            model: "vision".into(),
            enabled: 1,
        }];
        app
    }

    #[test]
    fn run_requires_image_prompt_and_selection() {
        let mut app = app_with_models();
        assert!(run_compare(&mut app).is_empty());

        app.compare.image_path.set_input("/tmp/cat.png");
        assert!(run_compare(&mut app).is_empty());

        app.compare.prompt.set_input("describe the image");
        assert!(run_compare(&mut app).is_empty());

        app.compare.selected_ids.push(4);
        let effects = run_compare(&mut app);
        assert_eq!(
            effects,
            vec![Effect::RunCompare {
                image_path: "/tmp/cat.png".into(),
                prompt: "describe the image".into(),
                model_ids: vec![4],
            }]
        );
        assert!(app.compare.running);
    }

    #[test]
    fn run_is_ignored_while_already_running() {
        let mut app = app_with_models();
        app.compare.image_path.set_input("/tmp/cat.png");
        app.compare.prompt.set_input("describe");
        app.compare.selected_ids.push(4);
        app.compare.running = true;
        assert!(run_compare(&mut app).is_empty());
    }

    #[test]
    fn clicks_map_through_the_list_scroll_offset() {
        let mut app = app_with_models();
        app.compare.models = (0..20)
            .map(|i| ModelEntry {
                id: i + 1,
                created_at: None,
                provider: "kimi".into(),
                label: format!("K{i}"),
                base_url: "https://api.example.com".into(),
                model: "vision".into(),
                enabled: 1,
            })
            .collect();
        app.compare.cursor = 19;

        let mut component = CompareComponent::default();
        let mut terminal = Terminal::new(TestBackend::new(60, 14)).expect("terminal");
        terminal
            .draw(|frame| {
                let area = frame.area();
                component.render(frame, area, &mut app);
            })
            .expect("draw");
        assert!(component.model_offset > 0, "list should have scrolled");

        let first = component.model_areas[0];
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: first.x,
            row: first.y,
            modifiers: KeyModifiers::empty(),
        };
        let _ = component.handle_mouse_events(&mut app, click);
        assert_eq!(app.compare.cursor, component.model_offset);
        let expected = app.compare.models[component.model_offset].id;
        assert_eq!(app.compare.selected_ids, vec![expected]);
    }

    #[test]
    fn space_toggles_selection_under_cursor() {
        let mut app = app_with_models();
        app.compare.focus = CompareFocus::ModelList;
        let mut component = CompareComponent::default();
        let space = KeyEvent::from(KeyCode::Char(' '));
        let _ = component.handle_key_events(&mut app, space);
        assert_eq!(app.compare.selected_ids, vec![4]);
        let _ = component.handle_key_events(&mut app, space);
        assert!(app.compare.selected_ids.is_empty());
    }
}
