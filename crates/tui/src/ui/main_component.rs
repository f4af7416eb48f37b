//! Top-level layout and event dispatch.
//!
//! Owns the navigation bar and the three views, splits the frame into
//! nav / content / status rows, and routes events to whichever view the
//! current route selects. The nav bar renders last so its dropdown overlays
//! the content.

use crossterm::event::{KeyCode, KeyEvent, MouseEvent};
use haixin_types::{Effect, Route};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, StatusKind};
use crate::ui::components::compare::CompareComponent;
use crate::ui::components::component::Component;
use crate::ui::components::history::HistoryComponent;
use crate::ui::components::models::ModelsComponent;
use crate::ui::components::nav_bar::{DropdownRow, NavBarComponent, NAV_BAR_HEIGHT};
use crate::ui::theme::{build_hint_spans, panel_style};

#[derive(Default)]
pub struct MainComponent {
    nav_bar: NavBarComponent,
    compare: CompareComponent,
    models: ModelsComponent,
    history: HistoryComponent,
}

impl MainComponent {
    pub fn new() -> Self {
        Self::default()
    }

    fn active_view(&mut self, route: Route) -> &mut dyn Component {
        match route {
            Route::Compare => &mut self.compare,
            Route::Models => &mut self.models,
            Route::History => &mut self.history,
        }
    }

    /// The path to navigate to for a function-key route shortcut: the current
    /// tool's strip when it has the page, any tool's page otherwise.
    fn shortcut_path(app: &App, route: Route) -> Option<String> {
        let key = route.page_key();
        if let Some(link) = app.nav.model.strip.iter().find(|l| l.page_key == key) {
            return Some(link.path.clone());
        }
        app.nav.model.dropdown.iter().find_map(|row| match row {
            DropdownRow::Link(link) if link.page_key == key => Some(link.path.clone()),
            _ => None,
        })
    }
}

impl Component for MainComponent {
    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let shortcut = match key.code {
            KeyCode::F(1) => Some(Route::Compare),
            KeyCode::F(2) => Some(Route::Models),
            KeyCode::F(3) => Some(Route::History),
            _ => None,
        };
        if let Some(route) = shortcut {
            if let Some(path) = Self::shortcut_path(app, route) {
                return vec![Effect::NavigateSameTool(path)];
            }
            return vec![Effect::SwitchTo(route)];
        }
        if key.code == KeyCode::Esc && app.nav.is_shown() {
            app.nav.hide_dropdown();
            app.mark_dirty();
            return Vec::new();
        }
        let route = app.route;
        self.active_view(route).handle_key_events(app, key)
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let dropdown_was_shown = app.nav.is_shown();
        let effects = self.nav_bar.handle_mouse_events(app, mouse);
        if !effects.is_empty() {
            return effects;
        }
        // While the dropdown is up it owns clicks; views still get hovers.
        if dropdown_was_shown || app.nav.is_shown() {
            if matches!(mouse.kind, crossterm::event::MouseEventKind::Down(_)) {
                return Vec::new();
            }
        }
        let route = app.route;
        self.active_view(route).handle_mouse_events(app, mouse)
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let areas = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(NAV_BAR_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(rect);

        let route = app.route;
        self.active_view(route).render(frame, areas[1], app);
        self.render_status_bar(frame, areas[2], app);
        // Last, so the dropdown overlay wins the content area.
        self.nav_bar.render(frame, areas[0], app);
    }
}

impl MainComponent {
    fn render_status_bar(&mut self, frame: &mut Frame, rect: Rect, app: &mut App) {
        if rect.width == 0 || rect.height == 0 {
            return;
        }
        let theme = app.theme.clone();
        frame.render_widget(
            ratatui::widgets::Block::default().style(panel_style(&theme)),
            rect,
        );

        if let Some((message, kind)) = app.status.visible() {
            let style = match kind {
                StatusKind::Info => theme.text_secondary_style(),
                StatusKind::Success => theme.status_success(),
                StatusKind::Error => theme.status_error(),
            };
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" {message}"), style)),
                rect,
            );
            return;
        }

        let route = app.route;
        let mut spans = build_hint_spans(
            &theme,
            &[("F1/F2/F3", " view  "), ("Ctrl+C", " quit  ")],
        );
        spans.extend(self.active_view(route).hint_spans(app));
        frame.render_widget(Paragraph::new(Line::from(spans)), rect);
    }
}
