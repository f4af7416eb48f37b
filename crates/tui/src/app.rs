//! Central application state and the message/effect update loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use haixin_api::HaixinClient;
use haixin_types::{
    CompareOutcome, Effect, HistoryDetail, HistoryItem, MenuDocument, ModelEntry, Msg, Route,
    ALLOWED_PROVIDERS,
};

use crate::ui::components::common::TextInputState;
use crate::ui::components::nav_bar::NavState;
use crate::ui::theme::Theme;

/// How long a status-line message stays up before expiring.
pub const STATUS_TTL: Duration = Duration::from_secs(3);

/// Braille throbber frames cycled while a background task runs.
pub const THROBBER_FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠇"];

/// Shared handles the views need but never own.
pub struct SharedCtx {
    pub client: Arc<HaixinClient>,
    /// Mutating model operations are only offered in manager mode.
    pub manager_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One-line transient status with a fixed time to live.
#[derive(Debug, Clone)]
pub struct StatusLine {
    message: String,
    kind: StatusKind,
    expires_at: Option<Instant>,
}

impl Default for StatusLine {
    fn default() -> Self {
        StatusLine {
            message: String::new(),
            kind: StatusKind::Info,
            expires_at: None,
        }
    }
}

impl StatusLine {
    pub fn set(&mut self, kind: StatusKind, message: impl Into<String>, now: Instant) {
        self.message = message.into();
        self.kind = kind;
        self.expires_at = Some(now + STATUS_TTL);
    }

    pub fn visible(&self) -> Option<(&str, StatusKind)> {
        self.expires_at.map(|_| (self.message.as_str(), self.kind))
    }

    /// Expires the message; returns whether anything changed.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.expires_at {
            Some(deadline) if now >= deadline => {
                self.expires_at = None;
                self.message.clear();
                true
            }
            _ => false,
        }
    }
}

/// Which input the compare view routes keys to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFocus {
    ImagePath,
    Prompt,
    ModelList,
}

/// State of the compare view: the two inputs, the enabled-model picker, and
/// the last outcome.
pub struct CompareState {
    pub focus: CompareFocus,
    pub image_path: TextInputState,
    pub prompt: TextInputState,
    /// Enabled models offered for selection, refreshed with `/models`.
    pub models: Vec<ModelEntry>,
    pub selected_ids: Vec<i64>,
    pub cursor: usize,
    pub running: bool,
    pub outcome: Option<CompareOutcome>,
    pub result_scroll: u16,
}

impl Default for CompareState {
    fn default() -> Self {
        CompareState {
            focus: CompareFocus::ImagePath,
            image_path: TextInputState::new(),
            prompt: TextInputState::new(),
            models: Vec::new(),
            selected_ids: Vec::new(),
            cursor: 0,
            running: false,
            outcome: None,
            result_scroll: 0,
        }
    }
}

impl CompareState {
    pub fn toggle_selected(&mut self, id: i64) {
        if let Some(pos) = self.selected_ids.iter().position(|&x| x == id) {
            self.selected_ids.remove(pos);
        } else {
            self.selected_ids.push(id);
        }
    }

    fn sync_models(&mut self, entries: &[ModelEntry]) {
        self.models = entries.iter().filter(|m| m.is_enabled()).cloned().collect();
        self.selected_ids
            .retain(|id| self.models.iter().any(|m| m.id == *id));
        if self.cursor >= self.models.len() {
            self.cursor = self.models.len().saturating_sub(1);
        }
    }
}

/// Registration form for a new model configuration.
pub struct ModelForm {
    pub provider_index: usize,
    pub label: TextInputState,
    pub base_url: TextInputState,
    pub api_key: TextInputState,
    pub model: TextInputState,
    pub enabled: bool,
    /// 0 provider, 1 label, 2 base_url, 3 api_key, 4 model, 5 enabled
    pub focus: usize,
}

impl Default for ModelForm {
    fn default() -> Self {
        ModelForm {
            provider_index: 0,
            label: TextInputState::new(),
            base_url: TextInputState::new(),
            api_key: TextInputState::masked(),
            model: TextInputState::new(),
            enabled: true,
            focus: 0,
        }
    }
}

impl ModelForm {
    pub fn provider(&self) -> &'static str {
        ALLOWED_PROVIDERS[self.provider_index % ALLOWED_PROVIDERS.len()]
    }

    pub fn cycle_provider(&mut self) {
        self.provider_index = (self.provider_index + 1) % ALLOWED_PROVIDERS.len();
    }
}

/// State of the models view.
#[derive(Default)]
pub struct ModelsState {
    pub entries: Vec<ModelEntry>,
    pub loading: bool,
    pub cursor: usize,
    pub form: Option<ModelForm>,
    /// A delete request waiting for its confirming second keypress.
    pub pending_delete: Option<i64>,
}

impl ModelsState {
    pub fn selected(&self) -> Option<&ModelEntry> {
        self.entries.get(self.cursor)
    }
}

/// State of the history view.
pub struct HistoryState {
    pub items: Vec<HistoryItem>,
    pub loading: bool,
    pub cursor: usize,
    pub limit: usize,
    pub offset: usize,
    pub detail: Option<HistoryDetail>,
    pub detail_scroll: u16,
}

impl Default for HistoryState {
    fn default() -> Self {
        HistoryState {
            items: Vec::new(),
            loading: false,
            cursor: 0,
            limit: 20,
            offset: 0,
            detail: None,
            detail_scroll: 0,
        }
    }
}

/// The whole application model. Components mutate it through `update` and
/// their event handlers; the runtime drives rendering off the dirty flag.
pub struct App {
    pub ctx: SharedCtx,
    pub theme: Theme,
    pub route: Route,
    pub nav: NavState,
    pub compare: CompareState,
    pub models: ModelsState,
    pub history: HistoryState,
    pub status: StatusLine,
    pub throbber_index: usize,
    pub should_quit: bool,
    pub dirty: bool,
}

impl App {
    /// Starts on the embedded fallback document; the real one arrives via
    /// [`Msg::MenusLoaded`] once the startup fetch resolves.
    pub fn new(client: Arc<HaixinClient>, manager_mode: bool, initial_path: String) -> Self {
        let nav = NavState::new(MenuDocument::fallback(), initial_path);
        let route = nav
            .current()
            .and_then(|c| Route::for_page_key(&c.page_key))
            .unwrap_or(Route::Compare);
        App {
            ctx: SharedCtx {
                client,
                manager_mode,
            },
            theme: Theme::default(),
            route,
            nav,
            compare: CompareState::default(),
            models: ModelsState::default(),
            history: HistoryState::default(),
            status: StatusLine::default(),
            throbber_index: 0,
            should_quit: false,
            dirty: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Whether some background work is in flight (drives fast ticking).
    pub fn is_busy(&self) -> bool {
        self.compare.running || self.models.loading || self.history.loading
    }

    pub fn status_info(&mut self, message: impl Into<String>) {
        self.status.set(StatusKind::Info, message, Instant::now());
        self.dirty = true;
    }

    pub fn status_success(&mut self, message: impl Into<String>) {
        self.status.set(StatusKind::Success, message, Instant::now());
        self.dirty = true;
    }

    pub fn status_error(&mut self, message: impl Into<String>) {
        self.status.set(StatusKind::Error, message, Instant::now());
        self.dirty = true;
    }

    /// Changes the active view, kicking off the fetch the view depends on.
    pub fn switch_to(&mut self, route: Route) -> Vec<Effect> {
        self.route = route;
        self.dirty = true;
        match route {
            Route::Compare => {
                self.models.loading = true;
                vec![Effect::FetchModels]
            }
            Route::Models => {
                self.models.loading = true;
                vec![Effect::FetchModels]
            }
            Route::History => {
                self.history.loading = true;
                vec![Effect::FetchHistory]
            }
        }
    }

    /// Moves the location path within the suite and re-resolves the current
    /// page; paths that resolve to a local page also switch the view.
    pub fn apply_navigation(&mut self, path: String) -> Vec<Effect> {
        self.nav.navigate(path);
        self.dirty = true;
        if let Some(route) = self
            .nav
            .current()
            .and_then(|c| Route::for_page_key(&c.page_key))
        {
            if route != self.route {
                return self.switch_to(route);
            }
        }
        Vec::new()
    }

    /// Applies a message, returning follow-up effects.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                let now = Instant::now();
                if self.is_busy() {
                    self.throbber_index = (self.throbber_index + 1) % THROBBER_FRAMES.len();
                    self.dirty = true;
                }
                if self.nav.tick(now) {
                    self.dirty = true;
                }
                if self.status.tick(now) {
                    self.dirty = true;
                }
                Vec::new()
            }
            Msg::Resize(_, _) => {
                self.dirty = true;
                Vec::new()
            }
            Msg::MenusLoaded(doc) => {
                self.nav.set_document(doc);
                self.dirty = true;
                Vec::new()
            }
            Msg::ModelsLoaded(result) => {
                self.models.loading = false;
                self.dirty = true;
                match result {
                    Ok(entries) => {
                        self.compare.sync_models(&entries);
                        if self.models.cursor >= entries.len() {
                            self.models.cursor = entries.len().saturating_sub(1);
                        }
                        self.models.entries = entries;
                    }
                    Err(err) => self.status_error(err),
                }
                Vec::new()
            }
            Msg::HistoryLoaded(result) => {
                self.history.loading = false;
                self.dirty = true;
                match result {
                    Ok(items) => {
                        if self.history.cursor >= items.len() {
                            self.history.cursor = items.len().saturating_sub(1);
                        }
                        self.history.items = items;
                    }
                    Err(err) => self.status_error(err),
                }
                Vec::new()
            }
            Msg::HistoryDetailLoaded(result) => {
                self.history.loading = false;
                self.dirty = true;
                match result {
                    Ok(detail) => {
                        self.history.detail_scroll = 0;
                        self.history.detail = Some(detail);
                    }
                    Err(err) => self.status_error(err),
                }
                Vec::new()
            }
            Msg::CompareCompleted(result) => {
                self.compare.running = false;
                self.dirty = true;
                match result {
                    Ok(outcome) => {
                        let succeeded = outcome.results.values().filter(|r| r.ok).count();
                        let total = outcome.results.len();
                        self.compare.result_scroll = 0;
                        self.compare.outcome = Some(outcome);
                        self.status_success(format!("Compare finished: {succeeded}/{total} ok"));
                    }
                    Err(err) => self.status_error(err),
                }
                Vec::new()
            }
            Msg::ModelMutated(result) => {
                self.dirty = true;
                match result {
                    Ok(message) => {
                        self.status_success(message);
                        self.models.loading = true;
                        vec![Effect::FetchModels]
                    }
                    Err(err) => {
                        self.status_error(err);
                        Vec::new()
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haixin_types::ModelResult;
    use indexmap::IndexMap;

    fn test_app() -> App {
        let client = Arc::new(
            HaixinClient::with_base_url("http://localhost:8000").expect("client"),
        );
        App::new(client, false, "/ai-model-compare/ui".into())
    }

    fn entry(id: i64, enabled: i64) -> ModelEntry {
        ModelEntry {
            id,
            created_at: None,
            provider: "kimi".into(),
            label: format!("m{id}"),
            base_url: "https://api.example.com".into(),
            model: "vision-1".into(),
            enabled,
        }
    }

    #[test]
    fn starts_on_route_resolved_from_initial_path() {
        let client = Arc::new(
            HaixinClient::with_base_url("http://localhost:8000").expect("client"),
        );
        let app = App::new(client, false, "/ai-model-compare/history-ui".into());
        assert_eq!(app.route, Route::History);
    }

    #[test]
    fn navigation_to_local_page_switches_route_and_fetches() {
        let mut app = test_app();
        let effects = app.apply_navigation("/ai-model-compare/models-ui".into());
        assert_eq!(app.route, Route::Models);
        assert_eq!(effects, vec![Effect::FetchModels]);
    }

    #[test]
    fn models_load_refreshes_compare_picker_with_enabled_only() {
        let mut app = test_app();
        app.compare.selected_ids = vec![1, 2];
        let _ = app.update(Msg::ModelsLoaded(Ok(vec![entry(1, 1), entry(2, 0)])));
        assert_eq!(app.models.entries.len(), 2);
        assert_eq!(app.compare.models.len(), 1);
        // Selections pointing at disabled models are dropped.
        assert_eq!(app.compare.selected_ids, vec![1]);
    }

    #[test]
    fn successful_mutation_sets_status_and_refetches() {
        let mut app = test_app();
        let effects = app.update(Msg::ModelMutated(Ok("Model added".into())));
        assert_eq!(effects, vec![Effect::FetchModels]);
        assert_eq!(
            app.status.visible(),
            Some(("Model added", StatusKind::Success))
        );
    }

    #[test]
    fn status_expires_after_ttl() {
        let mut app = test_app();
        let now = Instant::now();
        app.status.set(StatusKind::Info, "hello", now);
        assert!(app.status.visible().is_some());
        assert!(!app.status.tick(now + Duration::from_secs(1)));
        assert!(app.status.tick(now + STATUS_TTL));
        assert!(app.status.visible().is_none());
    }

    #[test]
    fn compare_completion_summarizes_outcome() {
        let mut app = test_app();
        app.compare.running = true;
        let mut results = IndexMap::new();
        results.insert(
            "1".to_string(),
            ModelResult {
                ok: true,
                text: Some("fine".into()),
                ..ModelResult::default()
            },
        );
        results.insert("2".to_string(), ModelResult::default());
        let _ = app.update(Msg::CompareCompleted(Ok(CompareOutcome {
            id: Some(7),
            results,
        })));
        assert!(!app.compare.running);
        assert_eq!(
            app.status.visible(),
            Some(("Compare finished: 1/2 ok", StatusKind::Success))
        );
    }
}
