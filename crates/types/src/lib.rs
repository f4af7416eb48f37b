//! Shared type definitions for the Haixin toolkit client.
//!
//! This crate owns the wire types exchanged with the Haixin backend (the menu
//! document served by `/menus`, model rows from `/models`, history rows from
//! `/history`, and `/compare` outcomes) together with the `Msg`/`Effect`/
//! `Route` plumbing shared by the TUI and the CLI.

mod menu;
mod records;

pub use menu::{sanitize_text, Brand, MenuDocument, Owner, Page, Tool, API_PREFIX};
pub use records::{
    parse_loose_json, CompareOutcome, HistoryDetail, HistoryItem, ItemList, ModelEntry,
    ModelResult, NewModel, ProviderError, ALLOWED_PROVIDERS,
};

/// Top-level views of the client, one per page of the `ai-model-compare`
/// tool. Routing between them is driven by the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Compare,
    Models,
    History,
}

impl Route {
    /// The page key this route corresponds to in the menu document.
    pub fn page_key(self) -> &'static str {
        match self {
            Route::Compare => "compare",
            Route::Models => "models",
            Route::History => "history",
        }
    }

    /// Maps a resolved page key back to a route, if the page has a local view.
    pub fn for_page_key(key: &str) -> Option<Route> {
        match key {
            "compare" => Some(Route::Compare),
            "models" => Some(Route::Models),
            "history" => Some(Route::History),
            _ => None,
        }
    }
}

/// Messages that update the application state.
///
/// Covers system events (ticks, resizes) and completed background fetches.
/// Fetch results carry their error as a rendered string so the message stays
/// `Clone` and the UI can surface it on the status line.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Periodic UI tick (throbbers, pending hide timer, status expiry)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// Menu document arrived (or the embedded fallback after a failed fetch)
    MenusLoaded(MenuDocument),
    /// `/models` list fetch completed
    ModelsLoaded(Result<Vec<ModelEntry>, String>),
    /// `/history` list fetch completed
    HistoryLoaded(Result<Vec<HistoryItem>, String>),
    /// `/history/{id}` detail fetch completed
    HistoryDetailLoaded(Result<HistoryDetail, String>),
    /// `/compare` run completed
    CompareCompleted(Result<CompareOutcome, String>),
    /// A model create/toggle/delete round trip completed; the Ok value is a
    /// status-line message
    ModelMutated(Result<String, String>),
}

/// Side effects produced by state changes.
///
/// Navigation effects are handled synchronously by the runtime; fetch effects
/// become spawned background tasks that resolve to a [`Msg`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Change the active view
    SwitchTo(Route),
    /// Navigate within the current tool: update the location path and
    /// re-resolve the current page
    NavigateSameTool(String),
    /// Open a link in the system browser (new browsing context)
    OpenExternal(String),
    /// Fetch the `/models` list
    FetchModels,
    /// Fetch the `/history` list
    FetchHistory,
    /// Fetch one history record's detail
    FetchHistoryDetail(i64),
    /// Run a multi-model comparison
    RunCompare {
        image_path: String,
        prompt: String,
        model_ids: Vec<i64>,
    },
    /// Register a new model configuration
    CreateModel(NewModel),
    /// Flip a model's enabled flag
    ToggleModel(i64),
    /// Delete a model configuration
    DeleteModel(i64),
    /// Exit the application
    Quit,
}
