//! Dropdown visibility state machine and hit-test bookkeeping.
//!
//! Hover semantics: entering the brand shows the dropdown immediately;
//! leaving the brand arms a short hide timer so the pointer can travel into
//! the dropdown without it vanishing; entering the dropdown cancels the
//! pending hide; leaving the dropdown hides immediately. The timer is a plain
//! deadline checked on ticks, with the instant injected so tests control
//! time.

use std::time::{Duration, Instant};

use haixin_types::{Effect, MenuDocument};
use ratatui::layout::Rect;

use super::model::{NavModel, PageLink};
use super::resolver::{resolve_current, CurrentPage};

/// Grace period between leaving the brand and hiding the dropdown.
pub const HIDE_DELAY: Duration = Duration::from_millis(200);

/// Cancellable single-shot deadline.
#[derive(Debug, Clone, Default)]
pub struct HideTimer {
    deadline: Option<Instant>,
}

impl HideTimer {
    pub fn arm(&mut self, deadline: Instant) {
        self.deadline = Some(deadline);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Clears and reports an expired deadline. Arming again after a fire
    /// starts a fresh window; a cancelled timer never fires.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Dropdown visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dropdown {
    Hidden,
    Shown,
}

/// Full navigation state: the document, the resolved current page, the
/// prebuilt render model, dropdown visibility, and the areas recorded by the
/// last render for mouse hit-testing.
#[derive(Debug, Clone)]
pub struct NavState {
    doc: MenuDocument,
    current_path: String,
    current: Option<CurrentPage>,
    pub model: NavModel,
    dropdown: Dropdown,
    hide_timer: HideTimer,
    pointer_over_brand: bool,
    pointer_over_dropdown: bool,
    // Areas recorded during the last render
    pub brand_area: Rect,
    pub action_area: Rect,
    pub strip_areas: Vec<Rect>,
    pub dropdown_area: Rect,
    pub dropdown_links: Vec<(Rect, PageLink)>,
}

impl NavState {
    pub fn new(doc: MenuDocument, path: String) -> Self {
        let current = resolve_current(&doc, &path);
        let model = NavModel::build(&doc, current.as_ref());
        NavState {
            doc,
            current_path: path,
            current,
            model,
            dropdown: Dropdown::Hidden,
            hide_timer: HideTimer::default(),
            pointer_over_brand: false,
            pointer_over_dropdown: false,
            brand_area: Rect::default(),
            action_area: Rect::default(),
            strip_areas: Vec::new(),
            dropdown_area: Rect::default(),
            dropdown_links: Vec::new(),
        }
    }

    pub fn current(&self) -> Option<&CurrentPage> {
        self.current.as_ref()
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn is_shown(&self) -> bool {
        self.dropdown == Dropdown::Shown
    }

    pub fn hide_pending(&self) -> bool {
        self.hide_timer.is_pending()
    }

    /// Replaces the document (initial fetch result) and re-resolves.
    pub fn set_document(&mut self, doc: MenuDocument) {
        self.doc = doc;
        self.re_resolve();
    }

    /// Moves the location path within the current tool and re-resolves.
    pub fn navigate(&mut self, path: String) {
        self.current_path = path;
        self.re_resolve();
    }

    fn re_resolve(&mut self) {
        self.current = resolve_current(&self.doc, &self.current_path);
        self.model = NavModel::build(&self.doc, self.current.as_ref());
    }

    /// Applies a pointer move. `over_brand` and `over_dropdown` are the
    /// hit-test results against the last rendered areas; the dropdown area
    /// only counts while shown.
    pub fn pointer_moved(&mut self, over_brand: bool, over_dropdown: bool, now: Instant) {
        let was_brand = self.pointer_over_brand;
        let was_dropdown = self.pointer_over_dropdown;
        let over_dropdown = over_dropdown && self.dropdown == Dropdown::Shown;
        self.pointer_over_brand = over_brand;
        self.pointer_over_dropdown = over_dropdown;

        if was_dropdown && !over_dropdown && !over_brand {
            self.dropdown = Dropdown::Hidden;
            self.hide_timer.cancel();
            return;
        }
        if over_dropdown && !was_dropdown {
            self.hide_timer.cancel();
        }
        if over_brand && !was_brand {
            self.hide_timer.cancel();
            self.dropdown = Dropdown::Shown;
        }
        if !over_brand && was_brand && self.dropdown == Dropdown::Shown && !over_dropdown {
            self.hide_timer.arm(now + HIDE_DELAY);
        }
    }

    /// Drives the hide timer. Returns whether visibility changed. An expired
    /// deadline only hides when the pointer is not over the dropdown.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.hide_timer.fire(now)
            && !self.pointer_over_dropdown
            && self.dropdown == Dropdown::Shown
        {
            self.dropdown = Dropdown::Hidden;
            return true;
        }
        false
    }

    pub fn hide_dropdown(&mut self) {
        self.hide_timer.cancel();
        self.pointer_over_dropdown = false;
        self.dropdown = Dropdown::Hidden;
    }

    /// Routes a link activation. Links into another tool leave the client
    /// untouched and open externally; everything else navigates in place.
    pub fn link_action(&self, link: &PageLink) -> Effect {
        match &self.current {
            Some(current) if current.tool_id != link.tool_id => {
                Effect::OpenExternal(link.path.clone())
            }
            _ => Effect::NavigateSameTool(link.path.clone()),
        }
    }
}
