//! Component system for the Haixin TUI application.
//!
//! Components are self-contained UI elements that handle their own events and
//! rendering while integrating with the main application through a consistent
//! interface. State lives on [`App`]; components hold only render-local data.

use crossterm::event::{KeyEvent, MouseEvent};
use haixin_types::Effect;
use ratatui::layout::Rect;
use ratatui::text::Span;
use ratatui::Frame;

use crate::app::App;

/// A trait representing a UI component with its own behavior.
///
/// Components handle localized events, update state on [`App`], and render
/// themselves into a provided `Rect`, reporting side effects back to the
/// runtime via `Effect`s.
pub(crate) trait Component {
    /// Handle key events when this component is active.
    #[allow(dead_code)]
    fn handle_key_events(&mut self, _app: &mut App, _key: KeyEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Handle mouse events. Components decide relevance by hit-testing the
    /// areas they recorded during their last render pass.
    #[allow(dead_code)]
    fn handle_mouse_events(&mut self, _app: &mut App, _mouse: MouseEvent) -> Vec<Effect> {
        Vec::new()
    }

    /// Render the component into the given area.
    ///
    /// Implementations must tolerate a zero-sized area by rendering nothing.
    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &mut App);

    /// Key hints shown in the bottom bar while this component is active.
    fn hint_spans(&self, _app: &App) -> Vec<Span<'static>> {
        Vec::new()
    }
}

/// Finds the index of the rect in `areas` containing the mouse position, if
/// the position is inside `container` at all.
pub(crate) fn find_target_index_by_mouse_position(
    container: &Rect,
    areas: &[Rect],
    x: u16,
    y: u16,
) -> Option<usize> {
    let position = ratatui::layout::Position::new(x, y);
    if !container.contains(position) {
        return None;
    }
    areas.iter().position(|area| area.contains(position))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_test_respects_container_bounds() {
        let container = Rect::new(0, 0, 10, 10);
        let areas = vec![Rect::new(0, 0, 10, 1), Rect::new(0, 1, 10, 1)];
        assert_eq!(find_target_index_by_mouse_position(&container, &areas, 2, 1), Some(1));
        assert_eq!(find_target_index_by_mouse_position(&container, &areas, 2, 5), None);
        assert_eq!(find_target_index_by_mouse_position(&container, &areas, 50, 1), None);
    }
}
