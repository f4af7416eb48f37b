//! Shared navigation bar component.
//!
//! Renders the tool-suite navigation from the menu document fetched at
//! startup: a brand block that reveals a dropdown of every registered tool,
//! a strip of the current tool's pages, and the developer-guide action link.
//!
//! The component splits into three pieces so the logic stays testable
//! without a terminal:
//! - [`resolver`]: pure resolution of the current `(tool, page)` from the
//!   location path
//! - [`model`]: pure construction of the typed render model
//! - [`state`]: dropdown visibility state machine with its cancellable hide
//!   timer, plus the hit-test areas recorded during rendering
//!
//! Link routing matches the suite convention: pages of the current tool
//! navigate in place, pages of another tool open in the system browser.

mod model;
mod nav_bar_component;
mod resolver;
mod state;

pub use model::{ActionLink, BrandNode, DropdownRow, NavModel, OwnerSegment, PageLink};
pub use nav_bar_component::{NavBarComponent, NAV_BAR_HEIGHT};
pub use resolver::{resolve_current, CurrentPage};
pub use state::{HideTimer, NavState, HIDE_DELAY};
