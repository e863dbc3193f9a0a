//! Top-level screens and the bottom navigation that switches between them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum View {
    #[default]
    Home,
    Search,
    Favorites,
    Settings,
    /// Upload / analyzing / results for one statement session
    StatementAnalysis,
}

/// Entries of the bottom navigation bar, left to right.
pub const NAV_ITEMS: [View; 4] = [View::Home, View::Search, View::Favorites, View::Settings];

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Home => "Home",
            View::Search => "Search",
            View::Favorites => "Favorites",
            View::Settings => "Settings",
            View::StatementAnalysis => "Statement Analysis",
        }
    }

    /// Position in the bottom bar, if the view has a tab.
    pub fn nav_index(&self) -> Option<usize> {
        NAV_ITEMS.iter().position(|v| v == self)
    }
}

/// Holds the current view. The presentation layer only ever calls
/// [`Navigator::set_current_view`].
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    current: View,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> View {
        self.current
    }

    pub fn set_current_view(&mut self, view: View) {
        if view != self.current {
            tracing::debug!(from = ?self.current, to = ?view, "navigate");
        }
        self.current = view;
    }

    /// Next bottom-bar tab (wraps). From a view without a tab, goes Home.
    pub fn next_tab(&mut self) {
        let next = match self.current.nav_index() {
            Some(i) => NAV_ITEMS[(i + 1) % NAV_ITEMS.len()],
            None => View::Home,
        };
        self.set_current_view(next);
    }
}
