//! Navigation subscriber trait

use super::PageContext;

/// Trait for components that need to respond to page changes
///
/// Subscribers are held weakly by the navigator: dropping the last `Arc`
/// to a subscriber unregisters it.
pub trait NavigationSubscriber: Send + Sync {
    /// Called after an accepted transition has moved the current page
    fn on_page_change(&self, context: &PageContext);
}
