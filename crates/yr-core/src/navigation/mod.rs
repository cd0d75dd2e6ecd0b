use serde::{Deserialize, Serialize};

mod engine;
mod position;
mod subscriber;

pub use engine::PageNavigator;
pub use position::{Direction, MediaId, PageIndex, MEDIA_ID_OFFSET};
pub use subscriber::NavigationSubscriber;

/// Why a transition request was ignored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    /// A previous transition is still inside its cooldown window
    Locked,
    /// The gating media for the current slide has not reported ready
    MediaPending(MediaId),
    /// The target page would fall outside the presentation
    OutOfBounds,
}

/// Result of a transition request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Transition {
    Accepted { from: PageIndex, to: PageIndex },
    Rejected(RejectReason),
}

impl Transition {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Transition::Accepted { .. })
    }

    /// Destination page of an accepted transition
    pub fn target(&self) -> Option<PageIndex> {
        match self {
            Transition::Accepted { to, .. } => Some(*to),
            Transition::Rejected(_) => None,
        }
    }
}

/// Context passed to subscribers after the page changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub page: PageIndex,
    pub total_pages: usize,
    /// Direction of the transition that produced this page, `None` for the initial page
    pub direction: Option<Direction>,
    /// Media to fetch eagerly so the next forward request is not gated
    pub preload_hint: Option<MediaId>,
}

impl PageContext {
    pub(crate) fn new(page: PageIndex, total_pages: usize, direction: Option<Direction>) -> Self {
        let preload_hint = if page + 1 < total_pages {
            Some(MediaId::for_page(page + 1))
        } else {
            None
        };
        Self {
            page,
            total_pages,
            direction,
            preload_hint,
        }
    }

    pub fn is_last(&self) -> bool {
        self.page + 1 >= self.total_pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preload_hint_uses_next_slide_media() {
        let context = PageContext::new(0, 26, None);
        assert_eq!(context.preload_hint, Some(MediaId(2)));

        let context = PageContext::new(24, 26, Some(Direction::Forward));
        assert_eq!(context.preload_hint, Some(MediaId(26)));
    }

    #[test]
    fn test_no_preload_hint_on_last_page() {
        let context = PageContext::new(25, 26, Some(Direction::Forward));
        assert!(context.is_last());
        assert_eq!(context.preload_hint, None);
    }

    #[test]
    fn test_transition_target() {
        assert_eq!(Transition::Accepted { from: 1, to: 2 }.target(), Some(2));
        assert!(!Transition::Rejected(RejectReason::Locked).is_accepted());
    }
}
