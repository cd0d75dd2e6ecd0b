//! Page navigation engine

use super::{
    Direction, MediaId, NavigationSubscriber, PageContext, PageIndex, RejectReason, Transition,
};
use crate::clock::{Clock, SystemClock};
use crate::events::events::{CooldownElapsed, MediaLoaded, PageChanged, TransitionRejected};
use crate::events::EventBus;
use crate::state::NavigatorConfig;
use ahash::AHashSet;
use parking_lot::RwLock;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tracing::{debug, info, trace};

/// Navigation state stored internally
#[derive(Debug, Clone)]
struct NavigatorState {
    page: PageIndex,
    /// Deadline of the running cooldown, `None` while idle
    cooldown_until: Option<Instant>,
    loaded: AHashSet<MediaId>,
}

impl NavigatorState {
    /// Clear an expired cooldown, returning the page it was held on
    fn release_expired(&mut self, now: Instant) -> Option<PageIndex> {
        match self.cooldown_until {
            Some(deadline) if now >= deadline => {
                self.cooldown_until = None;
                Some(self.page)
            }
            _ => None,
        }
    }
}

/// Turns direction requests into a single page index
///
/// Requests are accepted only when no cooldown is running, the current
/// slide's gating media is ready (or exempt) and the target stays inside the
/// presentation. Every other request is ignored and reported as
/// [`Transition::Rejected`]; nothing here returns an error.
///
/// The cooldown is a fixed timer started on acceptance. It approximates the
/// renderer's settle time and is not tied to when the slide animation ends.
pub struct PageNavigator {
    config: NavigatorConfig,
    exempt: AHashSet<MediaId>,
    state: Arc<RwLock<NavigatorState>>,
    subscribers: Arc<RwLock<Vec<Weak<dyn NavigationSubscriber>>>>,
    clock: Arc<dyn Clock>,
    events: Option<Arc<EventBus>>,
}

impl PageNavigator {
    /// Create a navigator on the wall clock
    pub fn new(config: NavigatorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a navigator reading time from `clock`
    pub fn with_clock(mut config: NavigatorConfig, clock: Arc<dyn Clock>) -> Self {
        config.total_pages = config.total_pages.max(1);
        let exempt = config.exempt_media.iter().copied().collect();

        let state = NavigatorState {
            page: 0,
            cooldown_until: None,
            loaded: AHashSet::new(),
        };

        Self {
            config,
            exempt,
            state: Arc::new(RwLock::new(state)),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            clock,
            events: None,
        }
    }

    /// Publish navigation events on `bus`
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &NavigatorConfig {
        &self.config
    }

    pub fn total_pages(&self) -> usize {
        self.config.total_pages
    }

    pub fn current_page(&self) -> PageIndex {
        self.state.read().page
    }

    /// Whether a cooldown is still running
    pub fn is_locked(&self) -> bool {
        let now = self.clock.now();
        matches!(self.state.read().cooldown_until, Some(deadline) if now < deadline)
    }

    /// Whether `media` has reported ready
    pub fn is_loaded(&self, media: MediaId) -> bool {
        self.state.read().loaded.contains(&media)
    }

    /// Snapshot of every media id reported ready so far
    pub fn loaded_media(&self) -> Vec<MediaId> {
        let mut loaded: Vec<_> = self.state.read().loaded.iter().copied().collect();
        loaded.sort();
        loaded
    }

    /// Whether a forward request from the current page would pass the media gate
    pub fn forward_gate_open(&self) -> bool {
        let state = self.state.read();
        self.gate_open(&state)
    }

    /// Context describing the current page
    pub fn context(&self) -> PageContext {
        PageContext::new(self.current_page(), self.config.total_pages, None)
    }

    /// Request a move by one page
    pub fn request_transition(&self, direction: Direction) -> Transition {
        let now = self.clock.now();
        let mut state = self.state.write();

        let released = state.release_expired(now);

        let verdict = if state.cooldown_until.is_some() {
            Err(RejectReason::Locked)
        } else if direction == Direction::Forward && !self.gate_open(&state) {
            Err(RejectReason::MediaPending(MediaId::for_page(state.page)))
        } else {
            direction
                .apply(state.page, self.config.total_pages)
                .ok_or(RejectReason::OutOfBounds)
        };

        let outcome = match verdict {
            Ok(next) => {
                let from = state.page;
                state.page = next;
                state.cooldown_until = Some(now + self.config.cooldown());
                Transition::Accepted { from, to: next }
            }
            Err(reason) => Transition::Rejected(reason),
        };
        let page = state.page;
        drop(state);

        if let Some(held) = released {
            self.publish(CooldownElapsed { page: held });
        }

        match outcome {
            Transition::Accepted { from, to } => {
                info!(from, to, ?direction, "page changed");
                self.publish(PageChanged { from, to, direction });
                self.notify_subscribers(PageContext::new(to, self.config.total_pages, Some(direction)));
            }
            Transition::Rejected(reason) => {
                debug!(page, ?direction, ?reason, "transition ignored");
                self.publish(TransitionRejected { page, direction, reason });
            }
        }

        outcome
    }

    /// Advance one page
    pub fn next(&self) -> Transition {
        self.request_transition(Direction::Forward)
    }

    /// Go back one page
    pub fn previous(&self) -> Transition {
        self.request_transition(Direction::Backward)
    }

    /// Record that `media` is ready. Repeated reports are no-ops.
    pub fn report_media_loaded(&self, media: MediaId) {
        let inserted = self.state.write().loaded.insert(media);
        if inserted {
            trace!(%media, "media ready");
            self.publish(MediaLoaded { media });
        }
    }

    /// Release the cooldown once its deadline has passed
    ///
    /// Hosts call this from their frame or timer loop. Returns `true` when a
    /// cooldown was released by this call.
    pub fn poll(&self) -> bool {
        let now = self.clock.now();
        let released = self.state.write().release_expired(now);
        match released {
            Some(page) => {
                trace!(page, "cooldown elapsed");
                self.publish(CooldownElapsed { page });
                true
            }
            None => false,
        }
    }

    /// Add a subscriber. It stays registered until its last `Arc` is dropped.
    pub fn add_subscriber(&self, subscriber: Arc<dyn NavigationSubscriber>) {
        let mut subscribers = self.subscribers.write();
        subscribers.push(Arc::downgrade(&subscriber));
    }

    /// Detach every subscriber
    pub fn clear_subscribers(&self) {
        self.subscribers.write().clear();
    }

    /// Number of subscribers that are still alive
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .read()
            .iter()
            .filter(|weak| weak.strong_count() > 0)
            .count()
    }

    fn gate_open(&self, state: &NavigatorState) -> bool {
        let gate = MediaId::for_page(state.page);
        self.exempt.contains(&gate) || state.loaded.contains(&gate)
    }

    fn publish<E: crate::events::Event>(&self, event: E) {
        if let Some(bus) = &self.events {
            bus.publish(event);
        }
    }

    /// Notify all subscribers of a page change
    fn notify_subscribers(&self, context: PageContext) {
        let live: Vec<Arc<dyn NavigationSubscriber>> = {
            let mut subscribers = self.subscribers.write();

            // Remove any dead weak references
            subscribers.retain(|weak| weak.strong_count() > 0);
            subscribers.iter().filter_map(Weak::upgrade).collect()
        };

        for subscriber in live {
            subscriber.on_page_change(&context);
        }
    }
}
