use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::Mutex;

/// Slideshow-wide event bus
///
/// Handlers run synchronously inside `publish` while the handler table is
/// locked, so a handler must not publish on the same bus.
pub struct EventBus {
    handlers: Arc<Mutex<AHashMap<std::any::TypeId, Vec<Box<dyn EventHandler>>>>>,
}

/// Event trait that all events must implement
pub trait Event: Send + Sync + 'static {
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Handler trait for event handlers
pub trait EventHandler: Send + Sync {
    fn handle(&mut self, event: &dyn Event);
}

/// Navigation events
pub mod events {
    use super::Event;
    use crate::navigation::{Direction, MediaId, PageIndex, RejectReason};

    /// An accepted transition moved the current page
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PageChanged {
        pub from: PageIndex,
        pub to: PageIndex,
        pub direction: Direction,
    }

    /// A transition request was ignored
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct TransitionRejected {
        pub page: PageIndex,
        pub direction: Direction,
        pub reason: RejectReason,
    }

    /// Media reported ready for the first time
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct MediaLoaded {
        pub media: MediaId,
    }

    /// The cooldown of the last accepted transition ran out
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct CooldownElapsed {
        pub page: PageIndex,
    }

    // Implement Event trait for all event types
    macro_rules! impl_event {
        ($($t:ty),*) => {
            $(
                impl Event for $t {
                    fn as_any(&self) -> &dyn std::any::Any {
                        self
                    }
                }
            )*
        }
    }

    impl_event!(
        PageChanged,
        TransitionRejected,
        MediaLoaded,
        CooldownElapsed
    );
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            handlers: Arc::new(Mutex::new(AHashMap::new())),
        }
    }

    /// Subscribe to events of a specific type
    pub fn subscribe<E: Event>(&self, handler: Box<dyn EventHandler>) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();
        handlers.entry(type_id).or_insert_with(Vec::new).push(handler);
    }

    /// Drop every handler registered for `E`
    pub fn unsubscribe_all<E: Event>(&self) {
        self.handlers.lock().remove(&std::any::TypeId::of::<E>());
    }

    /// Publish an event
    pub fn publish<E: Event>(&self, event: E) {
        let type_id = std::any::TypeId::of::<E>();
        let mut handlers = self.handlers.lock();

        if let Some(event_handlers) = handlers.get_mut(&type_id) {
            for handler in event_handlers.iter_mut() {
                handler.handle(&event);
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper struct for creating event handlers from closures
pub struct ClosureEventHandler<F> {
    handler: F,
}

impl<F> EventHandler for ClosureEventHandler<F>
where
    F: FnMut(&dyn Event) + Send + Sync,
{
    fn handle(&mut self, event: &dyn Event) {
        (self.handler)(event);
    }
}

/// Create an event handler from a closure
pub fn handler_from_fn<F>(f: F) -> Box<dyn EventHandler>
where
    F: FnMut(&dyn Event) + Send + Sync + 'static,
{
    Box::new(ClosureEventHandler { handler: f })
}

/// Create a handler that only sees events of type `E`
pub fn typed_handler<E, F>(mut f: F) -> Box<dyn EventHandler>
where
    E: Event,
    F: FnMut(&E) + Send + Sync + 'static,
{
    handler_from_fn(move |event| {
        if let Some(event) = event.as_any().downcast_ref::<E>() {
            f(event);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::events::{MediaLoaded, PageChanged};
    use super::*;
    use crate::navigation::{Direction, MediaId};

    #[test]
    fn test_publish_reaches_typed_handlers_only() {
        let bus = EventBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        bus.subscribe::<PageChanged>(typed_handler(move |event: &PageChanged| {
            sink.lock().push(event.to);
        }));

        bus.publish(PageChanged { from: 0, to: 1, direction: Direction::Forward });
        bus.publish(MediaLoaded { media: MediaId(3) });

        assert_eq!(*seen.lock(), vec![1]);
    }

    #[test]
    fn test_unsubscribe_all() {
        let bus = EventBus::new();
        let count = Arc::new(Mutex::new(0));

        let sink = count.clone();
        bus.subscribe::<MediaLoaded>(typed_handler(move |_: &MediaLoaded| {
            *sink.lock() += 1;
        }));
        bus.publish(MediaLoaded { media: MediaId(1) });
        bus.unsubscribe_all::<MediaLoaded>();
        bus.publish(MediaLoaded { media: MediaId(2) });

        assert_eq!(*count.lock(), 1);
    }
}
