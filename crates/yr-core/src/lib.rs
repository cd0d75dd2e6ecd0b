//! Core functionality for the year-in-review slideshow
//!
//! This crate owns the page navigation state machine and the small pieces of
//! logic around it: gesture adapters, the intro progress and the animated
//! statistic counters.

pub mod clock;
pub mod events;
pub mod input;
pub mod loading;
pub mod navigation;
pub mod state;
pub mod ticker;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::EventBus;
pub use input::{GestureEvent, GestureRouter, KeyboardAdapter, NavKey, TouchAdapter, WheelAdapter};
pub use loading::LoadingProgress;
pub use navigation::{
    Direction, MediaId, NavigationSubscriber, PageContext, PageIndex, PageNavigator,
    RejectReason, Transition,
};
pub use state::{AppSettings, LoadingConfig, NavigatorConfig, TickerConfig};
pub use ticker::NumberTicker;
