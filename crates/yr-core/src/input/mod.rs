//! Gesture adapters
//!
//! Each adapter turns one kind of raw input into an optional [`Direction`].
//! They hold no navigation state; only the touch adapter remembers where the
//! current touch started.

use crate::navigation::{Direction, PageNavigator, Transition};
use crate::state::NavigatorConfig;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Vertical wheel / trackpad scrolling
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelAdapter {
    threshold: f32,
}

impl WheelAdapter {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(config.wheel_threshold)
    }

    /// Positive `delta_y` scrolls down, i.e. forward. Deltas at or below the
    /// threshold are trackpad jitter and ignored.
    pub fn direction(&self, delta_y: f32) -> Option<Direction> {
        if delta_y.abs() > self.threshold {
            Direction::from_sign(delta_y)
        } else {
            None
        }
    }
}

/// Vertical swipes
#[derive(Debug, Clone, PartialEq)]
pub struct TouchAdapter {
    threshold: f32,
    start_y: Option<f32>,
}

impl TouchAdapter {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            start_y: None,
        }
    }

    pub fn from_config(config: &NavigatorConfig) -> Self {
        Self::new(config.touch_threshold)
    }

    pub fn touch_start(&mut self, y: f32) {
        self.start_y = Some(y);
    }

    /// Finish the gesture started by [`touch_start`](Self::touch_start).
    /// Swiping up (end above start) moves forward.
    pub fn touch_end(&mut self, y: f32) -> Option<Direction> {
        let start = self.start_y.take()?;
        let displacement = y - start;
        if displacement.abs() > self.threshold {
            Direction::from_sign(-displacement)
        } else {
            None
        }
    }

    /// Abandon the gesture in flight
    pub fn touch_cancel(&mut self) {
        self.start_y = None;
    }

    pub fn in_progress(&self) -> bool {
        self.start_y.is_some()
    }
}

/// Keys that page through the slides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NavKey {
    ArrowDown,
    ArrowUp,
    PageDown,
    PageUp,
    Space,
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyboardAdapter;

impl KeyboardAdapter {
    pub fn direction(&self, key: NavKey) -> Option<Direction> {
        match key {
            NavKey::ArrowDown | NavKey::PageDown | NavKey::Space => Some(Direction::Forward),
            NavKey::ArrowUp | NavKey::PageUp => Some(Direction::Backward),
            NavKey::Other => None,
        }
    }
}

/// A raw input event as delivered by a host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GestureEvent {
    Wheel { delta_y: f32 },
    TouchStart { y: f32 },
    TouchEnd { y: f32 },
    TouchCancel,
    Key { key: NavKey },
}

/// All adapters bundled for hosts that feed mixed input
#[derive(Debug, Clone)]
pub struct GestureRouter {
    wheel: WheelAdapter,
    touch: TouchAdapter,
    keyboard: KeyboardAdapter,
}

impl GestureRouter {
    pub fn new(config: &NavigatorConfig) -> Self {
        Self {
            wheel: WheelAdapter::from_config(config),
            touch: TouchAdapter::from_config(config),
            keyboard: KeyboardAdapter,
        }
    }

    /// Translate an event into a direction without touching the navigator
    pub fn translate(&mut self, event: GestureEvent) -> Option<Direction> {
        match event {
            GestureEvent::Wheel { delta_y } => self.wheel.direction(delta_y),
            GestureEvent::TouchStart { y } => {
                self.touch.touch_start(y);
                None
            }
            GestureEvent::TouchEnd { y } => self.touch.touch_end(y),
            GestureEvent::TouchCancel => {
                self.touch.touch_cancel();
                None
            }
            GestureEvent::Key { key } => self.keyboard.direction(key),
        }
    }

    /// Translate `event` and forward the result to `navigator`.
    /// Returns `None` when the event carried no page gesture.
    pub fn dispatch(&mut self, navigator: &PageNavigator, event: GestureEvent) -> Option<Transition> {
        let direction = self.translate(event);
        trace!(?event, ?direction, "gesture");
        direction.map(|direction| navigator.request_transition(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::navigation::MediaId;
    use std::sync::Arc;

    #[test]
    fn test_wheel_threshold() {
        let wheel = WheelAdapter::new(30.0);
        assert_eq!(wheel.direction(20.0), None);
        assert_eq!(wheel.direction(30.0), None);
        assert_eq!(wheel.direction(40.0), Some(Direction::Forward));
        assert_eq!(wheel.direction(-40.0), Some(Direction::Backward));
    }

    #[test]
    fn test_touch_swipe_up_moves_forward() {
        let mut touch = TouchAdapter::new(50.0);
        touch.touch_start(400.0);
        assert_eq!(touch.touch_end(300.0), Some(Direction::Forward));

        touch.touch_start(300.0);
        assert_eq!(touch.touch_end(400.0), Some(Direction::Backward));
    }

    #[test]
    fn test_touch_short_swipe_ignored() {
        let mut touch = TouchAdapter::new(50.0);
        touch.touch_start(400.0);
        assert_eq!(touch.touch_end(350.0), None);
        assert!(!touch.in_progress());
    }

    #[test]
    fn test_touch_end_without_start_ignored() {
        let mut touch = TouchAdapter::new(50.0);
        assert_eq!(touch.touch_end(0.0), None);

        touch.touch_start(500.0);
        touch.touch_cancel();
        assert_eq!(touch.touch_end(0.0), None);
    }

    #[test]
    fn test_keyboard_mapping() {
        let keys = KeyboardAdapter;
        assert_eq!(keys.direction(NavKey::ArrowDown), Some(Direction::Forward));
        assert_eq!(keys.direction(NavKey::Space), Some(Direction::Forward));
        assert_eq!(keys.direction(NavKey::PageUp), Some(Direction::Backward));
        assert_eq!(keys.direction(NavKey::Other), None);
    }

    #[test]
    fn test_router_dispatches_one_request_per_gesture() {
        let clock = Arc::new(ManualClock::new());
        let config = NavigatorConfig {
            total_pages: 5,
            exempt_media: vec![],
            ..Default::default()
        };
        let navigator = PageNavigator::with_clock(config.clone(), clock);
        navigator.report_media_loaded(MediaId(1));
        let mut router = GestureRouter::new(&config);

        assert_eq!(router.dispatch(&navigator, GestureEvent::Wheel { delta_y: 20.0 }), None);
        assert_eq!(navigator.current_page(), 0);

        let outcome = router.dispatch(&navigator, GestureEvent::Wheel { delta_y: 40.0 });
        assert_eq!(outcome, Some(Transition::Accepted { from: 0, to: 1 }));
        assert_eq!(navigator.current_page(), 1);
    }

    #[test]
    fn test_gesture_event_json_shape() {
        let event: GestureEvent = serde_json::from_str(r#"{"kind":"wheel","delta_y":42.0}"#).unwrap();
        assert_eq!(event, GestureEvent::Wheel { delta_y: 42.0 });

        let event: GestureEvent = serde_json::from_str(r#"{"kind":"key","key":"PageDown"}"#).unwrap();
        assert_eq!(event, GestureEvent::Key { key: NavKey::PageDown });
    }
}
