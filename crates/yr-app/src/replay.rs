//! Headless replay of recorded gestures
//!
//! Runs a scripted sequence of inputs against a navigator on a manual clock,
//! so navigation behaviour can be checked without opening a window.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use tracing::info;
use yr_core::{
    GestureEvent, GestureRouter, ManualClock, MediaId, NavigatorConfig, PageIndex, PageNavigator,
    Transition,
};

/// One scripted input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayAction {
    Gesture { event: GestureEvent },
    MediaLoaded { media: MediaId },
    Next,
    Previous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayStep {
    /// Milliseconds since the start of the replay
    pub at_ms: u64,
    pub action: ReplayAction,
}

/// What happened at a step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayRecord {
    pub at_ms: u64,
    /// Transition requested by the step, `None` for steps that request nothing
    pub outcome: Option<Transition>,
    pub page: PageIndex,
    pub locked: bool,
}

pub fn load_script(path: &Path) -> Result<Vec<ReplayStep>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading replay script {}", path.display()))?;
    let steps = serde_json::from_str(&text)
        .with_context(|| format!("parsing replay script {}", path.display()))?;
    Ok(steps)
}

/// Play `steps` in order. Steps timestamped before the previous one run at
/// the previous step's time.
pub fn run_replay(config: &NavigatorConfig, steps: &[ReplayStep]) -> Vec<ReplayRecord> {
    let clock = Arc::new(ManualClock::new());
    let navigator = PageNavigator::with_clock(config.clone(), clock.clone());
    let mut router = GestureRouter::new(config);
    let mut now_ms = 0u64;

    steps
        .iter()
        .map(|step| {
            if step.at_ms > now_ms {
                clock.advance(Duration::from_millis(step.at_ms - now_ms));
                now_ms = step.at_ms;
            }
            navigator.poll();

            let outcome = match &step.action {
                ReplayAction::Gesture { event } => router.dispatch(&navigator, *event),
                ReplayAction::MediaLoaded { media } => {
                    navigator.report_media_loaded(*media);
                    None
                }
                ReplayAction::Next => Some(navigator.next()),
                ReplayAction::Previous => Some(navigator.previous()),
            };

            let record = ReplayRecord {
                at_ms: now_ms,
                outcome,
                page: navigator.current_page(),
                locked: navigator.is_locked(),
            };
            info!(at_ms = record.at_ms, page = record.page, outcome = ?record.outcome, "replay step");
            record
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use yr_core::RejectReason;

    fn config(total_pages: usize) -> NavigatorConfig {
        NavigatorConfig {
            total_pages,
            exempt_media: vec![],
            ..Default::default()
        }
    }

    fn step(at_ms: u64, action: ReplayAction) -> ReplayStep {
        ReplayStep { at_ms, action }
    }

    #[test]
    fn test_replay_gate_lock_and_cooldown() {
        let steps = vec![
            step(0, ReplayAction::Next),
            step(10, ReplayAction::MediaLoaded { media: MediaId(1) }),
            step(20, ReplayAction::Next),
            step(30, ReplayAction::Next),
            step(1220, ReplayAction::Previous),
        ];
        let records = run_replay(&config(5), &steps);

        assert_eq!(records[0].outcome, Some(Transition::Rejected(RejectReason::MediaPending(MediaId(1)))));
        assert_eq!(records[1].outcome, None);
        assert_eq!(records[2].outcome, Some(Transition::Accepted { from: 0, to: 1 }));
        assert!(records[2].locked);
        assert_eq!(records[3].outcome, Some(Transition::Rejected(RejectReason::Locked)));
        assert_eq!(records[4].outcome, Some(Transition::Accepted { from: 1, to: 0 }));
    }

    #[test]
    fn test_replay_wheel_and_touch() {
        let steps = vec![
            step(0, ReplayAction::MediaLoaded { media: MediaId(1) }),
            step(0, ReplayAction::MediaLoaded { media: MediaId(2) }),
            step(0, ReplayAction::Gesture { event: GestureEvent::Wheel { delta_y: 20.0 } }),
            step(0, ReplayAction::Gesture { event: GestureEvent::Wheel { delta_y: 40.0 } }),
            step(1500, ReplayAction::Gesture { event: GestureEvent::TouchStart { y: 500.0 } }),
            step(1600, ReplayAction::Gesture { event: GestureEvent::TouchEnd { y: 380.0 } }),
        ];
        let records = run_replay(&config(5), &steps);

        assert_eq!(records[2].outcome, None);
        assert_eq!(records[3].outcome, Some(Transition::Accepted { from: 0, to: 1 }));
        assert_eq!(records[4].outcome, None);
        assert_eq!(records[5].outcome, Some(Transition::Accepted { from: 1, to: 2 }));
        assert_eq!(records[5].page, 2);
    }

    #[test]
    fn test_out_of_order_steps_do_not_rewind_clock() {
        let steps = vec![
            step(0, ReplayAction::MediaLoaded { media: MediaId(1) }),
            step(100, ReplayAction::Next),
            step(50, ReplayAction::Previous),
        ];
        let records = run_replay(&config(5), &steps);
        assert_eq!(records[2].at_ms, 100);
        assert_eq!(records[2].outcome, Some(Transition::Rejected(RejectReason::Locked)));
    }

    #[test]
    fn test_script_json_shape() {
        let script = r#"[
            { "at_ms": 0, "action": { "type": "media_loaded", "media": 1 } },
            { "at_ms": 5, "action": { "type": "gesture", "event": { "kind": "wheel", "delta_y": 40.0 } } },
            { "at_ms": 9, "action": { "type": "previous" } }
        ]"#;
        let steps: Vec<ReplayStep> = serde_json::from_str(script).unwrap();
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].action, ReplayAction::MediaLoaded { media: MediaId(1) });
        assert_eq!(
            steps[1].action,
            ReplayAction::Gesture { event: GestureEvent::Wheel { delta_y: 40.0 } }
        );
        assert_eq!(steps[2].action, ReplayAction::Previous);
    }
}
