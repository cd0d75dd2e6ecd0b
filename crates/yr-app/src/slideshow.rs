//! Desktop host: renders the current slide and feeds input to the navigator

use std::sync::Arc;
use std::time::Duration;

use eframe::egui::{self, Context, Ui};
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use yr_core::events::events::{MediaLoaded, PageChanged, TransitionRejected};
use yr_core::events::typed_handler;
use yr_core::{
    AppSettings, Direction, EventBus, GestureEvent, GestureRouter, LoadingProgress, MediaId,
    NavKey, NavigationSubscriber, NumberTicker, PageNavigator, RejectReason,
};
use yr_data::{JsonFileWishStore, MediaLoader, MediaManifest, Preloader, ReportConfig, WishWall};

/// Shared handle to the wish wall used from UI and background tasks
type SharedWall = Arc<tokio::sync::Mutex<WishWall<JsonFileWishStore>>>;

/// Line shown under the slide counter after an ignored gesture
type Notice = Arc<RwLock<Option<String>>>;

fn pending_notice(media: MediaId) -> String {
    format!("waiting for {media} before moving on")
}

/// Event bus that keeps `notice` in step with navigation events
fn notice_bus(notice: Notice) -> Arc<EventBus> {
    let bus = Arc::new(EventBus::new());

    let sink = notice.clone();
    bus.subscribe::<TransitionRejected>(typed_handler(move |e: &TransitionRejected| {
        debug!(page = e.page, reason = ?e.reason, "gesture ignored");
        let text = match (e.reason, e.direction) {
            // the slide is still moving, nothing to explain
            (RejectReason::Locked, _) => return,
            (RejectReason::MediaPending(media), _) => pending_notice(media),
            (RejectReason::OutOfBounds, Direction::Forward) => "this is the last slide".to_string(),
            (RejectReason::OutOfBounds, Direction::Backward) => "this is the first slide".to_string(),
        };
        *sink.write() = Some(text);
    }));

    let sink = notice.clone();
    bus.subscribe::<PageChanged>(typed_handler(move |_: &PageChanged| {
        *sink.write() = None;
    }));

    bus.subscribe::<MediaLoaded>(typed_handler(move |e: &MediaLoaded| {
        let mut notice = notice.write();
        if notice.as_deref() == Some(pending_notice(e.media).as_str()) {
            *notice = None;
        }
    }));

    bus
}

/// Main application state
pub struct SlideshowApp {
    settings: AppSettings,

    navigator: Arc<PageNavigator>,

    notice: Notice,

    router: GestureRouter,

    /// Intro progress; gestures are dropped until it completes
    loading: LoadingProgress,

    loader: Arc<MediaLoader>,

    /// Keeps the preload subscription alive for the lifetime of the app
    _preloader: Arc<dyn NavigationSubscriber>,

    wall: SharedWall,

    /// Latest wishes copied out of the wall for drawing
    wishes: Arc<RwLock<Vec<String>>>,

    /// Counter of wishes shown on the last slide
    wish_counter: NumberTicker,

    draft: String,

    /// Tokio runtime
    runtime: tokio::runtime::Runtime,
}

impl SlideshowApp {
    pub fn new(config: ReportConfig, runtime: tokio::runtime::Runtime) -> Self {
        let settings = config.settings.clone();
        let notice: Notice = Arc::new(RwLock::new(None));
        let navigator = Arc::new(
            PageNavigator::new(settings.navigation.clone())
                .with_event_bus(notice_bus(notice.clone())),
        );

        let manifest = match MediaManifest::load_or_empty(&config.manifest_path()) {
            Ok(manifest) => manifest,
            Err(err) => {
                warn!(error = %err, "media manifest unreadable, every slide uses a placeholder");
                MediaManifest::default()
            }
        };
        let loader = Arc::new(MediaLoader::new(
            navigator.clone(),
            manifest,
            config.media_dir.clone(),
            runtime.handle().clone(),
        ));
        let preloader: Arc<dyn NavigationSubscriber> = Arc::new(Preloader::new(loader.clone()));
        navigator.add_subscriber(preloader.clone());
        loader.start();

        let wall = WishWall::new(JsonFileWishStore::new(config.wish_file.clone()));
        let wishes = Arc::new(RwLock::new(wall.wishes().to_vec()));
        let wish_counter = NumberTicker::new(&settings.ticker, wall.wishes().len() as f64, "");
        let wall: SharedWall = Arc::new(tokio::sync::Mutex::new(wall));

        {
            let wall = wall.clone();
            let wishes = wishes.clone();
            runtime.spawn(async move {
                let mut wall = wall.lock().await;
                let added = wall.refresh().await;
                info!(added, "wish wall refreshed");
                *wishes.write() = wall.wishes().to_vec();
            });
        }

        Self {
            router: GestureRouter::new(&settings.navigation),
            loading: LoadingProgress::new(settings.loading.clone()),
            settings,
            navigator,
            notice,
            loader,
            _preloader: preloader,
            wall,
            wishes,
            wish_counter,
            draft: String::new(),
            runtime,
        }
    }

    /// Collect page gestures from this frame's input
    fn collect_gestures(ctx: &Context) -> Vec<GestureEvent> {
        let typing = ctx.wants_keyboard_input();
        ctx.input(|i| {
            i.events
                .iter()
                .filter_map(|event| match event {
                    // egui reports wheel-down as a negative delta
                    egui::Event::Scroll(delta) => Some(GestureEvent::Wheel { delta_y: -delta.y }),
                    egui::Event::Touch { phase, pos, .. } => match phase {
                        egui::TouchPhase::Start => Some(GestureEvent::TouchStart { y: pos.y }),
                        egui::TouchPhase::End => Some(GestureEvent::TouchEnd { y: pos.y }),
                        egui::TouchPhase::Cancel => Some(GestureEvent::TouchCancel),
                        egui::TouchPhase::Move => None,
                    },
                    egui::Event::Key { key, pressed: true, .. } if !typing => {
                        let key = match key {
                            egui::Key::ArrowDown => NavKey::ArrowDown,
                            egui::Key::ArrowUp => NavKey::ArrowUp,
                            egui::Key::PageDown => NavKey::PageDown,
                            egui::Key::PageUp => NavKey::PageUp,
                            egui::Key::Space => NavKey::Space,
                            _ => NavKey::Other,
                        };
                        Some(GestureEvent::Key { key })
                    }
                    _ => None,
                })
                .collect()
        })
    }

    fn show_loading(&self, ui: &mut Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.4);
            ui.heading("Preparing the year in review");
            ui.add_space(12.0);
            ui.add(
                egui::ProgressBar::new(self.loading.fraction())
                    .desired_width(260.0)
                    .text(format!("{}%", self.loading.percent())),
            );
        });
    }

    fn show_slide(&mut self, ui: &mut Ui) {
        let page = self.navigator.current_page();
        let total = self.navigator.total_pages();
        let media = MediaId::for_page(page);

        ui.vertical_centered(|ui| {
            ui.add_space(ui.available_height() * 0.3);
            ui.heading(format!("{} / {}", page + 1, total));

            if self.navigator.is_loaded(media) {
                ui.label(format!("{} ready", media));
            } else {
                ui.spinner();
            }

            if let Some(notice) = self.notice.read().as_deref() {
                ui.weak(notice);
            }
        });

        if page + 1 == total {
            self.show_wish_wall(ui);
        }
    }

    fn show_wish_wall(&mut self, ui: &mut Ui) {
        let wishes = self.wishes.read().clone();
        let count = wishes.len() as f64;
        if self.wish_counter.value() != count {
            self.wish_counter.set_value(count);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Wishes lit:");
            ui.strong(self.wish_counter.display());
        });

        ui.text_edit_multiline(&mut self.draft);
        if ui.button("Send").clicked() && !self.draft.trim().is_empty() {
            let content = std::mem::take(&mut self.draft);
            let wall = self.wall.clone();
            let shown = self.wishes.clone();
            self.runtime.spawn(async move {
                let mut wall = wall.lock().await;
                match wall.submit(&content).await {
                    Ok(saved) => info!(saved, "wish submitted"),
                    Err(err) => warn!(error = %err, "wish rejected"),
                }
                *shown.write() = wall.wishes().to_vec();
            });
        }

        egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
            for wish in &wishes {
                ui.label(format!("“{}”", wish));
            }
        });
    }
}

impl eframe::App for SlideshowApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let dt = Duration::from_secs_f32(ctx.input(|i| i.stable_dt).max(0.0));

        // Cooldown release runs on the frame loop
        self.navigator.poll();

        if !self.loading.is_complete() {
            self.loading.advance(dt);
            egui::CentralPanel::default().show(ctx, |ui| self.show_loading(ui));
            ctx.request_repaint();
            return;
        }

        for gesture in Self::collect_gestures(ctx) {
            self.router.dispatch(&self.navigator, gesture);
        }
        self.wish_counter.tick(dt);

        egui::CentralPanel::default().show(ctx, |ui| self.show_slide(ui));

        if self.navigator.is_locked() || !self.wish_counter.is_settled() {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(self.settings.navigation.cooldown());
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.navigator.clear_subscribers();
        info!(requested = self.loader.requested().len(), "slideshow closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yr_core::{ManualClock, NavigatorConfig};

    fn navigator(notice: &Notice) -> (PageNavigator, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let config = NavigatorConfig {
            total_pages: 3,
            exempt_media: vec![],
            ..Default::default()
        };
        let nav = PageNavigator::with_clock(config, clock.clone())
            .with_event_bus(notice_bus(notice.clone()));
        (nav, clock)
    }

    #[test]
    fn test_notice_follows_gate() {
        let notice: Notice = Arc::new(RwLock::new(None));
        let (nav, _clock) = navigator(&notice);

        nav.next();
        assert_eq!(notice.read().as_deref(), Some(pending_notice(MediaId(1)).as_str()));

        nav.report_media_loaded(MediaId(1));
        assert_eq!(*notice.read(), None);
    }

    #[test]
    fn test_notice_bounds_and_lock() {
        let notice: Notice = Arc::new(RwLock::new(None));
        let (nav, clock) = navigator(&notice);

        nav.previous();
        assert_eq!(notice.read().as_deref(), Some("this is the first slide"));

        nav.report_media_loaded(MediaId(1));
        assert!(nav.next().is_accepted());
        assert_eq!(*notice.read(), None);

        // locked rejections leave the line alone
        nav.next();
        assert_eq!(*notice.read(), None);

        clock.advance(nav.config().cooldown());
        nav.next();
        assert_eq!(notice.read().as_deref(), Some(pending_notice(MediaId(2)).as_str()));
    }
}
