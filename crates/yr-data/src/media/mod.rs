//! Slide media: manifest lookup and asynchronous readiness reporting
//!
//! The loader only ever reports success. A slide whose media cannot be read is
//! never reported ready, so forward navigation past it stays blocked unless
//! its media id is exempt. Whether such pages should eventually unblock is an
//! open product decision; nothing here times out.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ahash::AHashSet;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use yr_core::{MediaId, NavigationSubscriber, PageContext, PageNavigator};

use crate::{ReportError, Result};

/// Where a slide's primary media comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    File(PathBuf),
    /// No asset configured; a generated placeholder is shown and counts as ready
    Placeholder,
}

/// Map from media id to an asset path, stored as `{ "1": "cover.png", ... }`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaManifest {
    entries: BTreeMap<usize, String>,
}

impl MediaManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: MediaId, path: impl Into<String>) {
        self.entries.insert(id.0, path.into());
    }

    pub fn get(&self, id: MediaId) -> Option<&str> {
        self.entries.get(&id.0).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `id` against `base_dir`
    pub fn resolve(&self, id: MediaId, base_dir: &Path) -> MediaSource {
        match self.get(id) {
            Some(path) => MediaSource::File(base_dir.join(path)),
            None => MediaSource::Placeholder,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Load `path`, treating a missing file as an empty manifest
    pub fn load_or_empty(path: &Path) -> Result<Self> {
        match Self::load(path) {
            Err(ReportError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "no media manifest, every slide uses a placeholder");
                Ok(Self::default())
            }
            other => other,
        }
    }
}

/// Check that `source` can be shown and report it to the navigator
async fn load_source(navigator: &PageNavigator, id: MediaId, source: MediaSource) -> Result<()> {
    if let MediaSource::File(path) = &source {
        let metadata = tokio::fs::metadata(path).await.map_err(|err| {
            debug!(%id, path = %path.display(), error = %err, "media unreadable");
            ReportError::MediaMissing(id)
        })?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(ReportError::MediaMissing(id));
        }
    }
    navigator.report_media_loaded(id);
    Ok(())
}

/// Fetches slide media in the background and reports readiness
pub struct MediaLoader {
    navigator: Arc<PageNavigator>,
    manifest: Arc<MediaManifest>,
    base_dir: PathBuf,
    requested: Mutex<AHashSet<MediaId>>,
    runtime: Handle,
}

impl MediaLoader {
    pub fn new(
        navigator: Arc<PageNavigator>,
        manifest: MediaManifest,
        base_dir: PathBuf,
        runtime: Handle,
    ) -> Self {
        Self {
            navigator,
            manifest: Arc::new(manifest),
            base_dir,
            requested: Mutex::new(AHashSet::new()),
            runtime,
        }
    }

    /// Load one media id and wait for the result
    pub async fn load(&self, id: MediaId) -> Result<()> {
        let source = self.manifest.resolve(id, &self.base_dir);
        load_source(&self.navigator, id, source).await
    }

    /// Start loading `id` in the background unless it was requested before.
    /// Failed loads are logged and not retried.
    pub fn request(&self, id: MediaId) -> Option<JoinHandle<()>> {
        if !self.requested.lock().insert(id) {
            return None;
        }

        let navigator = self.navigator.clone();
        let source = self.manifest.resolve(id, &self.base_dir);
        Some(self.runtime.spawn(async move {
            if let Err(err) = load_source(&navigator, id, source).await {
                warn!(%id, error = %err, "media failed to load; forward navigation past it stays blocked");
            }
        }))
    }

    /// Request the current slide's media and the preload hint
    pub fn request_for(&self, context: &PageContext) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();
        handles.extend(self.request(MediaId::for_page(context.page)));
        if let Some(hint) = context.preload_hint {
            handles.extend(self.request(hint));
        }
        handles
    }

    /// Kick off loading for the page the navigator currently shows
    pub fn start(&self) -> Vec<JoinHandle<()>> {
        self.request_for(&self.navigator.context())
    }

    /// Every media id requested so far, sorted
    pub fn requested(&self) -> Vec<MediaId> {
        let mut ids: Vec<_> = self.requested.lock().iter().copied().collect();
        ids.sort();
        ids
    }
}

/// Navigation subscriber that keeps the next slide's media loading ahead of the user
pub struct Preloader {
    loader: Arc<MediaLoader>,
}

impl Preloader {
    pub fn new(loader: Arc<MediaLoader>) -> Self {
        Self { loader }
    }
}

impl NavigationSubscriber for Preloader {
    fn on_page_change(&self, context: &PageContext) {
        self.loader.request_for(context);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use yr_core::{ManualClock, NavigatorConfig};

    fn navigator(total_pages: usize) -> Arc<PageNavigator> {
        let config = NavigatorConfig {
            total_pages,
            exempt_media: vec![],
            ..Default::default()
        };
        Arc::new(PageNavigator::with_clock(config, Arc::new(ManualClock::new())))
    }

    fn fixture() -> (TempDir, MediaManifest) {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("cover.png"), b"\x89PNG").unwrap();
        std::fs::write(dir.path().join("empty.png"), b"").unwrap();

        let mut manifest = MediaManifest::new();
        manifest.insert(MediaId(1), "cover.png");
        manifest.insert(MediaId(2), "missing.png");
        manifest.insert(MediaId(3), "empty.png");
        (dir, manifest)
    }

    #[test]
    fn test_manifest_json_shape() {
        let manifest: MediaManifest =
            serde_json::from_str(r#"{ "1": "image/test.png", "24": "image/film.png" }"#).unwrap();
        assert_eq!(manifest.len(), 2);
        assert_eq!(manifest.get(MediaId(24)), Some("image/film.png"));
        assert_eq!(
            manifest.resolve(MediaId(1), Path::new("site")),
            MediaSource::File(PathBuf::from("site/image/test.png"))
        );
        assert_eq!(manifest.resolve(MediaId(2), Path::new("site")), MediaSource::Placeholder);
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = TempDir::new().unwrap();
        let manifest = MediaManifest::load_or_empty(&dir.path().join("manifest.json")).unwrap();
        assert!(manifest.is_empty());

        std::fs::write(dir.path().join("broken.json"), "{").unwrap();
        assert!(MediaManifest::load_or_empty(&dir.path().join("broken.json")).is_err());
    }

    #[tokio::test]
    async fn test_load_reports_ready_media() {
        let (dir, manifest) = fixture();
        let nav = navigator(5);
        let loader = MediaLoader::new(nav.clone(), manifest, dir.path().to_path_buf(), Handle::current());

        loader.load(MediaId(1)).await.unwrap();
        assert!(nav.is_loaded(MediaId(1)));

        // no manifest entry: placeholder counts as ready
        loader.load(MediaId(4)).await.unwrap();
        assert!(nav.is_loaded(MediaId(4)));
    }

    #[tokio::test]
    async fn test_failed_media_never_reported() {
        let (dir, manifest) = fixture();
        let nav = navigator(5);
        let loader = MediaLoader::new(nav.clone(), manifest, dir.path().to_path_buf(), Handle::current());

        assert!(matches!(loader.load(MediaId(2)).await, Err(ReportError::MediaMissing(MediaId(2)))));
        assert!(matches!(loader.load(MediaId(3)).await, Err(ReportError::MediaMissing(MediaId(3)))));
        assert!(!nav.is_loaded(MediaId(2)));
        assert!(!nav.is_loaded(MediaId(3)));
    }

    #[tokio::test]
    async fn test_request_is_deduplicated() {
        let (dir, manifest) = fixture();
        let nav = navigator(5);
        let loader = MediaLoader::new(nav.clone(), manifest, dir.path().to_path_buf(), Handle::current());

        let handle = loader.request(MediaId(1)).expect("first request spawns");
        assert!(loader.request(MediaId(1)).is_none());
        handle.await.unwrap();
        assert!(nav.is_loaded(MediaId(1)));
    }

    #[tokio::test]
    async fn test_start_requests_current_and_next_media() {
        let (dir, manifest) = fixture();
        let nav = navigator(5);
        let loader = MediaLoader::new(nav.clone(), manifest, dir.path().to_path_buf(), Handle::current());

        for handle in loader.start() {
            handle.await.unwrap();
        }
        assert_eq!(loader.requested(), vec![MediaId(1), MediaId(2)]);
        assert!(nav.is_loaded(MediaId(1)));
        // media#2 is missing on disk
        assert!(!nav.is_loaded(MediaId(2)));
    }

    #[tokio::test]
    async fn test_preloader_follows_page_changes() {
        let (dir, manifest) = fixture();
        let nav = navigator(5);
        let loader = Arc::new(MediaLoader::new(nav.clone(), manifest, dir.path().to_path_buf(), Handle::current()));
        let preloader: Arc<dyn NavigationSubscriber> = Arc::new(Preloader::new(loader.clone()));
        nav.add_subscriber(preloader.clone());

        loader.load(MediaId(1)).await.unwrap();
        assert!(nav.next().is_accepted());

        assert_eq!(loader.requested(), vec![MediaId(2), MediaId(3)]);
    }
}
