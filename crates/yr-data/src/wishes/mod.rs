//! Wish wall
//!
//! Visitors leave a short wish on the last slide. Wishes are kept in a JSON
//! file (newest first). The wall always has something to show: it starts from
//! built-in blessings and keeps them when storage is unavailable.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{ReportError, Result};

/// Blessings shown before any visitor wish is available
pub const DEFAULT_BLESSINGS: &[&str] = &[
    "薪火相传，点亮 2026！",
    "祝愿协会在新年里更上层楼。",
    "在大爱中前行，薪火不息。",
    "重邮薪火，温暖你我。",
    "让每一份善意都能汇聚成光。",
    "南山下的志愿情，一生难忘。",
    "愿薪火的温暖传遍山城的每个角落。",
];

/// Persistence for submitted wishes
#[async_trait]
pub trait WishStore: Send + Sync {
    /// All stored wishes, newest first
    async fn list(&self) -> Result<Vec<String>>;

    /// Store a wish at the front of the collection
    async fn submit(&self, content: &str) -> Result<()>;
}

/// Wishes stored as a JSON array of strings
pub struct JsonFileWishStore {
    path: PathBuf,
    /// Serialises read-modify-write cycles
    write_lock: Mutex<()>,
}

impl JsonFileWishStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Missing, empty and corrupt files all read as no wishes
    async fn read_all(&self) -> Result<Vec<String>> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        match serde_json::from_str::<Vec<String>>(&text) {
            Ok(wishes) => Ok(wishes),
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "unreadable wish file treated as empty");
                Ok(Vec::new())
            }
        }
    }
}

#[async_trait]
impl WishStore for JsonFileWishStore {
    async fn list(&self) -> Result<Vec<String>> {
        self.read_all().await
    }

    async fn submit(&self, content: &str) -> Result<()> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ReportError::EmptyWish);
        }

        let _guard = self.write_lock.lock().await;
        let mut wishes = self.read_all().await?;
        wishes.insert(0, content.to_string());
        let text = serde_json::to_string(&wishes)?;
        tokio::fs::write(&self.path, text).await?;
        Ok(())
    }
}

/// The collection of wishes shown on screen
pub struct WishWall<S: WishStore> {
    store: S,
    wishes: Vec<String>,
}

impl<S: WishStore> WishWall<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            wishes: DEFAULT_BLESSINGS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn wishes(&self) -> &[String] {
        &self.wishes
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Put stored wishes in front of what is shown. Storage errors keep the
    /// current list.
    pub async fn refresh(&mut self) -> usize {
        match self.store.list().await {
            Ok(stored) if !stored.is_empty() => {
                let count = stored.len();
                let mut merged = stored;
                merged.append(&mut self.wishes);
                self.wishes = merged;
                count
            }
            Ok(_) => 0,
            Err(err) => {
                warn!(error = %err, "wish storage unavailable, showing local wishes");
                0
            }
        }
    }

    /// Show a wish immediately and try to persist it.
    ///
    /// Returns `Err(EmptyWish)` for blank input. A storage failure is logged
    /// and the wish stays on the wall; the result is `Ok(false)` in that case.
    pub async fn submit(&mut self, content: &str) -> Result<bool> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ReportError::EmptyWish);
        }

        self.wishes.insert(0, content.to_string());
        match self.store.submit(content).await {
            Ok(()) => Ok(true),
            Err(err) => {
                warn!(error = %err, "failed to save wish");
                Ok(false)
            }
        }
    }
}
