//! Data handling for the slideshow: configuration files, slide media and the wish wall

pub mod config;
pub mod media;
pub mod wishes;

use thiserror::Error;

// Re-exports
pub use config::ReportConfig;
pub use media::{MediaLoader, MediaManifest, Preloader};
pub use wishes::{JsonFileWishStore, WishStore, WishWall};

/// Errors that can occur in data operations
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Wish content is empty")]
    EmptyWish,

    #[error("Media {0} is missing")]
    MediaMissing(yr_core::MediaId),
}

pub type Result<T> = std::result::Result<T, ReportError>;
