use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("pose model not found at {path} (run `fetch-model` to download it)")]
    ModelMissing { path: PathBuf },
    #[error("camera unavailable: {0}")]
    Camera(String),
    #[error("failed to load pose model: {0}")]
    Model(String),
    #[error("display unavailable: {0}")]
    Display(String),
    #[error("failed to present frame: {0}")]
    Present(String),
    #[error("camera stream ended: {0}")]
    EndOfStream(String),
}

impl GameError {
    /// Startup failures abort before the loop starts; everything else ends a running session.
    pub fn is_startup(&self) -> bool {
        !matches!(self, GameError::EndOfStream(_) | GameError::Present(_))
    }
}
