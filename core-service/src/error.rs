use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Core initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Playlist not found: {}", .0.display())]
    PlaylistNotFound(PathBuf),

    #[error(transparent)]
    Config(#[from] core_runtime::error::Error),

    #[error("Playlist error: {0}")]
    Playlist(#[from] core_playlist::PlaylistError),

    #[error("I/O error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, CoreError>;
