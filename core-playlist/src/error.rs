use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Playlist is not valid UTF-8: {0}")]
    InvalidEncoding(String),
}

pub type Result<T> = std::result::Result<T, PlaylistError>;
