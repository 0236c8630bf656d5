use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while driving a media element
#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("unsupported source '{0}': only local files can be played")]
    UnsupportedSource(String),
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode '{0}'")]
    Decode(PathBuf, #[source] rodio::decoder::DecoderError),
    #[error("seek failed: {0}")]
    Seek(#[from] rodio::source::SeekError),
}

/// Errors raised while building songs from files
#[derive(Error, Debug)]
pub enum SongError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid song list '{path}': {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to read tags from '{path}': {source}")]
    Tags {
        path: PathBuf,
        #[source]
        source: lofty::error::LoftyError,
    },
}

/// Errors raised by the presence socket
#[derive(Error, Debug)]
pub enum PresenceError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),
    #[error("failed to encode activity: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("connection closed by server")]
    Closed,
    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
