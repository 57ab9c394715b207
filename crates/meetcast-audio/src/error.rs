use std::path::PathBuf;
use thiserror::Error;

/// Errors that prevent an asset from becoming an audio buffer.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("audio file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read audio file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a supported MP3 stream: {0}")]
    Unsupported(String),

    #[error("no audio track found")]
    NoAudioTrack,

    #[error("no decoder for audio track: {0}")]
    Codec(String),

    #[error("malformed audio stream: {0}")]
    Malformed(String),

    #[error("audio stream decoded to zero samples")]
    Empty,

    #[error("decode task failed: {0}")]
    Task(String),
}
