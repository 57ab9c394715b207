//! Partitioning of decoded audio into wire frames.

use crate::error::PlaybackError;
use meetcast_types::{ClientMessage, DEFAULT_FRAME_SIZE};

/// Maximum raw bytes per frame. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSize(usize);

impl FrameSize {
    pub fn new(bytes: usize) -> Result<Self, PlaybackError> {
        if bytes == 0 {
            return Err(PlaybackError::Configuration(
                "frame size must be greater than zero".to_string(),
            ));
        }
        Ok(Self(bytes))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for FrameSize {
    fn default() -> Self {
        Self(DEFAULT_FRAME_SIZE)
    }
}

/// One slice of the audio buffer, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    index: usize,
    bytes: &'a [u8],
}

impl<'a> Frame<'a> {
    /// Zero-based position in the stream.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex, the encoding the endpoint decodes.
    pub fn encode(&self) -> String {
        hex::encode(self.bytes)
    }

    pub fn to_message(&self) -> ClientMessage {
        ClientMessage::audio(self.encode())
    }
}

/// Splits `bytes` into consecutive, non-overlapping frames of `size` bytes.
/// Only the last frame may be shorter.
pub fn partition(bytes: &[u8], size: FrameSize) -> impl Iterator<Item = Frame<'_>> {
    bytes
        .chunks(size.get())
        .enumerate()
        .map(|(index, bytes)| Frame { index, bytes })
}

/// Number of frames `partition` yields for `len` bytes.
pub fn frame_count(len: usize, size: FrameSize) -> usize {
    len.div_ceil(size.get())
}
