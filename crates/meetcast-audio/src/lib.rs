//! Audio preparation for streaming.
//!
//! Decodes an MP3 asset fully into memory as interleaved signed 16-bit
//! little-endian PCM. The buffer is produced once and never mutated; the
//! streaming loop only slices it.

pub mod decode;
pub mod error;

pub use decode::{decode_audio, load_audio, load_audio_async, AudioBuffer, BYTES_PER_SAMPLE};
pub use error::DecodeError;
