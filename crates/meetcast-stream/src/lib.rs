//! The audio streaming pipeline.
//!
//! [`Player::play`] drives one playback: it joins the meeting and decodes the
//! asset concurrently, then hands the session and buffer to
//! [`stream_audio`], which sends the buffer as fixed-size hex frames at a
//! fixed pace and releases the session on every exit path.
//!
//! Nothing is retried. A failed join or decode means no frame is sent; a
//! failed send abandons the remaining frames but still closes the session
//! before the error is reported.

pub mod error;
pub mod frame;
pub mod pacing;
pub mod player;
pub mod streamer;

pub use error::PlaybackError;
pub use frame::{frame_count, partition, Frame, FrameSize};
pub use pacing::{cancel_pair, CancelHandle, CancelSignal, Pacing, DEFAULT_FRAME_DELAY};
pub use player::{PlaybackSettings, Player};
pub use streamer::{stream_audio, StreamReport};
