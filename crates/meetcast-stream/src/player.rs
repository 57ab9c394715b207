use crate::error::PlaybackError;
use crate::frame::FrameSize;
use crate::pacing::{CancelSignal, Pacing};
use crate::streamer::{stream_audio, StreamReport};
use meetcast_audio::{load_audio_async, DecodeError};
use meetcast_session::{Connector, SessionNegotiator};
use meetcast_types::MeetingParams;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{info, warn};

/// Framing and pacing for a playback.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackSettings {
    pub frame_size: FrameSize,
    pub pacing: Pacing,
}

/// Joins a meeting and plays one audio file into it.
#[derive(Debug)]
pub struct Player<C> {
    negotiator: SessionNegotiator<C>,
    settings: PlaybackSettings,
}

impl<C: Connector> Player<C> {
    pub fn new(negotiator: SessionNegotiator<C>, settings: PlaybackSettings) -> Self {
        Self {
            negotiator,
            settings,
        }
    }

    /// Plays the MP3 at `audio_path` into `meeting`.
    ///
    /// A missing asset fails before any connection is attempted. Otherwise
    /// the join and the decode run concurrently; a decode failure is
    /// reported even when the join also failed, and a session opened for a
    /// failed decode is closed without sending anything. Cancelling while
    /// either is still running abandons both and closes any session that
    /// was already joined.
    pub async fn play(
        &self,
        meeting: &MeetingParams,
        audio_path: &Path,
        cancel: &mut CancelSignal,
    ) -> Result<StreamReport, PlaybackError> {
        check_asset(audio_path).await?;

        if cancel.is_cancelled() {
            return Ok(cancelled_report());
        }

        info!(
            meeting = meeting.meeting_number(),
            path = %audio_path.display(),
            "attempting to join meeting"
        );
        let join = self.negotiator.join(meeting);
        let decode = load_audio_async(audio_path);
        tokio::pin!(join, decode);

        let mut joined = None;
        let mut decoded = None;
        let (joined, decoded) = loop {
            match (joined.take(), decoded.take()) {
                (Some(j), Some(d)) => break (j, d),
                (j, d) => {
                    joined = j;
                    decoded = d;
                }
            }
            tokio::select! {
                res = &mut join, if joined.is_none() => joined = Some(res),
                res = &mut decode, if decoded.is_none() => decoded = Some(res),
                () = cancel.cancelled() => {
                    info!("playback cancelled before streaming started");
                    if let Some(Ok(session)) = joined {
                        if let Err(e) = session.close().await {
                            warn!(error = %e, "failed to close session after cancel");
                        }
                    }
                    return Ok(cancelled_report());
                }
            }
        };

        let audio = match decoded {
            Ok(audio) => audio,
            Err(decode_err) => {
                match joined {
                    Ok(session) => {
                        if let Err(e) = session.close().await {
                            warn!(error = %e, "failed to close session after decode failure");
                        }
                    }
                    Err(join_err) => {
                        warn!(error = %join_err, "join also failed");
                    }
                }
                return Err(decode_err.into());
            }
        };

        let session = match joined {
            Ok(session) => session,
            Err(join_err) => {
                info!(bytes = audio.len(), "discarding decoded audio");
                return Err(join_err.into());
            }
        };
        info!(meeting = session.meeting_number(), "successfully joined meeting");

        stream_audio(
            session,
            &audio,
            self.settings.frame_size,
            self.settings.pacing,
            cancel,
        )
        .await
    }
}

fn cancelled_report() -> StreamReport {
    StreamReport {
        cancelled: true,
        ..StreamReport::default()
    }
}

async fn check_asset(path: &Path) -> Result<(), DecodeError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(DecodeError::Read {
            path: path.to_path_buf(),
            source: std::io::Error::new(ErrorKind::InvalidInput, "not a regular file"),
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(DecodeError::NotFound(path.to_path_buf())),
        Err(e) => Err(DecodeError::Read {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
