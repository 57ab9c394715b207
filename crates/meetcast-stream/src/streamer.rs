use crate::error::PlaybackError;
use crate::frame::{frame_count, partition, FrameSize};
use crate::pacing::{CancelSignal, Pacing};
use meetcast_audio::AudioBuffer;
use meetcast_session::{MeetingSession, MeetingTransport};
use tracing::{debug, info, warn};

/// What a streaming run accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub frames_sent: usize,
    /// Raw audio bytes sent, before encoding.
    pub bytes_sent: usize,
    /// The run stopped early on request.
    pub cancelled: bool,
}

/// Streams `audio` through `session` and then closes it.
///
/// Frames go out strictly in source order, one at a time, with
/// `pacing.frame_delay()` after each. The session is closed exactly once
/// whether the run completes, fails on a send, or is cancelled. When a send
/// fails, that error is returned even if the close also fails.
pub async fn stream_audio<T: MeetingTransport>(
    mut session: MeetingSession<T>,
    audio: &AudioBuffer,
    frame_size: FrameSize,
    pacing: Pacing,
    cancel: &mut CancelSignal,
) -> Result<StreamReport, PlaybackError> {
    let mut report = StreamReport::default();
    let outcome = send_frames(
        &mut session,
        audio.as_bytes(),
        frame_size,
        pacing,
        cancel,
        &mut report,
    )
    .await;

    let closed = session.close().await;

    match (outcome, closed) {
        (Ok(()), Ok(())) => {
            info!(
                frames = report.frames_sent,
                bytes = report.bytes_sent,
                cancelled = report.cancelled,
                "finished playing audio"
            );
            Ok(report)
        }
        (Ok(()), Err(source)) => Err(PlaybackError::Transmission {
            frames_sent: report.frames_sent,
            source,
        }),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(error = %close_err, "failed to close session after stream error");
            Err(err)
        }
    }
}

async fn send_frames<T: MeetingTransport>(
    session: &mut MeetingSession<T>,
    bytes: &[u8],
    frame_size: FrameSize,
    pacing: Pacing,
    cancel: &mut CancelSignal,
    report: &mut StreamReport,
) -> Result<(), PlaybackError> {
    let total = frame_count(bytes.len(), frame_size);
    let delay = pacing.frame_delay();
    info!(
        meeting = session.meeting_number(),
        frames = total,
        bytes = bytes.len(),
        delay_ms = delay.as_millis() as u64,
        "streaming audio"
    );

    for frame in partition(bytes, frame_size) {
        if cancel.is_cancelled() {
            report.cancelled = true;
            info!(sent = report.frames_sent, total, "playback cancelled");
            return Ok(());
        }

        session
            .send(&frame.to_message())
            .await
            .map_err(|source| PlaybackError::Transmission {
                frames_sent: report.frames_sent,
                source,
            })?;
        report.frames_sent += 1;
        report.bytes_sent += frame.len();
        debug!(frame = frame.index(), len = frame.len(), total, "sent frame");

        if !delay.is_zero() {
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => {
                    report.cancelled = report.frames_sent < total;
                    if report.cancelled {
                        info!(sent = report.frames_sent, total, "playback cancelled");
                    }
                    return Ok(());
                }
            }
        }
    }

    Ok(())
}
