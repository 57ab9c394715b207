//! Frame pacing and cooperative cancellation.

use std::time::Duration;
use tokio::sync::watch;

/// Delay between frames in the reference playback behaviour.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// How long the streaming loop waits after each frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    frame_delay: Duration,
}

impl Pacing {
    pub const fn new(frame_delay: Duration) -> Self {
        Self { frame_delay }
    }

    /// No delay between frames.
    pub const fn unpaced() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn frame_delay(&self) -> Duration {
        self.frame_delay
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_DELAY)
    }
}

/// Triggers cancellation of the paired [`CancelSignal`]s.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

/// Observed by the streaming loop between frames and during pacing sleeps.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// A signal that never fires.
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once cancellation is requested. Pends forever if every
    /// handle is dropped without cancelling.
    pub async fn cancelled(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Creates a connected cancellation handle and signal.
pub fn cancel_pair() -> (CancelHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelSignal { rx })
}
