//! Debounced draft autosave
//!
//! Edits arrive as full snapshots. Only the latest one is kept, and it is
//! written once no newer edit has arrived for the debounce window, so a burst
//! of keystrokes produces a single write holding the final values.
//!
//! The waiting snapshot lives in a locked slot shared with the handle. The
//! task writes while holding that lock, and [`DraftAutosaver::clear_draft`]
//! clears while holding it, so a write can never land after a clear.

use super::DraftStore;
use parking_lot::Mutex;
use shared::FormFields;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

struct Slot {
    store: DraftStore,
    pending: Mutex<Option<FormFields>>,
}

impl Slot {
    fn flush(&self) {
        let mut pending = self.pending.lock();
        if let Some(snapshot) = pending.take() {
            self.store.save(&snapshot);
        }
    }
}

/// Handle to the autosave task
///
/// Dropping or disposing the handle cancels the task; a snapshot still
/// waiting for its window is dropped, not written.
pub struct DraftAutosaver {
    slot: Arc<Slot>,
    touch: mpsc::UnboundedSender<()>,
    shutdown: CancellationToken,
}

impl DraftAutosaver {
    /// Spawn the autosave task on the current tokio runtime
    pub fn spawn(store: DraftStore, debounce: Duration) -> Self {
        let slot = Arc::new(Slot {
            store,
            pending: Mutex::new(None),
        });
        let (touch, rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        tokio::spawn(run(slot.clone(), debounce, rx, shutdown.clone()));
        Self {
            slot,
            touch,
            shutdown,
        }
    }

    /// Queue a snapshot; it replaces any snapshot still waiting and restarts
    /// the window
    pub fn schedule(&self, snapshot: FormFields) {
        if self.is_disposed() {
            return;
        }
        *self.slot.pending.lock() = Some(snapshot);
        if self.touch.send(()).is_err() {
            tracing::debug!("Autosave stopped, snapshot not scheduled");
        }
    }

    /// Write `snapshot` now, superseding the waiting one
    pub fn save_now(&self, snapshot: &FormFields) {
        let mut pending = self.slot.pending.lock();
        *pending = None;
        self.slot.store.save(snapshot);
    }

    /// Drop the waiting snapshot and delete the stored draft
    pub fn clear_draft(&self) {
        let mut pending = self.slot.pending.lock();
        *pending = None;
        self.slot.store.clear();
    }

    /// Stop the task; nothing is written afterwards
    pub fn dispose(&self) {
        self.shutdown.cancel();
        if self.slot.pending.lock().take().is_some() {
            tracing::debug!("Autosave disposed, dropped pending draft write");
        }
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for DraftAutosaver {
    fn drop(&mut self) {
        self.dispose();
    }
}

async fn run(
    slot: Arc<Slot>,
    debounce: Duration,
    mut touch: mpsc::UnboundedReceiver<()>,
    shutdown: CancellationToken,
) {
    let mut deadline: Option<Instant> = None;

    loop {
        let sleep_until = deadline.unwrap_or_else(|| Instant::now() + Duration::from_secs(3600));

        // A newer edit always restarts the window before an expired timer fires
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,

            signal = touch.recv() => match signal {
                Some(()) => deadline = Some(Instant::now() + debounce),
                None => break,
            },

            _ = tokio::time::sleep_until(sleep_until), if deadline.is_some() => {
                deadline = None;
                if shutdown.is_cancelled() {
                    break;
                }
                slot.flush();
            }
        }
    }
}
