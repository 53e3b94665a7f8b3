//! Background polling loop turning bounded reads into a stream of hits.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::codec::{self, Hit};
use crate::error::{LaunchpadError, Result};
use crate::transport::InputStream;

pub use tokio::sync::mpsc::error::TryRecvError;

pub(crate) type SharedInput = Arc<Mutex<Box<dyn InputStream>>>;

/// One bounded read, decoded. Non-press events are dropped.
pub(crate) fn read_hits(input: &SharedInput, max: usize) -> Result<Vec<Hit>> {
    let events = input
        .lock()
        .read(max)
        .map_err(LaunchpadError::TransportRead)?;

    Ok(events.iter().filter_map(codec::decode_event).collect())
}

/// Hits delivered by an active listener.
///
/// Ends (`None`) once the listener is stopped or the driver is dropped.
pub struct HitStream {
    rx: mpsc::Receiver<Hit>,
}

impl HitStream {
    /// Wait for the next hit.
    pub async fn next(&mut self) -> Option<Hit> {
        self.rx.recv().await
    }

    /// Take a hit if one is ready.
    ///
    /// Fails with [`TryRecvError::Empty`] while nothing is queued and with
    /// [`TryRecvError::Disconnected`] once the stream has ended.
    pub fn try_next(&mut self) -> std::result::Result<Hit, TryRecvError> {
        self.rx.try_recv()
    }

    /// Block the current thread for the next hit.
    ///
    /// Panics if called from within an async context, like
    /// [`mpsc::Receiver::blocking_recv`].
    pub fn blocking_next(&mut self) -> Option<Hit> {
        self.rx.blocking_recv()
    }
}

/// Control side of a running listen loop, held by the driver.
pub(crate) struct Listener {
    cancel: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Listener {
    pub(crate) fn spawn(
        input: SharedInput,
        batch_size: usize,
        poll_interval: Duration,
        capacity: usize,
    ) -> Result<(Self, HitStream)> {
        let runtime = Handle::try_current().map_err(|_| LaunchpadError::NoRuntime)?;

        let (tx, rx) = mpsc::channel(capacity);
        let (cancel, cancel_rx) = watch::channel(false);
        let task = runtime.spawn(poll_loop(input, batch_size, poll_interval, tx, cancel_rx));

        Ok((Self { cancel, task }, HitStream { rx }))
    }

    /// Signal the loop to exit. Takes effect on its next tick or delivery.
    pub(crate) fn stop(&self) {
        self.cancel.send_replace(true);
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn poll_loop(
    input: SharedInput,
    batch_size: usize,
    poll_interval: Duration,
    tx: mpsc::Sender<Hit>,
    mut cancel: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = cancel.changed() => break,
            _ = tx.closed() => break,
        }
        if *cancel.borrow() {
            break;
        }

        let hits = match read_hits(&input, batch_size) {
            Ok(hits) => hits,
            Err(e) => {
                tracing::debug!("Listen tick skipped: {}", e);
                continue;
            }
        };

        for hit in hits {
            tokio::select! {
                sent = tx.send(hit) => {
                    if sent.is_err() {
                        tracing::debug!("Hit stream dropped, listener exiting");
                        return;
                    }
                }
                _ = cancel.changed() => return,
            }
        }
    }

    tracing::debug!("Listener stopped");
}
