// src/engine/cancel.rs

//! Stop requests.
//!
//! A [`StopHandle`] is held by whoever may want to abort a run (Ctrl-C
//! handler, an embedding application); every in-flight test run holds a
//! [`CancelSignal`] and races it against its child process.

use std::sync::Arc;

use tokio::sync::watch;

/// Create a connected handle/signal pair.
pub fn stop_channel() -> (StopHandle, CancelSignal) {
    let (tx, rx) = watch::channel(false);
    (StopHandle { tx: Arc::new(tx) }, CancelSignal { rx })
}

/// Requests a stop. Cheap to clone; all clones control the same run.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Ask the run to stop: in-flight processes are terminated and no further
    /// candidates start. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }

    /// Clear a previous stop request before a new run starts.
    pub(crate) fn reset(&self) {
        self.tx.send_replace(false);
    }

    pub fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observes stop requests.
#[derive(Debug, Clone)]
pub struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once a stop has been requested. Never resolves if every
    /// [`StopHandle`] is dropped without stopping.
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
