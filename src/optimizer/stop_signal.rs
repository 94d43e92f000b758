//! # Stop Signal
//!
//! Richiesta di interruzione condivisa tra il gestore di Ctrl-C e la run.
//!
//! La scansione si ferma alla prima richiesta. Dopo la scansione i file già
//! avviati vengono sempre completati: l'interruzione viene solo registrata e
//! il chiamante decide il codice di uscita a run conclusa.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Cloneable handle: every clone shares the same channel and flag
#[derive(Clone, Debug)]
pub struct StopSignal {
    sender: broadcast::Sender<()>,
    interrupted: Arc<AtomicBool>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(1);
        Self {
            sender,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Receiver for a scanner; dropped when the scan ends
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Record an interrupt and notify a running scan.
    ///
    /// Returns `true` when a scan was listening and will abort.
    pub fn request_stop(&self) -> bool {
        self.interrupted.store(true, Ordering::SeqCst);
        self.sender.send(()).is_ok()
    }

    pub fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}
