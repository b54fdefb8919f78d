//! Operator interrupt (Ctrl-C) shared by every phase of a run.
//!
//! Installing the SIGINT handler replaces the default terminate action for
//! the rest of the process, so one listener is spawned at startup and all
//! phases wait on the same flag.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

/// Shared interrupt flag.
#[derive(Debug, Clone)]
pub struct Interrupt {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    /// Creates an untriggered flag.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Spawns the Ctrl-C listener task.
    ///
    /// Call once at startup.
    pub fn spawn_listener(&self) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("received interrupt, stopping");
                    let _ = tx.send(true);
                }
                Err(e) => warn!("failed to listen for Ctrl-C: {}", e),
            }
        });
    }

    /// Raises the flag.
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Whether the flag has been raised.
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Completes once the flag is raised.
    pub fn cancelled(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let closed = rx.wait_for(|raised| *raised).await.is_err();
            if closed {
                std::future::pending::<()>().await;
            }
        }
    }

    /// Runs `work` until it finishes or the flag is raised.
    pub async fn guard<F, T>(&self, work: F) -> ClientResult<T>
    where
        F: Future<Output = ClientResult<T>>,
    {
        tokio::select! {
            result = work => result,
            () = self.cancelled() => Err(ClientError::Interrupted),
        }
    }
}
