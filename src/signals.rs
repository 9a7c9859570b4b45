/// Signal handling for graceful shutdown.
///
/// SIGINT and SIGTERM flip a single process-wide flag; both poll-loop
/// phases observe it at their next iteration boundary. The transition is
/// one-way: once stopping, never running again.
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::watch;

#[derive(Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

impl Shutdown {
    /// Subscribe to SIGINT/SIGTERM. The handler path does nothing beyond
    /// flipping the flag.
    pub fn install() -> std::io::Result<Self> {
        let (tx, rx) = watch::channel(false);
        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;
        tokio::spawn(async move {
            tokio::select! {
                _ = sigint.recv() => tracing::info!("SIGINT received, shutting down"),
                _ = sigterm.recv() => tracing::info!("SIGTERM received, shutting down"),
            }
            let _ = tx.send(true);
        });
        Ok(Self { rx })
    }

    /// Manually triggered variant for tests.
    pub fn channel() -> (watch::Sender<bool>, Self) {
        let (tx, rx) = watch::channel(false);
        (tx, Self { rx })
    }

    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once shutdown is requested. Used to cut sleeps short so a
    /// signal never waits out a full poll interval unobserved.
    pub async fn requested(&mut self) {
        if self.rx.wait_for(|stopping| *stopping).await.is_err() {
            // Trigger gone without firing; park forever rather than spin.
            std::future::pending::<()>().await;
        }
    }
}
