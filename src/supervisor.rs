/// Download supervisor: the process lifecycle around one transfer job.
///
/// Startup is fail-fast (bind, load, submit — any failure exits 1). After
/// that the supervisor polls progress once per interval until the job is
/// satisfied, notifies the configured PID, then keeps the session alive
/// until a shutdown signal arrives.
use crate::config::{Config, NotifyPolicy};
use crate::engine::{BindConfig, TransferEngine, TransferSession};
use crate::notify::Notifier;
use crate::peer_id::PeerId;
use crate::pidfile;
use crate::signals::Shutdown;
use std::path::PathBuf;
use std::time::Duration;

/// Downloaded payload lands in the working directory, as it always has;
/// the provisioning parent expects to find it there.
const SAVE_PATH: &str = "./";

/// Run the whole lifecycle. Returns the process exit code: 0 for graceful
/// completion or shutdown, 1 for any setup failure.
pub async fn run<E, N>(config: &Config, engine: &E, notifier: &N, mut shutdown: Shutdown) -> i32
where
    E: TransferEngine,
    N: Notifier,
{
    let bind = BindConfig {
        addr: config.bind_addr,
        peer_id: PeerId::from_local_hostname(),
        save_path: PathBuf::from(SAVE_PATH),
    };

    let mut session = match engine.open_session(&bind).await {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{e}");
            tracing::error!(error = %e, "session setup failed");
            return 1;
        }
    };

    if let Err(e) = session.add_job(&config.torrent_file).await {
        eprintln!("{e}");
        tracing::error!(error = %e, "job submission failed");
        return 1;
    }

    // Setup succeeded; from here on the pidfile exists until shutdown.
    // Write failure is soft: the download is still worth running.
    if let Err(e) = pidfile::write(&config.pidfile, std::process::id()) {
        tracing::warn!(path = %config.pidfile.display(), error = %e, "failed to write pidfile");
    }

    let mut remaining = match session.progress().await {
        Ok(snapshot) => {
            let remaining = snapshot.remaining();
            println!("Remains: {remaining}");
            remaining
        }
        Err(e) => {
            tracing::warn!(error = %e, "progress query failed, retrying next tick");
            u64::MAX
        }
    };

    // Phase 1: poll until every wanted byte arrived or shutdown.
    while remaining > 0 && !shutdown.is_shutdown() {
        sleep_or_shutdown(config.poll_interval, &mut shutdown).await;
        match session.progress().await {
            Ok(snapshot) => {
                remaining = snapshot.remaining();
                println!("Remains: {remaining}");
            }
            Err(e) => {
                tracing::warn!(error = %e, "progress query failed, retrying next tick");
            }
        }
        if let Err(e) = session.reannounce().await {
            tracing::warn!(error = %e, "reannounce failed");
        }
    }

    let completed = remaining == 0;
    if completed || config.notify_policy == NotifyPolicy::Always {
        println!(
            "Done with torrent. Sending SIGUSR1 to PID {}",
            config.notify_pid
        );
        if let Err(e) = notifier.notify(config.notify_pid) {
            tracing::warn!(pid = config.notify_pid, error = %e, "completion notification failed");
        }
    }

    // Phase 2: keep re-announcing (the swarm can still pull from us) until
    // told to stop. No progress output here.
    while !shutdown.is_shutdown() {
        sleep_or_shutdown(config.poll_interval, &mut shutdown).await;
        if shutdown.is_shutdown() {
            break;
        }
        if let Err(e) = session.reannounce().await {
            tracing::warn!(error = %e, "reannounce failed");
        }
    }

    if let Err(e) = session.stop().await {
        tracing::warn!(error = %e, "session stop failed");
    }
    if let Err(e) = pidfile::remove(&config.pidfile) {
        tracing::warn!(path = %config.pidfile.display(), error = %e, "failed to remove pidfile");
    }
    println!("Exit.");
    0
}

/// Sleep one poll interval, cut short if shutdown is requested mid-sleep.
async fn sleep_or_shutdown(interval: Duration, shutdown: &mut Shutdown) {
    tokio::select! {
        _ = tokio::time::sleep(interval) => {}
        _ = shutdown.requested() => {}
    }
}
