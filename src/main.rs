mod config;
mod engine;
mod notify;
mod peer_id;
mod pidfile;
mod rqbit;
mod signals;
mod supervisor;

use clap::{CommandFactory, Parser};
use config::{Config, NotifyPolicy};
use notify::SigusrNotifier;
use rqbit::RqbitEngine;
use signals::Shutdown;
use std::net::Ipv4Addr;
use std::path::PathBuf;

/// Download one torrent through the embedded rqbit engine, write a pidfile,
/// and send SIGUSR1 to a waiting process once every byte has arrived.
#[derive(Parser, Debug)]
#[command(name = "ltorrent-client", version, about)]
struct Cli {
    /// Torrent file
    #[arg(short = 't', value_name = "FILE")]
    torrent: PathBuf,

    /// SIGUSR1 will be sent to this process on complete
    #[arg(short = 'p', value_name = "PID")]
    pid: i32,

    /// File to write own pid to (<argv0>.pid by default)
    #[arg(short = 'f', value_name = "PIDFILE")]
    pidfile: Option<PathBuf>,

    /// IP to bind
    #[arg(short = 'b', value_name = "IP", default_value = "0.0.0.0")]
    bind: Ipv4Addr,

    /// Send announce to tracker every NUM sec
    #[arg(short = 'd', value_name = "NUM", default_value_t = 10)]
    delay: u64,

    /// When to send the completion signal
    #[arg(long = "notify", value_enum, default_value_t = NotifyPolicy::Always)]
    notify: NotifyPolicy,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    // Historical contract: usage goes to stdout and the process exits 1,
    // for help requests and bad invocations alike.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            print!("{}", e.render());
            std::process::exit(1);
        }
    };

    let argv0 = std::env::args()
        .next()
        .unwrap_or_else(|| "ltorrent-client".to_string());
    let config = match Config::resolve(
        cli.torrent,
        cli.pid,
        cli.pidfile,
        cli.bind,
        cli.delay,
        cli.notify,
        &argv0,
    ) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
    };

    tracing::info!(
        torrent = %config.torrent_file.display(),
        notify_pid = config.notify_pid,
        bind = %config.bind_addr,
        "ltorrent-client starting"
    );

    let shutdown = match Shutdown::install() {
        Ok(shutdown) => shutdown,
        Err(e) => {
            eprintln!("failed to install signal handlers: {e}");
            std::process::exit(1);
        }
    };

    let engine = RqbitEngine::new(config.poll_interval);
    let code = supervisor::run(&config, &engine, &SigusrNotifier, shutdown).await;
    std::process::exit(code);
}
