use clap::ValueEnum;
use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::time::Duration;

/// When to deliver the SIGUSR1 completion notification.
///
/// The historical client signaled unconditionally once the download loop
/// exited, even when a shutdown signal was what ended it. `Always` keeps
/// that behavior; `Complete` only notifies when every wanted byte arrived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NotifyPolicy {
    Always,
    Complete,
}

/// Resolved runtime configuration, validated once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the .torrent job descriptor.
    pub torrent_file: PathBuf,
    /// Process to signal with SIGUSR1 on completion. Always > 0.
    pub notify_pid: i32,
    /// Where to write our own pid.
    pub pidfile: PathBuf,
    /// IPv4 address the engine listens on.
    pub bind_addr: Ipv4Addr,
    /// Delay between progress polls / re-announces.
    pub poll_interval: Duration,
    pub notify_policy: NotifyPolicy,
}

impl Config {
    /// Validate raw CLI values into a `Config`.
    ///
    /// A `pidfile` of `None` resolves to `<argv0>.pid`, matching the
    /// original tool's default.
    pub fn resolve(
        torrent_file: PathBuf,
        notify_pid: i32,
        pidfile: Option<PathBuf>,
        bind_addr: Ipv4Addr,
        poll_interval_secs: u64,
        notify_policy: NotifyPolicy,
        argv0: &str,
    ) -> Result<Self, UsageError> {
        if notify_pid <= 0 {
            return Err(UsageError {
                message: format!("-p requires a PID greater than 0, got {notify_pid}"),
            });
        }
        if poll_interval_secs == 0 {
            return Err(UsageError {
                message: "-d requires a delay of at least 1 second".to_string(),
            });
        }
        let pidfile = pidfile.unwrap_or_else(|| PathBuf::from(format!("{argv0}.pid")));
        Ok(Self {
            torrent_file,
            notify_pid,
            pidfile,
            bind_addr,
            poll_interval: Duration::from_secs(poll_interval_secs),
            notify_policy,
        })
    }
}

/// Invalid or missing argument: print usage, exit 1, touch nothing.
#[derive(Debug)]
pub struct UsageError {
    pub message: String,
}

impl std::fmt::Display for UsageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for UsageError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(pid: i32, pidfile: Option<PathBuf>, delay: u64) -> Result<Config, UsageError> {
        Config::resolve(
            PathBuf::from("job.torrent"),
            pid,
            pidfile,
            Ipv4Addr::UNSPECIFIED,
            delay,
            NotifyPolicy::Always,
            "./ltorrent-client",
        )
    }

    #[test]
    fn valid_config_resolves() {
        let config = resolve(4242, Some(PathBuf::from("/run/lt.pid")), 10).unwrap();
        assert_eq!(config.notify_pid, 4242);
        assert_eq!(config.pidfile, PathBuf::from("/run/lt.pid"));
        assert_eq!(config.poll_interval, Duration::from_secs(10));
    }

    #[test]
    fn zero_pid_is_usage_error() {
        let err = resolve(0, None, 10).unwrap_err();
        assert!(err.message.contains("-p"));
    }

    #[test]
    fn negative_pid_is_usage_error() {
        assert!(resolve(-5, None, 10).is_err());
    }

    #[test]
    fn zero_delay_is_usage_error() {
        let err = resolve(4242, None, 0).unwrap_err();
        assert!(err.message.contains("-d"));
    }

    #[test]
    fn default_pidfile_derives_from_argv0() {
        let config = resolve(4242, None, 10).unwrap();
        assert_eq!(config.pidfile, PathBuf::from("./ltorrent-client.pid"));
    }
}
