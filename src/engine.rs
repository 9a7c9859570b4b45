/// Capability interface to the external transfer engine.
///
/// Everything hard about BitTorrent (handshakes, piece selection, choking,
/// DHT, disk I/O) lives behind these traits. The supervisor only opens one
/// session, submits one job, polls progress, and eventually stops it.
use crate::peer_id::PeerId;
use std::net::Ipv4Addr;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Listen ports the engine may claim, inherited from the original client.
pub const PORT_RANGE: RangeInclusive<u16> = 6881..=6889;

/// Parameters for opening a session.
#[derive(Debug, Clone)]
pub struct BindConfig {
    pub addr: Ipv4Addr,
    pub peer_id: PeerId,
    /// Directory downloaded payload lands in.
    pub save_path: PathBuf,
}

/// Point-in-time read of a job's progress. Recomputed every poll tick,
/// never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    /// Total bytes the job wants.
    pub wanted: u64,
    /// Bytes obtained so far.
    pub obtained: u64,
}

impl ProgressSnapshot {
    pub fn remaining(&self) -> u64 {
        self.wanted.saturating_sub(self.obtained)
    }
}

pub trait TransferEngine {
    type Session: TransferSession;

    /// Open a session listening on the configured address. Bind failures
    /// are fatal to the caller.
    async fn open_session(&self, bind: &BindConfig) -> Result<Self::Session, EngineError>;
}

pub trait TransferSession {
    /// Submit the single transfer job described by the .torrent file.
    async fn add_job(&mut self, descriptor: &Path) -> Result<(), EngineError>;

    /// Fresh progress snapshot for the submitted job.
    async fn progress(&self) -> Result<ProgressSnapshot, EngineError>;

    /// Ask peer-discovery infrastructure to refresh peer lists.
    async fn reannounce(&self) -> Result<(), EngineError>;

    /// Abort all network activity and release the listening endpoint.
    async fn stop(&mut self) -> Result<(), EngineError>;
}

/// Errors surfaced by the engine boundary.
#[derive(Debug)]
pub enum EngineError {
    /// Could not listen on the configured address / port range.
    Bind {
        addr: Ipv4Addr,
        source: std::io::Error,
    },
    /// The engine failed to start a session.
    Open { source: anyhow::Error },
    /// The job descriptor could not be loaded.
    Descriptor {
        path: PathBuf,
        source: anyhow::Error,
    },
    /// The engine rejected the job submission.
    Submit { source: anyhow::Error },
    /// A session call was made before a job was submitted.
    NoJob,
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::Bind { addr, source } => {
                write!(f, "failed to open listen socket on {addr}: {source}")
            }
            EngineError::Open { source } => {
                write!(f, "failed to open transfer session: {source}")
            }
            EngineError::Descriptor { path, source } => {
                write!(f, "failed to load torrent {}: {source}", path.display())
            }
            EngineError::Submit { source } => {
                write!(f, "failed to add torrent to session: {source}")
            }
            EngineError::NoJob => write!(f, "no job submitted to session"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Bind { source, .. } => Some(source),
            EngineError::Open { source } => Some(source.as_ref()),
            EngineError::Descriptor { source, .. } => Some(source.as_ref()),
            EngineError::Submit { source } => Some(source.as_ref()),
            EngineError::NoJob => None,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remaining_subtracts_obtained() {
        let snapshot = ProgressSnapshot {
            wanted: 100,
            obtained: 30,
        };
        assert_eq!(snapshot.remaining(), 70);
    }

    #[test]
    fn remaining_saturates_at_zero() {
        // An over-reporting engine must not wrap around.
        let snapshot = ProgressSnapshot {
            wanted: 100,
            obtained: 120,
        };
        assert_eq!(snapshot.remaining(), 0);
    }

    #[test]
    fn bind_error_carries_address() {
        let err = EngineError::Bind {
            addr: Ipv4Addr::new(10, 0, 0, 1),
            source: std::io::Error::from(std::io::ErrorKind::AddrInUse),
        };
        assert!(err.to_string().contains("10.0.0.1"));
    }
}
