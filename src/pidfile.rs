/// Pidfile handling: the only durable artifact this program produces.
///
/// Written once setup has fully succeeded, removed exactly once at
/// shutdown. Content is the decimal pid plus one trailing newline.
use std::path::Path;

pub fn write(path: &Path, pid: u32) -> std::io::Result<()> {
    std::fs::write(path, format!("{pid}\n"))
}

#[allow(dead_code)]
pub fn read(path: &Path) -> std::io::Result<u32> {
    let contents = std::fs::read_to_string(path)?;
    contents
        .trim_end_matches('\n')
        .parse()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Remove the pidfile. A missing file is fine; anything else is an error.
pub fn remove(path: &Path) -> std::io::Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_then_read_round_trips_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lt.pid");
        write(&path, 12345).unwrap();
        assert_eq!(read(&path).unwrap(), 12345);
    }

    #[test]
    fn content_is_decimal_pid_with_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lt.pid");
        write(&path, 42).unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw, "42\n");
    }

    #[test]
    fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lt.pid");
        write(&path, 1).unwrap();
        remove(&path).unwrap();
        assert!(!path.exists());
        // Second removal of an absent file is not an error.
        remove(&path).unwrap();
    }

    #[test]
    fn read_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lt.pid");
        std::fs::write(&path, "not-a-pid\n").unwrap();
        assert!(read(&path).is_err());
    }
}
