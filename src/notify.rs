/// Completion notification to the parent process.
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;

pub trait Notifier {
    fn notify(&self, pid: i32) -> std::io::Result<()>;
}

/// Delivers SIGUSR1, the contract the provisioning parent waits on.
pub struct SigusrNotifier;

impl Notifier for SigusrNotifier {
    fn notify(&self, pid: i32) -> std::io::Result<()> {
        kill(Pid::from_raw(pid), Signal::SIGUSR1)
            .map_err(|errno| std::io::Error::from_raw_os_error(errno as i32))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notify_to_dead_pid_reports_an_error() {
        // PIDs near i32::MAX are beyond pid_max on any realistic system.
        let err = SigusrNotifier.notify(i32::MAX - 1).unwrap_err();
        assert!(err.raw_os_error().is_some());
    }

    #[tokio::test]
    async fn sigusr1_reaches_a_real_child_process() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .unwrap();
        let pid = child.id().unwrap() as i32;

        SigusrNotifier.notify(pid).unwrap();

        // Default disposition for SIGUSR1 terminates the child.
        let status = tokio::time::timeout(std::time::Duration::from_secs(5), child.wait())
            .await
            .expect("child should die promptly")
            .unwrap();
        assert!(!status.success());
        use std::os::unix::process::ExitStatusExt;
        assert_eq!(status.signal(), Some(Signal::SIGUSR1 as i32));
    }
}
