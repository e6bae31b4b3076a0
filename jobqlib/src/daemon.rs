//! The daemon supervisor: idempotent start/stop around a pid lock artifact,
//! and the long-lived polling loop that dispatches pending jobs.

use crate::actors::ledger::LedgerHandle;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::output::OutputStore;
use crate::runner::Runner;
use crate::scheduler::Scheduler;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use std::fs;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};
use tokio::signal::unix::{signal as unix_signal, SignalKind};
use tokio::time;
use tracing::{error, info, warn};

/// Hidden subcommand the detached daemon process runs.
pub const LOOP_COMMAND: &str = "daemon-loop";

/// Whether a daemon lock artifact is present.
pub fn is_running(config: &Config) -> bool {
    config.lock_file().exists()
}

/// Detach a new daemon process and record its pid in the lock artifact.
/// Refuses if the lock artifact already exists.
pub fn start(config: &Config) -> Result<u32> {
    check_poll_interval(config)?;
    if is_running(config) {
        return Err(Error::DaemonAlreadyRunning);
    }
    let exe = std::env::current_exe()?;
    let data_dir = config.data_dir.canonicalize()?;
    let child = Command::new(exe)
        .arg("--data-dir")
        .arg(&data_dir)
        .arg("--max-workers")
        .arg(config.max_workers.to_string())
        .arg("--poll-secs")
        .arg(config.poll_interval.as_secs().to_string())
        .arg(LOOP_COMMAND)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .map_err(Error::Spawn)?;
    fs::write(config.lock_file(), format!("{}\n", child.id()))?;
    info!(pid = child.id(), "daemon started");
    Ok(child.id())
}

/// Signal the recorded daemon process and remove the lock artifact.
/// Fire-and-forget: no confirmation that the process actually exited.
pub fn stop(config: &Config) -> Result<()> {
    if !is_running(config) {
        return Err(Error::DaemonNotRunning);
    }
    let contents = fs::read_to_string(config.lock_file())?;
    match contents.trim().parse::<i32>() {
        Ok(pid) => {
            if let Err(err) = signal::kill(Pid::from_raw(pid), Signal::SIGTERM) {
                warn!(pid, %err, "could not signal daemon; removing stale lock");
            } else {
                info!(pid, "daemon stopped");
            }
        }
        // a corrupt lock must still be clearable through `stop`
        Err(_) => warn!(contents = %contents.trim(), "daemon lock is corrupt; removing it"),
    }
    fs::remove_file(config.lock_file())?;
    Ok(())
}

/// The daemon loop: dispatch pending jobs every poll interval until a
/// termination signal arrives, then sweep any subprocesses still alive so
/// stopping the daemon does not orphan in-flight jobs.
pub async fn run(config: Config) -> Result<()> {
    check_poll_interval(&config)?;
    let ledger = LedgerHandle::spawn(config.clone());
    let runner = Runner::new(ledger.clone(), OutputStore::new(&config));
    let scheduler = Scheduler::new(ledger.clone(), runner, config.max_workers);

    let mut term = unix_signal(SignalKind::terminate())?;
    let mut tick = time::interval(config.poll_interval);
    info!(
        interval = ?config.poll_interval,
        workers = config.max_workers,
        "daemon loop started"
    );
    loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Err(err) = scheduler.dispatch_pending().await {
                    error!(%err, "dispatch failed");
                }
            }
            _ = term.recv() => {
                info!("termination signal received");
                terminate_children(&ledger).await;
                return Ok(());
            }
        }
    }
}

// a zero interval would panic inside tokio's interval timer, and the
// detached daemon process would die silently with its lock still on disk
fn check_poll_interval(config: &Config) -> Result<()> {
    if config.poll_interval.is_zero() {
        return Err(Error::Config(
            "poll interval must be at least one second".to_string(),
        ));
    }
    Ok(())
}

async fn terminate_children(ledger: &LedgerHandle) {
    let entries = match ledger.pids().await {
        Ok(entries) => entries,
        Err(err) => {
            error!(%err, "could not read pid map during shutdown");
            return;
        }
    };
    for (id, pid) in entries {
        info!(job = id, pid, "terminating in-flight job");
        if let Err(err) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!(job = id, pid, %err, "could not terminate job process");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn start_rejects_zero_poll_interval_without_locking() {
        let dir = tempdir().unwrap();
        let mut config = Config::new(dir.path());
        config.poll_interval = Duration::ZERO;
        assert!(matches!(start(&config), Err(Error::Config(_))));
        assert!(!config.lock_file().exists());
    }

    #[tokio::test]
    async fn run_rejects_zero_poll_interval_before_looping() {
        let dir = tempdir().unwrap();
        let mut config = Config::new(dir.path());
        config.poll_interval = Duration::ZERO;
        assert!(matches!(run(config).await, Err(Error::Config(_))));
    }

    #[test]
    fn start_refuses_when_lock_exists() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        fs::write(config.lock_file(), "12345\n").unwrap();
        assert!(matches!(start(&config), Err(Error::DaemonAlreadyRunning)));
    }

    #[test]
    fn stop_refuses_without_lock() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        assert!(matches!(stop(&config), Err(Error::DaemonNotRunning)));
    }

    #[test]
    fn stop_signals_recorded_pid_and_removes_lock() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        let mut child = Command::new("sleep").arg("30").spawn().unwrap();
        fs::write(config.lock_file(), format!("{}\n", child.id())).unwrap();

        stop(&config).unwrap();

        assert!(!config.lock_file().exists());
        let status = child.wait().unwrap();
        assert!(!status.success());
    }

    #[test]
    fn stop_with_garbage_lock_still_removes_it() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        fs::write(config.lock_file(), "not a pid\n").unwrap();
        stop(&config).unwrap();
        assert!(!config.lock_file().exists());
    }
}
