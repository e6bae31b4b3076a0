//! Pause and resume of running jobs via process-control signals.

use crate::actors::ledger::LedgerHandle;
use crate::errors::{Error, Result};
use crate::types::{JobId, JobStatus};

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::info;

/// Suspend a running job with SIGSTOP and mark it PAUSED.
///
/// Errors if the job has no recorded subprocess or the signal cannot be
/// delivered, rather than silently skipping.
pub async fn pause(ledger: &LedgerHandle, id: JobId) -> Result<()> {
    deliver(ledger, id, Signal::SIGSTOP).await?;
    ledger.set_status(id, JobStatus::Paused).await?;
    info!(job = id, "paused job");
    Ok(())
}

/// Resume a paused job with SIGCONT and mark it RUNNING again.
pub async fn resume(ledger: &LedgerHandle, id: JobId) -> Result<()> {
    deliver(ledger, id, Signal::SIGCONT).await?;
    ledger.set_status(id, JobStatus::Running).await?;
    info!(job = id, "resumed job");
    Ok(())
}

async fn deliver(ledger: &LedgerHandle, id: JobId, sig: Signal) -> Result<()> {
    let pid = ledger.pid_of(id).await?.ok_or(Error::NotRunning { id })?;
    signal::kill(Pid::from_raw(pid as i32), sig).map_err(|source| Error::Signal { id, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::OutputStore;
    use crate::runner::Runner;
    use std::time::Duration;
    use tempfile::tempdir;

    #[tokio::test]
    async fn pause_without_recorded_pid_is_an_error() {
        let dir = tempdir().unwrap();
        let ledger = LedgerHandle::spawn(Config::new(dir.path()));
        ledger.append("sleep 1").await.unwrap();
        assert!(matches!(
            pause(&ledger, 1).await,
            Err(Error::NotRunning { id: 1 })
        ));
    }

    #[tokio::test]
    async fn pause_and_resume_cycle_a_live_job() {
        let dir = tempdir().unwrap();
        let config = Config::new(dir.path());
        let ledger = LedgerHandle::spawn(config.clone());
        let runner = Runner::new(ledger.clone(), OutputStore::new(&config));
        let command = "sleep 2";
        let id = ledger.append(command).await.unwrap();

        let exec = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.execute(id, "sleep 2").await })
        };

        // wait for the subprocess pid to land in the pid map
        let mut started = false;
        for _ in 0..100 {
            if ledger.pid_of(id).await.unwrap().is_some() {
                started = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(started, "job never registered a pid");

        pause(&ledger, id).await.unwrap();
        assert_eq!(ledger.snapshot().await.unwrap()[0].status, JobStatus::Paused);

        resume(&ledger, id).await.unwrap();
        assert_eq!(
            ledger.snapshot().await.unwrap()[0].status,
            JobStatus::Running
        );

        exec.await.unwrap();
        assert_eq!(
            ledger.snapshot().await.unwrap()[0].status,
            JobStatus::Completed
        );
    }
}
