use crate::actors::ledger::LedgerHandle;
use crate::errors::Result;
use crate::runner::Runner;

use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::debug;

/// Dispatches eligible jobs to a bounded pool of concurrent workers.
#[derive(Clone)]
pub struct Scheduler {
    ledger: LedgerHandle,
    runner: Runner,
    slots: Arc<Semaphore>,
}

impl Scheduler {
    pub fn new(ledger: LedgerHandle, runner: Runner, max_workers: usize) -> Self {
        Self {
            ledger,
            runner,
            slots: Arc::new(Semaphore::new(max_workers)),
        }
    }

    /// Scan the ledger once and launch every PENDING job in ascending index
    /// order, bounded by the worker limit. The whole eligible set is claimed
    /// (marked RUNNING) in one ledger pass before anything launches, so a
    /// ledger failure here launches nothing and an overlapping scan cannot
    /// dispatch the same job a second time.
    ///
    /// Submission is fire-and-forget: dropping the returned handles leaves
    /// the jobs running detached.
    pub async fn dispatch_pending(&self) -> Result<Vec<JoinHandle<()>>> {
        let claimed = self.ledger.claim_pending().await?;
        let mut handles = Vec::with_capacity(claimed.len());
        for (id, command) in claimed {
            debug!(job = id, %command, "dispatching job");
            let slots = Arc::clone(&self.slots);
            let runner = self.runner.clone();
            handles.push(tokio::spawn(async move {
                let _permit = slots.acquire_owned().await.expect("worker pool closed");
                runner.execute(id, &command).await;
            }));
        }
        Ok(handles)
    }

    /// One-shot dispatch: launch every pending job and wait for all of them
    /// to finish.
    pub async fn run_all(&self) -> Result<()> {
        let handles = self.dispatch_pending().await?;
        join_all(handles).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::output::OutputStore;
    use crate::types::JobStatus;
    use std::path::Path;
    use std::time::{Duration, Instant};
    use tempfile::tempdir;

    fn fixture(dir: &Path, max_workers: usize) -> (LedgerHandle, Scheduler) {
        let config = Config::new(dir);
        let ledger = LedgerHandle::spawn(config.clone());
        let runner = Runner::new(ledger.clone(), OutputStore::new(&config));
        let scheduler = Scheduler::new(ledger.clone(), runner, max_workers);
        (ledger, scheduler)
    }

    #[tokio::test]
    async fn pending_job_is_dispatched_exactly_once() {
        let dir = tempdir().unwrap();
        let (ledger, scheduler) = fixture(dir.path(), 4);
        let marker = dir.path().join("marker");
        let command = format!("echo ran >> {}", marker.display());
        ledger.append(command).await.unwrap();

        let first = scheduler.dispatch_pending().await.unwrap();
        // second scan in immediate succession sees the job as RUNNING
        let second = scheduler.dispatch_pending().await.unwrap();
        assert!(second.is_empty());

        join_all(first).await;
        let contents = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(contents.lines().count(), 1);
        assert_eq!(
            ledger.snapshot().await.unwrap()[0].status,
            JobStatus::Completed
        );
    }

    #[tokio::test]
    async fn concurrent_scans_never_double_claim() {
        let dir = tempdir().unwrap();
        let (ledger, scheduler) = fixture(dir.path(), 4);
        let marker = dir.path().join("claims");
        let command = format!("echo ran >> {}", marker.display());
        ledger.append(command).await.unwrap();

        let (first, second) =
            tokio::join!(scheduler.dispatch_pending(), scheduler.dispatch_pending());
        let mut handles = first.unwrap();
        handles.extend(second.unwrap());
        assert_eq!(handles.len(), 1);

        join_all(handles).await;
        let contents = std::fs::read_to_string(&marker).unwrap();
        assert_eq!(contents.lines().count(), 1);
    }

    #[tokio::test]
    async fn finished_jobs_are_not_redispatched() {
        let dir = tempdir().unwrap();
        let (ledger, scheduler) = fixture(dir.path(), 2);
        ledger.append("true").await.unwrap();
        ledger.append("exit 1").await.unwrap();

        scheduler.run_all().await.unwrap();
        let statuses: Vec<_> = ledger
            .snapshot()
            .await
            .unwrap()
            .iter()
            .map(|r| r.status)
            .collect();
        assert_eq!(statuses, vec![JobStatus::Completed, JobStatus::Error]);

        let handles = scheduler.dispatch_pending().await.unwrap();
        assert!(handles.is_empty());
    }

    #[tokio::test]
    async fn worker_limit_bounds_concurrency() {
        let dir = tempdir().unwrap();
        let (ledger, scheduler) = fixture(dir.path(), 1);
        ledger.append("sleep 0.3").await.unwrap();
        ledger.append("sleep 0.3").await.unwrap();

        let start = Instant::now();
        scheduler.run_all().await.unwrap();

        // with a single worker slot the jobs cannot overlap
        assert!(start.elapsed() >= Duration::from_millis(550));
    }
}
