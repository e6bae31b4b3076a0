mod actor;
mod messages;

use self::actor::Ledger;
use self::messages::LedgerMessage::{
    self, Append, ClaimPending, ClearPid, Compact, Delete, PidOf, Pids, RecordPid, SetStatus,
    Snapshot,
};
use crate::config::Config;
use crate::errors::Result;
use crate::types::{JobId, JobRecord, JobStatus};
use tokio::sync::{mpsc, oneshot};

/// A handle to the job ledger: durable storage for job commands, statuses,
/// and the pid map of currently executing jobs.
///
/// This struct is actually an actor handle, the real file I/O is done in the
/// actor spawned by `LedgerHandle::spawn`. Because the actor processes one
/// message at a time, every mutation is a serialized read-modify-write of the
/// whole ledger, which is exactly the locking discipline the ledger needs.
/// The handle can be cloned freely in a multi-thread async context without
/// an `Arc<Mutex>` or any other means of synchronization.
#[derive(Clone)]
pub struct LedgerHandle {
    sender: mpsc::Sender<LedgerMessage>,
}

impl LedgerHandle {
    /// Spawn a ledger actor owning the artifacts under `config.data_dir`.
    pub fn spawn(config: Config) -> Self {
        let (sender, receiver) = mpsc::channel(32);
        Ledger::spawn(receiver, config);
        Self { sender }
    }

    /// Append a new job in PENDING state and return its 1-based id.
    pub async fn append(&self, command: impl Into<String>) -> Result<JobId> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Append {
                command: command.into(),
                response: tx,
            })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Point-in-time snapshot of every job with its status.
    pub async fn snapshot(&self) -> Result<Vec<JobRecord>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Snapshot { response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Atomically mark every PENDING job RUNNING and return the claimed
    /// (id, command) pairs in index order. All-or-nothing: a failure claims
    /// no job, and two overlapping claims can never take the same job.
    pub async fn claim_pending(&self) -> Result<Vec<(JobId, String)>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ClaimPending { response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Update exactly one job's status in place.
    pub async fn set_status(&self, id: JobId, status: JobStatus) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(SetStatus {
                id,
                status,
                response: tx,
            })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Remove one job; every later job shifts down by one id.
    pub async fn delete(&self, id: JobId) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Delete { id, response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Drop every COMPLETED or ERROR job, preserving the order of the rest.
    pub async fn compact(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Compact { response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Record the pid of a job's executing subprocess.
    pub async fn record_pid(&self, id: JobId, pid: u32) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(RecordPid {
                id,
                pid,
                response: tx,
            })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Remove a job's pid map entry once its subprocess terminates.
    pub async fn clear_pid(&self, id: JobId) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(ClearPid { id, response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Look up the pid of a job's executing subprocess, if any.
    pub async fn pid_of(&self, id: JobId) -> Result<Option<u32>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(PidOf { id, response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }

    /// Every recorded (job id, pid) pair.
    pub async fn pids(&self) -> Result<Vec<(JobId, u32)>> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(Pids { response: tx })
            .await
            .expect("Ledger exited");
        rx.await.expect("Ledger exited")
    }
}
