use crate::errors::Result;
use crate::types::{JobId, JobRecord, JobStatus};
use tokio::sync::oneshot;

pub enum LedgerMessage {
    Append {
        command: String,
        response: oneshot::Sender<Result<JobId>>,
    },
    Snapshot {
        response: oneshot::Sender<Result<Vec<JobRecord>>>,
    },
    ClaimPending {
        response: oneshot::Sender<Result<Vec<(JobId, String)>>>,
    },
    SetStatus {
        id: JobId,
        status: JobStatus,
        response: oneshot::Sender<Result<()>>,
    },
    Delete {
        id: JobId,
        response: oneshot::Sender<Result<()>>,
    },
    Compact {
        response: oneshot::Sender<Result<()>>,
    },
    RecordPid {
        id: JobId,
        pid: u32,
        response: oneshot::Sender<Result<()>>,
    },
    ClearPid {
        id: JobId,
        response: oneshot::Sender<Result<()>>,
    },
    PidOf {
        id: JobId,
        response: oneshot::Sender<Result<Option<u32>>>,
    },
    Pids {
        response: oneshot::Sender<Result<Vec<(JobId, u32)>>>,
    },
}
