use crate::actors::ledger::LedgerHandle;
use crate::errors::{Error, Result};
use crate::output::OutputStore;
use crate::types::{JobId, JobStatus};

use bytes::{Bytes, BytesMut};
use std::env;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{error, info};

const DEFAULT_SHELL: &str = "/bin/sh";

/// Runs one job's command to completion and records the outcome: pid while
/// executing, output artifact and terminal status afterwards.
#[derive(Clone)]
pub struct Runner {
    ledger: LedgerHandle,
    outputs: OutputStore,
}

impl Runner {
    pub fn new(ledger: LedgerHandle, outputs: OutputStore) -> Self {
        Self { ledger, outputs }
    }

    /// Execute `command` for job `id`, blocking this worker until the
    /// subprocess exits. Failures are absorbed into the job's status and a
    /// log entry; the caller never sees an error.
    pub async fn execute(&self, id: JobId, command: &str) {
        match self.try_execute(id, command).await {
            Ok(status) => info!(job = id, %status, command, "job finished"),
            Err(err) => {
                error!(job = id, command, %err, "job failed");
                if let Err(err) = self.ledger.set_status(id, JobStatus::Error).await {
                    error!(job = id, %err, "could not record job failure");
                }
            }
        }
    }

    async fn try_execute(&self, id: JobId, command: &str) -> Result<JobStatus> {
        let shell = env::var("SHELL").unwrap_or_else(|_| DEFAULT_SHELL.to_string());
        info!(job = id, %shell, command, "starting job");
        let mut child = Command::new(&shell)
            .arg("-c")
            .arg(command)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(Error::Spawn)?;

        if let Some(pid) = child.id() {
            self.ledger.record_pid(id, pid).await?;
        }

        // drain both pipes off-task so neither can fill and stall the child
        let stdout_task = child.stdout.take().map(|stdout| tokio::spawn(drain(stdout)));
        let stderr_task = child.stderr.take().map(|stderr| tokio::spawn(drain(stderr)));

        let exit = child.wait().await.map_err(Error::Spawn)?;
        let stdout = collect(stdout_task).await;
        let stderr = collect(stderr_task).await;

        self.ledger.clear_pid(id).await?;
        self.outputs.write(id, &stdout, &stderr).await?;

        if exit.success() {
            self.ledger.set_status(id, JobStatus::Completed).await?;
            Ok(JobStatus::Completed)
        } else {
            error!(job = id, code = ?exit.code(), command, "job exited with failure");
            self.ledger.set_status(id, JobStatus::Error).await?;
            Ok(JobStatus::Error)
        }
    }
}

async fn drain(mut reader: impl AsyncRead + Unpin) -> Bytes {
    let mut buf = BytesMut::with_capacity(4096);
    loop {
        match reader.read_buf(&mut buf).await {
            Ok(n) if n > 0 => {}
            _ => break,
        }
    }
    buf.freeze()
}

async fn collect(task: Option<JoinHandle<Bytes>>) -> Bytes {
    match task {
        Some(task) => task.await.unwrap_or_default(),
        None => Bytes::new(),
    }
}
