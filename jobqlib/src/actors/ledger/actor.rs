use super::messages::LedgerMessage;
use crate::config::Config;
use crate::errors::{Error, Result};
use crate::types::{JobId, JobRecord, JobStatus};

use std::fmt::Write as _;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::info;

pub struct Ledger {
    inbox: mpsc::Receiver<LedgerMessage>,
    config: Config,
}

impl Ledger {
    pub fn spawn(inbox: mpsc::Receiver<LedgerMessage>, config: Config) {
        let actor = Self { inbox, config };
        tokio::spawn(async move { actor.run().await });
    }

    // One message at a time: this loop is the exclusive lock over the
    // ledger files within this process.
    async fn run(mut self) {
        use LedgerMessage::*;
        while let Some(msg) = self.inbox.recv().await {
            match msg {
                Append { command, response } => {
                    let _ = response.send(self.append(command).await);
                }
                Snapshot { response } => {
                    let _ = response.send(self.load().await);
                }
                ClaimPending { response } => {
                    let _ = response.send(self.claim_pending().await);
                }
                SetStatus {
                    id,
                    status,
                    response,
                } => {
                    let _ = response.send(self.set_status(id, status).await);
                }
                Delete { id, response } => {
                    let _ = response.send(self.delete(id).await);
                }
                Compact { response } => {
                    let _ = response.send(self.compact().await);
                }
                RecordPid { id, pid, response } => {
                    let _ = response.send(self.record_pid(id, pid).await);
                }
                ClearPid { id, response } => {
                    let _ = response.send(self.clear_pid(id).await);
                }
                PidOf { id, response } => {
                    let _ = response.send(self.pid_of(id).await);
                }
                Pids { response } => {
                    let _ = response.send(self.load_pids().await);
                }
            }
        }
    }

    async fn append(&self, command: String) -> Result<JobId> {
        if command.is_empty() || command.contains('\n') {
            return Err(Error::InvalidCommand);
        }
        let mut records = self.load().await?;
        records.push(JobRecord {
            command,
            status: JobStatus::Pending,
        });
        self.store(&records).await?;
        let id = records.len();
        info!(job = id, command = %records[id - 1].command, "queued job");
        Ok(id)
    }

    // One read-modify-write claims the whole eligible set: either every
    // PENDING job flips to RUNNING or, on failure, none do.
    async fn claim_pending(&self) -> Result<Vec<(JobId, String)>> {
        let mut records = self.load().await?;
        let mut claimed = Vec::new();
        for (idx, record) in records.iter_mut().enumerate() {
            if record.status == JobStatus::Pending {
                record.status = JobStatus::Running;
                claimed.push((idx + 1, record.command.clone()));
            }
        }
        if !claimed.is_empty() {
            self.store(&records).await?;
        }
        Ok(claimed)
    }

    async fn set_status(&self, id: JobId, status: JobStatus) -> Result<()> {
        let mut records = self.load().await?;
        if id == 0 || id > records.len() {
            return Err(Error::NoSuchJob(id));
        }
        records[id - 1].status = status;
        self.store(&records).await
    }

    async fn delete(&self, id: JobId) -> Result<()> {
        let mut records = self.load().await?;
        if id == 0 || id > records.len() {
            return Err(Error::NoSuchJob(id));
        }
        let removed = records.remove(id - 1);
        self.store(&records).await?;
        info!(job = id, command = %removed.command, "deleted job");
        Ok(())
    }

    async fn compact(&self) -> Result<()> {
        let mut records = self.load().await?;
        let before = records.len();
        records.retain(|record| !record.status.is_terminal());
        self.store(&records).await?;
        info!(removed = before - records.len(), "compacted ledger");
        Ok(())
    }

    async fn record_pid(&self, id: JobId, pid: u32) -> Result<()> {
        let mut entries = self.load_pids().await?;
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.push((id, pid));
        self.store_pids(&entries).await
    }

    async fn clear_pid(&self, id: JobId) -> Result<()> {
        let mut entries = self.load_pids().await?;
        entries.retain(|(entry_id, _)| *entry_id != id);
        self.store_pids(&entries).await
    }

    async fn pid_of(&self, id: JobId) -> Result<Option<u32>> {
        let entries = self.load_pids().await?;
        Ok(entries
            .into_iter()
            .find(|(entry_id, _)| *entry_id == id)
            .map(|(_, pid)| pid))
    }

    async fn load(&self) -> Result<Vec<JobRecord>> {
        let commands = read_lines(&self.config.jobs_file()).await?;
        let statuses = read_lines(&self.config.status_file()).await?;
        if commands.len() != statuses.len() {
            return Err(Error::Malformed(format!(
                "job ledger has {} entries but status ledger has {}",
                commands.len(),
                statuses.len()
            )));
        }
        commands
            .into_iter()
            .zip(statuses)
            .map(|(command, status)| {
                Ok(JobRecord {
                    command,
                    status: status.parse()?,
                })
            })
            .collect()
    }

    async fn store(&self, records: &[JobRecord]) -> Result<()> {
        let mut commands = String::new();
        let mut statuses = String::new();
        for record in records {
            let _ = writeln!(commands, "{}", record.command);
            let _ = writeln!(statuses, "{}", record.status);
        }
        fs::create_dir_all(&self.config.data_dir).await?;
        fs::write(self.config.jobs_file(), commands).await?;
        fs::write(self.config.status_file(), statuses).await?;
        Ok(())
    }

    async fn load_pids(&self) -> Result<Vec<(JobId, u32)>> {
        read_lines(&self.config.pids_file())
            .await?
            .iter()
            .map(|line| parse_pid_entry(line))
            .collect()
    }

    async fn store_pids(&self, entries: &[(JobId, u32)]) -> Result<()> {
        let mut contents = String::new();
        for (id, pid) in entries {
            let _ = writeln!(contents, "{id}:{pid}");
        }
        fs::create_dir_all(&self.config.data_dir).await?;
        fs::write(self.config.pids_file(), contents).await?;
        Ok(())
    }
}

fn parse_pid_entry(line: &str) -> Result<(JobId, u32)> {
    line.split_once(':')
        .and_then(|(id, pid)| Some((id.parse().ok()?, pid.parse().ok()?)))
        .ok_or_else(|| Error::Malformed(format!("bad pid map entry {line:?}")))
}

async fn read_lines(path: &Path) -> Result<Vec<String>> {
    match fs::read_to_string(path).await {
        Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
        // missing files read as an empty ledger on first run
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}
