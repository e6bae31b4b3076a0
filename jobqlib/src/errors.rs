use crate::types::JobId;
use std::io;
use std::result;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no job with id {0}")]
    NoSuchJob(JobId),
    #[error("job {id} has no running process")]
    NotRunning { id: JobId },
    #[error("failed to spawn process: {0}")]
    Spawn(#[source] io::Error),
    #[error("failed to signal job {id}: {source}")]
    Signal { id: JobId, source: nix::Error },
    #[error("daemon is already running")]
    DaemonAlreadyRunning,
    #[error("daemon is not running")]
    DaemonNotRunning,
    #[error("artifact i/o failure: {0}")]
    Io(#[from] io::Error),
    #[error("ledger is malformed: {0}")]
    Malformed(String),
    #[error("command must be a single non-empty line")]
    InvalidCommand,
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = result::Result<T, Error>;
