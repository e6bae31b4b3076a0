use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Queue shell commands and run them in the background
#[derive(Debug, Parser)]
pub struct ArgParser {
    /// Directory holding the job ledger and output artifacts
    #[clap(
        short = 'd',
        long = "data-dir",
        env = "JOBQ_DATA_DIR",
        default_value = "."
    )]
    pub data_dir: PathBuf,

    /// Maximum number of jobs executed concurrently
    #[clap(long, env = "JOBQ_MAX_WORKERS", default_value_t = 10)]
    pub max_workers: usize,

    /// Seconds the daemon sleeps between ledger scans
    #[clap(long, env = "JOBQ_POLL_SECS", default_value_t = 10)]
    pub poll_secs: u64,

    /// The sub-command to use
    #[clap(subcommand)]
    pub sub_command: SubCommand,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum SubCommand {
    /// queue a new shell command
    Add {
        /// the shell command to run, quoted as one argument
        command: String,
    },
    /// list every job with its status
    List,
    /// run every pending job now, without the daemon
    Run,
    /// suspend a running job
    Pause {
        /// 1-based job id
        job_id: usize,
    },
    /// resume a paused job
    Resume {
        /// 1-based job id
        job_id: usize,
    },
    /// print a job's captured output
    View {
        /// 1-based job id
        job_id: usize,
    },
    /// remove a job from the queue
    Delete {
        /// 1-based job id
        job_id: usize,
    },
    /// drop every completed or failed job
    Clean,
    /// start the background daemon
    Start,
    /// stop the background daemon
    Stop,
    /// the loop the detached daemon process runs; not for interactive use
    #[clap(hide = true)]
    DaemonLoop,
}
