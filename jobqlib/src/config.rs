use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration: where the job ledger lives and how the daemon
/// schedules work. The poll interval and worker limit are startup
/// configuration rather than constants so deployments can tune them.
#[derive(Clone, Debug)]
pub struct Config {
    /// Directory holding every persisted artifact.
    pub data_dir: PathBuf,
    /// Upper bound on concurrently executing jobs.
    pub max_workers: usize,
    /// How long the daemon sleeps between ledger scans.
    pub poll_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            max_workers: 10,
            poll_interval: Duration::from_secs(10),
        }
    }

    /// Job ledger: one command per line.
    pub fn jobs_file(&self) -> PathBuf {
        self.data_dir.join("jobs.txt")
    }

    /// Status ledger: one keyword per line, index-aligned with the job ledger.
    pub fn status_file(&self) -> PathBuf {
        self.data_dir.join("status.txt")
    }

    /// PID map: `index:pid` lines for currently executing jobs.
    pub fn pids_file(&self) -> PathBuf {
        self.data_dir.join("pids.txt")
    }

    /// Directory of per-job captured output files.
    pub fn output_dir(&self) -> PathBuf {
        self.data_dir.join("output")
    }

    /// Daemon lock artifact: single line holding the daemon's pid.
    pub fn lock_file(&self) -> PathBuf {
        self.data_dir.join("jobq.lock")
    }

    /// Daemon log file.
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("jobq.log")
    }
}
