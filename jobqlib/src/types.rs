use crate::errors::Error;
use std::fmt;
use std::str::FromStr;

/// 1-based position of a job in the ledger. Position is the job's identity;
/// `delete` and `clean` shift every later id down by one.
pub type JobId = usize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Error,
    Paused,
}

impl JobStatus {
    /// Completed and Error jobs are finished; `clean` removes them.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keyword = match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Error => "ERROR",
            JobStatus::Paused => "PAUSED",
        };
        f.write_str(keyword)
    }
}

impl FromStr for JobStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "PENDING" => Ok(JobStatus::Pending),
            "RUNNING" => Ok(JobStatus::Running),
            "COMPLETED" => Ok(JobStatus::Completed),
            "ERROR" => Ok(JobStatus::Error),
            "PAUSED" => Ok(JobStatus::Paused),
            other => Err(Error::Malformed(format!("unknown status keyword {other:?}"))),
        }
    }
}

/// One row of a ledger snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JobRecord {
    pub command: String,
    pub status: JobStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_keywords_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Completed,
            JobStatus::Error,
            JobStatus::Paused,
        ] {
            assert_eq!(status.to_string().parse::<JobStatus>().unwrap(), status);
        }
    }

    #[test]
    fn unknown_keyword_is_malformed() {
        assert!(matches!(
            "SLEEPING".parse::<JobStatus>(),
            Err(Error::Malformed(_))
        ));
    }
}
