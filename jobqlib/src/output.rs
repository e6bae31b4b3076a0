use crate::config::Config;
use crate::types::JobId;

use std::io;
use std::path::PathBuf;
use tokio::fs;

/// Divider between a job's stdout and stderr sections.
const ERROR_DIVIDER: &[u8] = b"\n--- Errors ---\n";

/// Per-job captured output, one file per job id, overwritten on each run.
#[derive(Clone)]
pub struct OutputStore {
    dir: PathBuf,
}

impl OutputStore {
    pub fn new(config: &Config) -> Self {
        Self {
            dir: config.output_dir(),
        }
    }

    fn path(&self, id: JobId) -> PathBuf {
        self.dir.join(format!("job_{id}.txt"))
    }

    /// Overwrite the job's artifact with its stdout, followed by stderr
    /// under the divider if any was produced.
    pub async fn write(&self, id: JobId, stdout: &[u8], stderr: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let mut contents = Vec::with_capacity(stdout.len() + stderr.len());
        contents.extend_from_slice(stdout);
        if !stderr.is_empty() {
            contents.extend_from_slice(ERROR_DIVIDER);
            contents.extend_from_slice(stderr);
        }
        fs::write(self.path(id), contents).await
    }

    /// Read back a job's captured output. None if the job has not run yet.
    pub async fn read(&self, id: JobId) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path(id)).await {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn stdout_only_has_no_divider() {
        let dir = tempdir().unwrap();
        let outputs = OutputStore::new(&Config::new(dir.path()));
        outputs.write(1, b"all good\n", b"").await.unwrap();
        assert_eq!(outputs.read(1).await.unwrap().unwrap(), "all good\n");
    }

    #[tokio::test]
    async fn stderr_lands_under_the_divider() {
        let dir = tempdir().unwrap();
        let outputs = OutputStore::new(&Config::new(dir.path()));
        outputs.write(2, b"partial", b"boom\n").await.unwrap();
        assert_eq!(
            outputs.read(2).await.unwrap().unwrap(),
            "partial\n--- Errors ---\nboom\n"
        );
    }

    #[tokio::test]
    async fn rerun_overwrites_previous_output() {
        let dir = tempdir().unwrap();
        let outputs = OutputStore::new(&Config::new(dir.path()));
        outputs.write(1, b"first", b"oops").await.unwrap();
        outputs.write(1, b"second", b"").await.unwrap();
        assert_eq!(outputs.read(1).await.unwrap().unwrap(), "second");
    }

    #[tokio::test]
    async fn missing_artifact_reads_as_none() {
        let dir = tempdir().unwrap();
        let outputs = OutputStore::new(&Config::new(dir.path()));
        assert_eq!(outputs.read(9).await.unwrap(), None);
    }
}
