use jobqlib::config::Config;
use jobqlib::control;
use jobqlib::errors::Result;
use jobqlib::{JobId, Ledger, OutputStore, Runner, Scheduler};

/// Thin dispatch layer over the job library for one CLI invocation.
pub struct JobCli {
    config: Config,
    ledger: Ledger,
    outputs: OutputStore,
}

impl JobCli {
    pub fn new(config: Config) -> Self {
        let ledger = Ledger::spawn(config.clone());
        let outputs = OutputStore::new(&config);
        Self {
            config,
            ledger,
            outputs,
        }
    }

    pub async fn add(&self, command: &str) -> Result<()> {
        let id = self.ledger.append(command).await?;
        println!("Added job {id}.");
        Ok(())
    }

    pub async fn list(&self) -> Result<()> {
        for (idx, record) in self.ledger.snapshot().await?.iter().enumerate() {
            println!("{}. [{}] {}", idx + 1, record.status, record.command);
        }
        Ok(())
    }

    /// One-shot run: dispatch every pending job and wait for completion so
    /// the process does not exit with jobs still in flight.
    pub async fn run(&self) -> Result<()> {
        let runner = Runner::new(self.ledger.clone(), self.outputs.clone());
        let scheduler = Scheduler::new(self.ledger.clone(), runner, self.config.max_workers);
        scheduler.run_all().await
    }

    pub async fn pause(&self, id: JobId) -> Result<()> {
        control::pause(&self.ledger, id).await?;
        println!("Paused job {id}.");
        Ok(())
    }

    pub async fn resume(&self, id: JobId) -> Result<()> {
        control::resume(&self.ledger, id).await?;
        println!("Resumed job {id}.");
        Ok(())
    }

    pub async fn view(&self, id: JobId) -> Result<()> {
        match self.outputs.read(id).await? {
            Some(contents) => print!("{contents}"),
            None => println!("No output yet for job {id}."),
        }
        Ok(())
    }

    pub async fn delete(&self, id: JobId) -> Result<()> {
        self.ledger.delete(id).await?;
        println!("Deleted job {id}.");
        Ok(())
    }

    pub async fn clean(&self) -> Result<()> {
        self.ledger.compact().await?;
        println!("Cleared completed and failed jobs.");
        Ok(())
    }
}
