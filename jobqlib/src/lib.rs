mod actors;
pub mod config;
pub mod control;
pub mod daemon;
pub mod errors;
mod output;
mod runner;
mod scheduler;
pub mod types;

// re-export the ledger actor handle as if it is the ledger itself.
pub use actors::ledger::LedgerHandle as Ledger;
pub use output::OutputStore;
pub use runner::Runner;
pub use scheduler::Scheduler;
pub use types::{JobId, JobRecord, JobStatus};
