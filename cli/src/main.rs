mod arg_parser;
mod commands;

use arg_parser::{ArgParser, SubCommand};
use commands::JobCli;

use clap::Parser;
use jobqlib::config::Config;
use jobqlib::daemon;
use std::error;
use std::fs::OpenOptions;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn error::Error>> {
    let args = ArgParser::parse();
    let config = Config {
        data_dir: args.data_dir,
        max_workers: args.max_workers,
        poll_interval: Duration::from_secs(args.poll_secs),
    };

    // the daemon control commands are synchronous and never touch the queue
    match args.sub_command {
        SubCommand::Start => {
            let pid = daemon::start(&config)?;
            println!("Daemon started (pid {pid}).");
            return Ok(());
        }
        SubCommand::Stop => {
            daemon::stop(&config)?;
            println!("Daemon stopped.");
            return Ok(());
        }
        SubCommand::DaemonLoop => {
            let log = OpenOptions::new()
                .create(true)
                .append(true)
                .open(config.log_file())?;
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_writer(Arc::new(log))
                .init();
            daemon::run(config).await?;
            return Ok(());
        }
        _ => {}
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = JobCli::new(config.clone());
    match args.sub_command {
        SubCommand::Add { command } => cli.add(&command).await?,
        SubCommand::List => cli.list().await?,
        SubCommand::Run => cli.run().await?,
        SubCommand::Pause { job_id } => cli.pause(job_id).await?,
        SubCommand::Resume { job_id } => cli.resume(job_id).await?,
        SubCommand::View { job_id } => cli.view(job_id).await?,
        SubCommand::Delete { job_id } => cli.delete(job_id).await?,
        SubCommand::Clean => cli.clean().await?,
        SubCommand::Start | SubCommand::Stop | SubCommand::DaemonLoop => unreachable!(),
    }

    // queued jobs only execute once the daemon is up (or via `run`)
    if !daemon::is_running(&config) {
        println!("Daemon is not running. Start it with `jobq start`.");
    }

    Ok(())
}
