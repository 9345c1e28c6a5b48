mod config;
mod detect;
mod driver;
mod error;
mod git;
mod logging;
mod message;
mod models;
mod scheduler;
mod status;

use clap::Parser;
use chrono::Local;
use std::env;
use std::process;
use std::time::Duration;
use config::Config;
use error::{AppError, AppResult};
use git::GitCli;
use models::{CommitOutcome, CycleReport, PushOutcome};
use rand::rngs::StdRng;
use rand::SeedableRng;
use scheduler::Scheduler;
use status::StatusStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Commit and push working-tree changes on a timer")]
struct Args {
    #[arg(long, help = "Minutes between checks", value_name = "MINUTES")]
    interval: Option<u64>,

    #[arg(long, help = "Run a single check-and-commit cycle and exit")]
    once: bool,

    #[arg(long, help = "Show what would be committed without staging or committing")]
    dry_run: bool,

    #[arg(long, help = "Print the commit ledger and exit")]
    status: bool,

    #[arg(long, help = "Remote to push to", value_name = "NAME")]
    remote: Option<String>,

    #[arg(long, help = "Branch to push (defaults to the checked-out branch)", value_name = "BRANCH")]
    branch: Option<String>,
}

fn main() {
    logging::setup_logger();
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> AppResult<()> {
    let mut config = Config::load()?;
    if let Some(interval) = args.interval {
        config.interval_minutes = interval;
    }
    if let Some(remote) = args.remote {
        config.remote = remote;
    }
    if args.branch.is_some() {
        config.branch = args.branch;
    }
    if args.dry_run {
        config.auto_commit = false;
    }
    config.validate()?;

    let rt = tokio::runtime::Runtime::new()?;
    let runner = GitCli::new(
        env::current_dir()?,
        Duration::from_secs(config.command_timeout_secs),
    );

    let root = rt.block_on(git::ensure_repository(&runner)).map_err(|e| {
        eprintln!("Run \"git init\" first to initialize git.");
        e
    })?;
    config.ignore_ledger(&root);
    let store = StatusStore::new(config.status_path(&root));

    if args.status {
        handle_status(&store);
        return Ok(());
    }

    let interval = config.interval_minutes;
    let auto_commit = config.auto_commit;
    let scheduler = Scheduler::new(runner, config, store, StdRng::from_entropy());

    if args.once {
        return match rt.block_on(scheduler.run_cycle()) {
            CycleReport::DetectFailed(reason) => Err(AppError::RepositoryUnavailable(reason)),
            CycleReport::Attempted {
                files,
                commit: CommitOutcome::StageFailed | CommitOutcome::CommitFailed,
                ..
            } => Err(AppError::CycleFailed(format!(
                "{files} changed file(s) left uncommitted"
            ))),
            CycleReport::Attempted {
                push: PushOutcome::PushFailed,
                ..
            } => {
                println!("Commit saved locally; run again once the remote is reachable.");
                Ok(())
            }
            CycleReport::Previewed { files } => {
                println!("Dry run: {files} file(s) left untouched");
                Ok(())
            }
            _ => Ok(()),
        };
    }

    // Ctrl+C only flags cancellation; the loop exits once the current cycle is done.
    {
        let cancel = scheduler.cancel_handle();
        ctrlc::set_handler(move || {
            println!("\nStopping auto-commit...");
            cancel.cancel();
        })?;
    }

    println!("Auto-commit started");
    println!("  - Check interval: {} minute(s)", interval);
    println!("  - Auto-commit: {}", if auto_commit { "ENABLED" } else { "DISABLED" });
    println!("Press Ctrl+C to stop");
    println!("{}", "━".repeat(60));

    rt.block_on(scheduler.start(interval))?;

    scheduler.print_summary();
    println!("Auto-commit stopped.");
    Ok(())
}

fn handle_status(store: &StatusStore) {
    let status = store.load();

    println!("Ledger: {}", store.path().display());
    println!("Total commits: {}", status.total_commits);
    match status.last_commit {
        Some(at) => println!(
            "Last commit: {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        ),
        None => println!("Last commit: never"),
    }

    if status.sessions.is_empty() {
        return;
    }
    println!("Recent sessions:");
    for session in status.sessions.iter().rev().take(10) {
        println!(
            "  {} → {}  {} commit(s)",
            session.started_at.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
            session.last_commit_at.with_timezone(&Local).format("%H:%M"),
            session.commits
        );
    }
}
