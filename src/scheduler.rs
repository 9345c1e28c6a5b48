use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use rand::rngs::StdRng;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use ulid::Ulid;

use crate::config::Config;
use crate::detect::detect_changes;
use crate::driver::CommitDriver;
use crate::error::{AppError, AppResult};
use crate::git::CommandRunner;
use crate::message::synthesize;
use crate::models::{ChangeSet, CommitOutcome, CycleReport, PushOutcome};
use crate::status::StatusStore;

const PREVIEW_FILES: usize = 5;

/// Shared between the scheduler and the Ctrl+C handler.
#[derive(Default)]
pub struct CancelHandle {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}

/// Owns everything one process run needs: the git port, the ledger and the run counters.
pub struct Scheduler<R> {
    runner: R,
    config: Config,
    store: StatusStore,
    rng: Mutex<StdRng>,
    running: AtomicBool,
    commits_this_run: AtomicU64,
    session_id: String,
    started_at: DateTime<Utc>,
    cancel: Arc<CancelHandle>,
}

impl<R: CommandRunner> Scheduler<R> {
    pub fn new(runner: R, config: Config, store: StatusStore, rng: StdRng) -> Self {
        Scheduler {
            runner,
            config,
            store,
            rng: Mutex::new(rng),
            running: AtomicBool::new(false),
            commits_this_run: AtomicU64::new(0),
            session_id: Ulid::new().to_string(),
            started_at: Utc::now(),
            cancel: Arc::new(CancelHandle::default()),
        }
    }

    pub fn cancel_handle(&self) -> Arc<CancelHandle> {
        self.cancel.clone()
    }

    pub fn commits_this_run(&self) -> u64 {
        self.commits_this_run.load(Ordering::SeqCst)
    }

    /// Run a cycle now and then every `interval_minutes` until cancelled.
    /// Cycles never overlap; ticks missed during a slow cycle are absorbed.
    pub async fn start(&self, interval_minutes: u64) -> AppResult<()> {
        if interval_minutes == 0 {
            return Err(AppError::Config(
                "interval must be at least 1 minute".to_string(),
            ));
        }
        if self.running.swap(true, Ordering::SeqCst) {
            warn!("scheduler already running, ignoring start");
            println!("⚠ Already running!");
            return Ok(());
        }

        info!(interval_minutes, session = %self.session_id, "watching for changes");
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_minutes * 60));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {}
            }

            self.run_cycle().await;

            if self.cancel.is_cancelled() {
                break;
            }
            println!("Next check in {} minute(s)...", interval_minutes);
            println!("{}", "━".repeat(60));
        }

        self.running.store(false, Ordering::SeqCst);
        Ok(())
    }

    /// One detect, synthesize, commit, push, persist pass.
    pub async fn run_cycle(&self) -> CycleReport {
        println!("\nChecking for changes... ({})", Local::now().format("%H:%M:%S"));

        let changes = match detect_changes(&self.runner, &self.config.ignore_patterns).await {
            Ok(changes) => changes,
            Err(e) => {
                println!("⚠ {}", e);
                return CycleReport::DetectFailed(e.to_string());
            }
        };

        if changes.is_empty() {
            println!("✓ No changes detected");
            return CycleReport::NoChanges;
        }
        print_preview(&changes);

        let message = {
            let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());
            synthesize(&changes, &mut *rng, Local::now())
        };

        if !self.config.auto_commit {
            println!("\nWould commit:\n{}", message.as_str());
            return CycleReport::Previewed {
                files: changes.len(),
            };
        }

        let target = self.config.push_target();
        let (commit, push) = CommitDriver::new(&self.runner, &target).run(&message).await;
        report_outcome(commit, push);

        if commit == CommitOutcome::Committed {
            println!("  {}", message.header());
            self.record_commit();
        }

        CycleReport::Attempted {
            files: changes.len(),
            commit,
            push,
        }
    }

    fn record_commit(&self) {
        let run_total = self.commits_this_run.fetch_add(1, Ordering::SeqCst) + 1;

        let mut status = self.store.load();
        status.record_commit(&self.session_id, self.started_at, Utc::now());
        if let Err(e) = self.store.save(&status) {
            warn!(error = %e, "status ledger not saved");
            println!("⚠ {}", e);
        }

        println!("Total commits this session: {}", run_total);
        println!("Total commits all time: {}", status.total_commits);
    }

    pub fn print_summary(&self) {
        println!("\nSession Summary:");
        println!("  - Commits this session: {}", self.commits_this_run());
    }
}

fn print_preview(changes: &ChangeSet) {
    println!("Found {} changed file(s):", changes.len());
    for path in changes.paths.iter().take(PREVIEW_FILES) {
        println!("   - {}", path);
    }
    if changes.len() > PREVIEW_FILES {
        println!("   - ... and {} more", changes.len() - PREVIEW_FILES);
    }
}

fn report_outcome(commit: CommitOutcome, push: PushOutcome) {
    match commit {
        CommitOutcome::Committed => println!("✓ Changes committed"),
        CommitOutcome::NothingToCommit => println!("✓ No changes to commit"),
        CommitOutcome::StageFailed => println!("⚠ Could not stage changes, skipping this cycle"),
        CommitOutcome::CommitFailed => println!("⚠ Commit failed, will try again next cycle"),
    }
    match push {
        PushOutcome::Pushed => println!("✓ Pushed"),
        PushOutcome::PushFailed => {
            println!("⚠ Push failed, the commit is saved locally and goes out with the next push")
        }
        PushOutcome::Skipped => {}
    }
}
