//! Deadline-driven timer scheduler.
//!
//! One background loop owns a min-heap of `(deadline, entity)` entries and
//! wakes the owning service at or after each deadline. This replaces
//! per-module polling loops: giveaway ends and temp-channel grace periods
//! both arm entries here, and cancellation is an explicit `cancel` call
//! (e.g. a member rejoining an emptied channel before its grace deadline).
//!
//! Re-arming a key supersedes its previous entry; stale heap entries are
//! skipped on pop via a per-key sequence number. Timers are not persisted;
//! the reconciliation pass re-arms them from each entity's `expires_at`
//! after a restart.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serenity::async_trait;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Identifies the entity a timer belongs to and the transition it drives.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimerKey {
    GiveawayEnd { giveaway_id: i32 },
    TempVoiceGrace { channel_id: String },
}

/// Implemented by the service layer; called once per due timer. The handler
/// runs the transition through the entity guard and version-guarded store,
/// so a timer racing a user-triggered mutation cannot interleave with it.
#[async_trait]
pub trait TimerHandler: Send + Sync {
    async fn on_due(&self, key: TimerKey);
}

enum Command {
    Arm { key: TimerKey, deadline: Instant },
    Cancel { key: TimerKey },
}

pub struct CommandReceiver(mpsc::UnboundedReceiver<Command>);

/// Cheap-to-clone handle for arming and cancelling timers.
#[derive(Clone)]
pub struct SchedulerHandle {
    tx: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    /// Creates the handle/receiver pair. The receiver is passed to `spawn`
    /// once the timer handler (which itself holds this handle) exists.
    pub fn channel() -> (SchedulerHandle, CommandReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (SchedulerHandle { tx }, CommandReceiver(rx))
    }

    /// Arms (or re-arms) the timer for `key`. A deadline in the past fires
    /// on the next loop iteration.
    pub fn arm(&self, key: TimerKey, due: DateTime<Utc>) {
        let delta = (due - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        let deadline = Instant::now() + delta;
        if self.tx.send(Command::Arm { key, deadline }).is_err() {
            warn!("timer scheduler is gone, dropping arm request");
        }
    }

    pub fn cancel(&self, key: TimerKey) {
        if self.tx.send(Command::Cancel { key }).is_err() {
            warn!("timer scheduler is gone, dropping cancel request");
        }
    }
}

struct TimerEntry {
    deadline: Instant,
    seq: u64,
    key: TimerKey,
}

impl PartialEq for TimerEntry {
    fn eq(&self, other: &Self) -> bool {
        self.deadline == other.deadline && self.seq == other.seq
    }
}

impl Eq for TimerEntry {}

impl PartialOrd for TimerEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimerEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.deadline
            .cmp(&other.deadline)
            .then(self.seq.cmp(&other.seq))
    }
}

/// Spawns the scheduler loop. Stops when every `SchedulerHandle` is dropped.
pub fn spawn(rx: CommandReceiver, handler: Arc<dyn TimerHandler>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run(rx, handler))
}

async fn run(rx: CommandReceiver, handler: Arc<dyn TimerHandler>) {
    let CommandReceiver(mut rx) = rx;
    let mut heap: BinaryHeap<Reverse<TimerEntry>> = BinaryHeap::new();
    // Sequence number of the live entry per key; heap entries with a stale
    // sequence were superseded or cancelled and are skipped on pop.
    let mut armed: HashMap<TimerKey, u64> = HashMap::new();
    let mut seq: u64 = 0;

    loop {
        let next_deadline = heap.peek().map(|Reverse(entry)| entry.deadline);

        tokio::select! {
            command = rx.recv() => match command {
                None => break,
                Some(Command::Arm { key, deadline }) => {
                    seq += 1;
                    armed.insert(key.clone(), seq);
                    heap.push(Reverse(TimerEntry { deadline, seq, key }));
                }
                Some(Command::Cancel { key }) => {
                    armed.remove(&key);
                }
            },
            () = sleep_until(next_deadline) => {
                let now = Instant::now();
                while heap
                    .peek()
                    .is_some_and(|Reverse(entry)| entry.deadline <= now)
                {
                    if let Some(Reverse(entry)) = heap.pop() {
                        if armed.get(&entry.key) == Some(&entry.seq) {
                            armed.remove(&entry.key);
                            debug!(key = ?entry.key, "timer due");
                            let handler = Arc::clone(&handler);
                            tokio::spawn(async move {
                                handler.on_due(entry.key).await;
                            });
                        }
                    }
                }
            }
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
