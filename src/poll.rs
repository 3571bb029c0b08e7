//! Live task updates.
//!
//! The detail view only needs to know when a task's status or seeker changes.
//! [`TaskUpdates`] hides how that is detected so a push transport could replace
//! polling later; [`PollingUpdates`] re-fetches the task on a fixed interval.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::ApiClient;
use crate::models::{Id, Task};

/// Default polling interval (5s).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

const CHANNEL_CAPACITY: usize = 16;

/// A detected change: the fresh snapshot plus whether chat should now show.
#[derive(Debug, Clone)]
pub struct TaskChange {
    pub task: Task,
    pub chat_visible: bool,
}

impl TaskChange {
    pub fn new(task: Task) -> Self {
        let chat_visible = task.status.chat_visible();
        Self { task, chat_visible }
    }
}

/// True when status or seeker differ. Seekers compare string-normalized.
pub fn has_changed(previous: Option<&Task>, current: &Task) -> bool {
    match previous {
        None => true,
        Some(prev) => {
            prev.status != current.status
                || prev.seeker_id.as_ref().map(Id::to_string)
                    != current.seeker_id.as_ref().map(Id::to_string)
        }
    }
}

#[derive(Default)]
struct BaselineState {
    generation: u64,
    task: Option<Task>,
}

/// Last-known snapshot shared by the session and the poller.
///
/// Every replacement bumps a generation counter. A poll result is only
/// compared against the baseline that was current when its fetch started.
#[derive(Clone, Default)]
pub struct Baseline {
    inner: Arc<Mutex<BaselineState>>,
}

impl Baseline {
    pub fn new(task: Option<Task>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(BaselineState {
                generation: 0,
                task,
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BaselineState> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn get(&self) -> Option<Task> {
        self.lock().task.clone()
    }

    /// Replace the snapshot, e.g. after the session re-fetched the task.
    pub fn set(&self, task: Task) {
        let mut state = self.lock();
        state.task = Some(task);
        state.generation += 1;
    }

    /// Adopt `task` if the baseline is still at `generation` and the task
    /// changed. Returns whether it was adopted.
    pub fn advance(&self, generation: u64, task: &Task) -> bool {
        let mut state = self.lock();
        if state.generation != generation || !has_changed(state.task.as_ref(), task) {
            return false;
        }
        state.task = Some(task.clone());
        state.generation += 1;
        true
    }
}

/// A running update feed. Dropping it stops the feed.
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
    changes: mpsc::Receiver<TaskChange>,
}

impl Subscription {
    pub fn new(handle: JoinHandle<()>, changes: mpsc::Receiver<TaskChange>) -> Self {
        Self {
            handle: Some(handle),
            changes,
        }
    }

    /// Next change, or `None` once the feed has stopped.
    pub async fn recv(&mut self) -> Option<TaskChange> {
        self.changes.recv().await
    }

    pub fn is_active(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("task update subscription cancelled");
        }
        self.changes.close();
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Source of task change notifications.
pub trait TaskUpdates: Send + Sync {
    /// Start watching `task_id`. `baseline` holds the snapshot already shown
    /// and is kept current by both sides; while it is empty the first
    /// observation counts as a change.
    fn subscribe(&self, task_id: Id, baseline: Baseline) -> Subscription;
}

/// Interval polling against `GET /api/tasks/{id}`.
#[derive(Clone)]
pub struct PollingUpdates {
    api: ApiClient,
    interval: Duration,
}

impl PollingUpdates {
    pub fn new(api: ApiClient, interval: Duration) -> Self {
        Self { api, interval }
    }

    async fn run(
        api: ApiClient,
        task_id: Id,
        baseline: Baseline,
        interval: Duration,
        tx: mpsc::Sender<TaskChange>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the caller already holds a snapshot.
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let generation = baseline.generation();
            match api.task(&task_id).await {
                Ok(task) => {
                    if baseline.advance(generation, &task) {
                        tracing::info!(
                            task_id = %task_id,
                            status = %task.status,
                            "task changed"
                        );
                        if tx.send(TaskChange::new(task)).await.is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(task_id = %task_id, error = %e, "task poll failed");
                }
            }
        }
    }
}

impl TaskUpdates for PollingUpdates {
    fn subscribe(&self, task_id: Id, baseline: Baseline) -> Subscription {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = tokio::spawn(Self::run(
            self.api.clone(),
            task_id,
            baseline,
            self.interval,
            tx,
        ));
        Subscription::new(handle, rx)
    }
}
