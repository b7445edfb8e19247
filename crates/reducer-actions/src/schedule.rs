//! Deferred-execution capability used to run flushes after the current
//! dispatch completes.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::runtime::Handle;

/// A unit of deferred work.
pub type ScheduledTask = Box<dyn FnOnce() + Send>;

/// Deferred-execution capability.
///
/// Implementations queue the task and return; the task must run strictly
/// after the current dispatch call stack has unwound. Running it synchronously
/// inside `schedule` would re-enter the store while its lock is held.
pub trait Schedule: Send + Sync {
    fn schedule(&self, delay: Duration, task: ScheduledTask);
}

/// Runs tasks on a tokio runtime.
///
/// This is the default capability: a zero-delay task lands on the runtime's
/// queue and executes on the next turn, after the dispatching call returns.
pub struct TokioSchedule {
    handle: Handle,
}

impl TokioSchedule {
    /// Capture the current runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime. Hosts without a runtime
    /// should inject [`QueueSchedule`] or their own implementation instead.
    pub fn new() -> Self {
        Self {
            handle: Handle::current(),
        }
    }

    pub fn with_handle(handle: Handle) -> Self {
        Self { handle }
    }
}

impl Schedule for TokioSchedule {
    fn schedule(&self, delay: Duration, task: ScheduledTask) {
        self.handle.spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            task();
        });
    }
}

/// Collects tasks for an explicit, host-driven drain loop.
///
/// Single-threaded hosts (and tests) hand this to the enhancer and call
/// [`run_until_idle`](QueueSchedule::run_until_idle) whenever they want
/// deferred work to happen. Tasks enqueued while draining are picked up in the
/// same call, so a replay cascade settles in one drain.
#[derive(Clone, Default)]
pub struct QueueSchedule {
    tasks: Arc<Mutex<VecDeque<ScheduledTask>>>,
}

impl QueueSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.tasks.lock().unwrap().len()
    }

    /// Run queued tasks, including any they enqueue, until none remain.
    /// Returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        loop {
            // Pop one at a time: a task may schedule follow-up work.
            let task = self.tasks.lock().unwrap().pop_front();
            match task {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl Schedule for QueueSchedule {
    fn schedule(&self, _delay: Duration, task: ScheduledTask) {
        self.tasks.lock().unwrap().push_back(task);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_schedule_runs_tasks_in_order() {
        let schedule = QueueSchedule::new();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let seen = Arc::clone(&seen);
            schedule.schedule(
                Duration::ZERO,
                Box::new(move || seen.lock().unwrap().push(i)),
            );
        }

        assert_eq!(schedule.pending(), 3);
        assert_eq!(schedule.run_until_idle(), 3);
        assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(schedule.pending(), 0);
    }

    #[test]
    fn test_tasks_enqueued_while_draining_run_in_same_drain() {
        let schedule = QueueSchedule::new();
        let inner = schedule.clone();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_outer = Arc::clone(&seen);

        schedule.schedule(
            Duration::ZERO,
            Box::new(move || {
                seen_outer.lock().unwrap().push("outer");
                let seen_inner = Arc::clone(&seen_outer);
                inner.schedule(
                    Duration::ZERO,
                    Box::new(move || seen_inner.lock().unwrap().push("inner")),
                );
            }),
        );

        assert_eq!(schedule.run_until_idle(), 2);
        assert_eq!(*seen.lock().unwrap(), vec!["outer", "inner"]);
    }

    #[tokio::test]
    async fn test_tokio_schedule_runs_task_after_current_turn() {
        let (tx, rx) = tokio::sync::oneshot::channel();
        let schedule = TokioSchedule::new();

        schedule.schedule(
            Duration::ZERO,
            Box::new(move || {
                let _ = tx.send(42);
            }),
        );

        assert_eq!(rx.await, Ok(42));
    }
}
