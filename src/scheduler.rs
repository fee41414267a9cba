// fmgc-vnav/src/scheduler.rs

use log::trace;
use std::time::Duration;

/// Handle of a scheduled task, used to cancel it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TaskToken(u64);

/// Deferred actions owned by the host loop.
pub trait TaskScheduler<A> {
    fn schedule(&mut self, action: A, delay: Duration) -> TaskToken;

    /// Returns `false` when the task already ran or was cancelled.
    fn cancel(&mut self, token: TaskToken) -> bool;
}

struct PendingTask<A> {
    token: TaskToken,
    due: Duration,
    action: A,
}

/// Scheduler driven by the simulation frame delta.
pub struct TickScheduler<A> {
    now: Duration,
    next_token: u64,
    pending: Vec<PendingTask<A>>,
}

impl<A> Default for TickScheduler<A> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_token: 0,
            pending: Vec::new(),
        }
    }
}

impl<A> TickScheduler<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves time forward and returns the actions that came due, oldest first.
    pub fn advance(&mut self, delta: Duration) -> Vec<A> {
        self.now += delta;

        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due <= self.now {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by_key(|task| task.due);

        if !due.is_empty() {
            trace!("{} scheduled task(s) due", due.len());
        }
        due.into_iter().map(|task| task.action).collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

impl<A> TaskScheduler<A> for TickScheduler<A> {
    fn schedule(&mut self, action: A, delay: Duration) -> TaskToken {
        let token = TaskToken(self.next_token);
        self.next_token += 1;
        self.pending.push(PendingTask {
            token,
            due: self.now + delay,
            action,
        });
        token
    }

    fn cancel(&mut self, token: TaskToken) -> bool {
        let before = self.pending.len();
        self.pending.retain(|task| task.token != token);
        self.pending.len() != before
    }
}
