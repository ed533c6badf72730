//! Timer port used by playback to schedule auto-advance ticks.
//!
//! Playback never sleeps or spawns on its own. It asks a [`Timer`] for a
//! wake-up and gets a [`TimerToken`] back; whoever drives the timer hands the
//! token to [`Playback::on_tick`](crate::Playback::on_tick) when it fires.
//! Tokens that no longer match the pending one are ignored, so a cancelled
//! tick that was already in flight can't advance a replaced trace.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Handle for one scheduled wake-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

/// Schedule a callback after a delay, cancelable.
pub trait Timer {
    /// Arrange for `token` to fire after `delay`.
    fn schedule_after(&mut self, delay: Duration) -> TimerToken;

    /// Cancel a scheduled token. Unknown or already-fired tokens are ignored.
    fn cancel(&mut self, token: TimerToken);
}

/// Deterministic timer with a hand-cranked clock.
#[derive(Debug, Default)]
pub struct ManualTimer {
    now: Duration,
    next_id: u64,
    pending: Vec<(TimerToken, Duration)>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the fake clock.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of scheduled, unfired tokens.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Delay until the earliest pending token fires.
    pub fn next_due_in(&self) -> Option<Duration> {
        self.pending
            .iter()
            .map(|&(_, due)| due)
            .min()
            .map(|due| due.saturating_sub(self.now))
    }

    /// Move the clock forward by `by` and return the tokens that fired, in
    /// due order.
    pub fn advance(&mut self, by: Duration) -> Vec<TimerToken> {
        self.now += by;
        let now = self.now;

        let mut fired: Vec<_> = self
            .pending
            .iter()
            .filter(|&&(_, due)| due <= now)
            .copied()
            .collect();
        fired.sort_by_key(|&(token, due)| (due, token));
        self.pending.retain(|&(_, due)| due > now);

        fired.into_iter().map(|(token, _)| token).collect()
    }

    /// Jump the clock to the earliest pending token and fire it alone.
    pub fn fire_next(&mut self) -> Option<TimerToken> {
        let (pos, &(token, due)) = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|&(_, &(token, due))| (due, token))?;
        self.now = self.now.max(due);
        self.pending.remove(pos);
        Some(token)
    }
}

impl Timer for ManualTimer {
    fn schedule_after(&mut self, delay: Duration) -> TimerToken {
        let token = TimerToken(self.next_id);
        self.next_id += 1;
        self.pending.push((token, self.now + delay));
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        self.pending.retain(|&(t, _)| t != token);
    }
}

/// Timer backed by tokio tasks.
///
/// Fired tokens are delivered on the channel returned by [`TokioTimer::new`].
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioTimer {
    next_id: u64,
    fired: mpsc::UnboundedSender<TimerToken>,
    tasks: HashMap<TimerToken, JoinHandle<()>>,
}

impl TokioTimer {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<TimerToken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = Self {
            next_id: 0,
            fired: tx,
            tasks: HashMap::new(),
        };
        (timer, rx)
    }
}

impl Timer for TokioTimer {
    fn schedule_after(&mut self, delay: Duration) -> TimerToken {
        self.tasks.retain(|_, task| !task.is_finished());

        let token = TimerToken(self.next_id);
        self.next_id += 1;

        let tx = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the server is shutting down
            let _ = tx.send(token);
        });
        self.tasks.insert(token, task);
        token
    }

    fn cancel(&mut self, token: TimerToken) {
        if let Some(task) = self.tasks.remove(&token) {
            task.abort();
        }
    }
}
