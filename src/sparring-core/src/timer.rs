//! Round countdown and the tick source that drives it.
//!
//! [`RoundTimer`] is the pure countdown state machine. [`TickSource`] owns the
//! spawned task emitting one tick per interval; only one is alive at a time.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Length of a round in seconds.
pub const ROUND_SECONDS: u32 = 300;

/// State of the round countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running,
    Expired,
}

/// Result of feeding one tick into the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Still running with this many seconds left.
    Running(u32),
    /// Reached zero on this tick.
    Expired,
    /// Timer was not running; nothing changed.
    Ignored,
}

/// Countdown for a single round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTimer {
    state: TimerState,
    time_left: u32,
}

impl Default for RoundTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            time_left: ROUND_SECONDS,
        }
    }

    /// Reset to a full round and start counting down.
    pub fn start(&mut self) {
        self.time_left = ROUND_SECONDS;
        self.state = TimerState::Running;
    }

    /// Advance the countdown by one second.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != TimerState::Running {
            return TickOutcome::Ignored;
        }

        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.state = TimerState::Expired;
            TickOutcome::Expired
        } else {
            TickOutcome::Running(self.time_left)
        }
    }

    /// Continue counting down from the current remaining time.
    pub fn resume(&mut self) {
        if self.state == TimerState::Idle && self.time_left > 0 {
            self.state = TimerState::Running;
        }
    }

    /// Halt a running countdown, keeping the remaining time.
    pub fn stop(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Idle;
        }
    }

    /// Put the countdown at rest with the given remaining time (capped to a round).
    pub fn reset(&mut self, seconds: u32) {
        self.time_left = seconds.min(ROUND_SECONDS);
        self.state = TimerState::Idle;
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    /// The mm:ss display of the remaining time.
    pub fn display(&self) -> String {
        format_time(self.time_left)
    }
}

/// Format seconds as zero-padded `MM:SS`.
pub fn format_time(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Handle to the spawned task emitting ticks for the active countdown.
///
/// Every start bumps the generation, and each tick carries the generation of
/// the task that sent it, so ticks queued by a superseded task can be told
/// apart and dropped by the receiver.
#[derive(Debug, Default)]
pub struct TickSource {
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

impl TickSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort any running tick task and spawn a new one.
    ///
    /// The first tick arrives after `initial_delay + interval`. Returns the
    /// generation assigned to the new task.
    pub fn start<S, F>(
        &mut self,
        tx: UnboundedSender<S>,
        initial_delay: Duration,
        interval: Duration,
        signal: F,
    ) -> u64
    where
        S: Send + 'static,
        F: Fn(u64) -> S + Send + 'static,
    {
        self.cancel();
        self.generation += 1;
        let generation = self.generation;

        self.handle = Some(tokio::spawn(async move {
            if !initial_delay.is_zero() {
                tokio::time::sleep(initial_delay).await;
            }

            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                if tx.send(signal(generation)).is_err() {
                    break;
                }
            }
        }));

        tracing::debug!(generation, "tick source started");
        generation
    }

    /// Stop the tick task if one is running.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!(generation = self.generation, "tick source cancelled");
        }
    }

    /// Whether a tick with this generation comes from the live task.
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && generation == self.generation
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl Drop for TickSource {
    fn drop(&mut self) {
        self.cancel();
    }
}
