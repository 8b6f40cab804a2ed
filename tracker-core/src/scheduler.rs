//! # Analysis Scheduler Module
//!
//! The producer side of the pipeline: decides when to pull a fresh test
//! tone and submit it to the worker. Two rules hold for any sequence of
//! events:
//!
//! - **Single-flight**: at most one analysis request is outstanding.
//! - **Throttling**: a new submission happens no sooner than the minimum
//!   interval after the previous completion.
//!
//! The scheduler is polled cooperatively from the UI tick; it never
//! blocks and never spins. All timing state lives in this one struct
//! rather than in ambient flags.

use std::time::{Duration, Instant};

/// Minimum time between a completion and the next submission.
pub const ANALYSIS_INTERVAL: Duration = Duration::from_millis(250);

/// Where the scheduler is in its submission cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No request outstanding; a submission may be considered.
    Idle,
    /// The caller is pulling a sample buffer and sending it.
    Submitting,
    /// A request is in flight; nothing may be submitted.
    AwaitingResult,
}

/// Paces analysis submissions against the worker.
#[derive(Debug)]
pub struct AnalysisScheduler {
    state: SchedulerState,
    running: bool,
    ready: bool,
    interval: Duration,
    /// When the last request completed. `None` means the throttle is
    /// open and the next poll may submit immediately.
    last_completion: Option<Instant>,
}

impl AnalysisScheduler {
    pub fn new() -> Self {
        Self::with_interval(ANALYSIS_INTERVAL)
    }

    /// Mainly for tests; production code uses [`ANALYSIS_INTERVAL`].
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            state: SchedulerState::Idle,
            running: false,
            ready: false,
            interval,
            last_completion: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Flips the external running flag. Stopping only suppresses future
    /// submissions; an in-flight request still completes normally.
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    /// Records that the worker finished (or failed) initialization.
    /// Until ready, every poll is a no-op.
    pub fn set_ready(&mut self, ready: bool) {
        self.ready = ready;
    }

    /// Forgets the completion baseline so the next poll submits
    /// immediately. Called when the requested test frequency changes
    /// while running; it never cancels the in-flight request.
    pub fn reset_baseline(&mut self) {
        self.last_completion = None;
    }

    /// True when a submission is allowed right now: running, worker
    /// ready, nothing in flight, and the throttle interval elapsed since
    /// the last completion.
    pub fn should_submit(&self, now: Instant) -> bool {
        if !self.running || !self.ready || self.state != SchedulerState::Idle {
            return false;
        }
        match self.last_completion {
            Some(completed_at) => now.duration_since(completed_at) >= self.interval,
            None => true,
        }
    }

    /// Attempts the Idle -> Submitting transition. On `true` the caller
    /// must pull a sample buffer, send it, and call [`mark_submitted`].
    ///
    /// [`mark_submitted`]: AnalysisScheduler::mark_submitted
    pub fn begin_submission(&mut self, now: Instant) -> bool {
        if !self.should_submit(now) {
            return false;
        }
        self.state = SchedulerState::Submitting;
        true
    }

    /// Submitting -> AwaitingResult, once the Analyze message is sent.
    pub fn mark_submitted(&mut self) {
        debug_assert_eq!(self.state, SchedulerState::Submitting);
        self.state = SchedulerState::AwaitingResult;
    }

    /// AwaitingResult -> Idle on either outcome of the request. Records
    /// the completion timestamp the throttle measures from.
    pub fn mark_completed(&mut self, now: Instant) {
        self.state = SchedulerState::Idle;
        self.last_completion = Some(now);
    }
}

impl Default for AnalysisScheduler {
    fn default() -> Self {
        Self::new()
    }
}
