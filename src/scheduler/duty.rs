// src/scheduler/duty.rs

use crate::common::timing;

/// Where a duty is in its cycle.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DutyState {
    /// Waiting for its next due time.
    Idle,
    /// Due time reached, not yet started.
    Due,
    /// Started and not yet finished.
    Running,
}

/// One periodically scheduled responsibility of the control loop.
///
/// Each duty keeps its own next-due time on the millisecond clock, so one
/// duty running late or failing never moves another.
#[derive(Debug, Clone)]
pub struct Duty {
    name: &'static str,
    period_ms: u32,
    next_due_ms: u32,
    state: DutyState,
    runs: u32,
}

impl Duty {
    /// A duty first due at `first_due_ms`, then every `period_ms`.
    pub const fn new(name: &'static str, period_ms: u32, first_due_ms: u32) -> Self {
        Duty {
            name,
            period_ms,
            next_due_ms: first_due_ms,
            state: DutyState::Idle,
            runs: 0,
        }
    }

    /// Moves an idle duty to `Due` once its time has come. Returns whether it is due.
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.state == DutyState::Idle && timing::reached(self.next_due_ms, now_ms) {
            self.state = DutyState::Due;
        }
        self.state == DutyState::Due
    }

    /// Marks a due duty as running.
    pub fn begin(&mut self) {
        debug_assert_eq!(self.state, DutyState::Due, "duty '{}' started while not due", self.name);
        self.state = DutyState::Running;
    }

    /// Returns the duty to `Idle` and schedules its next run.
    ///
    /// The next due time advances by one period from the previous one. If the
    /// loop fell a full period behind, it restarts from `now_ms` instead of
    /// firing a burst of catch-up runs.
    pub fn finish(&mut self, now_ms: u32) {
        self.state = DutyState::Idle;
        self.runs = self.runs.wrapping_add(1);
        self.next_due_ms = self.next_due_ms.wrapping_add(self.period_ms);
        if timing::reached(self.next_due_ms, now_ms) {
            log::debug!("duty '{}' fell behind, rescheduling from now", self.name);
            self.next_due_ms = now_ms.wrapping_add(self.period_ms);
        }
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn state(&self) -> DutyState {
        self.state
    }

    #[inline]
    pub fn next_due_ms(&self) -> u32 {
        self.next_due_ms
    }

    /// Completed runs, successful or not.
    #[inline]
    pub fn runs(&self) -> u32 {
        self.runs
    }
}
