//! Reveal timer — one pending step on a virtual clock
//!
//! The reveal sequence is a chain: each step, when it fires, schedules the
//! next. Holding at most one pending step makes it impossible for two
//! reveals to overlap, and cancelling the slot stops the whole chain.

/// What the orchestrator does when the pending step comes due
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Pre-roll over: start decelerating and reveal the first winner
    BeginReveal,
    /// Reveal the winner at this index
    RevealNext(usize),
    /// Trailing buffer over: commit and return to idle
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pending {
    due_ms: f64,
    action: TimerAction,
}

/// Single-slot cancellable timer
#[derive(Debug, Clone, Default)]
pub struct RevealTimer {
    pending: Option<Pending>,
}

impl RevealTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the slot, replacing whatever was pending
    pub fn schedule(&mut self, due_ms: f64, action: TimerAction) {
        if let Some(old) = self.pending.replace(Pending { due_ms, action }) {
            log::warn!("RevealTimer: replaced pending {:?} due at {:.1}ms", old.action, old.due_ms);
        }
    }

    /// Disarm; returns the action that was pending, if any
    pub fn cancel(&mut self) -> Option<TimerAction> {
        self.pending.take().map(|p| p.action)
    }

    /// Take the pending step if it is due at `now_ms`.
    ///
    /// Returns the action with its due time, so callers can stamp events with
    /// the scheduled instant rather than the tick that observed it.
    pub fn take_due(&mut self, now_ms: f64) -> Option<(f64, TimerAction)> {
        match self.pending {
            Some(p) if p.due_ms <= now_ms => {
                self.pending = None;
                Some((p.due_ms, p.action))
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending_action(&self) -> Option<TimerAction> {
        self.pending.map(|p| p.action)
    }

    pub fn due_ms(&self) -> Option<f64> {
        self.pending.map(|p| p.due_ms)
    }
}
