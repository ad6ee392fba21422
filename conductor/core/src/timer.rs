//! Step-Scoped Timers
//!
//! Every delayed effect in the story (revealing a control, reporting a
//! challenge success, ending a cooldown, releasing the talking sound) is a
//! deadline on a virtual clock owned by the Conductor. The clock only moves
//! when the surface calls `tick`, so tests can drive time deterministically.
//!
//! Timers carry a [`TimerScope`]. Step-scoped timers die with their step:
//! [`Timers::begin_step_scope`] bumps the epoch and drops them, and any timer
//! from an older epoch is ignored by [`Timers::is_current`] should one ever
//! reach a handler.

use std::time::Duration;

/// What happens when a timer fires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerAction {
    /// Show the skip/advance control for the current dialogue line
    RevealControl,
    /// A right answer finished celebrating; advance the step
    ChallengePassed,
    /// A wrong answer's cooldown ended; accept answers again
    ChallengeCooldown,
    /// The talking segment finished; clear the busy flag
    TalkingReleased,
}

/// Lifetime of a timer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerScope {
    /// Cancelled when the step with this epoch ends
    Step(u64),
    /// Lives for the whole session
    Session,
}

/// A timer that reached its deadline
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    /// What to do
    pub action: TimerAction,
    /// Scope it was scheduled in
    pub scope: TimerScope,
}

#[derive(Debug)]
struct Pending {
    deadline: Duration,
    seq: u64,
    action: TimerAction,
    scope: TimerScope,
}

/// Virtual-clock timer wheel
#[derive(Debug, Default)]
pub struct Timers {
    now: Duration,
    epoch: u64,
    seq: u64,
    pending: Vec<Pending>,
}

impl Timers {
    /// Create an empty timer set at time zero
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time
    #[must_use]
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Current step epoch
    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Number of timers still waiting
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether a timer for `action` is waiting
    #[must_use]
    pub fn is_pending(&self, action: TimerAction) -> bool {
        self.pending.iter().any(|p| p.action == action)
    }

    /// Start a new step: cancel every step-scoped timer
    ///
    /// Returns the new epoch.
    pub fn begin_step_scope(&mut self) -> u64 {
        self.epoch += 1;
        self.pending
            .retain(|p| matches!(p.scope, TimerScope::Session));
        self.epoch
    }

    /// Cancel step-scoped timers for `action` without ending the step
    pub fn cancel(&mut self, action: TimerAction) {
        self.pending
            .retain(|p| p.action != action || p.scope == TimerScope::Session);
    }

    /// Schedule `action` after `delay`, cancelled on the next step change
    pub fn schedule_for_step(&mut self, action: TimerAction, delay: Duration) {
        let scope = TimerScope::Step(self.epoch);
        self.push(action, delay, scope);
    }

    /// Schedule `action` after `delay` for the rest of the session
    pub fn schedule_for_session(&mut self, action: TimerAction, delay: Duration) {
        self.push(action, delay, TimerScope::Session);
    }

    fn push(&mut self, action: TimerAction, delay: Duration, scope: TimerScope) {
        self.seq += 1;
        self.pending.push(Pending {
            deadline: self.now + delay,
            seq: self.seq,
            action,
            scope,
        });
    }

    /// Whether a fired timer still belongs to the live step
    #[must_use]
    pub fn is_current(&self, scope: TimerScope) -> bool {
        match scope {
            TimerScope::Step(epoch) => epoch == self.epoch,
            TimerScope::Session => true,
        }
    }

    /// Move the clock forward and collect expired timers
    ///
    /// Fired timers come back ordered by deadline, ties in scheduling order.
    pub fn advance(&mut self, delta: Duration) -> Vec<FiredTimer> {
        self.now += delta;
        let now = self.now;

        let mut fired: Vec<Pending> = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].deadline <= now {
                fired.push(self.pending.swap_remove(i));
            } else {
                i += 1;
            }
        }
        fired.sort_by_key(|p| (p.deadline, p.seq));

        fired
            .into_iter()
            .map(|p| FiredTimer {
                action: p.action,
                scope: p.scope,
            })
            .collect()
    }
}
