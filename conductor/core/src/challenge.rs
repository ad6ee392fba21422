//! Answer Challenges
//!
//! The "prove it's you" questions. Every question shares one state shape:
//!
//! ```text
//! Idle ──select──► Evaluating ──► Correct   (terminal; success after a delay)
//!                            └──► Wrong ──cooldown──► Idle (selection cleared)
//! ```
//!
//! While a challenge is not `Idle` further selections are rejected, so at most
//! one evaluation is in flight. The challenge itself only records state and
//! reports how long to wait; the Conductor owns the timers.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::script::Tint;

/// Where a challenge is in its attempt cycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeState {
    /// Waiting for an answer
    #[default]
    Idle,
    /// An answer was picked and is being compared
    Evaluating,
    /// The right answer was picked
    Correct,
    /// The wrong answer was picked; cooling down
    Wrong,
}

impl ChallengeState {
    /// Whether new answers are accepted
    #[must_use]
    pub fn accepts_input(self) -> bool {
        self == Self::Idle
    }
}

/// Why an answer was not evaluated
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectError {
    /// The identifier is not one of the question's options
    #[error("unknown candidate `{0}`")]
    UnknownCandidate(String),

    /// Another answer is still being evaluated or cooling down
    #[error("challenge is not accepting answers while {0:?}")]
    Busy(ChallengeState),

    /// Nothing to submit
    #[error("no value to submit")]
    EmptyInput,
}

/// Outcome of an evaluated answer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Right answer; report success after this delay
    Correct {
        /// Delay before the step should advance
        succeed_after: Duration,
    },
    /// Wrong answer; return to idle after this cooldown
    Wrong {
        /// Delay before answers are accepted again
        retry_after: Duration,
    },
}

impl Verdict {
    /// Whether the answer was right
    #[must_use]
    pub fn is_correct(self) -> bool {
        matches!(self, Verdict::Correct { .. })
    }
}

/// One selectable option of a multiple-choice question
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Stable identifier used in events
    pub id: &'static str,
    /// Text shown to the player
    pub label: &'static str,
}

impl Candidate {
    /// Create a candidate
    #[must_use]
    pub const fn new(id: &'static str, label: &'static str) -> Self {
        Self { id, label }
    }
}

/// A multiple-choice question, fixed at build time
#[derive(Debug)]
pub struct ChallengeDefinition {
    /// The question
    pub prompt: &'static str,
    /// Smaller line under the question
    pub subtitle: Option<&'static str>,
    /// Options in display order
    pub candidates: &'static [Candidate],
    /// Identifier of the right option
    pub correct: &'static str,
    /// Delay between a right answer and success
    pub success_delay: Duration,
    /// Delay between a wrong answer and the next attempt
    pub cooldown: Duration,
    /// Feedback after a right answer
    pub praise: &'static str,
    /// Feedback after a wrong answer
    pub scold: &'static str,
    /// Card colour
    pub tint: Tint,
}

impl ChallengeDefinition {
    /// Find a candidate by identifier
    #[must_use]
    pub fn candidate(&self, id: &str) -> Option<&'static Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }
}

/// A date question, fixed at build time
#[derive(Debug)]
pub struct DateDefinition {
    /// The question
    pub prompt: &'static str,
    /// Smaller line under the question
    pub subtitle: Option<&'static str>,
    /// Expected value, `YYYY-MM-DD`
    pub target: &'static str,
    /// Delay between a right answer and success
    pub success_delay: Duration,
    /// Delay between a wrong answer and the next attempt
    pub cooldown: Duration,
    /// Feedback after a right answer
    pub praise: &'static str,
    /// Feedback after a wrong answer
    pub scold: &'static str,
    /// Card colour
    pub tint: Tint,
}

// ============================================================================
// Multiple choice
// ============================================================================

/// Attempt state of a multiple-choice question
#[derive(Debug)]
pub struct AnswerChallenge {
    definition: &'static ChallengeDefinition,
    state: ChallengeState,
    selected: Option<&'static str>,
}

impl AnswerChallenge {
    /// Start a fresh attempt cycle
    #[must_use]
    pub fn new(definition: &'static ChallengeDefinition) -> Self {
        Self {
            definition,
            state: ChallengeState::Idle,
            selected: None,
        }
    }

    /// The question being asked
    #[must_use]
    pub fn definition(&self) -> &'static ChallengeDefinition {
        self.definition
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ChallengeState {
        self.state
    }

    /// Currently selected option, if any
    #[must_use]
    pub fn selected(&self) -> Option<&'static str> {
        self.selected
    }

    /// Pick an option
    ///
    /// # Errors
    ///
    /// [`SelectError::UnknownCandidate`] for an identifier that is not an
    /// option, [`SelectError::Busy`] while an earlier answer is unresolved.
    pub fn select(&mut self, candidate_id: &str) -> Result<Verdict, SelectError> {
        let candidate = self
            .definition
            .candidate(candidate_id)
            .ok_or_else(|| SelectError::UnknownCandidate(candidate_id.to_string()))?;

        if !self.state.accepts_input() {
            return Err(SelectError::Busy(self.state));
        }

        self.selected = Some(candidate.id);
        self.state = ChallengeState::Evaluating;

        if candidate.id == self.definition.correct {
            self.state = ChallengeState::Correct;
            Ok(Verdict::Correct {
                succeed_after: self.definition.success_delay,
            })
        } else {
            self.state = ChallengeState::Wrong;
            Ok(Verdict::Wrong {
                retry_after: self.definition.cooldown,
            })
        }
    }

    /// End the cooldown after a wrong answer
    ///
    /// Returns `true` if the state changed. Does nothing unless `Wrong`.
    pub fn reset(&mut self) -> bool {
        if self.state != ChallengeState::Wrong {
            return false;
        }
        self.state = ChallengeState::Idle;
        self.selected = None;
        true
    }

    /// Feedback line for the current state
    #[must_use]
    pub fn feedback(&self) -> Option<&'static str> {
        match self.state {
            ChallengeState::Correct => Some(self.definition.praise),
            ChallengeState::Wrong => Some(self.definition.scold),
            ChallengeState::Idle | ChallengeState::Evaluating => None,
        }
    }
}

// ============================================================================
// Date
// ============================================================================

/// Attempt state of a date question
#[derive(Debug)]
pub struct DateChallenge {
    definition: &'static DateDefinition,
    state: ChallengeState,
    value: String,
}

impl DateChallenge {
    /// Start a fresh attempt cycle with an empty value
    #[must_use]
    pub fn new(definition: &'static DateDefinition) -> Self {
        Self {
            definition,
            state: ChallengeState::Idle,
            value: String::new(),
        }
    }

    /// The question being asked
    #[must_use]
    pub fn definition(&self) -> &'static DateDefinition {
        self.definition
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> ChallengeState {
        self.state
    }

    /// Current input value
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether submitting is currently allowed
    #[must_use]
    pub fn can_submit(&self) -> bool {
        !self.value.is_empty() && self.state.accepts_input()
    }

    /// Change the input value
    ///
    /// Editing after a wrong answer clears the feedback straight away. Once
    /// correct the value is frozen. Returns `true` if the state changed.
    pub fn edit(&mut self, value: &str) -> bool {
        if self.state == ChallengeState::Correct {
            return false;
        }
        self.value = value.to_string();
        if self.state == ChallengeState::Wrong {
            self.state = ChallengeState::Idle;
            return true;
        }
        false
    }

    /// Submit the current value
    ///
    /// # Errors
    ///
    /// [`SelectError::EmptyInput`] when no date was picked,
    /// [`SelectError::Busy`] while an earlier answer is unresolved.
    pub fn submit(&mut self) -> Result<Verdict, SelectError> {
        if self.value.is_empty() {
            return Err(SelectError::EmptyInput);
        }
        if !self.state.accepts_input() {
            return Err(SelectError::Busy(self.state));
        }

        self.state = ChallengeState::Evaluating;

        if self.value == self.definition.target {
            self.state = ChallengeState::Correct;
            Ok(Verdict::Correct {
                succeed_after: self.definition.success_delay,
            })
        } else {
            self.state = ChallengeState::Wrong;
            Ok(Verdict::Wrong {
                retry_after: self.definition.cooldown,
            })
        }
    }

    /// End the cooldown after a wrong answer
    ///
    /// The picked date is kept so it can be adjusted.
    pub fn reset(&mut self) -> bool {
        if self.state != ChallengeState::Wrong {
            return false;
        }
        self.state = ChallengeState::Idle;
        true
    }

    /// Feedback line for the current state
    #[must_use]
    pub fn feedback(&self) -> Option<&'static str> {
        match self.state {
            ChallengeState::Correct => Some(self.definition.praise),
            ChallengeState::Wrong => Some(self.definition.scold),
            ChallengeState::Idle | ChallengeState::Evaluating => None,
        }
    }
}
