//! Display State Types
//!
//! Types that represent the current display state for the TUI.
//! These are derived from ConductorMessages and used for rendering.
//!
//! # Design Philosophy
//!
//! The TUI is a "thin client" - it just renders what the Conductor tells it to.
//! Display state is the bridge between ConductorMessages and rendering.
//!
//! - DisplayDialogue: the line being typed and its bubble
//! - DisplayChallenge: the question card and its attempt state
//! - DisplayCelebration: the time-together card

use std::time::Duration;

use chrono::{Local, NaiveDate, NaiveDateTime};

use valentine_conductor::{
    ChallengeState, ChallengeView, ConductorMessage, DialogueControl, ProposalView, Step,
    TimeTogether, Tint,
};

/// How often the time-together counter is recomputed
pub const COUNTER_REFRESH: Duration = Duration::from_secs(60);

/// The dialogue line on screen
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayDialogue {
    /// Line position within the step
    pub index: usize,
    /// Lines in the step
    pub total: usize,
    /// Bubble colour
    pub tint: Tint,
    /// Cursor glyph to draw after the text
    pub cursor: Option<char>,
    /// Visible text
    pub text: String,
    /// Whether typing stopped
    pub finished: bool,
}

impl DisplayDialogue {
    /// Text with the cursor appended while typing
    pub fn rendered(&self) -> String {
        match self.cursor {
            Some(cursor) if !self.finished => format!("{}{cursor}", self.text),
            _ => self.text.clone(),
        }
    }
}

/// The question on screen
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayChallenge {
    /// What to show
    pub view: ChallengeView,
    /// Attempt state
    pub state: ChallengeState,
    /// Selected option id or date value
    pub selected: Option<String>,
    /// Feedback line
    pub feedback: Option<String>,
}

impl DisplayChallenge {
    /// Create a fresh card
    pub fn new(view: ChallengeView) -> Self {
        Self {
            view,
            state: ChallengeState::Idle,
            selected: None,
            feedback: None,
        }
    }

    /// Whether the card takes input
    pub fn accepts_input(&self) -> bool {
        self.state.accepts_input()
    }
}

/// The celebration card
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayCelebration {
    /// Anniversary
    pub since: NaiveDate,
    /// Counter values
    pub together: TimeTogether,
    /// Time since the counter was last refreshed
    since_refresh: Duration,
}

impl DisplayCelebration {
    /// Create a card from the Conductor's snapshot
    pub fn new(since: NaiveDate, together: TimeTogether) -> Self {
        Self {
            since,
            together,
            since_refresh: Duration::ZERO,
        }
    }

    /// Recompute the counter for `now`
    pub fn refresh_at(&mut self, now: NaiveDateTime) {
        self.together = TimeTogether::between(self.since, now);
        self.since_refresh = Duration::ZERO;
    }

    /// Advance the refresh clock; returns true when the counter was recomputed
    pub fn update(&mut self, delta: Duration) -> bool {
        self.since_refresh += delta;
        if self.since_refresh >= COUNTER_REFRESH {
            self.refresh_at(Local::now().naive_local());
            true
        } else {
            false
        }
    }
}

/// Complete display state for rendering
#[derive(Clone, Debug, Default)]
pub struct DisplayState {
    /// Active step
    pub step: Option<Step>,
    /// Whether the active step is the last one
    pub terminal: bool,
    /// Dialogue line, during dialogue steps
    pub dialogue: Option<DisplayDialogue>,
    /// Skip/advance control, once revealed
    pub control: Option<DialogueControl>,
    /// Question card, during question steps
    pub challenge: Option<DisplayChallenge>,
    /// Proposal controls, during the proposal
    pub proposal: Option<ProposalView>,
    /// Time-together card, once celebrated
    pub celebration: Option<DisplayCelebration>,
    /// Cycling celebration line
    pub celebration_text: String,
    /// Session is over
    pub quit: bool,
    /// Celebrate arrived and effects have not started yet
    celebrate_pending: bool,
}

impl DisplayState {
    /// Create an empty display state
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a Conductor message
    pub fn apply_message(&mut self, msg: ConductorMessage) {
        match msg {
            ConductorMessage::StepEntered { step, terminal, .. } => {
                self.step = Some(step);
                self.terminal = terminal;
                self.dialogue = None;
                self.control = None;
                self.challenge = None;
                self.proposal = None;
                self.celebration_text.clear();
            }
            ConductorMessage::DialogueLine {
                index,
                total,
                tint,
                cursor,
            } => {
                self.dialogue = Some(DisplayDialogue {
                    index,
                    total,
                    tint,
                    cursor,
                    text: String::new(),
                    finished: false,
                });
                self.control = None;
            }
            ConductorMessage::DialogueTyped { text, finished } => {
                if let Some(dialogue) = &mut self.dialogue {
                    dialogue.text = text;
                    dialogue.finished = finished;
                }
            }
            ConductorMessage::ControlShown { control } => {
                self.control = Some(control);
            }
            ConductorMessage::ChallengePresented { challenge } => {
                self.challenge = Some(DisplayChallenge::new(challenge));
            }
            ConductorMessage::ChallengeUpdated {
                state,
                selected,
                feedback,
            } => {
                if let Some(challenge) = &mut self.challenge {
                    challenge.state = state;
                    challenge.selected = selected;
                    challenge.feedback = feedback;
                }
            }
            ConductorMessage::ProposalUpdated { proposal } => {
                self.proposal = Some(proposal);
            }
            ConductorMessage::Celebrate { together, since } => {
                self.celebration = Some(DisplayCelebration::new(since, together));
                self.celebrate_pending = true;
            }
            ConductorMessage::CelebrationTyped { text } => {
                self.celebration_text = text;
            }
            ConductorMessage::Quit => {
                self.quit = true;
            }
        }
    }

    /// Update timers
    pub fn update(&mut self, delta: Duration) {
        if let Some(celebration) = &mut self.celebration {
            celebration.update(delta);
        }
    }

    /// Whether the character is talking (a line is still typing)
    pub fn is_talking(&self) -> bool {
        self.dialogue.as_ref().is_some_and(|d| !d.finished)
    }

    /// Tint of the active stage, for the backdrop and focus colours
    pub fn tint(&self) -> Tint {
        if let Some(dialogue) = &self.dialogue {
            dialogue.tint
        } else if let Some(challenge) = &self.challenge {
            challenge.view.tint
        } else {
            Tint::Pink
        }
    }

    /// Take the one-shot "start the confetti" signal
    pub fn take_celebrate(&mut self) -> bool {
        std::mem::take(&mut self.celebrate_pending)
    }
}
