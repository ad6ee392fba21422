//! Conductor Messages
//!
//! Messages sent from the Conductor to the rendering surface. They describe
//! what is on screen, never how it looks: colours, layout, animation and
//! confetti are the surface's business.
//!
//! # Design Philosophy
//!
//! The surface is a pure renderer that displays what the Conductor tells it.
//! All story logic (which step, which line, whether an answer was right)
//! stays in the Conductor, so the same story can drive a terminal, a test
//! harness or anything else.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::challenge::ChallengeState;
use crate::script::{Step, Tint};
use crate::sequencer::DialogueControl;
use crate::together::TimeTogether;

/// Messages from Conductor to UI Surface
///
/// The surface should not have any story logic; it renders what it's told.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ConductorMessage {
    // ============================================
    // Sequencing
    // ============================================
    /// A new step became active; drop everything from the previous one
    StepEntered {
        /// The step
        step: Step,
        /// Its position
        index: usize,
        /// Whether it is the last step
        terminal: bool,
    },

    // ============================================
    // Dialogue
    // ============================================
    /// A dialogue line started typing
    DialogueLine {
        /// Line position within the step
        index: usize,
        /// Number of lines in the step
        total: usize,
        /// Bubble colour
        tint: Tint,
        /// Cursor glyph, if one should be drawn
        cursor: Option<char>,
    },

    /// Visible text of the typing line changed
    DialogueTyped {
        /// Everything typed so far
        text: String,
        /// Whether typing has stopped
        finished: bool,
    },

    /// The skip/advance control may be shown and pressed
    ControlShown {
        /// Which control
        control: DialogueControl,
    },

    // ============================================
    // Challenges
    // ============================================
    /// A question is on screen
    ChallengePresented {
        /// What to show
        challenge: ChallengeView,
    },

    /// The question's attempt state changed
    ChallengeUpdated {
        /// New state
        state: ChallengeState,
        /// Selected option id (choice) or value (date)
        selected: Option<String>,
        /// Feedback line to show, if any
        feedback: Option<String>,
    },

    // ============================================
    // Proposal
    // ============================================
    /// The proposal controls changed
    ProposalUpdated {
        /// What to show
        proposal: ProposalView,
    },

    // ============================================
    // Celebration
    // ============================================
    /// Start the celebration; sent once per session
    Celebrate {
        /// Time-together snapshot
        together: TimeTogether,
        /// Anniversary, so the surface can refresh the counter itself
        since: NaiveDate,
    },

    /// Celebration line cycling
    CelebrationTyped {
        /// Visible text of the cycling line
        text: String,
    },

    // ============================================
    // Lifecycle
    // ============================================
    /// The session is over; the surface should exit
    Quit,
}

/// Kind of question
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChallengeKind {
    /// Pick one of several options
    Choice,
    /// Pick a date
    Date,
}

/// One option of a choice question
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionView {
    /// Identifier to send back in events
    pub id: String,
    /// Text to show
    pub label: String,
}

/// A question as the surface needs it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeView {
    /// Kind of question
    pub kind: ChallengeKind,
    /// The question
    pub prompt: String,
    /// Smaller line under it
    pub subtitle: Option<String>,
    /// Options in order; empty for date questions
    pub options: Vec<OptionView>,
    /// Card colour
    pub tint: Tint,
}

/// The proposal as the surface needs it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposalView {
    /// The question
    pub question: String,
    /// Accept control text
    pub accept_label: String,
    /// Evading control text
    pub evade_label: String,
    /// Accept control growth factor (1.0 to 2.0)
    pub accept_scale: f32,
    /// Evading control displacement (x, y)
    pub evade_offset: (f32, f32),
    /// Evading control label size in points (6 to 14)
    pub evade_font_size: f32,
    /// Times the evading control ran away
    pub dodge_count: u32,
}

impl ConductorMessage {
    /// Short name for logs
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StepEntered { .. } => "step_entered",
            Self::DialogueLine { .. } => "dialogue_line",
            Self::DialogueTyped { .. } => "dialogue_typed",
            Self::ControlShown { .. } => "control_shown",
            Self::ChallengePresented { .. } => "challenge_presented",
            Self::ChallengeUpdated { .. } => "challenge_updated",
            Self::ProposalUpdated { .. } => "proposal_updated",
            Self::Celebrate { .. } => "celebrate",
            Self::CelebrationTyped { .. } => "celebration_typed",
            Self::Quit => "quit",
        }
    }
}
