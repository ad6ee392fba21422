//! Story Script
//!
//! The fixed, linear sequence of steps and every line the story says.
//!
//! All of it is compile-time data. Nothing here is mutated at runtime; the
//! Conductor only ever reads a step's [`StepKind`] to decide which stage to
//! build when the step becomes active.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::challenge::{Candidate, ChallengeDefinition, DateDefinition};

/// One screen of the story, in presentation order
///
/// The discriminants double as the step index. `Celebration` is the terminal
/// step; the index never goes past it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Step {
    /// "psst, hey!" opening dialogue
    Intro,
    /// Favourite colour question
    ColorQuestion,
    /// Dialogue leading into the birthday question
    BirthdayTeaser,
    /// Birthday date question
    BirthdayQuestion,
    /// Dialogue leading into the car question
    CarTeaser,
    /// Favourite car question
    CarQuestion,
    /// Dialogue leading into the map question
    MapTeaser,
    /// Favourite map question
    MapQuestion,
    /// Dialogue leading into the big question
    ProposalTeaser,
    /// "Will you be my Valentine?" with the dodging No
    Proposal,
    /// Confetti and the time-together counter
    Celebration,
}

impl Step {
    /// Every step, in order
    pub const ALL: [Step; 11] = [
        Step::Intro,
        Step::ColorQuestion,
        Step::BirthdayTeaser,
        Step::BirthdayQuestion,
        Step::CarTeaser,
        Step::CarQuestion,
        Step::MapTeaser,
        Step::MapQuestion,
        Step::ProposalTeaser,
        Step::Proposal,
        Step::Celebration,
    ];

    /// The terminal step
    pub const TERMINAL: Step = Step::Celebration;

    /// Position of this step in [`Step::ALL`]
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a step by index
    #[must_use]
    pub fn from_index(index: usize) -> Option<Step> {
        Self::ALL.get(index).copied()
    }

    /// The following step, clamped to the terminal step
    #[must_use]
    pub fn next(self) -> Step {
        Self::from_index(self.index() + 1).unwrap_or(Self::TERMINAL)
    }

    /// Whether this is the celebration step
    #[must_use]
    pub fn is_terminal(self) -> bool {
        self == Self::TERMINAL
    }

    /// Short name used in logs and the status bar
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Step::Intro => "intro",
            Step::ColorQuestion => "color",
            Step::BirthdayTeaser => "birthday-teaser",
            Step::BirthdayQuestion => "birthday",
            Step::CarTeaser => "car-teaser",
            Step::CarQuestion => "car",
            Step::MapTeaser => "map-teaser",
            Step::MapQuestion => "map",
            Step::ProposalTeaser => "proposal-teaser",
            Step::Proposal => "proposal",
            Step::Celebration => "celebration",
        }
    }

    /// What kind of stage this step shows
    #[must_use]
    pub fn kind(self) -> StepKind {
        match self {
            Step::Intro => StepKind::Dialogue(&INTRO),
            Step::ColorQuestion => StepKind::Choice(&COLOR_QUESTION),
            Step::BirthdayTeaser => StepKind::Dialogue(&BIRTHDAY_TEASER),
            Step::BirthdayQuestion => StepKind::Date(&BIRTHDAY_QUESTION),
            Step::CarTeaser => StepKind::Dialogue(&CAR_TEASER),
            Step::CarQuestion => StepKind::Choice(&CAR_QUESTION),
            Step::MapTeaser => StepKind::Dialogue(&MAP_TEASER),
            Step::MapQuestion => StepKind::Choice(&MAP_QUESTION),
            Step::ProposalTeaser => StepKind::Dialogue(&PROPOSAL_TEASER),
            Step::Proposal => StepKind::Proposal,
            Step::Celebration => StepKind::Celebration,
        }
    }

    /// The dialogue script, for dialogue steps
    #[must_use]
    pub fn script(self) -> Option<&'static DialogueScript> {
        match self.kind() {
            StepKind::Dialogue(script) => Some(script),
            _ => None,
        }
    }
}

/// The stage a step shows
#[derive(Clone, Copy, Debug)]
pub enum StepKind {
    /// Character speech bubble with typed lines
    Dialogue(&'static DialogueScript),
    /// Multiple-choice question
    Choice(&'static ChallengeDefinition),
    /// Date question
    Date(&'static DateDefinition),
    /// The proposal with its dodging control
    Proposal,
    /// Terminal celebration
    Celebration,
}

/// Colour family a stage is drawn in; surfaces map it to real colours
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tint {
    /// Pink bubble / card
    Pink,
    /// Blue bubble
    Blue,
    /// Purple card
    Purple,
    /// Yellow card
    Yellow,
    /// Orange card
    Orange,
    /// Teal card
    Teal,
    /// Green bubble
    Green,
}

/// Ordered lines spoken in a dialogue step
#[derive(Debug)]
pub struct DialogueScript {
    /// Lines, revealed one at a time
    pub lines: &'static [&'static str],
    /// Label of the control that leaves the step after the last line
    pub advance_label: &'static str,
    /// Bubble colour
    pub tint: Tint,
}

impl DialogueScript {
    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether the script has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Line at `index`, if any
    #[must_use]
    pub fn line(&self, index: usize) -> Option<&'static str> {
        self.lines.get(index).copied()
    }
}

// ============================================================================
// Dialogue
// ============================================================================

/// Opening lines
pub static INTRO: DialogueScript = DialogueScript {
    lines: &[
        "psst, hey!",
        "you found the secret!",
        "but i need to make sure its really you.",
        "you need to answer some questions...",
    ],
    advance_label: "I'm ready! 💪",
    tint: Tint::Pink,
};

/// Before the birthday question
pub static BIRTHDAY_TEASER: DialogueScript = DialogueScript {
    lines: &["that was too easy..", "whens my birthday?"],
    advance_label: "I know this! 📅",
    tint: Tint::Blue,
};

/// Before the car question
///
/// New copy. The car and map questions had no lead-in lines before this story
/// reached the terminal.
pub static CAR_TEASER: DialogueScript = DialogueScript {
    lines: &["okay okay, you remembered..", "but do you know my favourite car?"],
    advance_label: "vroom vroom 🏎️",
    tint: Tint::Orange,
};

/// Before the map question
///
/// New copy, like [`CAR_TEASER`].
pub static MAP_TEASER: DialogueScript = DialogueScript {
    lines: &["lucky guess.", "this next one is the real test."],
    advance_label: "bring it on 🗺️",
    tint: Tint::Teal,
};

/// Before the proposal
pub static PROPOSAL_TEASER: DialogueScript = DialogueScript {
    lines: &[
        "alright, you won't get this one..",
        "this one is really hard.. click the button",
    ],
    advance_label: "💕",
    tint: Tint::Green,
};

/// Lines cycled on the celebration card
pub const CELEBRATION_LINES: &[&str] = &["I knew you'd say yes!", "Happy Valentine's Day, my love!"];

// ============================================================================
// Questions
// ============================================================================

const SUCCESS_DELAY: Duration = Duration::from_millis(800);
const COOLDOWN: Duration = Duration::from_millis(1200);

/// "whats my favorite color?"
pub static COLOR_QUESTION: ChallengeDefinition = ChallengeDefinition {
    prompt: "whats my favorite color?",
    subtitle: None,
    candidates: &[
        Candidate::new("Red", "Red"),
        Candidate::new("Blue", "Blue"),
        Candidate::new("Purple", "Purple"),
        Candidate::new("Green", "Green"),
    ],
    correct: "Purple",
    success_delay: SUCCESS_DELAY,
    cooldown: COOLDOWN,
    praise: "alright, alright..",
    scold: "wow, you don't know my favorite color?",
    tint: Tint::Purple,
};

/// "which one is my favourite car?"
pub static CAR_QUESTION: ChallengeDefinition = ChallengeDefinition {
    prompt: "which one is my favourite car?",
    subtitle: None,
    candidates: &[
        Candidate::new("ans1", "Car #1"),
        Candidate::new("ans2", "Car #2"),
        Candidate::new("ans3", "Car #3"),
        Candidate::new("ans4", "Car #4"),
    ],
    correct: "ans4",
    success_delay: SUCCESS_DELAY,
    cooldown: COOLDOWN,
    praise: "hmm okay...",
    scold: "NOPE. not that one 😭",
    tint: Tint::Orange,
};

/// "which one is my favourite map?"
pub static MAP_QUESTION: ChallengeDefinition = ChallengeDefinition {
    prompt: "which one is my favourite map?",
    subtitle: Some("you're DEFINITELY not getting this"),
    candidates: &[
        Candidate::new("ans1", "Map #1"),
        Candidate::new("ans2", "Map #2"),
        Candidate::new("ans3", "Map #3"),
        Candidate::new("ans4", "Map #4"),
    ],
    correct: "ans2",
    success_delay: SUCCESS_DELAY,
    cooldown: COOLDOWN,
    praise: "hmm okay...",
    scold: "NOPE. not that one 😭",
    tint: Tint::Teal,
};

/// "whens my birthday?"
pub static BIRTHDAY_QUESTION: DateDefinition = DateDefinition {
    prompt: "whens my birthday? 🎂",
    subtitle: Some("pick the date!"),
    target: "2003-09-07",
    success_delay: Duration::from_millis(1000),
    cooldown: Duration::from_millis(1500),
    praise: "you remembered! 🥹💖",
    scold: "hmm, that's not right! 🤔",
    tint: Tint::Yellow,
};

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_step_indices_follow_all() {
        for (i, step) in Step::ALL.iter().enumerate() {
            assert_eq!(step.index(), i);
            assert_eq!(Step::from_index(i), Some(*step));
        }
        assert_eq!(Step::from_index(Step::ALL.len()), None);
    }

    #[test]
    fn test_next_clamps_at_terminal() {
        assert_eq!(Step::Intro.next(), Step::ColorQuestion);
        assert_eq!(Step::Proposal.next(), Step::Celebration);
        assert_eq!(Step::Celebration.next(), Step::Celebration);
        assert!(Step::Celebration.is_terminal());
        assert!(!Step::Proposal.is_terminal());
    }

    #[test]
    fn test_every_question_has_its_answer_among_candidates() {
        for step in Step::ALL {
            if let StepKind::Choice(def) = step.kind() {
                assert!(
                    def.candidate(def.correct).is_some(),
                    "{} has no candidate for its answer",
                    step.label()
                );
                assert_eq!(def.candidates.len(), 4);
            }
        }
    }

    #[test]
    fn test_dialogue_steps_have_lines() {
        let dialogue_steps: Vec<_> = Step::ALL.iter().filter_map(|s| s.script()).collect();
        assert_eq!(dialogue_steps.len(), 5);
        assert!(dialogue_steps.iter().all(|s| !s.is_empty()));
        assert_eq!(INTRO.line(0), Some("psst, hey!"));
        assert_eq!(INTRO.line(4), None);
    }
}
