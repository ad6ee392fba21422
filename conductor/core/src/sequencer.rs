//! Step Sequencer
//!
//! Which step is showing, which dialogue line of it, and whether the
//! skip/advance control may be pressed yet.
//!
//! The step only ever moves forward, one at a time, and stops at the
//! celebration. Changing step puts the dialogue back on its first line and
//! hides the control before anyone can observe the new step.

use serde::{Deserialize, Serialize};

use crate::script::Step;

/// The control shown under a dialogue line
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueControl {
    /// Move on to the next line
    Skip,
    /// Leave the dialogue step
    Advance {
        /// Button text
        label: String,
    },
}

/// Step index plus dialogue position
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepSequencer {
    step: Step,
    dialogue_index: usize,
    control_visible: bool,
}

impl Default for StepSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl StepSequencer {
    /// Start at the first step
    #[must_use]
    pub fn new() -> Self {
        Self {
            step: Step::Intro,
            dialogue_index: 0,
            control_visible: false,
        }
    }

    /// Current step
    #[must_use]
    pub fn step(&self) -> Step {
        self.step
    }

    /// Current line within a dialogue step
    #[must_use]
    pub fn dialogue_index(&self) -> usize {
        self.dialogue_index
    }

    /// Whether the skip/advance control may be pressed
    #[must_use]
    pub fn control_visible(&self) -> bool {
        self.control_visible
    }

    /// Show or hide the control
    pub fn set_control_visible(&mut self, visible: bool) {
        self.control_visible = visible;
    }

    /// Move to the next step
    ///
    /// Returns `false` at the celebration, where nothing changes.
    pub fn advance_step(&mut self) -> bool {
        let next = self.step.next();
        if next == self.step {
            return false;
        }
        self.step = next;
        self.dialogue_index = 0;
        self.control_visible = false;
        true
    }

    /// Move to the next dialogue line, if there is one
    pub fn advance_dialogue(&mut self) -> bool {
        if !self.has_more_lines() {
            return false;
        }
        self.dialogue_index += 1;
        self.control_visible = false;
        true
    }

    /// Line being spoken, for dialogue steps
    #[must_use]
    pub fn current_line(&self) -> Option<&'static str> {
        self.step.script()?.line(self.dialogue_index)
    }

    /// Whether the current dialogue has lines after this one
    #[must_use]
    pub fn has_more_lines(&self) -> bool {
        self.step
            .script()
            .is_some_and(|script| self.dialogue_index + 1 < script.len())
    }

    /// Control for the current dialogue line; `None` outside dialogue steps
    #[must_use]
    pub fn control(&self) -> Option<DialogueControl> {
        let script = self.step.script()?;
        if self.has_more_lines() {
            Some(DialogueControl::Skip)
        } else {
            Some(DialogueControl::Advance {
                label: script.advance_label.to_string(),
            })
        }
    }
}
