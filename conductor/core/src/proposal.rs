//! The Proposal
//!
//! "Will you be my Valentine?" with two controls. Accepting ends the step.
//! The other control runs away whenever it is touched: it jumps to a random
//! offset, its label escalates through [`DODGE_MESSAGES`], it shrinks, and
//! the accept control grows. There is no way to actually refuse.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// The question asked
pub const QUESTION: &str = "Will you be my Valentine?";

/// Label of the accept control
pub const ACCEPT_LABEL: &str = "Yes! 💕";

/// Labels of the evading control, by number of evasions
pub const DODGE_MESSAGES: [&str; 8] = [
    "No",
    "Are you sure? 🥺",
    "Really?? 😢",
    "Think again! 💔",
    "Please?? 🥹",
    "I'll cry... 😭",
    "PLEASE 😭😭",
    "nooooo 💀",
];

const SCALE_STEP: f32 = 0.15;
const MAX_SCALE: f32 = 2.0;
const BASE_FONT: f32 = 14.0;
const FONT_STEP: f32 = 1.5;
const MIN_FONT: f32 = 6.0;

/// Coarse viewport class; decides how far the evading control may jump
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viewport {
    /// Roomy screen
    #[default]
    Wide,
    /// Small screen
    Narrow,
}

impl Viewport {
    /// Classify a width against the wide threshold (strictly greater is wide)
    #[must_use]
    pub fn from_width(width: u16, wide_threshold: u16) -> Self {
        if width > wide_threshold {
            Viewport::Wide
        } else {
            Viewport::Narrow
        }
    }

    /// Largest jump on each axis, in abstract units (x, y)
    #[must_use]
    pub fn max_offset(self) -> (f32, f32) {
        match self {
            Viewport::Wide => (200.0, 150.0),
            Viewport::Narrow => (100.0, 80.0),
        }
    }
}

/// How often the evading control has run away, and where it is now
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DodgeState {
    /// Number of evasions so far
    pub count: u32,
    /// Current displacement from the resting place (x, y)
    pub offset: (f32, f32),
}

impl DodgeState {
    /// Fresh state: no evasions, resting place
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run away once
    pub fn evade<R: Rng + ?Sized>(&mut self, viewport: Viewport, rng: &mut R) {
        let (max_x, max_y) = viewport.max_offset();
        self.count = self.count.saturating_add(1);
        self.offset = (rng.gen_range(-max_x..=max_x), rng.gen_range(-max_y..=max_y));
    }

    /// Index into [`DODGE_MESSAGES`]
    #[must_use]
    pub fn message_index(&self) -> usize {
        (self.count as usize).min(DODGE_MESSAGES.len() - 1)
    }

    /// Current label of the evading control
    #[must_use]
    pub fn message(&self) -> &'static str {
        DODGE_MESSAGES[self.message_index()]
    }

    /// Growth factor of the accept control
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn accept_scale(&self) -> f32 {
        (1.0 + SCALE_STEP * self.count as f32).min(MAX_SCALE)
    }

    /// Label size of the evading control, in points
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn evade_font_size(&self) -> f32 {
        (BASE_FONT - FONT_STEP * self.count as f32).max(MIN_FONT)
    }
}
