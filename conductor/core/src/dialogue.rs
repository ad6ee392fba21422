//! Typed Dialogue
//!
//! A [`Typewriter`] reveals text one character at a time, the way the
//! character "talks". It is a pure state machine advanced by elapsed time, so
//! the pace does not depend on the surface's frame rate: a long frame simply
//! reveals several characters at once, each reported by its own
//! [`TypewriterEvent::CharTyped`].
//!
//! With several lines the typewriter types a line, pauses, erases it and
//! moves on. Without looping it stops after typing the last line and keeps
//! it on screen.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Typing pace and presentation
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingConfig {
    /// Time per revealed character
    pub typing_speed: Duration,
    /// Time per erased character
    pub deleting_speed: Duration,
    /// Pause after a line is fully typed, before erasing
    pub pause_duration: Duration,
    /// Start over from the first line after the last one
    pub looping: bool,
    /// Whether surfaces should draw a cursor
    pub show_cursor: bool,
    /// Cursor glyph
    pub cursor: char,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            typing_speed: Duration::from_millis(60),
            deleting_speed: Duration::from_millis(30),
            pause_duration: Duration::from_millis(1500),
            looping: false,
            show_cursor: true,
            cursor: '▌',
        }
    }
}

impl TypingConfig {
    /// Same pacing, looping forever
    #[must_use]
    pub fn looping(mut self) -> Self {
        self.looping = true;
        self
    }
}

/// Text to type: one line or an ordered list
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypewriterText {
    /// A single line
    Single(String),
    /// Several lines typed in turn
    Lines(Vec<String>),
}

impl TypewriterText {
    fn into_lines(self) -> Vec<Vec<char>> {
        let lines = match self {
            TypewriterText::Single(line) => vec![line],
            TypewriterText::Lines(lines) if lines.is_empty() => vec![String::new()],
            TypewriterText::Lines(lines) => lines,
        };
        lines.into_iter().map(|l| l.chars().collect()).collect()
    }
}

impl From<&str> for TypewriterText {
    fn from(line: &str) -> Self {
        TypewriterText::Single(line.to_string())
    }
}

impl From<String> for TypewriterText {
    fn from(line: String) -> Self {
        TypewriterText::Single(line)
    }
}

impl From<Vec<String>> for TypewriterText {
    fn from(lines: Vec<String>) -> Self {
        TypewriterText::Lines(lines)
    }
}

impl From<&[&str]> for TypewriterText {
    fn from(lines: &[&str]) -> Self {
        TypewriterText::Lines(lines.iter().map(ToString::to_string).collect())
    }
}

/// Something that happened while advancing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypewriterEvent {
    /// A character became visible
    CharTyped(char),
    /// The line at this index is fully typed
    LineCompleted(usize),
    /// All text is typed and nothing more will happen (non-looping only)
    Finished,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Phase {
    Typing,
    Pausing,
    Deleting,
    Done,
}

/// Time-paced character reveal
#[derive(Debug)]
pub struct Typewriter {
    lines: Vec<Vec<char>>,
    config: TypingConfig,
    line: usize,
    visible: usize,
    phase: Phase,
    elapsed: Duration,
}

impl Typewriter {
    /// Start typing `text` from the first character of the first line
    pub fn new(text: impl Into<TypewriterText>, config: TypingConfig) -> Self {
        Self {
            lines: text.into().into_lines(),
            config,
            line: 0,
            visible: 0,
            phase: Phase::Typing,
            elapsed: Duration::ZERO,
        }
    }

    /// Pacing in use
    #[must_use]
    pub fn config(&self) -> &TypingConfig {
        &self.config
    }

    /// Index of the line being typed
    #[must_use]
    pub fn line_index(&self) -> usize {
        self.line
    }

    /// Text currently on screen, without the cursor
    #[must_use]
    pub fn visible_text(&self) -> String {
        self.lines[self.line][..self.visible].iter().collect()
    }

    /// Cursor glyph, if the cursor is shown
    #[must_use]
    pub fn cursor(&self) -> Option<char> {
        self.config.show_cursor.then_some(self.config.cursor)
    }

    /// Whether typing has stopped for good
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Done
    }

    fn current_len(&self) -> usize {
        self.lines[self.line].len()
    }

    fn step_duration(&self) -> Duration {
        let step = match self.phase {
            Phase::Typing => self.config.typing_speed,
            Phase::Pausing => self.config.pause_duration,
            Phase::Deleting => self.config.deleting_speed,
            Phase::Done => return Duration::MAX,
        };
        step.max(Duration::from_millis(1))
    }

    /// Move time forward by `delta`
    ///
    /// Returns everything that happened, in order.
    pub fn advance(&mut self, delta: Duration) -> Vec<TypewriterEvent> {
        let mut events = Vec::new();
        if self.phase == Phase::Done {
            return events;
        }

        self.elapsed += delta;

        // Lines that are empty complete without consuming time
        self.settle_line_end(&mut events);

        loop {
            let step = self.step_duration();
            if self.phase == Phase::Done || self.elapsed < step {
                break;
            }
            self.elapsed -= step;

            match self.phase {
                Phase::Typing => {
                    let ch = self.lines[self.line][self.visible];
                    self.visible += 1;
                    events.push(TypewriterEvent::CharTyped(ch));
                    self.settle_line_end(&mut events);
                }
                Phase::Pausing => {
                    self.phase = Phase::Deleting;
                    self.settle_erased();
                    self.settle_line_end(&mut events);
                }
                Phase::Deleting => {
                    self.visible = self.visible.saturating_sub(1);
                    self.settle_erased();
                    self.settle_line_end(&mut events);
                }
                Phase::Done => break,
            }
        }

        if self.phase == Phase::Done {
            self.elapsed = Duration::ZERO;
        }
        events
    }

    /// Handle a fully typed line
    fn settle_line_end(&mut self, events: &mut Vec<TypewriterEvent>) {
        if self.phase != Phase::Typing || self.visible < self.current_len() {
            return;
        }
        events.push(TypewriterEvent::LineCompleted(self.line));

        let last = self.line + 1 == self.lines.len();
        if last && !self.config.looping {
            self.phase = Phase::Done;
            events.push(TypewriterEvent::Finished);
        } else {
            self.phase = Phase::Pausing;
        }
    }

    /// Handle a fully erased line
    fn settle_erased(&mut self) {
        if self.phase != Phase::Deleting || self.visible > 0 {
            return;
        }
        self.line = (self.line + 1) % self.lines.len();
        self.phase = Phase::Typing;
    }
}
