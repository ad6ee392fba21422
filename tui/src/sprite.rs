//! Character Sprite
//!
//! The 8-bit character who asks the questions. Blocky pixel art using
//! Unicode block elements (█▀▄) with one colour per palette key, and two
//! frames (mouth closed, mouth open) swapped while a line is typing.

use std::time::Duration;

use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

use crate::theme::{SPRITE_EYES, SPRITE_HAIR, SPRITE_MOUTH, SPRITE_SKIN, SPRITE_SWEATER};

/// How long each talking frame stays up
pub const TALK_FRAME: Duration = Duration::from_millis(150);

// ============================================================================
// Palette Keys (used in sprite patterns)
// ============================================================================
// H = Hair
// h = Hair, top half only
// S = Skin
// E = Eye
// M = Mouth (open)
// m = Mouth (closed)
// W = Sweater
// w = Sweater, bottom half only
// space = transparent

fn palette(key: char) -> Option<(char, Color)> {
    match key {
        'H' => Some(('█', SPRITE_HAIR)),
        'h' => Some(('▀', SPRITE_HAIR)),
        'S' => Some(('█', SPRITE_SKIN)),
        'E' => Some(('█', SPRITE_EYES)),
        'M' => Some(('█', SPRITE_MOUTH)),
        'm' => Some(('▄', SPRITE_MOUTH)),
        'W' => Some(('█', SPRITE_SWEATER)),
        'w' => Some(('▄', SPRITE_SWEATER)),
        _ => None,
    }
}

const IDLE: [&str; 8] = [
    "  hHHHHh  ",
    " HHHHHHHH ",
    " HSSSSSSH ",
    " HSESSESH ",
    " HSSSSSSH ",
    "  SSmmSS  ",
    " wWWWWWWw ",
    "WWWWWWWWWW",
];

const TALKING: [&str; 8] = [
    "  hHHHHh  ",
    " HHHHHHHH ",
    " HSSSSSSH ",
    " HSESSESH ",
    " HSSMMSSH ",
    "  SSMMSS  ",
    " wWWWWWWw ",
    "WWWWWWWWWW",
];

/// Which frame is up
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpriteFrame {
    /// Mouth closed
    Idle,
    /// Mouth open
    Talking,
}

impl SpriteFrame {
    fn pattern(self) -> &'static [&'static str; 8] {
        match self {
            SpriteFrame::Idle => &IDLE,
            SpriteFrame::Talking => &TALKING,
        }
    }
}

/// The character and its talking animation
#[derive(Debug)]
pub struct Sprite {
    frame: SpriteFrame,
    frame_time: Duration,
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

impl Sprite {
    /// Create an idle sprite
    pub fn new() -> Self {
        Self {
            frame: SpriteFrame::Idle,
            frame_time: Duration::ZERO,
        }
    }

    /// Size in cells (width, height); every pattern pixel is two columns wide
    pub fn bounds() -> (u16, u16) {
        let width = IDLE.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        (
            u16::try_from(width * 2).unwrap_or(u16::MAX),
            u16::try_from(IDLE.len()).unwrap_or(u16::MAX),
        )
    }

    /// Current frame
    pub fn frame(&self) -> SpriteFrame {
        self.frame
    }

    /// Advance the animation; talking flips frames, silence closes the mouth
    pub fn update(&mut self, delta: Duration, talking: bool) {
        if !talking {
            self.frame = SpriteFrame::Idle;
            self.frame_time = Duration::ZERO;
            return;
        }

        self.frame_time += delta;
        while self.frame_time >= TALK_FRAME {
            self.frame_time -= TALK_FRAME;
            self.frame = match self.frame {
                SpriteFrame::Idle => SpriteFrame::Talking,
                SpriteFrame::Talking => SpriteFrame::Idle,
            };
        }
    }

    /// Draw the current frame with its top-left corner at (x, y)
    pub fn render(&self, buf: &mut Buffer, x: u16, y: u16) {
        let area = buf.area;
        for (row, line) in self.frame.pattern().iter().enumerate() {
            let py = y.saturating_add(u16::try_from(row).unwrap_or(u16::MAX));
            if py >= area.bottom() {
                break;
            }
            for (col, key) in line.chars().enumerate() {
                let Some((glyph, color)) = palette(key) else {
                    continue;
                };
                let px = x.saturating_add(u16::try_from(col * 2).unwrap_or(u16::MAX));
                if px + 1 >= area.right() {
                    break;
                }
                let style = Style::default().fg(color);
                buf[(px, py)].set_char(glyph).set_style(style);
                buf[(px + 1, py)].set_char(glyph).set_style(style);
            }
        }
    }
}
