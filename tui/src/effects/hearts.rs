//! Floating Hearts
//!
//! A fixed swarm of hearts drifting up the backdrop. A heart that leaves the
//! top comes back at the bottom in a new column with a new speed.

use std::time::Duration;

use rand::Rng;
use ratatui::buffer::Buffer;
use ratatui::style::{Color, Style};

use crate::theme::{HEART_DIM, VALENTINE_PINK};

/// Hearts on screen at any time
pub const HEART_COUNT: usize = 20;

const GLYPHS: [char; 3] = ['♥', '♡', '❤'];

/// Rows per second
const SPEED_RANGE: std::ops::Range<f32> = 0.8..2.5;

#[derive(Clone, Debug, PartialEq)]
struct Heart {
    /// Column as a fraction of the width
    column: f32,
    /// Row, counted from the top; may be negative while leaving
    row: f32,
    speed: f32,
    glyph: char,
    bright: bool,
}

impl Heart {
    fn spawn<R: Rng + ?Sized>(rng: &mut R, row: f32) -> Self {
        Self {
            column: rng.gen_range(0.0..1.0),
            row,
            speed: rng.gen_range(SPEED_RANGE),
            glyph: GLYPHS[rng.gen_range(0..GLYPHS.len())],
            bright: rng.gen_bool(0.25),
        }
    }
}

/// The swarm
#[derive(Clone, Debug)]
pub struct Hearts {
    hearts: Vec<Heart>,
}

impl Hearts {
    /// Scatter hearts over a screen `height` rows tall
    pub fn new<R: Rng + ?Sized>(rng: &mut R, height: u16) -> Self {
        let height = f32::from(height.max(1));
        let hearts = (0..HEART_COUNT)
            .map(|_| {
                let row = rng.gen_range(0.0..height);
                Heart::spawn(rng, row)
            })
            .collect();
        Self { hearts }
    }

    /// Number of hearts
    pub fn len(&self) -> usize {
        self.hearts.len()
    }

    /// Whether there are no hearts
    pub fn is_empty(&self) -> bool {
        self.hearts.is_empty()
    }

    /// Drift every heart up; recycle the ones that left the screen
    pub fn update<R: Rng + ?Sized>(&mut self, delta: Duration, height: u16, rng: &mut R) {
        let dt = delta.as_secs_f32();
        let bottom = f32::from(height);
        for heart in &mut self.hearts {
            heart.row -= heart.speed * dt;
            if heart.row < -1.0 {
                *heart = Heart::spawn(rng, bottom);
            }
        }
    }

    /// Draw onto the backdrop layer
    pub fn render(&self, buf: &mut Buffer) {
        let area = buf.area;
        if area.width == 0 || area.height == 0 {
            return;
        }
        for heart in &self.hearts {
            if heart.row < 0.0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (x, y) = (
                (heart.column * f32::from(area.width)) as u16,
                heart.row as u16,
            );
            if x >= area.width || y >= area.height {
                continue;
            }
            let color: Color = if heart.bright { VALENTINE_PINK } else { HEART_DIM };
            buf[(area.x + x, area.y + y)]
                .set_char(heart.glyph)
                .set_style(Style::default().fg(color));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use ratatui::layout::Rect;

    #[test]
    fn test_swarm_size() {
        let mut rng = StdRng::seed_from_u64(7);
        let hearts = Hearts::new(&mut rng, 24);
        assert_eq!(hearts.len(), HEART_COUNT);
        assert!(hearts.hearts.iter().all(|h| h.row >= 0.0 && h.row < 24.0));
    }

    #[test]
    fn test_hearts_rise_and_recycle() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut hearts = Hearts::new(&mut rng, 24);
        let before: Vec<f32> = hearts.hearts.iter().map(|h| h.row).collect();

        hearts.update(Duration::from_millis(100), 24, &mut rng);
        for (heart, row) in hearts.hearts.iter().zip(before) {
            assert!(heart.row < row);
        }

        // Long enough for every heart to leave the top at least once
        hearts.update(Duration::from_secs(40), 24, &mut rng);
        assert_eq!(hearts.len(), HEART_COUNT);
        assert!(hearts.hearts.iter().all(|h| h.row >= 23.0));
    }

    #[test]
    fn test_render_draws_visible_hearts() {
        let mut rng = StdRng::seed_from_u64(3);
        let hearts = Hearts::new(&mut rng, 10);
        let mut buf = Buffer::empty(Rect::new(0, 0, 40, 10));
        hearts.render(&mut buf);

        let drawn = buf
            .content
            .iter()
            .filter(|c| GLYPHS.iter().any(|g| c.symbol() == g.to_string()))
            .count();
        assert!(drawn > 0);
        assert!(drawn <= HEART_COUNT);
    }
}
