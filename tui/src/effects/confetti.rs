//! Confetti
//!
//! One burst of particles dropped from above the screen when the celebration
//! starts. Pieces fall under gravity with a little sideways drift and are
//! dropped once they pass the bottom; the burst never repeats on its own.

use std::time::Duration;

use rand::Rng;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};

use crate::theme::CONFETTI;

/// Pieces in one burst
pub const PIECE_COUNT: usize = 300;

/// Rows per second squared
const GRAVITY: f32 = 6.0;

const GLYPHS: [char; 6] = ['▪', '▫', '•', '◆', '*', '✦'];

#[derive(Clone, Debug, PartialEq)]
struct Piece {
    x: f32,
    y: f32,
    vx: f32,
    vy: f32,
    glyph: char,
    color: Color,
}

/// The burst
#[derive(Clone, Debug, Default)]
pub struct Confetti {
    pieces: Vec<Piece>,
    /// Screen the burst is falling through
    area: Rect,
}

impl Confetti {
    /// No confetti
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a fresh burst over `area`
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R, area: Rect) {
        self.area = area;
        let width = f32::from(area.width.max(1));
        let height = f32::from(area.height.max(1));
        self.pieces = (0..PIECE_COUNT)
            .map(|_| Piece {
                x: rng.gen_range(0.0..width),
                y: -rng.gen_range(0.0..height),
                vx: rng.gen_range(-3.0..3.0),
                vy: rng.gen_range(2.0..8.0),
                glyph: GLYPHS[rng.gen_range(0..GLYPHS.len())],
                color: CONFETTI[rng.gen_range(0..CONFETTI.len())],
            })
            .collect();
        tracing::debug!(pieces = self.pieces.len(), "Confetti started");
    }

    /// Whether pieces are still falling
    pub fn is_active(&self) -> bool {
        !self.pieces.is_empty()
    }

    /// Pieces still falling
    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    /// Whether the burst is over
    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Keep falling through a resized screen
    pub fn resize(&mut self, area: Rect) {
        self.area = area;
    }

    /// Move every piece; drop the ones below the screen
    pub fn update(&mut self, delta: Duration) {
        let dt = delta.as_secs_f32();
        let bottom = f32::from(self.area.height);
        for piece in &mut self.pieces {
            piece.vy += GRAVITY * dt;
            piece.x += piece.vx * dt;
            piece.y += piece.vy * dt;
        }
        self.pieces.retain(|p| p.y < bottom);
    }

    /// Draw onto the effects layer
    pub fn render(&self, buf: &mut Buffer) {
        let area = buf.area;
        for piece in &self.pieces {
            if piece.y < 0.0 || piece.x < 0.0 {
                continue;
            }
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let (x, y) = (piece.x as u16, piece.y as u16);
            if x >= area.width || y >= area.height {
                continue;
            }
            buf[(area.x + x, area.y + y)]
                .set_char(piece.glyph)
                .set_style(Style::default().fg(piece.color));
        }
    }
}
