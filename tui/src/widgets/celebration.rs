//! Celebration Card Widget
//!
//! The cycling celebration line above a card counting how long we have been
//! together.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use valentine_conductor::{TimeTogether, Tint};

use super::choice_grid::blit_inner;
use super::{centered, draw_card, draw_centered};
use crate::theme::{CARD_TEXT, DIM_GRAY, VALENTINE_PINK};

/// Heading of the counter
pub const HEADING: &str = "we've been together for...";

/// Line under the counter
pub const FOOTER: &str = "and counting...";

/// The celebration card
pub struct CelebrationCard<'a> {
    text: &'a str,
    together: Option<TimeTogether>,
}

impl<'a> CelebrationCard<'a> {
    /// Create a card with the cycling line `text`
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            together: None,
        }
    }

    /// Show the counter
    #[must_use]
    pub fn together(mut self, together: Option<TimeTogether>) -> Self {
        self.together = together;
        self
    }

    /// Counter rows, largest unit first
    pub fn counter_lines(together: &TimeTogether) -> [String; 3] {
        [
            format!("{} {}", together.months, plural(together.months, "month")),
            format!("{} {}", together.days, plural(together.days, "day")),
            format!("{} {}", together.hours, plural(together.hours, "hour")),
        ]
    }

    /// Draw centred in `area`
    pub fn render(self, area: Rect, buf: &mut Buffer) {
        let Some(together) = self.together else {
            draw_centered(
                buf,
                area.y + area.height / 2,
                self.text,
                Style::default().fg(VALENTINE_PINK).add_modifier(Modifier::BOLD),
            );
            return;
        };

        // heading + gap + 3 counters + gap + footer, inside a border
        let card = centered(area, 40.min(area.width), 9);
        draw_centered(
            buf,
            card.y.saturating_sub(2),
            self.text,
            Style::default().fg(VALENTINE_PINK).add_modifier(Modifier::BOLD),
        );

        let inner = draw_card(buf, card, Tint::Pink);
        if inner.height == 0 {
            return;
        }
        let mut card_buf = Buffer::empty(inner);
        draw_centered(&mut card_buf, inner.y, HEADING, Style::default().fg(DIM_GRAY));
        for (i, line) in Self::counter_lines(&together).iter().enumerate() {
            let row = u16::try_from(i).unwrap_or(0);
            draw_centered(
                &mut card_buf,
                inner.y + 2 + row,
                line,
                Style::default().fg(CARD_TEXT).add_modifier(Modifier::BOLD),
            );
        }
        draw_centered(
            &mut card_buf,
            inner.y + 6,
            FOOTER,
            Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
        );
        blit_inner(buf, &card_buf);
    }
}

fn plural(count: u64, unit: &str) -> String {
    if count == 1 {
        unit.to_string()
    } else {
        format!("{unit}s")
    }
}
