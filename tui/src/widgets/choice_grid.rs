//! Choice Grid Widget
//!
//! A question card: prompt, optional subtitle, options in two columns and
//! the feedback line. Options are numbered so digits can pick them.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use valentine_conductor::ChallengeState;

use super::{centered, draw_button, draw_card, draw_centered, wrap_lines, ButtonLook, HitMap, Target};
use crate::display::DisplayChallenge;
use crate::theme::{tint_color, CARD_TEXT, DIM_GRAY, ERROR_RED, SUCCESS_GREEN};

/// Widest a card gets
pub const MAX_WIDTH: u16 = 56;

/// A multiple-choice card
pub struct ChoiceGrid<'a> {
    challenge: &'a DisplayChallenge,
    focused: Option<&'a Target>,
}

impl<'a> ChoiceGrid<'a> {
    /// Create a card for `challenge`
    pub fn new(challenge: &'a DisplayChallenge) -> Self {
        Self {
            challenge,
            focused: None,
        }
    }

    /// Highlight the focused option
    #[must_use]
    pub fn focused(mut self, focused: Option<&'a Target>) -> Self {
        self.focused = focused;
        self
    }

    /// Style of one option given the attempt state
    pub fn option_style(&self, id: &str) -> (Style, bool) {
        let tint = tint_color(self.challenge.view.tint);
        let selected = self.challenge.selected.as_deref() == Some(id);
        match (self.challenge.state, selected) {
            (ChallengeState::Correct, true) => (
                Style::default().fg(SUCCESS_GREEN).add_modifier(Modifier::BOLD),
                false,
            ),
            (ChallengeState::Wrong, true) => (
                Style::default().fg(ERROR_RED).add_modifier(Modifier::CROSSED_OUT),
                false,
            ),
            (ChallengeState::Evaluating, true) => (Style::default().fg(tint), false),
            (state, _) => (Style::default().fg(tint), !state.accepts_input()),
        }
    }

    /// Draw centred in `area` and record the options
    pub fn render(self, area: Rect, buf: &mut Buffer, hits: &mut HitMap) {
        let view = &self.challenge.view;
        let width = area.width.min(MAX_WIDTH);
        let text_width = width.saturating_sub(4);
        let prompt = wrap_lines(&view.prompt, text_width);
        let option_rows = u16::try_from(view.options.len().div_ceil(2)).unwrap_or(u16::MAX);
        let subtitle_rows = u16::from(view.subtitle.is_some());
        let prompt_rows = u16::try_from(prompt.len()).unwrap_or(u16::MAX);
        // border + prompt + subtitle + gap + options + gap + feedback + border
        let height = prompt_rows + subtitle_rows + option_rows * 2 + 5;

        let card = centered(area, width, height);
        let inner = draw_card(buf, card, view.tint);
        if inner.width < 4 || inner.height == 0 {
            return;
        }
        let mut card_buf = Buffer::empty(inner);
        let mut y = inner.y;

        let prompt_style = Style::default().fg(CARD_TEXT).add_modifier(Modifier::BOLD);
        for line in &prompt {
            draw_centered(&mut card_buf, y, line, prompt_style);
            y += 1;
        }
        if let Some(subtitle) = &view.subtitle {
            draw_centered(
                &mut card_buf,
                y,
                subtitle,
                Style::default().fg(DIM_GRAY).add_modifier(Modifier::ITALIC),
            );
            y += 1;
        }
        y += 1;

        let column_width = inner.width / 2;
        for (i, option) in view.options.iter().enumerate() {
            let row = u16::try_from(i / 2).unwrap_or(u16::MAX);
            let column = u16::try_from(i % 2).unwrap_or(0);
            let center_x = inner.x + column_width * column + column_width / 2;
            let target = Target::Option(option.id.clone());
            let (style, disabled) = self.option_style(&option.id);
            let look = ButtonLook {
                style,
                focused: self.focused == Some(&target),
                disabled,
            };
            let label = format!("{} {}", i + 1, option.label);
            let button = draw_button(&mut card_buf, center_x, y + row * 2, &label, look);
            hits.push(button, target);
        }
        y += option_rows * 2;

        if let Some(feedback) = &self.challenge.feedback {
            let style = match self.challenge.state {
                ChallengeState::Correct => Style::default().fg(SUCCESS_GREEN),
                _ => Style::default().fg(ERROR_RED),
            };
            draw_centered(&mut card_buf, y, feedback, style);
        }

        blit_inner(buf, &card_buf);
    }
}

/// Copy a card's contents into the layer, keeping the card background
pub(super) fn blit_inner(buf: &mut Buffer, card: &Buffer) {
    let area = card.area.intersection(buf.area);
    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            let cell = &card[(x, y)];
            if cell.symbol() != " " {
                let bg = buf[(x, y)].bg;
                buf[(x, y)] = cell.clone();
                buf[(x, y)].set_bg(bg);
            }
        }
    }
}
