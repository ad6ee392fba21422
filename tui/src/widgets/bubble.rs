//! Speech Bubble Widget
//!
//! The dialogue line in a tinted bubble, with the skip/advance control under
//! it once the Conductor reveals it.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use valentine_conductor::{DialogueControl, Tint};

use super::{draw_button, draw_card, wrap_lines, ButtonLook, HitMap, Target};
use crate::theme::{tint_color, CARD_TEXT};

/// Widest a bubble gets
pub const MAX_WIDTH: u16 = 44;

/// Label of the skip control
pub const SKIP_LABEL: &str = "skip ▸";

/// A dialogue bubble
pub struct Bubble<'a> {
    text: &'a str,
    tint: Tint,
    control: Option<&'a DialogueControl>,
    focused: Option<&'a Target>,
}

impl<'a> Bubble<'a> {
    /// Create a bubble for `text`
    pub fn new(text: &'a str, tint: Tint) -> Self {
        Self {
            text,
            tint,
            control: None,
            focused: None,
        }
    }

    /// Show a control under the bubble
    #[must_use]
    pub fn control(mut self, control: Option<&'a DialogueControl>) -> Self {
        self.control = control;
        self
    }

    /// Highlight the focused control
    #[must_use]
    pub fn focused(mut self, focused: Option<&'a Target>) -> Self {
        self.focused = focused;
        self
    }

    /// Rows the bubble needs at `width`, including border and control row
    pub fn height_for(text: &str, width: u16) -> u16 {
        let inner = width.saturating_sub(4);
        let lines = wrap_lines(text, inner).len().max(1);
        u16::try_from(lines).unwrap_or(u16::MAX).saturating_add(2 + 2)
    }

    /// Draw into `area` (top-left anchored) and record the control
    pub fn render(self, area: Rect, buf: &mut Buffer, hits: &mut HitMap) {
        let width = area.width.min(MAX_WIDTH);
        if width < 6 {
            return;
        }
        let lines = wrap_lines(self.text, width.saturating_sub(4));
        let body_height = u16::try_from(lines.len().max(1))
            .unwrap_or(u16::MAX)
            .saturating_add(2)
            .min(area.height);
        let body = Rect::new(area.x, area.y, width, body_height);

        let inner = draw_card(buf, body, self.tint);
        let text_style = Style::default().fg(CARD_TEXT);
        for (i, line) in lines.iter().enumerate() {
            let Ok(row) = u16::try_from(i) else { break };
            if row >= inner.height {
                break;
            }
            buf.set_stringn(
                inner.x + 1,
                inner.y + row,
                line,
                usize::from(inner.width.saturating_sub(1)),
                text_style,
            );
        }

        // Tail pointing back at the speaker
        if body.x > buf.area.x && body.height > 2 {
            buf[(body.x - 1, body.y + 1)]
                .set_char('◀')
                .set_style(Style::default().fg(tint_color(self.tint)));
        }

        let Some(control) = self.control else {
            return;
        };
        let (label, target) = match control {
            DialogueControl::Skip => (SKIP_LABEL, Target::Skip),
            DialogueControl::Advance { label } => (label.as_str(), Target::Advance),
        };
        let y = body.bottom() + 1;
        if y >= area.bottom() {
            return;
        }
        let look = ButtonLook {
            style: Style::default()
                .fg(tint_color(self.tint))
                .add_modifier(Modifier::BOLD),
            focused: self.focused == Some(&target),
            disabled: false,
        };
        let button = draw_button(buf, body.x + body.width / 2, y, label, look);
        hits.push(button, target);
    }
}
