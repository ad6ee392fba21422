//! Proposal Widget
//!
//! The big question with two controls: accept, which grows every time the
//! other one is chased, and the refusal, which jumps away and shrinks.
//!
//! Offsets arrive in pixels; a terminal cell counts as 8 x 16 pixels.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use unicode_width::UnicodeWidthStr;

use valentine_conductor::ProposalView;

use super::{draw_button, draw_centered, ButtonLook, HitMap, Target};
use crate::theme::{DIM_GRAY, SUCCESS_GREEN, VALENTINE_PINK};

/// Pixels per terminal column
pub const CELL_WIDTH_PX: f32 = 8.0;

/// Pixels per terminal row
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// Label size at which the refusal is shown in full
pub const FULL_FONT_SIZE: f32 = 14.0;

/// The proposal controls
pub struct ProposalButtons<'a> {
    proposal: &'a ProposalView,
    focused: Option<&'a Target>,
}

impl<'a> ProposalButtons<'a> {
    /// Create the controls for `proposal`
    pub fn new(proposal: &'a ProposalView) -> Self {
        Self {
            proposal,
            focused: None,
        }
    }

    /// Highlight the focused control
    #[must_use]
    pub fn focused(mut self, focused: Option<&'a Target>) -> Self {
        self.focused = focused;
        self
    }

    /// Draw centred in `area` and record both controls
    pub fn render(self, area: Rect, buf: &mut Buffer, hits: &mut HitMap) {
        if area.width < 20 || area.height < 5 {
            return;
        }
        let mid_y = area.y + area.height / 2;

        draw_centered(
            buf,
            mid_y.saturating_sub(3),
            &self.proposal.question,
            Style::default()
                .fg(VALENTINE_PINK)
                .add_modifier(Modifier::BOLD),
        );

        let accept_label = grow_label(&self.proposal.accept_label, self.proposal.accept_scale);
        let accept = draw_button(
            buf,
            area.x + area.width / 3,
            mid_y,
            &accept_label,
            ButtonLook {
                style: Style::default()
                    .fg(SUCCESS_GREEN)
                    .add_modifier(Modifier::BOLD),
                focused: self.focused == Some(&Target::Accept),
                disabled: false,
            },
        );

        let (dx, dy) = offset_cells(self.proposal.evade_offset);
        let base_x = i32::from(area.x + area.width * 2 / 3);
        let evade_x = clamp_to(base_x + dx, area.left(), area.right().saturating_sub(1));
        let evade_y = clamp_to(i32::from(mid_y) + dy, area.top(), area.bottom().saturating_sub(1));
        let evade_label = shrink_label(&self.proposal.evade_label, self.proposal.evade_font_size);
        let evade = draw_button(
            buf,
            evade_x,
            evade_y,
            &evade_label,
            ButtonLook {
                style: Style::default().fg(DIM_GRAY),
                focused: self.focused == Some(&Target::Evade),
                disabled: false,
            },
        );

        hits.push(accept, Target::Accept);
        hits.push(evade, Target::Evade);
    }
}

/// Pixel offset to whole cells
///
/// Offsets are bounded by the viewport's max offset, far inside `i32`.
#[allow(clippy::cast_possible_truncation)]
pub fn offset_cells(offset: (f32, f32)) -> (i32, i32) {
    (
        (offset.0 / CELL_WIDTH_PX).round() as i32,
        (offset.1 / CELL_HEIGHT_PX).round() as i32,
    )
}

fn clamp_to(value: i32, min: u16, max: u16) -> u16 {
    let clamped = value.clamp(i32::from(min), i32::from(max.max(min)));
    u16::try_from(clamped).unwrap_or(min)
}

/// Pad the accept label so it takes `scale` times its width
pub fn grow_label(label: &str, scale: f32) -> String {
    let width = label.width();
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let extra = ((scale.max(1.0) - 1.0) * width as f32).round() as usize;
    let left = extra / 2;
    let right = extra - left;
    format!("{}{label}{}", " ".repeat(left), " ".repeat(right))
}

/// Cut the refusal label down in proportion to its font size
pub fn shrink_label(label: &str, font_size: f32) -> String {
    let chars: Vec<char> = label.chars().collect();
    if font_size >= FULL_FONT_SIZE || chars.is_empty() {
        return label.to_string();
    }
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let keep = ((chars.len() as f32 * font_size / FULL_FONT_SIZE).ceil() as usize).max(1);
    if keep >= chars.len() {
        return label.to_string();
    }
    let mut short: String = chars[..keep].iter().collect();
    short.push('…');
    short
}
