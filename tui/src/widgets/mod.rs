//! Stage Widgets
//!
//! Each widget draws one piece of a stage into a layer buffer and records
//! where its controls landed in a [`HitMap`], so the app can route clicks,
//! hovers and keyboard focus without knowing the layout.

pub mod bubble;
pub mod celebration;
pub mod choice_grid;
pub mod date_picker;
pub mod proposal;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{Block, BorderType, Widget};
use unicode_width::UnicodeWidthStr;

use valentine_conductor::Tint;

use crate::theme::{tint_color, CARD_BG, DIM_GRAY, FOCUS_YELLOW};

pub use bubble::Bubble;
pub use celebration::CelebrationCard;
pub use choice_grid::ChoiceGrid;
pub use date_picker::{DateField, DatePicker};
pub use proposal::ProposalButtons;

/// Something the player can point at or activate
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// Next dialogue line
    Skip,
    /// Leave the dialogue step
    Advance,
    /// A question option
    Option(String),
    /// One field of the date picker
    DateField(DateField),
    /// Submit the date
    DateSubmit,
    /// Say yes
    Accept,
    /// The control that runs away
    Evade,
}

/// Screen regions of the controls drawn this frame
#[derive(Clone, Debug, Default)]
pub struct HitMap {
    regions: Vec<(Rect, Target)>,
}

impl HitMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every region
    pub fn clear(&mut self) {
        self.regions.clear();
    }

    /// Record a control
    pub fn push(&mut self, area: Rect, target: Target) {
        self.regions.push((area, target));
    }

    /// Topmost control under (x, y)
    pub fn target_at(&self, x: u16, y: u16) -> Option<&Target> {
        self.regions
            .iter()
            .rev()
            .find(|(area, _)| {
                x >= area.left() && x < area.right() && y >= area.top() && y < area.bottom()
            })
            .map(|(_, target)| target)
    }

    /// Controls in drawing order
    pub fn targets(&self) -> impl Iterator<Item = &Target> {
        self.regions.iter().map(|(_, target)| target)
    }

    /// Where a control was drawn
    pub fn area_of(&self, target: &Target) -> Option<Rect> {
        self.regions
            .iter()
            .find(|(_, t)| t == target)
            .map(|(area, _)| *area)
    }

    /// The control after `current` in drawing order, wrapping around
    pub fn next_after(&self, current: Option<&Target>, backwards: bool) -> Option<Target> {
        let len = self.regions.len();
        if len == 0 {
            return None;
        }
        let position = current.and_then(|c| self.regions.iter().position(|(_, t)| t == c));
        let index = match (position, backwards) {
            (None, false) => 0,
            (None, true) => len - 1,
            (Some(i), false) => (i + 1) % len,
            (Some(i), true) => (i + len - 1) % len,
        };
        Some(self.regions[index].1.clone())
    }
}

/// How a button is drawn
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ButtonLook {
    /// Base style
    pub style: Style,
    /// Keyboard focus is on it
    pub focused: bool,
    /// It cannot be pressed right now
    pub disabled: bool,
}

/// Draw `[ label ]` centred on `center_x` at row `y`; returns its area
pub fn draw_button(buf: &mut Buffer, center_x: u16, y: u16, label: &str, look: ButtonLook) -> Rect {
    let text = format!("[ {label} ]");
    let width = u16::try_from(text.width()).unwrap_or(u16::MAX);
    let area = buf.area;
    let x = center_x
        .saturating_sub(width / 2)
        .clamp(area.left(), area.right().saturating_sub(width).max(area.left()));

    let style = if look.disabled {
        Style::default().fg(DIM_GRAY)
    } else if look.focused {
        look.style.fg(FOCUS_YELLOW).add_modifier(Modifier::BOLD)
    } else {
        look.style
    };

    if y < area.bottom() {
        buf.set_stringn(x, y, &text, usize::from(area.right().saturating_sub(x)), style);
    }
    Rect::new(x, y, width.min(area.right().saturating_sub(x)), 1)
}

/// Draw `text` centred on row `y`, clipped to the buffer
pub fn draw_centered(buf: &mut Buffer, y: u16, text: &str, style: Style) {
    let area = buf.area;
    if y >= area.bottom() || area.width == 0 {
        return;
    }
    let width = u16::try_from(text.width()).unwrap_or(u16::MAX).min(area.width);
    let x = area.left() + (area.width - width) / 2;
    buf.set_stringn(x, y, text, usize::from(area.width), style);
}

/// Paint a rounded, filled card in `tint`; returns the area inside the border
pub fn draw_card(buf: &mut Buffer, area: Rect, tint: Tint) -> Rect {
    let area = area.intersection(buf.area);
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(tint_color(tint)))
        .style(Style::default().bg(CARD_BG));
    let inner = block.inner(area);
    block.render(area, buf);
    inner
}

/// Centre a `width` x `height` box inside `area`
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

/// Wrap `text` to `width` columns
pub fn wrap_lines(text: &str, width: u16) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    textwrap::wrap(text, usize::from(width))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}
