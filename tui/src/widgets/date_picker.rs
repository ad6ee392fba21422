//! Date Picker Widget
//!
//! Year, month and day spinners for the birthday question. The picker starts
//! blank; the first adjustment fills it in and from then on every change is
//! reported as an edit. Fields can also be typed digit by digit.

use chrono::{Datelike, NaiveDate};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};

use valentine_conductor::ChallengeState;

use super::choice_grid::blit_inner;
use super::{centered, draw_button, draw_card, draw_centered, wrap_lines, ButtonLook, HitMap, Target};
use crate::display::DisplayChallenge;
use crate::theme::{tint_color, CARD_TEXT, DIM_GRAY, ERROR_RED, FOCUS_YELLOW, SUCCESS_GREEN};

/// Earliest selectable year
pub const MIN_YEAR: i32 = 1900;

/// Latest selectable year
pub const MAX_YEAR: i32 = 2100;

/// Submit control text
pub const SUBMIT_LABEL: &str = "that's it!";

/// One spinner of the picker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DateField {
    /// Year
    Year,
    /// Month
    Month,
    /// Day of month
    Day,
}

impl DateField {
    /// Every field, left to right
    pub const ALL: [DateField; 3] = [DateField::Year, DateField::Month, DateField::Day];

    /// Field to the right, clamped
    pub fn next(self) -> Self {
        match self {
            DateField::Year => DateField::Month,
            DateField::Month | DateField::Day => DateField::Day,
        }
    }

    /// Digits a full entry of this field takes
    pub fn width(self) -> usize {
        match self {
            DateField::Year => 4,
            DateField::Month | DateField::Day => 2,
        }
    }

    /// Field to the left, clamped
    pub fn prev(self) -> Self {
        match self {
            DateField::Year | DateField::Month => DateField::Year,
            DateField::Day => DateField::Month,
        }
    }
}

/// Picker state, owned by the app for the duration of a date question
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DatePicker {
    date: NaiveDate,
    field: DateField,
    touched: bool,
    // Digits typed into the focused field so far
    entry: String,
}

impl Default for DatePicker {
    fn default() -> Self {
        Self::new()
    }
}

impl DatePicker {
    /// Create a blank picker
    pub fn new() -> Self {
        Self {
            date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or(NaiveDate::MIN),
            field: DateField::Year,
            touched: false,
            entry: String::new(),
        }
    }

    /// Field with keyboard focus
    pub fn field(&self) -> DateField {
        self.field
    }

    /// Move keyboard focus to `field`
    pub fn set_field(&mut self, field: DateField) {
        self.field = field;
        self.entry.clear();
    }

    /// Date shown by the spinners
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Whether the player has picked anything yet
    pub fn is_blank(&self) -> bool {
        !self.touched
    }

    /// `YYYY-MM-DD`, or empty while blank
    pub fn value(&self) -> String {
        if self.touched {
            self.date.format("%Y-%m-%d").to_string()
        } else {
            String::new()
        }
    }

    /// Spin the focused field by `delta`; returns true when the value changed
    pub fn adjust(&mut self, delta: i32) -> bool {
        self.entry.clear();
        let before = self.value();
        let (mut year, mut month, mut day) = (self.date.year(), self.date.month(), self.date.day());

        match self.field {
            DateField::Year => year = (year + delta).clamp(MIN_YEAR, MAX_YEAR),
            DateField::Month => month = wrap(month, delta, 12),
            DateField::Day => day = wrap(day, delta, days_in_month(year, month)),
        }
        day = day.min(days_in_month(year, month));

        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.date = date;
        }
        self.touched = true;
        self.value() != before
    }

    /// Type one digit into the focused field; returns true when the value changed
    ///
    /// A field takes its value once the digits typed so far make a valid one.
    /// When the field is full, focus moves to the next field.
    pub fn type_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        let width = self.field.width();
        if self.entry.len() >= width {
            self.entry.clear();
        }
        self.entry.push(digit);

        let before = self.value();
        let typed: u32 = self.entry.parse().unwrap_or(0);
        let (year, month, day) = (self.date.year(), self.date.month(), self.date.day());
        let candidate = match self.field {
            DateField::Year if self.entry.len() == width => i32::try_from(typed)
                .ok()
                .filter(|y| (MIN_YEAR..=MAX_YEAR).contains(y))
                .map(|y| (y, month, day.min(days_in_month(y, month)))),
            DateField::Year => None,
            DateField::Month if (1..=12).contains(&typed) => {
                Some((year, typed, day.min(days_in_month(year, typed))))
            }
            DateField::Day if (1..=days_in_month(year, month)).contains(&typed) => {
                Some((year, month, typed))
            }
            DateField::Month | DateField::Day => None,
        };
        if let Some(date) = candidate.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)) {
            self.date = date;
            self.touched = true;
        }

        if self.entry.len() == width {
            self.set_field(self.field.next());
        }
        self.value() != before
    }

    /// Draw the question card centred in `area` and record its controls
    pub fn render(
        &self,
        challenge: &DisplayChallenge,
        focused: Option<&Target>,
        area: Rect,
        buf: &mut Buffer,
        hits: &mut HitMap,
    ) {
        let view = &challenge.view;
        let width = area.width.min(48);
        let prompt = wrap_lines(&view.prompt, width.saturating_sub(4));
        let prompt_rows = u16::try_from(prompt.len()).unwrap_or(u16::MAX);
        let subtitle_rows = u16::from(view.subtitle.is_some());
        // border + prompt + subtitle + gap + spinners + gap + submit + feedback + border
        let height = prompt_rows + subtitle_rows + 7;

        let card = centered(area, width, height);
        let inner = draw_card(buf, card, view.tint);
        if inner.width < 16 || inner.height == 0 {
            return;
        }
        let mut card_buf = Buffer::empty(inner);
        let mut y = inner.y;

        for line in &prompt {
            draw_centered(
                &mut card_buf,
                y,
                line,
                Style::default().fg(CARD_TEXT).add_modifier(Modifier::BOLD),
            );
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

        // "yyyy - mm - dd"
        // Spinning after a wrong answer clears it; only a right answer freezes the picker
        let editable = matches!(challenge.state, ChallengeState::Idle | ChallengeState::Wrong);
        let tint = tint_color(view.tint);
        let spinners = [
            (DateField::Year, self.field_text(DateField::Year)),
            (DateField::Month, self.field_text(DateField::Month)),
            (DateField::Day, self.field_text(DateField::Day)),
        ];
        let total = 4 + 3 + 2 + 3 + 2;
        let mut x = inner.x + inner.width.saturating_sub(total) / 2;
        for (i, (field, text)) in spinners.iter().enumerate() {
            let target = Target::DateField(*field);
            let style = if !editable {
                Style::default().fg(DIM_GRAY)
            } else if focused == Some(&target) {
                Style::default().fg(FOCUS_YELLOW).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
            } else if self.touched {
                Style::default().fg(tint)
            } else {
                Style::default().fg(DIM_GRAY)
            };
            let width = u16::try_from(text.len()).unwrap_or(u16::MAX);
            card_buf.set_string(x, y, text, style);
            hits.push(Rect::new(x, y, width, 1), target);
            x += width;
            if i < 2 {
                card_buf.set_string(x, y, " - ", Style::default().fg(DIM_GRAY));
                x += 3;
            }
        }
        y += 2;

        let look = ButtonLook {
            style: Style::default().fg(tint).add_modifier(Modifier::BOLD),
            focused: focused == Some(&Target::DateSubmit),
            disabled: self.is_blank() || !challenge.accepts_input(),
        };
        let button = draw_button(&mut card_buf, inner.x + inner.width / 2, y, SUBMIT_LABEL, look);
        hits.push(button, Target::DateSubmit);
        y += 1;

        if let Some(feedback) = &challenge.feedback {
            let style = match challenge.state {
                ChallengeState::Correct => Style::default().fg(SUCCESS_GREEN),
                _ => Style::default().fg(ERROR_RED),
            };
            draw_centered(&mut card_buf, y, feedback, style);
        }

        blit_inner(buf, &card_buf);
    }

    fn field_text(&self, field: DateField) -> String {
        match (self.touched, field) {
            (false, DateField::Year) => "yyyy".to_string(),
            (false, DateField::Month) => "mm".to_string(),
            (false, DateField::Day) => "dd".to_string(),
            (true, DateField::Year) => format!("{:04}", self.date.year()),
            (true, DateField::Month) => format!("{:02}", self.date.month()),
            (true, DateField::Day) => format!("{:02}", self.date.day()),
        }
    }
}

/// Step `value` in `1..=max` by `delta`, wrapping around
fn wrap(value: u32, delta: i32, max: u32) -> u32 {
    let max = i64::from(max.max(1));
    let zero_based = i64::from(value) - 1 + i64::from(delta);
    u32::try_from(zero_based.rem_euclid(max) + 1).unwrap_or(1)
}

/// Days in `month` of `year`
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month >= 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
