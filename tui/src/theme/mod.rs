//! Theme and Colors
//!
//! The valentine palette: soft pinks for the character and bubbles, one
//! colour family per question card, and warm accents for the celebration.

use ratatui::style::Color;

use valentine_conductor::Tint;

// ============================================================================
// Character Palette
// ============================================================================

/// Hair - dark brown
pub const SPRITE_HAIR: Color = Color::Rgb(92, 58, 44);

/// Skin
pub const SPRITE_SKIN: Color = Color::Rgb(255, 214, 186);

/// Eyes
pub const SPRITE_EYES: Color = Color::Rgb(40, 40, 40);

/// Mouth (open while talking)
pub const SPRITE_MOUTH: Color = Color::Rgb(200, 80, 110);

/// Sweater - valentine red
pub const SPRITE_SWEATER: Color = Color::Rgb(230, 70, 100);

// ============================================================================
// UI Colors
// ============================================================================

/// Main accent
pub const VALENTINE_PINK: Color = Color::Rgb(255, 105, 180);

/// Soft background hearts
pub const HEART_DIM: Color = Color::Rgb(120, 60, 90);

/// System/dim text
pub const DIM_GRAY: Color = Color::Rgb(100, 100, 100);

/// Wrong answer
pub const ERROR_RED: Color = Color::Rgb(255, 80, 80);

/// Right answer
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Focused control outline
pub const FOCUS_YELLOW: Color = Color::Rgb(255, 223, 128);

/// Text on cards
pub const CARD_TEXT: Color = Color::Rgb(255, 255, 255);

/// Card and bubble fill; painted cells hide the hearts behind them
pub const CARD_BG: Color = Color::Rgb(40, 24, 36);

/// Confetti colours
pub const CONFETTI: [Color; 6] = [
    Color::Rgb(255, 105, 180),
    Color::Rgb(255, 223, 128),
    Color::Rgb(150, 180, 255),
    Color::Rgb(120, 230, 120),
    Color::Rgb(200, 140, 255),
    Color::Rgb(255, 150, 120),
];

// ============================================================================
// Tints
// ============================================================================

/// Main colour of a tint (bubble or card fill)
pub fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Pink => Color::Rgb(255, 182, 193),
        Tint::Blue => Color::Rgb(150, 190, 255),
        Tint::Purple => Color::Rgb(170, 120, 230),
        Tint::Yellow => Color::Rgb(250, 210, 90),
        Tint::Orange => Color::Rgb(255, 160, 90),
        Tint::Teal => Color::Rgb(80, 200, 190),
        Tint::Green => Color::Rgb(130, 220, 130),
    }
}

/// Darker shade of a tint, for borders and shadows
pub fn tint_shadow(tint: Tint) -> Color {
    match tint_color(tint) {
        Color::Rgb(r, g, b) => Color::Rgb(r / 10 * 7, g / 10 * 7, b / 10 * 7),
        other => other,
    }
}
