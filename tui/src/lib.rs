//! Secret Valentine TUI - Terminal surface for the Secret Valentine story
//!
//! This crate draws the story run by `valentine-conductor`: a little pixel
//! character typing out lines in a speech bubble, the "prove it's you"
//! questions, the proposal with a refusal that runs away, and the
//! celebration with confetti and a time-together counter.
//!
//! # Architecture
//!
//! - **ConductorClient**: embeds the headless Conductor and drains its messages
//! - **DisplayState**: what is on screen, derived only from ConductorMessages
//! - **Compositor**: layered rendering (backdrop hearts, stage, confetti, status)
//! - **Widgets**: bubble, question cards, proposal controls, celebration card
//! - **Sound**: plays clips through an external player process

pub mod app;
pub mod compositor;
pub mod conductor_client;
pub mod display;
pub mod effects;
pub mod sound;
pub mod sprite;
pub mod theme;
pub mod widgets;

pub use app::App;
