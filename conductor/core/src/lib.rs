//! Valentine Conductor - Headless Story Core for Secret Valentine
//!
//! This crate holds everything the story *is*: the fixed sequence of steps,
//! the lines the character types out, the "prove it's you" questions, the
//! proposal that cannot be refused and the celebration at the end. It knows
//! nothing about terminals, colours or confetti.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       Rendering surface                      │
//! │            (valentine-tui: ratatui + crossterm)              │
//! │                              │                               │
//! │                     SurfaceEvent (up)                        │
//! │                   ConductorMessage (down)                    │
//! └──────────────────────────────┼───────────────────────────────┘
//!                                │
//! ┌──────────────────────────────┼───────────────────────────────┐
//! │                      CONDUCTOR CORE                          │
//! │  ┌───────────────────────────┴────────────────────────────┐  │
//! │  │                       Conductor                        │  │
//! │  │  ┌───────────┐ ┌──────────┐ ┌────────┐ ┌────────────┐  │  │
//! │  │  │ Sequencer │ │  Stage   │ │ Timers │ │ Sound bank │  │  │
//! │  │  └───────────┘ └──────────┘ └────────┘ └────────────┘  │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Conductor`]: owns the session and drives everything
//! - [`ConductorMessage`]: what the surface should show
//! - [`SurfaceEvent`]: what the player did
//! - [`Step`]: the steps of the story, in order
//! - [`Typewriter`]: time-paced character reveal
//! - [`AnswerChallenge`] / [`DateChallenge`]: question attempt state
//!
//! # Quick Start
//!
//! ```ignore
//! use std::time::Duration;
//! use valentine_conductor::{Conductor, SilentBackend, StoryConfig, SurfaceEvent};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(256);
//!     let mut conductor = Conductor::new(SilentBackend, StoryConfig::default(), tx);
//!     conductor.start().await?;
//!
//!     loop {
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message
//!         }
//!         conductor.tick(Duration::from_millis(16)).await;
//!         // Translate input into SurfaceEvents and call handle_event
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`script`]: steps, dialogue lines and question definitions
//! - [`sequencer`]: step index and dialogue position
//! - [`dialogue`]: the typewriter
//! - [`challenge`]: multiple-choice and date question state
//! - [`proposal`]: the dodging refusal
//! - [`timer`]: step-scoped virtual-clock timers
//! - [`audio`]: sound load states and playback requests
//! - [`together`]: the time-together counter
//! - [`config`]: layered configuration
//! - [`events`] / [`messages`]: the surface protocol
//! - [`conductor`]: the Conductor itself
//!
//! # No TUI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod audio;
pub mod challenge;
pub mod conductor;
pub mod config;
pub mod dialogue;
pub mod events;
pub mod messages;
pub mod proposal;
pub mod script;
pub mod sequencer;
pub mod timer;
pub mod together;

// Re-exports for convenience
pub use audio::{
    AudioBackend, AudioError, PlayRequest, SilentBackend, SoundBank, SoundHandle, SoundKind,
    SoundSource, SoundState,
};
pub use challenge::{
    AnswerChallenge, Candidate, ChallengeDefinition, ChallengeState, DateChallenge,
    DateDefinition, SelectError, Verdict,
};
pub use conductor::{Conductor, Stage};
pub use dialogue::{Typewriter, TypewriterEvent, TypewriterText, TypingConfig};
pub use events::SurfaceEvent;
pub use messages::{ChallengeKind, ChallengeView, ConductorMessage, OptionView, ProposalView};
pub use proposal::{DodgeState, Viewport, DODGE_MESSAGES};
pub use script::{DialogueScript, Step, StepKind, Tint};
pub use sequencer::{DialogueControl, StepSequencer};
pub use timer::{FiredTimer, TimerAction, TimerScope, Timers};
pub use together::TimeTogether;

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, AudioConfig, ConfigError,
    ConfigOverrides, ConfigSource, ControlDelay, StoryConfig, ValentineToml,
};
