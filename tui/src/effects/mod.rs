//! Decorative Effects
//!
//! Particles that live on their own layers and never talk to the Conductor:
//! hearts drifting up the backdrop for the whole session, and confetti that
//! falls once when the celebration starts.

pub mod confetti;
pub mod hearts;

pub use confetti::Confetti;
pub use hearts::Hearts;
