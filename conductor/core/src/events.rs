//! Surface Events
//!
//! Events sent from the rendering surface to the Conductor. They report what
//! the player did, not what it means: the surface says "option 3 was
//! clicked", the Conductor decides whether that was the right answer.

use serde::{Deserialize, Serialize};

/// Events from UI Surface to Conductor
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceEvent {
    // ============================================
    // Connection Events
    // ============================================
    /// Surface is ready to render
    Connected {
        /// Width in surface units (terminal columns)
        width: u16,
        /// Height in surface units (terminal rows)
        height: u16,
    },

    /// Surface viewport resized
    Resized {
        /// New width
        width: u16,
        /// New height
        height: u16,
    },

    // ============================================
    // Dialogue
    // ============================================
    /// Skip to the next dialogue line
    SkipPressed,

    /// Leave the dialogue step
    AdvancePressed,

    // ============================================
    // Challenges
    // ============================================
    /// Pointer or focus moved onto an option
    OptionHovered {
        /// Option identifier
        id: String,
    },

    /// An option was picked
    OptionSelected {
        /// Option identifier
        id: String,
    },

    /// The date input changed
    DateEdited {
        /// New value, `YYYY-MM-DD` or empty
        value: String,
    },

    /// The date was submitted
    DateSubmitted {
        /// Submitted value, `YYYY-MM-DD` or empty
        value: String,
    },

    // ============================================
    // Proposal
    // ============================================
    /// The evading control was hovered or pressed
    EvadeTouched,

    /// The accept control was pressed
    AcceptPressed,

    // ============================================
    // Lifecycle
    // ============================================
    /// The player wants to leave
    QuitRequested,
}

impl SurfaceEvent {
    /// Whether this event comes from a deliberate player gesture
    ///
    /// Gestures unlock the talking sound.
    #[must_use]
    pub fn is_gesture(&self) -> bool {
        !matches!(
            self,
            Self::Connected { .. } | Self::Resized { .. } | Self::OptionHovered { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gestures() {
        assert!(SurfaceEvent::SkipPressed.is_gesture());
        assert!(SurfaceEvent::EvadeTouched.is_gesture());
        assert!(!SurfaceEvent::Resized { width: 80, height: 24 }.is_gesture());
        assert!(!SurfaceEvent::OptionHovered { id: "Red".into() }.is_gesture());
    }
}
