//! Sound Resources
//!
//! Three short sounds accompany the story: a talking clip cut into segments
//! while dialogue types, a chime for right answers, and a blip when an
//! option is hovered.
//!
//! Decoding and playback are someone else's problem. The core only talks to
//! an [`AudioBackend`] and tracks each sound as an explicit state machine:
//!
//! ```text
//! Unloaded ──load──► Loading ──► Ready(handle)
//!                           └──► Failed        (silent for the session)
//! ```
//!
//! Playing a sound that is not `Ready` does nothing. There is no retry and
//! no queue.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::config::AudioConfig;

/// Length of one talking segment
pub const SEGMENT: Duration = Duration::from_millis(1500);

/// Extra time before the talking busy flag is cleared
const RELEASE_GRACE: Duration = Duration::from_millis(100);

const HOVER_LEAD_IN: Duration = Duration::from_millis(250);
const HOVER_LENGTH: Duration = Duration::from_millis(500);
const HOVER_VOLUME: f32 = 0.5;
const CORRECT_LENGTH: Duration = Duration::from_secs(2);
const CORRECT_VOLUME: f32 = 0.6;

// ============================================================================
// Types
// ============================================================================

/// Which sound
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundKind {
    /// Character voice, played in segments while typing
    Talking,
    /// Right-answer chime
    Correct,
    /// Option hover blip
    Hover,
}

impl SoundKind {
    /// All sounds
    pub const ALL: [SoundKind; 3] = [SoundKind::Talking, SoundKind::Correct, SoundKind::Hover];

    /// File name inside the sounds directory
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            SoundKind::Talking => "talking.mp3",
            SoundKind::Correct => "correct.mp3",
            SoundKind::Hover => "hover.mp3",
        }
    }
}

/// Where to load a sound from
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundSource {
    /// Which sound
    pub kind: SoundKind,
    /// File to load
    pub path: PathBuf,
    /// Known length of the clip, used to cut segments
    pub clip: Duration,
}

/// A loaded sound, ready to play
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SoundHandle {
    /// Which sound
    pub kind: SoundKind,
    /// File it came from
    pub path: PathBuf,
    /// Length of the clip
    pub clip: Duration,
    /// Size on disk
    pub size_bytes: u64,
}

impl SoundHandle {
    /// How many whole segments fit in the clip
    #[must_use]
    pub fn segments(&self) -> u32 {
        u32::try_from(self.clip.as_millis() / SEGMENT.as_millis()).unwrap_or(u32::MAX)
    }
}

/// One playback
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayRequest {
    /// Start position inside the clip
    pub offset: Duration,
    /// How long to play; `None` plays to the end
    pub duration: Option<Duration>,
    /// Gain, 0.0 to 1.0
    pub volume: f32,
}

/// Why a sound could not be loaded
#[derive(Debug, Error)]
pub enum AudioError {
    /// Sound is switched off
    #[error("audio is disabled")]
    Disabled,

    /// The file does not exist
    #[error("sound file not found: {path}")]
    NotFound {
        /// Missing file
        path: PathBuf,
    },

    /// The file could not be read
    #[error("failed to read sound file {path}: {source}")]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// The file has no content
    #[error("sound file is empty: {path}")]
    Empty {
        /// Empty file
        path: PathBuf,
    },
}

/// Load state of one sound
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum SoundState {
    /// Not requested yet
    #[default]
    Unloaded,
    /// Load in flight
    Loading,
    /// Loaded
    Ready(SoundHandle),
    /// Could not load; stays silent
    Failed,
}

impl SoundState {
    /// Whether the sound can play
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, SoundState::Ready(_))
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Whatever actually decodes and plays sounds
#[async_trait]
pub trait AudioBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &str;

    /// Prepare a sound for playback
    async fn load(&self, source: &SoundSource) -> Result<SoundHandle, AudioError>;

    /// Start playing; fire-and-forget
    fn play(&self, sound: &SoundHandle, request: PlayRequest);
}

/// Backend that never makes a sound
#[derive(Clone, Copy, Debug, Default)]
pub struct SilentBackend;

#[async_trait]
impl AudioBackend for SilentBackend {
    fn name(&self) -> &str {
        "silent"
    }

    async fn load(&self, _source: &SoundSource) -> Result<SoundHandle, AudioError> {
        Err(AudioError::Disabled)
    }

    fn play(&self, _sound: &SoundHandle, _request: PlayRequest) {}
}

// ============================================================================
// Sound bank
// ============================================================================

type LoadResult = (SoundKind, Result<SoundHandle, AudioError>);

/// The session's sounds and their load states
pub struct SoundBank<A: AudioBackend> {
    backend: Arc<A>,
    sources: HashMap<SoundKind, SoundSource>,
    slots: HashMap<SoundKind, SoundState>,
    muted: bool,
    talking_busy: bool,
    loaded_tx: mpsc::UnboundedSender<LoadResult>,
    loaded_rx: mpsc::UnboundedReceiver<LoadResult>,
}

impl<A: AudioBackend + 'static> SoundBank<A> {
    /// Create a bank with every sound unloaded
    pub fn new(backend: A, config: &AudioConfig) -> Self {
        let sources = SoundKind::ALL
            .into_iter()
            .map(|kind| {
                let clip = match kind {
                    SoundKind::Talking => config.talking_clip,
                    SoundKind::Hover => config.hover_clip,
                    SoundKind::Correct => CORRECT_LENGTH,
                };
                let source = SoundSource {
                    kind,
                    path: config.sounds_dir.join(kind.file_name()),
                    clip,
                };
                (kind, source)
            })
            .collect();
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();

        Self {
            backend: Arc::new(backend),
            sources,
            slots: HashMap::new(),
            muted: config.muted,
            talking_busy: false,
            loaded_tx,
            loaded_rx,
        }
    }

    /// Backend in use
    pub fn backend(&self) -> &A {
        &self.backend
    }

    /// Load state of a sound
    pub fn state(&self, kind: SoundKind) -> SoundState {
        self.slots.get(&kind).cloned().unwrap_or_default()
    }

    /// Whether a talking segment is playing
    pub fn is_talking(&self) -> bool {
        self.talking_busy
    }

    /// Load the talking sound; call on the first user gesture
    ///
    /// Calling it again does nothing.
    pub fn init(&mut self) {
        self.load(SoundKind::Talking);
    }

    /// Load the sounds that do not wait for a gesture
    pub fn preload(&mut self) {
        self.load(SoundKind::Correct);
        self.load(SoundKind::Hover);
    }

    fn load(&mut self, kind: SoundKind) {
        if self.state(kind) != SoundState::Unloaded {
            return;
        }
        if self.muted {
            self.slots.insert(kind, SoundState::Failed);
            return;
        }
        let Some(source) = self.sources.get(&kind).cloned() else {
            self.slots.insert(kind, SoundState::Failed);
            return;
        };

        self.slots.insert(kind, SoundState::Loading);
        let backend = Arc::clone(&self.backend);
        let tx = self.loaded_tx.clone();

        tokio::spawn(async move {
            let result = backend.load(&source).await;
            // The bank may be gone if the session ended mid-load
            let _ = tx.send((source.kind, result));
        });
    }

    /// Apply finished loads
    ///
    /// Returns how many sounds changed state.
    pub fn poll_loaded(&mut self) -> usize {
        let mut applied = 0;
        while let Ok((kind, result)) = self.loaded_rx.try_recv() {
            let state = match result {
                Ok(handle) => {
                    tracing::debug!(sound = ?kind, path = %handle.path.display(), "Sound ready");
                    SoundState::Ready(handle)
                }
                Err(AudioError::Disabled) => SoundState::Failed,
                Err(e) => {
                    tracing::warn!(
                        sound = ?kind,
                        backend = self.backend.name(),
                        error = %e,
                        "Failed to load sound"
                    );
                    SoundState::Failed
                }
            };
            self.slots.insert(kind, state);
            applied += 1;
        }
        applied
    }

    /// Play a random talking segment unless one is already playing
    ///
    /// Returns the delay after which [`SoundBank::release_talking`] should be
    /// called, or `None` if nothing started.
    pub fn play_segment<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<Duration> {
        if self.talking_busy {
            return None;
        }
        let SoundState::Ready(handle) = self.slots.get(&SoundKind::Talking)? else {
            return None;
        };
        let segments = handle.segments();
        if segments == 0 {
            return None;
        }

        let index = rng.gen_range(0..segments);
        self.backend.play(
            handle,
            PlayRequest {
                offset: SEGMENT * index,
                duration: Some(SEGMENT),
                volume: 1.0,
            },
        );
        self.talking_busy = true;
        Some(SEGMENT + RELEASE_GRACE)
    }

    /// Clear the talking busy flag
    pub fn release_talking(&mut self) {
        self.talking_busy = false;
    }

    /// Play a one-shot sound; ignores the talking busy flag
    pub fn play_once<R: Rng + ?Sized>(&self, kind: SoundKind, rng: &mut R) {
        let Some(SoundState::Ready(handle)) = self.slots.get(&kind) else {
            return;
        };

        let request = match kind {
            SoundKind::Correct => PlayRequest {
                offset: Duration::ZERO,
                duration: Some(CORRECT_LENGTH),
                volume: CORRECT_VOLUME,
            },
            SoundKind::Hover => {
                let segments = handle.segments();
                if segments == 0 {
                    return;
                }
                let index = rng.gen_range(0..segments);
                PlayRequest {
                    offset: SEGMENT * index + HOVER_LEAD_IN,
                    duration: Some(HOVER_LENGTH),
                    volume: HOVER_VOLUME,
                }
            }
            SoundKind::Talking => PlayRequest {
                offset: Duration::ZERO,
                duration: Some(SEGMENT),
                volume: 1.0,
            },
        };
        self.backend.play(handle, request);
    }
}
