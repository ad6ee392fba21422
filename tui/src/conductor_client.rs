//! Conductor Client
//!
//! Thin wrapper around the Conductor for TUI integration.
//! This client embeds the Conductor directly (no network) and provides
//! a convenient interface for sending events and receiving messages.
//!
//! # Architecture
//!
//! The TUI is a "thin client" - it doesn't contain any story logic.
//! All sequencing happens in the Conductor. The TUI's job is:
//! 1. Convert terminal events to SurfaceEvents
//! 2. Send SurfaceEvents to Conductor
//! 3. Receive ConductorMessages
//! 4. Render display state based on messages

use std::time::Duration;

use tokio::sync::mpsc;

use valentine_conductor::{AudioBackend, Conductor, ConductorMessage, StoryConfig, SurfaceEvent};

use crate::sound::ProcessAudio;

/// Client for communicating with the embedded Conductor
pub struct ConductorClient<A: AudioBackend + 'static = ProcessAudio> {
    /// The embedded Conductor instance
    conductor: Conductor<A>,
    /// Receiver for messages from Conductor
    rx: mpsc::Receiver<ConductorMessage>,
}

impl ConductorClient<ProcessAudio> {
    /// Create a client that plays sounds through the configured player
    pub fn new(config: StoryConfig) -> Self {
        let backend = ProcessAudio::from_config(&config.audio);
        Self::with_backend(backend, config)
    }
}

impl<A: AudioBackend + 'static> ConductorClient<A> {
    /// Create a client around any audio backend
    pub fn with_backend(backend: A, config: StoryConfig) -> Self {
        // Create channel for Conductor -> TUI messages
        let (tx, rx) = mpsc::channel(256);
        let conductor = Conductor::new(backend, config, tx);
        Self { conductor, rx }
    }

    /// Use a fixed random seed (tests)
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.conductor = self.conductor.with_seed(seed);
        self
    }

    /// The embedded Conductor
    pub fn conductor(&self) -> &Conductor<A> {
        &self.conductor
    }

    /// Start the Conductor (preload sounds, show the first step)
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await
    }

    /// Connect this surface to the Conductor
    pub async fn connect(&mut self, width: u16, height: u16) -> anyhow::Result<()> {
        self.send(SurfaceEvent::Connected { width, height }).await
    }

    /// Forward any event to the Conductor
    pub async fn send(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        self.conductor.handle_event(event).await
    }

    /// Notify Conductor of resize
    pub async fn resized(&mut self, width: u16, height: u16) -> anyhow::Result<()> {
        self.send(SurfaceEvent::Resized { width, height }).await
    }

    /// Notify Conductor that user wants to quit
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.send(SurfaceEvent::QuitRequested).await
    }

    /// Advance the Conductor's clock by one frame
    pub async fn tick(&mut self, delta: Duration) {
        self.conductor.tick(delta).await;
    }

    /// Receive all pending messages from the Conductor (non-blocking)
    pub fn recv_all(&mut self) -> Vec<ConductorMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }
}
