//! Conductor - The Story Core
//!
//! The Conductor owns the whole session: which step is active, the stage
//! that step shows, the timers pacing it and the sounds accompanying it.
//!
//! # Design Philosophy
//!
//! The Conductor is UI-agnostic. It communicates through:
//! - `SurfaceEvent`: what the player did, received FROM the surface
//! - `ConductorMessage`: what to show, sent TO the surface
//!
//! Time only moves when the surface calls [`Conductor::tick`]. Every delayed
//! effect is a step-scoped timer, so leaving a step cancels whatever it had
//! pending and nothing from an old step can leak into the next one.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use crate::audio::{AudioBackend, SoundBank, SoundKind};
use crate::challenge::{
    AnswerChallenge, ChallengeDefinition, ChallengeState, DateChallenge, DateDefinition, Verdict,
};
use crate::config::StoryConfig;
use crate::dialogue::{Typewriter, TypewriterEvent};
use crate::events::SurfaceEvent;
use crate::messages::{ChallengeKind, ChallengeView, ConductorMessage, OptionView, ProposalView};
use crate::proposal::{DodgeState, Viewport, ACCEPT_LABEL, QUESTION};
use crate::script::{Step, StepKind, CELEBRATION_LINES};
use crate::sequencer::StepSequencer;
use crate::timer::{TimerAction, Timers};
use crate::together::TimeTogether;

/// Transient state of the active step; dropped when the step changes
#[derive(Debug)]
pub enum Stage {
    /// Typing the current dialogue line
    Dialogue(Typewriter),
    /// Multiple-choice question
    Choice(AnswerChallenge),
    /// Date question
    Date(DateChallenge),
    /// The proposal
    Proposal(DodgeState),
    /// Celebration, cycling its lines
    Celebration(Typewriter),
}

impl Stage {
    fn for_step(step: Step, config: &StoryConfig) -> Self {
        match step.kind() {
            StepKind::Dialogue(script) => Stage::Dialogue(Typewriter::new(
                script.line(0).unwrap_or_default(),
                config.typing.clone(),
            )),
            StepKind::Choice(definition) => Stage::Choice(AnswerChallenge::new(definition)),
            StepKind::Date(definition) => Stage::Date(DateChallenge::new(definition)),
            StepKind::Proposal => Stage::Proposal(DodgeState::new()),
            StepKind::Celebration => Stage::Celebration(Typewriter::new(
                CELEBRATION_LINES,
                config.typing.clone().looping(),
            )),
        }
    }
}

/// The Conductor - headless story core
pub struct Conductor<A: AudioBackend> {
    /// Configuration
    config: StoryConfig,
    /// Step and dialogue position
    sequencer: StepSequencer,
    /// What the active step shows
    stage: Stage,
    /// Pending delayed effects
    timers: Timers,
    /// Sounds and their load states
    sounds: SoundBank<A>,
    /// Channel to send messages to UI surface
    tx: mpsc::Sender<ConductorMessage>,
    /// Viewport class of the connected surface
    viewport: Viewport,
    /// Randomness for dodges and sound segments
    rng: StdRng,
    /// Whether the celebration was announced
    celebrated: bool,
}

impl<A: AudioBackend + 'static> Conductor<A> {
    /// Create a new Conductor with the given audio backend
    pub fn new(backend: A, config: StoryConfig, tx: mpsc::Sender<ConductorMessage>) -> Self {
        let sounds = SoundBank::new(backend, &config.audio);
        let sequencer = StepSequencer::new();
        let stage = Stage::for_step(sequencer.step(), &config);

        Self {
            config,
            sequencer,
            stage,
            timers: Timers::new(),
            sounds,
            tx,
            viewport: Viewport::default(),
            rng: StdRng::from_entropy(),
            celebrated: false,
        }
    }

    /// Use a fixed random seed
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Current step
    pub fn step(&self) -> Step {
        self.sequencer.step()
    }

    /// Step and dialogue position
    pub fn sequencer(&self) -> &StepSequencer {
        &self.sequencer
    }

    /// Active stage
    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Pending timers
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Sounds
    pub fn sounds(&self) -> &SoundBank<A> {
        &self.sounds
    }

    /// Configuration in use
    pub fn config(&self) -> &StoryConfig {
        &self.config
    }

    /// Viewport class used for dodges
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Whether the celebration was announced
    pub fn has_celebrated(&self) -> bool {
        self.celebrated
    }

    /// Attempt state of the active question, if any
    pub fn challenge_state(&self) -> Option<ChallengeState> {
        match &self.stage {
            Stage::Choice(challenge) => Some(challenge.state()),
            Stage::Date(challenge) => Some(challenge.state()),
            _ => None,
        }
    }

    /// Dodge state during the proposal
    pub fn dodge(&self) -> Option<&DodgeState> {
        match &self.stage {
            Stage::Proposal(dodge) => Some(dodge),
            _ => None,
        }
    }

    /// Start the Conductor: preload sounds and show the first step
    ///
    /// # Errors
    ///
    /// Never returns an error today. Sounds that fail to load are logged and stay silent.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        tracing::info!(
            config_source = %self.config.source(),
            backend = self.sounds.backend().name(),
            "Starting conductor"
        );
        self.sounds.preload();
        self.enter_step().await;
        Ok(())
    }

    /// Handle an event from the surface
    ///
    /// # Errors
    ///
    /// Never returns an error today. Rejected input is logged and ignored.
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        if event.is_gesture() {
            self.sounds.init();
        }

        match event {
            SurfaceEvent::Connected { width, height } => {
                self.set_viewport(width);
                tracing::debug!(width, height, viewport = ?self.viewport, "Surface connected");
                self.announce_step().await;
                self.announce_stage(false).await;
            }

            SurfaceEvent::Resized { width, .. } => {
                self.set_viewport(width);
            }

            SurfaceEvent::SkipPressed => self.skip().await,

            SurfaceEvent::AdvancePressed => self.advance_dialogue_step().await,

            SurfaceEvent::OptionHovered { id } => {
                if let Stage::Choice(challenge) = &self.stage {
                    if challenge.definition().candidate(&id).is_some() {
                        self.sounds.play_once(SoundKind::Hover, &mut self.rng);
                    }
                }
            }

            SurfaceEvent::OptionSelected { id } => self.select_option(&id).await,

            SurfaceEvent::DateEdited { value } => {
                if let Stage::Date(challenge) = &mut self.stage {
                    if challenge.edit(&value) {
                        self.send_challenge_update().await;
                    }
                } else {
                    tracing::debug!(step = ?self.sequencer.step(), "Ignoring date edit outside date step");
                }
            }

            SurfaceEvent::DateSubmitted { value } => self.submit_date(&value).await,

            SurfaceEvent::EvadeTouched => {
                if let Stage::Proposal(dodge) = &mut self.stage {
                    dodge.evade(self.viewport, &mut self.rng);
                    tracing::debug!(count = dodge.count, "Evaded");
                    self.send_proposal().await;
                } else {
                    tracing::debug!(step = ?self.sequencer.step(), "Ignoring evade outside proposal");
                }
            }

            SurfaceEvent::AcceptPressed => {
                if matches!(self.stage, Stage::Proposal(_)) {
                    tracing::info!("Proposal accepted");
                    self.advance_step().await;
                } else {
                    tracing::debug!(step = ?self.step(), "Ignoring accept outside proposal");
                }
            }

            SurfaceEvent::QuitRequested => {
                tracing::info!(step = ?self.step(), "Quit requested");
                self.send(ConductorMessage::Quit).await;
            }
        }

        Ok(())
    }

    /// Move time forward by `delta`
    ///
    /// Applies finished sound loads, advances typing and fires due timers.
    pub async fn tick(&mut self, delta: Duration) {
        self.sounds.poll_loaded();
        self.advance_typing(delta).await;

        for fired in self.timers.advance(delta) {
            if !self.timers.is_current(fired.scope) {
                continue;
            }
            self.on_timer(fired.action).await;
        }
    }

    // ========================================================================
    // Steps
    // ========================================================================

    fn set_viewport(&mut self, width: u16) {
        self.viewport = Viewport::from_width(width, self.config.wide_viewport_cols);
    }

    async fn advance_step(&mut self) {
        if self.sequencer.advance_step() {
            self.enter_step().await;
        } else {
            tracing::debug!("Already at the last step");
        }
    }

    /// Build the stage for the current step and show it
    async fn enter_step(&mut self) {
        self.timers.begin_step_scope();
        let step = self.sequencer.step();
        self.stage = Stage::for_step(step, &self.config);

        tracing::info!(step = ?step, index = step.index(), "Entered step");
        self.announce_step().await;
        self.announce_stage(true).await;
    }

    async fn announce_step(&self) {
        let step = self.sequencer.step();
        self.send(ConductorMessage::StepEntered {
            step,
            index: step.index(),
            terminal: step.is_terminal(),
        })
        .await;
    }

    /// Describe the active stage
    ///
    /// A fresh stage also arms its timers and, for the celebration, sends the
    /// one-time `Celebrate`.
    async fn announce_stage(&mut self, fresh: bool) {
        match &self.stage {
            Stage::Dialogue(_) => {
                self.announce_line(fresh).await;
            }
            Stage::Choice(challenge) => {
                let view = choice_view(challenge.definition());
                self.send(ConductorMessage::ChallengePresented { challenge: view })
                    .await;
                self.send_challenge_update().await;
            }
            Stage::Date(challenge) => {
                let view = date_view(challenge.definition());
                self.send(ConductorMessage::ChallengePresented { challenge: view })
                    .await;
                self.send_challenge_update().await;
            }
            Stage::Proposal(_) => self.send_proposal().await,
            Stage::Celebration(typewriter) => {
                let text = typewriter.visible_text();
                if fresh && !self.celebrated {
                    self.celebrated = true;
                    let since = self.config.together_since;
                    let together = TimeTogether::since(since);
                    tracing::info!(months = together.months, days = together.days, "Celebrating");
                    self.send(ConductorMessage::Celebrate { together, since })
                        .await;
                }
                self.send(ConductorMessage::CelebrationTyped { text }).await;
            }
        }
    }

    // ========================================================================
    // Dialogue
    // ========================================================================

    /// Describe the current dialogue line; a fresh line also arms its control
    async fn announce_line(&mut self, fresh: bool) {
        let Some(script) = self.sequencer.step().script() else {
            return;
        };
        let Stage::Dialogue(typewriter) = &self.stage else {
            return;
        };
        let text = typewriter.visible_text();
        let finished = typewriter.is_finished();
        let cursor = typewriter.cursor();

        self.send(ConductorMessage::DialogueLine {
            index: self.sequencer.dialogue_index(),
            total: script.len(),
            tint: script.tint,
            cursor,
        })
        .await;
        self.send(ConductorMessage::DialogueTyped { text, finished })
            .await;

        if fresh {
            let line = self.sequencer.current_line().unwrap_or_default();
            let delay = self.config.control_delay.for_line(line);
            self.timers.cancel(TimerAction::RevealControl);
            self.timers.schedule_for_step(TimerAction::RevealControl, delay);
        } else if self.sequencer.control_visible() {
            self.send_control().await;
        }
    }

    async fn skip(&mut self) {
        if !matches!(self.stage, Stage::Dialogue(_)) || !self.sequencer.control_visible() {
            tracing::debug!(step = ?self.step(), "Ignoring skip while control hidden");
            return;
        }
        if !self.sequencer.advance_dialogue() {
            tracing::debug!(step = ?self.step(), "Ignoring skip on last line");
            return;
        }

        let line = self.sequencer.current_line().unwrap_or_default();
        self.stage = Stage::Dialogue(Typewriter::new(line, self.config.typing.clone()));
        tracing::debug!(
            step = ?self.step(),
            line = self.sequencer.dialogue_index(),
            "Next dialogue line"
        );
        self.announce_line(true).await;
    }

    async fn advance_dialogue_step(&mut self) {
        let ready = matches!(self.stage, Stage::Dialogue(_))
            && self.sequencer.control_visible()
            && !self.sequencer.has_more_lines();
        if ready {
            self.advance_step().await;
        } else {
            tracing::debug!(step = ?self.step(), "Ignoring advance before last line is ready");
        }
    }

    async fn send_control(&self) {
        if let Some(control) = self.sequencer.control() {
            self.send(ConductorMessage::ControlShown { control }).await;
        }
    }

    async fn advance_typing(&mut self, delta: Duration) {
        match &mut self.stage {
            Stage::Dialogue(typewriter) => {
                let events = typewriter.advance(delta);
                if events.is_empty() {
                    return;
                }
                let text = typewriter.visible_text();
                let finished = typewriter.is_finished();

                for event in &events {
                    if let TypewriterEvent::CharTyped(_) = event {
                        if let Some(release) = self.sounds.play_segment(&mut self.rng) {
                            self.timers
                                .schedule_for_session(TimerAction::TalkingReleased, release);
                        }
                    }
                }
                self.send(ConductorMessage::DialogueTyped { text, finished })
                    .await;
            }
            Stage::Celebration(typewriter) => {
                if typewriter.advance(delta).is_empty() {
                    return;
                }
                let text = typewriter.visible_text();
                self.send(ConductorMessage::CelebrationTyped { text }).await;
            }
            Stage::Choice(_) | Stage::Date(_) | Stage::Proposal(_) => {}
        }
    }

    // ========================================================================
    // Challenges
    // ========================================================================

    async fn select_option(&mut self, id: &str) {
        let Stage::Choice(challenge) = &mut self.stage else {
            tracing::debug!(step = ?self.sequencer.step(), id, "Ignoring option outside choice step");
            return;
        };
        match challenge.select(id) {
            Ok(verdict) => {
                tracing::info!(step = ?self.sequencer.step(), id, correct = verdict.is_correct(), "Answered");
                self.apply_verdict(verdict).await;
            }
            Err(e) => tracing::debug!(step = ?self.sequencer.step(), error = %e, "Rejected selection"),
        }
    }

    async fn submit_date(&mut self, value: &str) {
        let Stage::Date(challenge) = &mut self.stage else {
            tracing::debug!(step = ?self.sequencer.step(), "Ignoring date outside date step");
            return;
        };
        if challenge.value() != value {
            challenge.edit(value);
        }
        match challenge.submit() {
            Ok(verdict) => {
                tracing::info!(step = ?self.sequencer.step(), correct = verdict.is_correct(), "Date submitted");
                self.apply_verdict(verdict).await;
            }
            Err(e) => {
                tracing::debug!(step = ?self.sequencer.step(), error = %e, "Rejected date");
                // An edit folded into the submit may have cleared feedback
                self.send_challenge_update().await;
            }
        }
    }

    async fn apply_verdict(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Correct { succeed_after } => {
                self.sounds.play_once(SoundKind::Correct, &mut self.rng);
                self.timers
                    .schedule_for_step(TimerAction::ChallengePassed, succeed_after);
            }
            Verdict::Wrong { retry_after } => {
                self.timers
                    .schedule_for_step(TimerAction::ChallengeCooldown, retry_after);
            }
        }
        self.send_challenge_update().await;
    }

    async fn send_challenge_update(&self) {
        let (state, selected, feedback) = match &self.stage {
            Stage::Choice(challenge) => (
                challenge.state(),
                challenge.selected().map(String::from),
                challenge.feedback(),
            ),
            Stage::Date(challenge) => (
                challenge.state(),
                Some(challenge.value().to_string()).filter(|v| !v.is_empty()),
                challenge.feedback(),
            ),
            _ => return,
        };
        self.send(ConductorMessage::ChallengeUpdated {
            state,
            selected,
            feedback: feedback.map(String::from),
        })
        .await;
    }

    // ========================================================================
    // Proposal
    // ========================================================================

    async fn send_proposal(&self) {
        let Stage::Proposal(dodge) = &self.stage else {
            return;
        };
        let proposal = ProposalView {
            question: QUESTION.to_string(),
            accept_label: ACCEPT_LABEL.to_string(),
            evade_label: dodge.message().to_string(),
            accept_scale: dodge.accept_scale(),
            evade_offset: dodge.offset,
            evade_font_size: dodge.evade_font_size(),
            dodge_count: dodge.count,
        };
        self.send(ConductorMessage::ProposalUpdated { proposal }).await;
    }

    // ========================================================================
    // Timers
    // ========================================================================

    async fn on_timer(&mut self, action: TimerAction) {
        match action {
            TimerAction::RevealControl => {
                if matches!(self.stage, Stage::Dialogue(_)) {
                    self.sequencer.set_control_visible(true);
                    self.send_control().await;
                }
            }
            TimerAction::ChallengePassed => {
                if self.challenge_state() == Some(ChallengeState::Correct) {
                    self.advance_step().await;
                }
            }
            TimerAction::ChallengeCooldown => {
                let reset = match &mut self.stage {
                    Stage::Choice(challenge) => challenge.reset(),
                    Stage::Date(challenge) => challenge.reset(),
                    _ => false,
                };
                if reset {
                    self.send_challenge_update().await;
                }
            }
            TimerAction::TalkingReleased => self.sounds.release_talking(),
        }
    }

    /// Send a message to the UI surface
    async fn send(&self, msg: ConductorMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

fn choice_view(definition: &ChallengeDefinition) -> ChallengeView {
    ChallengeView {
        kind: ChallengeKind::Choice,
        prompt: definition.prompt.to_string(),
        subtitle: definition.subtitle.map(String::from),
        options: definition
            .candidates
            .iter()
            .map(|c| OptionView {
                id: c.id.to_string(),
                label: c.label.to_string(),
            })
            .collect(),
        tint: definition.tint,
    }
}

fn date_view(definition: &DateDefinition) -> ChallengeView {
    ChallengeView {
        kind: ChallengeKind::Date,
        prompt: definition.prompt.to_string(),
        subtitle: definition.subtitle.map(String::from),
        options: Vec::new(),
        tint: definition.tint,
    }
}
