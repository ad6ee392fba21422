//! Main Application
//!
//! The App struct manages the TUI lifecycle as a thin display client:
//! - Event loop (keyboard, mouse, resize)
//! - ConductorClient for the story
//! - DisplayState for rendering
//!
//! # Architecture
//!
//! The App is a thin client that:
//! 1. Converts terminal events to SurfaceEvents
//! 2. Sends events to the embedded Conductor via ConductorClient
//! 3. Receives ConductorMessages and updates DisplayState
//! 4. Renders based on DisplayState
//!
//! Everything the player can point at is recorded in a [`HitMap`] while the
//! stage is drawn; mouse and keyboard both resolve to a [`Target`] through it.

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use futures::StreamExt;
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::Terminal;
use tokio::time::MissedTickBehavior;

use valentine_conductor::{
    AudioBackend, ChallengeKind, ChallengeState, ConductorMessage, Step, SurfaceEvent,
};

use crate::compositor::{Compositor, LayerKind};
use crate::conductor_client::ConductorClient;
use crate::display::DisplayState;
use crate::effects::{Confetti, Hearts};
use crate::sound::ProcessAudio;
use crate::sprite::Sprite;
use crate::theme::tint_shadow;
use crate::widgets::{
    bubble, Bubble, CelebrationCard, ChoiceGrid, DatePicker, HitMap, ProposalButtons, Target,
};

/// Time between frames (~60 FPS, the typewriter needs the resolution)
pub const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Below this width the bubble goes under the sprite instead of beside it
const SIDE_BY_SIDE_MIN_WIDTH: u16 = 64;

/// Said on the way out after a yes
const FAREWELL: &str = "Happy Valentine's Day 💕";

/// Main application state
pub struct App<A: AudioBackend + 'static = ProcessAudio> {
    // === Core State ===
    /// Is the app still running?
    running: bool,

    // === Conductor Integration ===
    /// Client for communicating with the embedded Conductor
    conductor: ConductorClient<A>,
    /// Display state derived from ConductorMessages
    display: DisplayState,

    // === UI Components ===
    /// The layered compositor
    compositor: Compositor,
    /// Controls drawn in the last frame
    hits: HitMap,
    /// The talking character
    sprite: Sprite,
    /// Backdrop hearts
    hearts: Hearts,
    /// Celebration burst
    confetti: Confetti,

    // === Input State ===
    /// Keyboard focus
    focused: Option<Target>,
    /// Control under the mouse
    hovered: Option<Target>,
    /// Date question spinners
    picker: DatePicker,

    // === Misc State ===
    /// Randomness for decorations
    rng: StdRng,
    /// Last frame time (for animations)
    last_frame: Instant,
    /// Terminal size
    size: (u16, u16),
}

impl<A: AudioBackend + 'static> App<A> {
    /// Create a new App around a conductor client for a `size` terminal
    pub fn new(conductor: ConductorClient<A>, size: (u16, u16)) -> Self {
        let area = Rect::new(0, 0, size.0, size.1);
        let mut rng = StdRng::from_entropy();
        let hearts = Hearts::new(&mut rng, size.1);

        Self {
            running: true,
            conductor,
            display: DisplayState::new(),
            compositor: Compositor::new(area),
            hits: HitMap::new(),
            sprite: Sprite::new(),
            hearts,
            confetti: Confetti::new(),
            focused: None,
            hovered: None,
            picker: DatePicker::new(),
            rng,
            last_frame: Instant::now(),
            size,
        }
    }

    /// Is the app still running?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Display state
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// The conductor client
    pub fn conductor(&self) -> &ConductorClient<A> {
        &self.conductor
    }

    /// Controls drawn in the last frame
    pub fn hits(&self) -> &HitMap {
        &self.hits
    }

    /// Keyboard focus
    pub fn focused(&self) -> Option<&Target> {
        self.focused.as_ref()
    }

    /// Date spinners
    pub fn picker(&self) -> &DatePicker {
        &self.picker
    }

    /// Confetti burst
    pub fn confetti(&self) -> &Confetti {
        &self.confetti
    }

    /// Line to print after the terminal is restored
    pub fn farewell(&self) -> Option<&'static str> {
        self.display.celebration.as_ref().map(|_| FAREWELL)
    }

    /// Start the Conductor and connect this surface
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.conductor.start().await?;
        self.conductor.connect(self.size.0, self.size.1).await?;
        self.process_conductor_messages();
        self.draw_layers();
        Ok(())
    }

    /// Main event loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        // Create async event stream for non-blocking terminal events
        let mut event_stream = EventStream::new();
        let mut frames = tokio::time::interval(FRAME_DURATION);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        self.start().await?;
        self.last_frame = Instant::now();
        self.render(terminal)?;

        while self.running {
            tokio::select! {
                biased;

                // Check for terminal events - highest priority
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_terminal_event(event).await,
                        Some(Err(e)) => tracing::warn!(error = %e, "Terminal event error"),
                        None => self.running = false,
                    }
                }

                // Frame tick - advance time and render
                _ = frames.tick() => {
                    let now = Instant::now();
                    let delta = now - self.last_frame;
                    self.last_frame = now;
                    self.frame(delta).await;
                    self.render(terminal)?;
                }
            }
        }

        Ok(())
    }

    /// Advance everything by one frame
    pub async fn frame(&mut self, delta: Duration) {
        self.conductor.tick(delta).await;
        self.process_conductor_messages();

        self.display.update(delta);
        self.sprite.update(delta, self.display.is_talking());
        self.hearts.update(delta, self.size.1, &mut self.rng);
        self.confetti.update(delta);

        self.draw_layers();
    }

    /// Process all pending messages from the Conductor
    fn process_conductor_messages(&mut self) {
        for msg in self.conductor.recv_all() {
            if let ConductorMessage::StepEntered { step, .. } = &msg {
                tracing::debug!(step = ?step, "Surface switching step");
                self.focused = None;
                self.hovered = None;
                self.picker = DatePicker::new();
            }
            self.display.apply_message(msg);
        }

        if self.display.take_celebrate() {
            self.confetti.start(&mut self.rng, self.compositor.area());
        }
        if self.display.quit {
            self.running = false;
        }
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Route one terminal event
    pub async fn handle_terminal_event(&mut self, event: Event) {
        match event {
            // Only handle Press events (not Release or Repeat)
            Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key).await,
            Event::Mouse(mouse) => self.handle_mouse(mouse).await,
            Event::Resize(w, h) => self.handle_resize(w, h).await,
            _ => return,
        }
        self.process_conductor_messages();
        self.draw_layers();
    }

    /// Handle keyboard input
    async fn handle_key(&mut self, key: KeyEvent) {
        let on_date_field = matches!(self.focused, Some(Target::DateField(_)));

        match key.code {
            // Quit
            KeyCode::Esc => self.request_quit().await,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_quit().await;
            }

            // Date spinners
            KeyCode::Up if on_date_field => self.adjust_date(1).await,
            KeyCode::Down if on_date_field => self.adjust_date(-1).await,
            KeyCode::Left if on_date_field => {
                let field = self.picker.field().prev();
                self.set_focus(Some(Target::DateField(field))).await;
            }
            KeyCode::Right if on_date_field => {
                let field = self.picker.field().next();
                self.set_focus(Some(Target::DateField(field))).await;
            }
            KeyCode::Char(c @ '0'..='9') if on_date_field => self.type_date_digit(c).await,

            // Focus
            KeyCode::Tab | KeyCode::Right | KeyCode::Down => self.move_focus(false).await,
            KeyCode::BackTab | KeyCode::Left | KeyCode::Up => self.move_focus(true).await,

            // Activate
            KeyCode::Enter | KeyCode::Char(' ') => match self.focused.clone() {
                Some(target) => self.activate(target).await,
                None => self.activate_default().await,
            },

            // Numbered options
            KeyCode::Char(c @ '1'..='9') => self.pick_numbered(c).await,

            _ => {}
        }
    }

    /// Handle mouse input
    async fn handle_mouse(&mut self, mouse: MouseEvent) {
        let target = self.hits.target_at(mouse.column, mouse.row).cloned();

        match mouse.kind {
            MouseEventKind::Moved => {
                if target != self.hovered {
                    self.hovered = target.clone();
                    if let Some(target) = target {
                        self.point_at(&target).await;
                    }
                }
            }
            MouseEventKind::Down(MouseButton::Left) => {
                if let Some(target) = target {
                    self.set_focus(Some(target.clone())).await;
                    self.activate(target).await;
                }
            }
            MouseEventKind::ScrollUp => {
                if let Some(Target::DateField(field)) = target {
                    self.set_focus(Some(Target::DateField(field))).await;
                    self.adjust_date(1).await;
                }
            }
            MouseEventKind::ScrollDown => {
                if let Some(Target::DateField(field)) = target {
                    self.set_focus(Some(Target::DateField(field))).await;
                    self.adjust_date(-1).await;
                }
            }
            _ => {}
        }
    }

    /// Handle terminal resize
    async fn handle_resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        let area = Rect::new(0, 0, width, height);
        self.compositor.resize(area);
        self.confetti.resize(area);

        if let Err(e) = self.conductor.resized(width, height).await {
            tracing::warn!(error = %e, "Failed to report resize");
        }
    }

    async fn request_quit(&mut self) {
        if let Err(e) = self.conductor.request_quit().await {
            tracing::warn!(error = %e, "Quit request failed");
            self.running = false;
        }
    }

    async fn send(&mut self, event: SurfaceEvent) {
        if let Err(e) = self.conductor.send(event).await {
            tracing::warn!(error = %e, "Conductor rejected event");
        }
    }

    /// Pointer or focus arrived on a control
    async fn point_at(&mut self, target: &Target) {
        match target {
            Target::Option(id) => {
                self.send(SurfaceEvent::OptionHovered { id: id.clone() })
                    .await;
            }
            Target::Evade => self.send(SurfaceEvent::EvadeTouched).await,
            _ => {}
        }
    }

    async fn set_focus(&mut self, target: Option<Target>) {
        if target == self.focused {
            return;
        }
        if let Some(Target::DateField(field)) = &target {
            self.picker.set_field(*field);
        }
        self.focused = target.clone();
        if let Some(target) = target {
            self.point_at(&target).await;
        }
    }

    async fn move_focus(&mut self, backwards: bool) {
        let next = self.hits.next_after(self.focused.as_ref(), backwards);
        self.set_focus(next).await;
    }

    /// Enter with nothing focused presses the dialogue control, if any
    async fn activate_default(&mut self) {
        let control = self
            .hits
            .targets()
            .find(|t| matches!(t, Target::Skip | Target::Advance))
            .cloned();
        match control {
            Some(target) => self.activate(target).await,
            None => self.move_focus(false).await,
        }
    }

    async fn activate(&mut self, target: Target) {
        match target {
            Target::Skip => self.send(SurfaceEvent::SkipPressed).await,
            Target::Advance => self.send(SurfaceEvent::AdvancePressed).await,
            Target::Option(id) => {
                let enabled = self
                    .display
                    .challenge
                    .as_ref()
                    .is_some_and(|c| c.accepts_input());
                if enabled {
                    self.send(SurfaceEvent::OptionSelected { id }).await;
                }
            }
            Target::DateField(field) => self.picker.set_field(field),
            Target::DateSubmit => {
                let enabled = !self.picker.is_blank()
                    && self
                        .display
                        .challenge
                        .as_ref()
                        .is_some_and(|c| c.accepts_input());
                if enabled {
                    let value = self.picker.value();
                    self.send(SurfaceEvent::DateSubmitted { value }).await;
                }
            }
            Target::Accept => self.send(SurfaceEvent::AcceptPressed).await,
            Target::Evade => self.send(SurfaceEvent::EvadeTouched).await,
        }
    }

    async fn pick_numbered(&mut self, digit: char) {
        let Some(challenge) = &self.display.challenge else {
            return;
        };
        if challenge.view.kind != ChallengeKind::Choice {
            return;
        }
        let index = digit.to_digit(10).and_then(|d| d.checked_sub(1));
        let option = index
            .and_then(|i| challenge.view.options.get(i as usize))
            .map(|o| Target::Option(o.id.clone()));
        if let Some(target) = option {
            self.set_focus(Some(target.clone())).await;
            self.activate(target).await;
        }
    }

    fn date_editable(&self) -> bool {
        self.display.challenge.as_ref().is_some_and(|c| {
            c.view.kind == ChallengeKind::Date
                && matches!(c.state, ChallengeState::Idle | ChallengeState::Wrong)
        })
    }

    async fn adjust_date(&mut self, delta: i32) {
        if self.date_editable() && self.picker.adjust(delta) {
            let value = self.picker.value();
            self.send(SurfaceEvent::DateEdited { value }).await;
        }
    }

    /// Typed digits fill the focused field and move on when it is full
    async fn type_date_digit(&mut self, digit: char) {
        if !self.date_editable() {
            return;
        }
        if self.picker.type_digit(digit) {
            let value = self.picker.value();
            self.send(SurfaceEvent::DateEdited { value }).await;
        }
        self.focused = Some(Target::DateField(self.picker.field()));
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    /// Redraw every layer and rebuild the hit map
    fn draw_layers(&mut self) {
        let backdrop = self.compositor.layer_buffer_mut(LayerKind::Backdrop);
        backdrop.reset();
        self.hearts.render(backdrop);

        self.draw_stage();

        let effects = self.compositor.layer_buffer_mut(LayerKind::Effects);
        effects.reset();
        self.confetti.render(effects);
        self.compositor
            .set_visible(LayerKind::Effects, self.confetti.is_active());

        self.draw_status();

        // Drop focus from controls that are gone
        if let Some(focused) = &self.focused {
            if self.hits.area_of(focused).is_none() {
                self.focused = None;
            }
        }
    }

    fn draw_stage(&mut self) {
        self.hits.clear();
        let buf = self.compositor.layer_buffer_mut(LayerKind::Stage);
        buf.reset();
        let screen = buf.area;
        let area = Rect::new(
            screen.x,
            screen.y,
            screen.width,
            screen.height.saturating_sub(1),
        );
        let focused = self.focused.as_ref();

        if let Some(dialogue) = &self.display.dialogue {
            let text = dialogue.rendered();
            let (sprite_w, sprite_h) = Sprite::bounds();
            let bubble_area = if area.width >= SIDE_BY_SIDE_MIN_WIDTH {
                let sprite_x = area.x + 4;
                let sprite_y = area.y + area.height.saturating_sub(sprite_h) / 2;
                self.sprite.render(buf, sprite_x, sprite_y);
                let x = sprite_x + sprite_w + 3;
                Rect::new(
                    x,
                    sprite_y,
                    area.right().saturating_sub(x + 2),
                    area.bottom().saturating_sub(sprite_y),
                )
            } else {
                // Short screens drop the character before they drop text
                let width = area.width.saturating_sub(2).min(bubble::MAX_WIDTH);
                let room = area.height.saturating_sub(sprite_h + 2);
                let y = if room >= Bubble::height_for(&text, width) {
                    let sprite_x = area.x + area.width.saturating_sub(sprite_w) / 2;
                    self.sprite.render(buf, sprite_x, area.y + 1);
                    area.y + 1 + sprite_h + 1
                } else {
                    area.y
                };
                Rect::new(
                    area.x + 1,
                    y,
                    area.width.saturating_sub(2),
                    area.bottom().saturating_sub(y),
                )
            };
            Bubble::new(&text, dialogue.tint)
                .control(self.display.control.as_ref())
                .focused(focused)
                .render(bubble_area, buf, &mut self.hits);
        } else if let Some(challenge) = &self.display.challenge {
            match challenge.view.kind {
                ChallengeKind::Choice => ChoiceGrid::new(challenge)
                    .focused(focused)
                    .render(area, buf, &mut self.hits),
                ChallengeKind::Date => {
                    self.picker
                        .render(challenge, focused, area, buf, &mut self.hits);
                }
            }
        } else if let Some(proposal) = &self.display.proposal {
            ProposalButtons::new(proposal)
                .focused(focused)
                .render(area, buf, &mut self.hits);
        } else if self.display.step == Some(Step::Celebration) {
            CelebrationCard::new(&self.display.celebration_text)
                .together(self.display.celebration.as_ref().map(|c| c.together))
                .render(area, buf);
        }
    }

    fn draw_status(&mut self) {
        let hints = self.status_hints();
        let style = Style::default().fg(tint_shadow(self.display.tint()));
        let buf = self.compositor.layer_buffer_mut(LayerKind::Status);
        buf.reset();
        let area = buf.area;
        if area.height == 0 {
            return;
        }
        buf.set_stringn(
            area.x + 1,
            area.bottom() - 1,
            hints,
            usize::from(area.width.saturating_sub(1)),
            style,
        );
    }

    fn status_hints(&self) -> &'static str {
        if let Some(challenge) = &self.display.challenge {
            return match challenge.view.kind {
                ChallengeKind::Choice => "1-4 answer · Tab move · Enter pick · Esc quit",
                ChallengeKind::Date => "↑↓ or digits change · ←→ field · Tab move · Enter check · Esc quit",
            };
        }
        if self.display.proposal.is_some() {
            return "Tab move · Enter choose wisely · Esc quit";
        }
        if self.display.step == Some(Step::Celebration) {
            return "Esc quit";
        }
        "Enter continue · Esc quit"
    }

    /// Composite all layers into one buffer
    pub fn composite(&mut self) -> &Buffer {
        self.compositor.composite()
    }

    /// Draw the composited layers to the terminal
    fn render<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> anyhow::Result<()> {
        let compositor = &mut self.compositor;
        terminal.draw(|frame| {
            let output = compositor.composite();
            let area = frame.area();
            let buf = frame.buffer_mut();

            for y in 0..area.height.min(output.area.height) {
                for x in 0..area.width.min(output.area.width) {
                    buf[(x, y)] = output[(x, y)].clone();
                }
            }
        })?;

        Ok(())
    }
}

impl App<ProcessAudio> {
    /// Create an App for the current terminal
    pub fn for_terminal(conductor: ConductorClient<ProcessAudio>) -> io::Result<Self> {
        let size = crossterm::terminal::size()?;
        Ok(Self::new(conductor, size))
    }
}
