//! Story flow integration tests
//!
//! These tests drive a Conductor the way a surface does: events in, ticks to
//! move time, messages out. A recording audio backend stands in for the real
//! player so sound behaviour can be checked too.
//!
//! Tests cover:
//! - Answering questions right and wrong, with their delays
//! - The birthday date question
//! - Dodging and accepting the proposal
//! - The one-time celebration
//! - Timer cancellation across step changes
//! - Talking sound throttling

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::mpsc;

use valentine_conductor::{
    AudioBackend, AudioError, ChallengeState, Conductor, ConductorMessage, DialogueControl,
    PlayRequest, SoundHandle, SoundKind, SoundSource, Stage, Step, StoryConfig, SurfaceEvent,
};

// =============================================================================
// Harness
// =============================================================================

/// Loads every sound instantly and records what was played
#[derive(Clone, Default)]
struct RecordingAudio {
    plays: Arc<Mutex<Vec<(SoundKind, PlayRequest)>>>,
}

impl RecordingAudio {
    fn plays_of(&self, kind: SoundKind) -> usize {
        self.plays
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }
}

#[async_trait]
impl AudioBackend for RecordingAudio {
    fn name(&self) -> &str {
        "recording"
    }

    async fn load(&self, source: &SoundSource) -> Result<SoundHandle, AudioError> {
        Ok(SoundHandle {
            kind: source.kind,
            path: source.path.clone(),
            clip: source.clip,
            size_bytes: 1024,
        })
    }

    fn play(&self, sound: &SoundHandle, request: PlayRequest) {
        self.plays.lock().unwrap().push((sound.kind, request));
    }
}

struct Harness {
    conductor: Conductor<RecordingAudio>,
    rx: mpsc::Receiver<ConductorMessage>,
    audio: RecordingAudio,
}

impl Harness {
    async fn start() -> Self {
        let audio = RecordingAudio::default();
        let (tx, rx) = mpsc::channel(4096);
        let mut conductor = Conductor::new(audio.clone(), StoryConfig::default(), tx).with_seed(14);
        conductor.start().await.unwrap();
        conductor
            .handle_event(SurfaceEvent::Connected {
                width: 120,
                height: 40,
            })
            .await
            .unwrap();
        Self {
            conductor,
            rx,
            audio,
        }
    }

    async fn send(&mut self, event: SurfaceEvent) {
        self.conductor.handle_event(event).await.unwrap();
    }

    async fn tick(&mut self, ms: u64) {
        // Let sound loading tasks run between frames
        tokio::task::yield_now().await;
        self.conductor.tick(Duration::from_millis(ms)).await;
    }

    /// Advance in small frames, like a real surface
    async fn run_for(&mut self, ms: u64) {
        for _ in 0..ms / 16 {
            self.tick(16).await;
        }
        self.tick(ms % 16).await;
    }

    fn drain(&mut self) -> Vec<ConductorMessage> {
        let mut out = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            out.push(msg);
        }
        out
    }

    fn step(&self) -> Step {
        self.conductor.step()
    }

    /// Play the story forward, answering correctly, until `target` is active
    async fn walk_to(&mut self, target: Step) {
        while self.step() != target {
            let before = self.step();
            match self.conductor.stage() {
                Stage::Dialogue(_) => {
                    self.tick(5000).await;
                    if self.conductor.sequencer().has_more_lines() {
                        self.send(SurfaceEvent::SkipPressed).await;
                    } else {
                        self.send(SurfaceEvent::AdvancePressed).await;
                    }
                }
                Stage::Choice(challenge) => {
                    let correct = challenge.definition().correct.to_string();
                    self.send(SurfaceEvent::OptionSelected { id: correct }).await;
                    self.tick(1000).await;
                }
                Stage::Date(challenge) => {
                    let target = challenge.definition().target.to_string();
                    self.send(SurfaceEvent::DateSubmitted { value: target }).await;
                    self.tick(1100).await;
                }
                Stage::Proposal(_) => self.send(SurfaceEvent::AcceptPressed).await,
                Stage::Celebration(_) => panic!("walked past {target:?}"),
            }
            assert!(self.step() >= before, "step went backwards");
        }
        self.drain();
    }
}

fn step_entries(msgs: &[ConductorMessage]) -> Vec<Step> {
    msgs.iter()
        .filter_map(|m| match m {
            ConductorMessage::StepEntered { step, .. } => Some(*step),
            _ => None,
        })
        .collect()
}

fn challenge_updates(msgs: &[ConductorMessage]) -> Vec<(ChallengeState, Option<String>)> {
    msgs.iter()
        .filter_map(|m| match m {
            ConductorMessage::ChallengeUpdated {
                state, selected, ..
            } => Some((*state, selected.clone())),
            _ => None,
        })
        .collect()
}

// =============================================================================
// Full Walkthrough
// =============================================================================

#[tokio::test]
async fn test_walkthrough_visits_every_step_once_in_order() {
    let mut h = Harness::start().await;
    let mut entered = step_entries(&h.drain());

    while h.step() != Step::Celebration {
        let before = h.step();
        h.walk_to(before.next()).await;
        entered.push(h.step());
    }

    // First entry is from start(), second from Connected re-announcing it
    assert_eq!(entered[0], Step::Intro);
    assert_eq!(entered[1], Step::Intro);
    assert_eq!(&entered[1..], &Step::ALL[..]);
}

// =============================================================================
// Dialogue
// =============================================================================

#[tokio::test]
async fn test_dialogue_skip_then_advance() {
    let mut h = Harness::start().await;
    h.drain();

    for expected in 1..4 {
        h.tick(5000).await;
        let msgs = h.drain();
        assert!(msgs.contains(&ConductorMessage::ControlShown {
            control: DialogueControl::Skip
        }));
        h.send(SurfaceEvent::SkipPressed).await;
        assert_eq!(h.conductor.sequencer().dialogue_index(), expected);
    }

    // Advance is refused until the last line's control is revealed
    h.send(SurfaceEvent::AdvancePressed).await;
    assert_eq!(h.step(), Step::Intro);

    h.tick(5000).await;
    let msgs = h.drain();
    assert!(msgs.contains(&ConductorMessage::ControlShown {
        control: DialogueControl::Advance {
            label: "I'm ready! 💪".to_string()
        }
    }));

    h.send(SurfaceEvent::SkipPressed).await;
    assert_eq!(h.conductor.sequencer().dialogue_index(), 3);

    h.send(SurfaceEvent::AdvancePressed).await;
    assert_eq!(h.step(), Step::ColorQuestion);
    assert_eq!(h.conductor.sequencer().dialogue_index(), 0);
}

#[tokio::test]
async fn test_typed_text_reaches_surface() {
    let mut h = Harness::start().await;
    h.drain();

    h.tick(5000).await;
    let typed: Vec<_> = h
        .drain()
        .into_iter()
        .filter_map(|m| match m {
            ConductorMessage::DialogueTyped { text, finished } => Some((text, finished)),
            _ => None,
        })
        .collect();

    assert_eq!(typed.last(), Some(&("psst, hey!".to_string(), true)));
}

// =============================================================================
// Scenario 1 & 2: Color Question
// =============================================================================

#[tokio::test]
async fn test_color_correct_advances_after_delay() {
    let mut h = Harness::start().await;
    h.walk_to(Step::ColorQuestion).await;

    h.send(SurfaceEvent::OptionSelected {
        id: "Purple".to_string(),
    })
    .await;
    assert_eq!(
        h.conductor.challenge_state(),
        Some(ChallengeState::Correct)
    );
    assert_eq!(h.audio.plays_of(SoundKind::Correct), 1);

    h.run_for(799).await;
    assert_eq!(h.step(), Step::ColorQuestion);

    h.tick(1).await;
    assert_eq!(h.step(), Step::BirthdayTeaser);

    // Exactly one advance
    h.run_for(3000).await;
    let msgs = h.drain();
    assert_eq!(step_entries(&msgs), vec![Step::BirthdayTeaser]);
}

#[tokio::test]
async fn test_color_wrong_returns_to_idle() {
    let mut h = Harness::start().await;
    h.walk_to(Step::ColorQuestion).await;

    h.send(SurfaceEvent::OptionSelected {
        id: "Red".to_string(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Wrong));

    // Further picks are refused while cooling down
    h.send(SurfaceEvent::OptionSelected {
        id: "Purple".to_string(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Wrong));

    h.run_for(1199).await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Wrong));
    h.tick(1).await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Idle));

    let updates = challenge_updates(&h.drain());
    assert_eq!(
        updates,
        vec![
            (ChallengeState::Wrong, Some("Red".to_string())),
            (ChallengeState::Idle, None),
        ]
    );

    h.run_for(5000).await;
    assert_eq!(h.step(), Step::ColorQuestion);
    assert_eq!(h.audio.plays_of(SoundKind::Correct), 0);
}

#[tokio::test]
async fn test_hover_plays_blip_for_known_options_only() {
    let mut h = Harness::start().await;
    h.walk_to(Step::ColorQuestion).await;

    h.send(SurfaceEvent::OptionHovered {
        id: "Blue".to_string(),
    })
    .await;
    h.send(SurfaceEvent::OptionHovered {
        id: "Beige".to_string(),
    })
    .await;

    assert_eq!(h.audio.plays_of(SoundKind::Hover), 1);
}

// =============================================================================
// Scenario 3: Birthday
// =============================================================================

#[tokio::test]
async fn test_birthday_exact_date_only() {
    let mut h = Harness::start().await;
    h.walk_to(Step::BirthdayQuestion).await;

    h.send(SurfaceEvent::DateSubmitted {
        value: String::new(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Idle));

    h.send(SurfaceEvent::DateSubmitted {
        value: "2003-09-08".to_string(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Wrong));

    // Resubmitting the same wrong date during the cooldown is refused
    h.send(SurfaceEvent::DateSubmitted {
        value: "2003-09-08".to_string(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Wrong));

    h.run_for(1500).await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Idle));

    h.send(SurfaceEvent::DateSubmitted {
        value: "2003-09-07".to_string(),
    })
    .await;
    assert_eq!(
        h.conductor.challenge_state(),
        Some(ChallengeState::Correct)
    );

    h.run_for(1000).await;
    assert_eq!(h.step(), Step::CarTeaser);
}

#[tokio::test]
async fn test_editing_clears_wrong_feedback_immediately() {
    let mut h = Harness::start().await;
    h.walk_to(Step::BirthdayQuestion).await;

    h.send(SurfaceEvent::DateSubmitted {
        value: "2001-01-01".to_string(),
    })
    .await;
    h.send(SurfaceEvent::DateEdited {
        value: "2003-09-07".to_string(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Idle));

    let msgs = h.drain();
    let last = msgs
        .iter()
        .rev()
        .find_map(|m| match m {
            ConductorMessage::ChallengeUpdated { feedback, .. } => Some(feedback.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(last, None);
}

#[tokio::test]
async fn test_stale_cooldown_does_not_touch_next_step() {
    let mut h = Harness::start().await;
    h.walk_to(Step::BirthdayQuestion).await;

    // Wrong answer arms a 1500 ms cooldown
    h.send(SurfaceEvent::DateSubmitted {
        value: "2003-01-01".to_string(),
    })
    .await;
    h.tick(100).await;

    // A changed value clears the feedback and is judged right away
    h.send(SurfaceEvent::DateSubmitted {
        value: "2003-09-07".to_string(),
    })
    .await;
    assert_eq!(
        h.conductor.challenge_state(),
        Some(ChallengeState::Correct)
    );

    h.run_for(1000).await;
    assert_eq!(h.step(), Step::CarTeaser);
    h.drain();

    // The old cooldown would have fired here
    h.run_for(1000).await;
    let msgs = h.drain();
    assert!(challenge_updates(&msgs).is_empty());
    assert_eq!(h.step(), Step::CarTeaser);
}

// =============================================================================
// Car and Map
// =============================================================================

#[tokio::test]
async fn test_car_and_map_answers() {
    let mut h = Harness::start().await;
    h.walk_to(Step::CarQuestion).await;

    h.send(SurfaceEvent::OptionSelected {
        id: "ans1".to_string(),
    })
    .await;
    assert_eq!(h.conductor.challenge_state(), Some(ChallengeState::Wrong));
    h.run_for(1200).await;
    h.send(SurfaceEvent::OptionSelected {
        id: "ans4".to_string(),
    })
    .await;
    h.run_for(800).await;
    assert_eq!(h.step(), Step::MapTeaser);

    h.walk_to(Step::MapQuestion).await;
    let msgs = {
        h.send(SurfaceEvent::OptionSelected {
            id: "ans2".to_string(),
        })
        .await;
        h.drain()
    };
    assert!(msgs.iter().any(|m| matches!(
        m,
        ConductorMessage::ChallengeUpdated {
            state: ChallengeState::Correct,
            feedback: Some(f),
            ..
        } if f == "hmm okay..."
    )));
}

// =============================================================================
// Scenario 4: Proposal
// =============================================================================

#[tokio::test]
async fn test_three_dodges_then_accept_advances_once() {
    let mut h = Harness::start().await;
    h.walk_to(Step::Proposal).await;

    for _ in 0..3 {
        h.send(SurfaceEvent::EvadeTouched).await;
    }
    let dodge = *h.conductor.dodge().unwrap();
    assert_eq!(dodge.count, 3);
    assert!((dodge.accept_scale() - 1.45).abs() < 1e-5);
    assert_eq!(dodge.message(), "Think again! 💔");
    assert!(dodge.offset.0.abs() <= 200.0 && dodge.offset.1.abs() <= 150.0);

    let msgs = h.drain();
    let labels: Vec<_> = msgs
        .iter()
        .filter_map(|m| match m {
            ConductorMessage::ProposalUpdated { proposal } => Some(proposal.evade_label.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(
        labels,
        vec!["Are you sure? 🥺", "Really?? 😢", "Think again! 💔"]
    );

    h.send(SurfaceEvent::AcceptPressed).await;
    h.send(SurfaceEvent::AcceptPressed).await;
    assert_eq!(h.step(), Step::Celebration);
    assert_eq!(step_entries(&h.drain()), vec![Step::Celebration]);
}

#[tokio::test]
async fn test_narrow_viewport_limits_jumps() {
    let mut h = Harness::start().await;
    h.send(SurfaceEvent::Resized {
        width: 60,
        height: 20,
    })
    .await;
    h.walk_to(Step::Proposal).await;

    for _ in 0..50 {
        h.send(SurfaceEvent::EvadeTouched).await;
        let dodge = h.conductor.dodge().unwrap();
        assert!(dodge.offset.0.abs() <= 100.0);
        assert!(dodge.offset.1.abs() <= 80.0);
    }
    assert_eq!(h.conductor.dodge().unwrap().message(), "nooooo 💀");
}

// =============================================================================
// Scenario 5: Celebration
// =============================================================================

#[tokio::test]
async fn test_celebrate_emitted_once() {
    let mut h = Harness::start().await;
    h.walk_to(Step::Proposal).await;

    h.send(SurfaceEvent::AcceptPressed).await;
    let msgs = h.drain();
    let celebrations = msgs
        .iter()
        .filter(|m| matches!(m, ConductorMessage::Celebrate { .. }))
        .count();
    assert_eq!(celebrations, 1);
    assert!(h.conductor.has_celebrated());

    // Reconnecting and time passing never celebrate again
    h.send(SurfaceEvent::Connected {
        width: 120,
        height: 40,
    })
    .await;
    h.run_for(10_000).await;
    h.send(SurfaceEvent::AcceptPressed).await;

    let msgs = h.drain();
    assert!(msgs
        .iter()
        .all(|m| !matches!(m, ConductorMessage::Celebrate { .. })));
    assert!(msgs
        .iter()
        .any(|m| matches!(m, ConductorMessage::CelebrationTyped { .. })));
    assert_eq!(h.step(), Step::Celebration);
}

// =============================================================================
// Sound
// =============================================================================

#[tokio::test]
async fn test_talking_waits_for_gesture_and_throttles() {
    let mut h = Harness::start().await;

    // No gesture yet: talking sound not loaded, typing is silent
    h.run_for(500).await;
    assert_eq!(h.audio.plays_of(SoundKind::Talking), 0);

    // First gesture loads it; the next line talks
    h.run_for(5000).await;
    h.send(SurfaceEvent::SkipPressed).await;
    h.tick(0).await;

    // "you found the secret!" types for 1260 ms: one segment, busy throughout
    h.run_for(1260).await;
    assert_eq!(h.audio.plays_of(SoundKind::Talking), 1);

    h.drain();
    h.send(SurfaceEvent::Connected {
        width: 120,
        height: 40,
    })
    .await;
    assert_eq!(h.audio.plays_of(SoundKind::Talking), 1);
}

#[tokio::test]
async fn test_quit_requested() {
    let mut h = Harness::start().await;
    h.drain();
    h.send(SurfaceEvent::QuitRequested).await;
    assert_eq!(h.drain(), vec![ConductorMessage::Quit]);
}
