//! TUI integration tests
//!
//! These drive the App the way a terminal does: synthetic crossterm key and
//! mouse events, frames to move time, and the composited buffer to see what
//! would be on screen. The Conductor runs embedded with a silent audio
//! backend and a fixed seed.

use std::time::Duration;

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use pretty_assertions::assert_eq;

use valentine_conductor::{
    ChallengeKind, ChallengeState, SilentBackend, Stage, Step, StoryConfig, Viewport,
};
use valentine_tui::conductor_client::ConductorClient;
use valentine_tui::widgets::{DateField, Target};
use valentine_tui::App;

// =============================================================================
// Harness
// =============================================================================

async fn start_app() -> App<SilentBackend> {
    let client = ConductorClient::with_backend(SilentBackend, StoryConfig::default()).with_seed(14);
    let mut app = App::new(client, (120, 30));
    app.start().await.unwrap();
    app
}

async fn run_for(app: &mut App<SilentBackend>, ms: u64) {
    // Let sound loading tasks settle between frames
    tokio::task::yield_now().await;
    app.frame(Duration::from_millis(ms)).await;
}

async fn press(app: &mut App<SilentBackend>, code: KeyCode) {
    app.handle_terminal_event(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
        .await;
}

async fn mouse(app: &mut App<SilentBackend>, kind: MouseEventKind, column: u16, row: u16) {
    app.handle_terminal_event(Event::Mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }))
    .await;
}

fn screen_text(app: &mut App<SilentBackend>) -> String {
    app.composite()
        .content
        .iter()
        .map(|c| c.symbol())
        .collect()
}

fn step(app: &App<SilentBackend>) -> Step {
    app.conductor().conductor().step()
}

/// Answer the active multiple-choice question with the number keys
async fn pick_correct(app: &mut App<SilentBackend>) {
    let correct = match app.conductor().conductor().stage() {
        Stage::Choice(challenge) => challenge.definition().correct,
        _ => panic!("not a choice question"),
    };
    let index = app
        .display()
        .challenge
        .as_ref()
        .unwrap()
        .view
        .options
        .iter()
        .position(|o| o.id == correct)
        .unwrap();
    let digit = char::from_digit(u32::try_from(index + 1).unwrap(), 10).unwrap();
    press(app, KeyCode::Char(digit)).await;
}

/// Spin the date picker to 2003-09-07 and submit it with the keyboard
async fn enter_birthday(app: &mut App<SilentBackend>) {
    press(app, KeyCode::Tab).await;
    assert_eq!(app.focused(), Some(&Target::DateField(DateField::Year)));
    for _ in 0..3 {
        press(app, KeyCode::Up).await;
    }
    press(app, KeyCode::Right).await;
    for _ in 0..8 {
        press(app, KeyCode::Up).await;
    }
    press(app, KeyCode::Right).await;
    for _ in 0..6 {
        press(app, KeyCode::Up).await;
    }
    assert_eq!(app.picker().value(), "2003-09-07");

    press(app, KeyCode::Tab).await;
    assert_eq!(app.focused(), Some(&Target::DateSubmit));
    press(app, KeyCode::Enter).await;
}

/// Play forward with keyboard input only until `target` is active
async fn walk_to(app: &mut App<SilentBackend>, target: Step) {
    while step(app) != target {
        match app.conductor().conductor().stage() {
            Stage::Dialogue(_) => {
                run_for(app, 5000).await;
                press(app, KeyCode::Enter).await;
            }
            Stage::Choice(_) => {
                pick_correct(app).await;
                run_for(app, 1000).await;
            }
            Stage::Date(_) => {
                enter_birthday(app).await;
                run_for(app, 1100).await;
            }
            Stage::Proposal(_) => {
                press(app, KeyCode::Tab).await;
                assert_eq!(app.focused(), Some(&Target::Accept));
                press(app, KeyCode::Enter).await;
            }
            Stage::Celebration(_) => panic!("walked past {target:?}"),
        }
    }
}

// =============================================================================
// Dialogue
// =============================================================================

#[tokio::test]
async fn test_app_opens_on_intro() {
    let mut app = start_app().await;
    assert!(app.is_running());
    assert_eq!(app.display().step, Some(Step::Intro));

    run_for(&mut app, 5000).await;
    assert!(screen_text(&mut app).contains("psst, hey!"));
    assert!(app.hits().area_of(&Target::Skip).is_some());
}

#[tokio::test]
async fn test_enter_presses_dialogue_control() {
    let mut app = start_app().await;

    // Nothing to press before the control shows
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.conductor().conductor().sequencer().dialogue_index(), 0);

    run_for(&mut app, 5000).await;
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(app.conductor().conductor().sequencer().dialogue_index(), 1);
    assert!(app.display().control.is_none());
}

#[tokio::test]
async fn test_click_on_skip() {
    let mut app = start_app().await;
    run_for(&mut app, 5000).await;

    let skip = app.hits().area_of(&Target::Skip).unwrap();
    mouse(
        &mut app,
        MouseEventKind::Down(MouseButton::Left),
        skip.x + 1,
        skip.y,
    )
    .await;
    assert_eq!(app.conductor().conductor().sequencer().dialogue_index(), 1);
}

// =============================================================================
// Questions
// =============================================================================

#[tokio::test]
async fn test_wrong_answer_locks_options_until_cooldown() {
    let mut app = start_app().await;
    walk_to(&mut app, Step::ColorQuestion).await;
    assert!(screen_text(&mut app).contains("whats my favorite color?"));

    let options = app.display().challenge.as_ref().unwrap().view.options.clone();
    let wrong = options.iter().position(|o| o.id != "Purple").unwrap();
    let digit = char::from_digit(u32::try_from(wrong + 1).unwrap(), 10).unwrap();
    press(&mut app, KeyCode::Char(digit)).await;

    let challenge = app.display().challenge.as_ref().unwrap();
    assert_eq!(challenge.state, ChallengeState::Wrong);
    assert_eq!(challenge.selected.as_deref(), Some(options[wrong].id.as_str()));

    // The right answer is ignored while the wrong one is showing
    pick_correct(&mut app).await;
    assert_eq!(
        app.display().challenge.as_ref().unwrap().state,
        ChallengeState::Wrong
    );

    run_for(&mut app, 1300).await;
    assert_eq!(
        app.display().challenge.as_ref().unwrap().state,
        ChallengeState::Idle
    );
    pick_correct(&mut app).await;
    assert_eq!(
        app.display().challenge.as_ref().unwrap().state,
        ChallengeState::Correct
    );
    run_for(&mut app, 1000).await;
    assert_eq!(step(&app), Step::BirthdayTeaser);
}

#[tokio::test]
async fn test_birthday_with_date_picker() {
    let mut app = start_app().await;
    walk_to(&mut app, Step::BirthdayQuestion).await;

    let challenge = app.display().challenge.as_ref().unwrap();
    assert_eq!(challenge.view.kind, ChallengeKind::Date);
    assert!(app.picker().is_blank());

    // Submit does nothing while the picker is blank
    press(&mut app, KeyCode::BackTab).await;
    assert_eq!(app.focused(), Some(&Target::DateSubmit));
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(
        app.display().challenge.as_ref().unwrap().state,
        ChallengeState::Idle
    );

    press(&mut app, KeyCode::Esc).await;
    assert!(!app.is_running());
}

#[tokio::test]
async fn test_birthday_correct_moves_on() {
    let mut app = start_app().await;
    walk_to(&mut app, Step::BirthdayQuestion).await;

    enter_birthday(&mut app).await;
    assert_eq!(
        app.display().challenge.as_ref().unwrap().state,
        ChallengeState::Correct
    );
    assert!(screen_text(&mut app).contains("you remembered!"));

    run_for(&mut app, 1100).await;
    assert_eq!(step(&app), Step::CarTeaser);
}

#[tokio::test]
async fn test_birthday_typed_with_digits() {
    let mut app = start_app().await;
    walk_to(&mut app, Step::BirthdayQuestion).await;

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.focused(), Some(&Target::DateField(DateField::Year)));
    for c in "2003".chars() {
        press(&mut app, KeyCode::Char(c)).await;
    }
    // A full year moves focus along
    assert_eq!(app.focused(), Some(&Target::DateField(DateField::Month)));
    for c in "0907".chars() {
        press(&mut app, KeyCode::Char(c)).await;
    }
    assert_eq!(app.picker().value(), "2003-09-07");
    assert_eq!(app.focused(), Some(&Target::DateField(DateField::Day)));
    // Digits on the date go to the picker, not to numbered options
    assert_eq!(step(&app), Step::BirthdayQuestion);

    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.focused(), Some(&Target::DateSubmit));
    press(&mut app, KeyCode::Enter).await;
    assert_eq!(
        app.display().challenge.as_ref().unwrap().state,
        ChallengeState::Correct
    );
}

// =============================================================================
// Proposal
// =============================================================================

#[tokio::test]
async fn test_refusal_runs_from_the_mouse() {
    let mut app = start_app().await;
    walk_to(&mut app, Step::Proposal).await;
    assert!(screen_text(&mut app).contains("Will you be my Valentine?"));

    let before = app.hits().area_of(&Target::Evade).unwrap();
    mouse(&mut app, MouseEventKind::Moved, before.x + 1, before.y).await;

    let proposal = app.display().proposal.as_ref().unwrap();
    assert_eq!(proposal.dodge_count, 1);
    assert!(proposal.accept_scale > 1.0);
    let after = app.hits().area_of(&Target::Evade).unwrap();
    assert_ne!(before, after);

    // Clicking it only makes it run again
    mouse(
        &mut app,
        MouseEventKind::Down(MouseButton::Left),
        after.x + 1,
        after.y,
    )
    .await;
    assert!(app.display().proposal.as_ref().unwrap().dodge_count >= 2);
    assert_eq!(step(&app), Step::Proposal);
}

#[tokio::test]
async fn test_tab_onto_refusal_dodges() {
    let mut app = start_app().await;
    walk_to(&mut app, Step::Proposal).await;

    press(&mut app, KeyCode::Tab).await;
    press(&mut app, KeyCode::Tab).await;
    assert_eq!(app.focused(), Some(&Target::Evade));
    assert_eq!(app.display().proposal.as_ref().unwrap().dodge_count, 1);
}

// =============================================================================
// Celebration
// =============================================================================

#[tokio::test]
async fn test_accept_celebrates_with_confetti() {
    let mut app = start_app().await;
    assert!(app.farewell().is_none());

    walk_to(&mut app, Step::Celebration).await;
    assert!(app.confetti().is_active());
    assert!(app.display().celebration.is_some());
    assert!(app.farewell().is_some());

    // One burst only
    for _ in 0..15 {
        run_for(&mut app, 1000).await;
    }
    assert!(!app.confetti().is_active());
    assert!(screen_text(&mut app).contains("together"));
}

#[tokio::test]
async fn test_full_walkthrough_by_keyboard() {
    let mut app = start_app().await;
    let mut seen = vec![step(&app)];
    while step(&app) != Step::Celebration {
        let next = step(&app).next();
        walk_to(&mut app, next).await;
        seen.push(step(&app));
    }
    assert_eq!(seen, Step::ALL.to_vec());
}

// =============================================================================
// Terminal
// =============================================================================

#[tokio::test]
async fn test_resize_reaches_conductor() {
    let mut app = start_app().await;
    assert_eq!(app.conductor().conductor().viewport(), Viewport::Wide);
    app.handle_terminal_event(Event::Resize(50, 20)).await;

    assert_eq!(app.composite().area.width, 50);
    assert_eq!(app.conductor().conductor().viewport(), Viewport::Narrow);
}

#[tokio::test]
async fn test_ctrl_c_quits() {
    let mut app = start_app().await;
    app.handle_terminal_event(Event::Key(KeyEvent::new(
        KeyCode::Char('c'),
        KeyModifiers::CONTROL,
    )))
    .await;
    assert!(!app.is_running());
}
