//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code MUST NOT sleep. The Conductor's clock is
//! virtual and only moves through `tick(delta)`; the TUI waits on its event
//! stream and frame interval. A sleep would freeze the typewriter and make
//! every timer in the tests depend on the wall clock.

use architectural_enforcement::{report, scan};

fn is_sleep(code: &str) -> bool {
    code.contains("thread::sleep")
        || code.contains("time::sleep")
        || code.contains("sleep_until")
        || code.contains("sleep(Duration")
}

#[test]
fn test_no_sleep_in_conductor() {
    let violations = scan("conductor/core/src", is_sleep);
    report("sleep() in conductor production code", &violations);
}

#[test]
fn test_no_sleep_in_tui() {
    let violations = scan("tui/src", is_sleep);
    report("sleep() in TUI production code", &violations);
}

#[test]
fn test_detector_catches_common_forms() {
    assert!(is_sleep("std::thread::sleep(Duration::from_millis(5));"));
    assert!(is_sleep("tokio::time::sleep(d).await;"));
    assert!(!is_sleep("let interval = tokio::time::interval(FRAME_DURATION);"));
}
