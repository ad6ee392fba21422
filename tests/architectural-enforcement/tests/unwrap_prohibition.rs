//! Integration Test: Unwrap Prohibition
//!
//! **Policy**: Production code propagates errors with `?`, logs them, or
//! falls back to a default. `unwrap()` and `expect()` are for tests only; a
//! panic would leave the terminal in raw mode mid-story.

use architectural_enforcement::{report, scan};

fn is_unwrap(code: &str) -> bool {
    code.contains(".unwrap()") || code.contains(".expect(")
}

#[test]
fn test_no_unwrap_in_conductor() {
    let violations = scan("conductor/core/src", is_unwrap);
    report("unwrap()/expect() in conductor production code", &violations);
}

#[test]
fn test_no_unwrap_in_tui() {
    let violations = scan("tui/src", is_unwrap);
    report("unwrap()/expect() in TUI production code", &violations);
}
