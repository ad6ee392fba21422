//! Integration Test: Surface Independence
//!
//! The story core is headless. Everything it knows reaches a screen through
//! `ConductorMessage`; it must never pull in a terminal or UI crate, so any
//! surface can be written against it.

use std::fs;

use architectural_enforcement::{report, scan, workspace_root};

const UI_CRATES: [&str; 3] = ["ratatui", "crossterm", "unicode-width"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest is readable");

    let found: Vec<&str> = manifest
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .filter_map(|line| {
            UI_CRATES
                .iter()
                .find(|krate| line.trim_start().starts_with(*krate))
                .copied()
        })
        .collect();

    assert!(
        found.is_empty(),
        "conductor/core depends on UI crates: {found:?}"
    );
}

#[test]
fn test_core_sources_do_not_use_ui_crates() {
    let violations = scan("conductor/core/src", |code| {
        code.contains("ratatui::") || code.contains("crossterm::")
    });
    report("The story core must not touch a terminal crate", &violations);
}

#[test]
fn test_core_does_not_know_the_tui() {
    let violations = scan("conductor/core/src", |code| code.contains("valentine_tui"));
    report("The story core must not depend on its surface", &violations);
}
