//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - The story core never depends on a rendering surface
//! - No sleep() calls in production code; time only moves through `tick`
//! - No unwrap()/expect() in production code
//!
//! The helpers here find the workspace sources and strip what the rules do not
//! apply to: comments and the trailing `#[cfg(test)]` module of each file.

use std::fs;
use std::path::{Path, PathBuf};

/// A rule broken at one line
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// File, relative to the workspace root
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{} - {}", self.file.display(), self.line, self.text)
    }
}

/// The workspace root (two levels above this package)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

/// Every `.rs` file under `dir` (relative to the workspace root)
pub fn rust_sources(dir: &str) -> Vec<PathBuf> {
    let root = workspace_root().join(dir);
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.path().extension().and_then(|s| s.to_str()) == Some("rs"))
        .map(|e| e.into_path())
        .collect()
}

/// Code lines of a file that ship: comments and the test module are dropped
///
/// Returns `(line_number, code)` pairs, with any trailing `//` comment cut off.
pub fn production_lines(content: &str) -> Vec<(usize, String)> {
    let mut lines = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim_start();
        // Unit test modules sit at the bottom of each file
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }
        if trimmed.starts_with("//") {
            continue;
        }
        let code = line.split("//").next().unwrap_or(line);
        lines.push((idx + 1, code.to_string()));
    }
    lines
}

/// Find production lines under `dir` for which `is_violation` holds
pub fn scan(dir: &str, is_violation: impl Fn(&str) -> bool) -> Vec<Violation> {
    let root = workspace_root();
    let mut violations = Vec::new();
    for path in rust_sources(dir) {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        for (line, code) in production_lines(&content) {
            if is_violation(&code) {
                violations.push(Violation {
                    file: path.strip_prefix(&root).unwrap_or(&path).to_path_buf(),
                    line,
                    text: code.trim().to_string(),
                });
            }
        }
    }
    violations
}

/// Panic with a readable report if there are violations
pub fn report(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    eprintln!("\n❌ {rule}\n");
    for violation in violations {
        eprintln!("  ❌ {violation}");
    }
    panic!("\nFound {} violation(s): {rule}", violations.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_comments_and_tests() {
        let source = "\
//! docs mention ratatui
fn run() {
    go(); // then sleep()
}

#[cfg(test)]
mod tests {
    fn helper() { x.unwrap(); }
}
";
        let lines = production_lines(source);
        assert_eq!(lines.len(), 4);
        assert!(lines.iter().all(|(_, code)| !code.contains("sleep")));
        assert!(lines.iter().all(|(_, code)| !code.contains("unwrap")));
        assert_eq!(lines[0], (2, "fn run() {".to_string()));
    }

    #[test]
    fn test_workspace_root_has_both_crates() {
        let root = workspace_root();
        assert!(root.join("conductor/core/Cargo.toml").exists());
        assert!(root.join("tui/Cargo.toml").exists());
    }
}
