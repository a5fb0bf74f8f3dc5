//! The pet core is single-threaded and terminal-agnostic

use architectural_enforcement::{assert_clean, find_violations, workspace_root};

const THREADING: &[&str] = &[
    "Mutex",
    "RwLock",
    "Arc<",
    "Arc::",
    "thread::spawn",
    "tokio::spawn",
    "AtomicBool",
];

#[test]
fn test_core_has_no_threading_primitives() {
    let dir = workspace_root().join("pet/core/src");
    let violations = find_violations(&dir, |line| THREADING.iter().any(|p| line.contains(p)));
    assert_clean("Threading primitive in pet core", &violations);
}

#[test]
fn test_core_does_not_touch_the_terminal() {
    let dir = workspace_root().join("pet/core/src");
    let violations = find_violations(&dir, |line| {
        line.contains("ratatui") || line.contains("crossterm")
    });
    assert_clean("Terminal crate used in pet core", &violations);
}

#[test]
fn test_core_manifest_has_no_terminal_deps() {
    let manifest = std::fs::read_to_string(workspace_root().join("pet/core/Cargo.toml"))
        .expect("core manifest");
    for dep in ["ratatui", "crossterm", "clap"] {
        assert!(
            !manifest.lines().any(|l| l.trim_start().starts_with(dep)),
            "pet core must not depend on {dep}"
        );
    }
}

#[test]
fn test_core_tokio_is_single_threaded() {
    let manifest = std::fs::read_to_string(workspace_root().join("pet/core/Cargo.toml"))
        .expect("core manifest");
    let tokio_lines: Vec<&str> = manifest
        .lines()
        .filter(|l| l.trim_start().starts_with("tokio ="))
        .collect();
    assert!(!tokio_lines.is_empty());
    for line in tokio_lines {
        assert!(
            !line.contains("rt-multi-thread") && !line.contains("\"full\""),
            "pet core must only use tokio's current-thread runtime: {line}"
        );
    }
}
