//! Production code never blocks the thread to wait

use architectural_enforcement::{assert_clean, find_violations, workspace_root};

fn is_blocking_sleep(line: &str) -> bool {
    line.contains("thread::sleep") || line.contains("std::thread::park")
}

#[test]
fn test_core_has_no_blocking_sleep() {
    let dir = workspace_root().join("pet/core/src");
    let violations = find_violations(&dir, is_blocking_sleep);
    assert_clean("Blocking sleep in pet core", &violations);
}

#[test]
fn test_tui_has_no_blocking_sleep() {
    let dir = workspace_root().join("tui/src");
    let violations = find_violations(&dir, is_blocking_sleep);
    assert_clean("Blocking sleep in TUI", &violations);
}

#[test]
fn test_core_never_sleeps_for_a_fixed_delay() {
    // Waiting is always on an absolute deadline from the timer queue
    let dir = workspace_root().join("pet/core/src");
    let violations = find_violations(&dir, |line| line.contains("time::sleep("));
    assert_clean("Relative sleep in pet core", &violations);
}
