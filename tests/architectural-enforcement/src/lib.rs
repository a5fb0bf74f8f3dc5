//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce architectural principles:
//! - No blocking sleep in production code
//! - The pet core stays single-threaded (no locks, no `Arc`, no spawned threads)
//! - The pet core never depends on the terminal crates
//!
//! These tests are designed to catch violations early in the development cycle.
//! The helpers below strip test code so only production lines are checked.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A forbidden pattern found in production code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// File containing the match
    pub file: PathBuf,
    /// 1-based line number
    pub line: usize,
    /// The offending line, trimmed
    pub text: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.text)
    }
}

/// Workspace root (parent of `tests/architectural-enforcement`)
pub fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// Every `.rs` file under `dir`, sorted
pub fn rust_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "rs"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Lines of `source` outside `#[cfg(test)]` items, with their line numbers
///
/// A `#[cfg(test)]` attribute hides the item that follows it up to the
/// matching closing brace. Line comments are dropped.
pub fn production_lines(source: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut skip_next_item = false;
    let mut depth: i64 = 0;
    let mut in_test = false;

    for (idx, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        if in_test {
            depth += brace_delta(trimmed);
            if depth <= 0 {
                in_test = false;
            }
            continue;
        }

        if trimmed.starts_with("#[cfg(test)]") {
            skip_next_item = true;
            continue;
        }

        if skip_next_item {
            skip_next_item = false;
            depth = brace_delta(trimmed);
            // `mod tests;` or a single-line item
            in_test = depth > 0;
            continue;
        }

        if trimmed.starts_with("//") {
            continue;
        }

        lines.push((idx + 1, line));
    }

    lines
}

fn brace_delta(line: &str) -> i64 {
    let code = line.split("//").next().unwrap_or("");
    let opens = code.matches('{').count() as i64;
    let closes = code.matches('}').count() as i64;
    opens - closes
}

/// Production lines under `dir` matching `is_violation`
pub fn find_violations<F>(dir: &Path, is_violation: F) -> Vec<Violation>
where
    F: Fn(&str) -> bool,
{
    let mut found = Vec::new();
    for file in rust_files(dir) {
        let Ok(source) = fs::read_to_string(&file) else {
            continue;
        };
        for (line, text) in production_lines(&source) {
            if is_violation(text) {
                found.push(Violation {
                    file: file.clone(),
                    line,
                    text: text.trim().to_string(),
                });
            }
        }
    }
    found
}

/// Panic with a readable list if any violations were found
pub fn assert_clean(rule: &str, violations: &[Violation]) {
    if violations.is_empty() {
        return;
    }
    let listing: Vec<String> = violations.iter().map(ToString::to_string).collect();
    panic!("{rule}\n{}", listing.join("\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_lines_skip_test_module() {
        let source = "fn real() {}\n#[cfg(test)]\nmod tests {\n    fn fake() { sleep(); }\n}\nfn after() {}\n";
        let lines: Vec<&str> = production_lines(source).into_iter().map(|(_, l)| l).collect();
        assert_eq!(lines, vec!["fn real() {}", "fn after() {}"]);
    }

    #[test]
    fn test_production_lines_skip_comments() {
        let source = "// thread::sleep here is fine\nlet x = 1;\n";
        let lines = production_lines(source);
        assert_eq!(lines, vec![(2, "let x = 1;")]);
    }

    #[test]
    fn test_workspace_root_has_core() {
        assert!(workspace_root().join("pet").join("core").join("src").is_dir());
    }
}
