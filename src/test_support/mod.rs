//! Test utilities and mocks for berth unit tests.
//!
//! Provides a recording [`MockExecutor`] for the credential helper and
//! document fixtures.
//!
//! # Example
//!
//! ```rust,ignore
//! use berth::test_support::{MockExecutor, MockProcessOutput};
//!
//! #[test]
//! fn test_example() {
//!     let mut exec = MockExecutor::new();
//!     exec.expect_suffix(" flags", MockProcessOutput::success("{}"));
//!
//!     // Hand `&exec` to a CredentialBridge...
//!     assert_eq!(exec.calls().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::sync::Mutex;

use anyhow::{bail, Result};

use crate::util::process::{Executor, ProcessBuilder, ProcessOutput};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Mock process output for testing command execution.
#[derive(Debug, Clone)]
pub struct MockProcessOutput {
    /// Exit status code (0 = success).
    pub status: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl MockProcessOutput {
    /// Create a successful output with the given stdout.
    pub fn success(stdout: impl Into<String>) -> Self {
        MockProcessOutput {
            status: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    /// Create a failure output with the given stderr and status code.
    pub fn failure(status: i32, stderr: impl Into<String>) -> Self {
        MockProcessOutput {
            status,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn to_output(&self) -> ProcessOutput {
        ProcessOutput {
            status: Some(self.status),
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        }
    }
}

/// Pattern for matching commands in MockExecutor.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command ends with suffix.
    EndsWith(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::EndsWith(s) => cmd.ends_with(s),
        }
    }
}

#[derive(Debug)]
struct Expectation {
    pattern: CommandPattern,
    output: MockProcessOutput,
}

/// Mock process executor for testing command execution.
///
/// Commands are matched against expectations in the order they were added;
/// every call is recorded, matched or not. An unmatched command is an
/// error, as if the program could not be started.
#[derive(Debug, Default)]
pub struct MockExecutor {
    expectations: Vec<Expectation>,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    /// Create a new mock executor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an expectation for an exact command match.
    pub fn expect(&mut self, cmd: &str, output: MockProcessOutput) -> &mut Self {
        self.expect_pattern(CommandPattern::Exact(cmd.to_string()), output)
    }

    /// Add an expectation for a command ending with `suffix`.
    pub fn expect_suffix(&mut self, suffix: &str, output: MockProcessOutput) -> &mut Self {
        self.expect_pattern(CommandPattern::EndsWith(suffix.to_string()), output)
    }

    /// Add a custom expectation.
    pub fn expect_pattern(&mut self, pattern: CommandPattern, output: MockProcessOutput) -> &mut Self {
        self.expectations.push(Expectation { pattern, output });
        self
    }

    /// Get all commands that were called.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

impl Executor for MockExecutor {
    fn execute(&self, cmd: &ProcessBuilder) -> Result<ProcessOutput> {
        let full_cmd = cmd.display_command();
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(full_cmd.clone());
        }

        match self.expectations.iter().find(|e| e.pattern.matches(&full_cmd)) {
            Some(exp) => Ok(exp.output.to_output()),
            None => bail!("unexpected command: {}", full_cmd),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_executor_matches_in_order() {
        let mut exec = MockExecutor::new();
        exec.expect("helper status", MockProcessOutput::failure(1, "no"))
            .expect_suffix("status", MockProcessOutput::success("yes"));

        let out = exec.execute(&ProcessBuilder::new("helper").arg("status")).unwrap();
        assert_eq!(out.status, Some(1));

        let out = exec.execute(&ProcessBuilder::new("/x/helper").arg("status")).unwrap();
        assert!(out.success());

        assert_eq!(exec.calls(), vec!["helper status", "/x/helper status"]);
    }

    #[test]
    fn test_mock_executor_unexpected_command() {
        let exec = MockExecutor::new();
        assert!(exec.execute(&ProcessBuilder::new("helper").arg("flags")).is_err());
        assert_eq!(exec.calls().len(), 1);
    }
}
