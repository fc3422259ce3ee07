//! Check trait and result types

use std::fmt;
use std::time::Duration;

use colored::Colorize;

/// Outcome of a single check, ordered from best to worst
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckStatus {
    Pass,
    /// Usable, but something deserves a look
    Warn,
    Fail,
}

impl CheckStatus {
    /// Pass or Warn
    pub fn is_ok(self) -> bool {
        self != Self::Fail
    }

    pub fn is_fail(self) -> bool {
        self == Self::Fail
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Warn => "WARN",
            Self::Fail => "FAIL",
        }
    }

    /// Label colored for terminal output
    pub fn as_colored_str(self) -> String {
        let label = self.label();
        match self {
            Self::Pass => label.green(),
            Self::Warn => label.yellow(),
            Self::Fail => label.red(),
        }
        .to_string()
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What a check found
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub status: CheckStatus,
    /// One-line summary shown in the report table
    pub message: String,
    /// Extra lines printed below the table
    pub details: Vec<String>,
    /// Filled in by the runner
    pub duration: Duration,
}

impl CheckResult {
    pub fn new(status: CheckStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    pub fn pass(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Pass, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Warn, message)
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self::new(CheckStatus::Fail, message)
    }

    pub fn with_details<I, L>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        self.details.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}

/// A named health check
pub trait SystemCheck {
    fn name(&self) -> &'static str;

    fn check(&self) -> CheckResult;

    /// What the check validates, for listings
    fn description(&self) -> Option<&'static str> {
        None
    }
}
