use std::fmt;
use std::path::PathBuf;

use crate::error::Error;

/// Result of one best-effort item (a template, a deployment, an action).
#[derive(Debug)]
pub enum Outcome {
    Done(PathBuf),
    Skipped(String),
    Failed(Error),
}

impl Outcome {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }

    /// Missing inputs are expected and reported as skips, everything else fails.
    pub fn from_error(err: Error) -> Self {
        match err {
            Error::NotFound(path) => Outcome::Skipped(format!("{} not found", path.display())),
            other => Outcome::Failed(other),
        }
    }
}

impl From<crate::error::Result<PathBuf>> for Outcome {
    fn from(result: crate::error::Result<PathBuf>) -> Self {
        match result {
            Ok(path) => Outcome::Done(path),
            Err(err) => Outcome::from_error(err),
        }
    }
}

#[derive(Debug)]
pub struct ItemReport {
    pub name: String,
    pub outcome: Outcome,
}

impl ItemReport {
    pub fn new(name: impl Into<String>, outcome: impl Into<Outcome>) -> Self {
        Self {
            name: name.into(),
            outcome: outcome.into(),
        }
    }
}

impl fmt::Display for ItemReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.outcome {
            Outcome::Done(path) => write!(f, "  ✓ {} → {}", self.name, path.display()),
            Outcome::Skipped(reason) => write!(f, "  - {}: {reason}", self.name),
            Outcome::Failed(err) => write!(f, "  ✗ {}: {err}", self.name),
        }
    }
}
