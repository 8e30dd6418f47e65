//! Outcomes of best-effort side operations.

use std::fmt;

/// Result of an operation whose failure must never fail the caller, such as
/// a diagnostic screenshot. Callers may inspect it or drop it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advisory<T> {
    Completed(T),
    Failed(String),
}

impl<T> Advisory<T> {
    pub fn from_result<E: fmt::Display>(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Advisory::Completed(value),
            Err(e) => Advisory::Failed(e.to_string()),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Advisory::Completed(_))
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Advisory::Completed(value) => Some(value),
            Advisory::Failed(_) => None,
        }
    }
}
