//! Outcome of a single probe check

use serde::Serialize;
use std::fmt;

/// Immutable health outcome produced by one probe.
///
/// `healthy` is always set by the constructor that was called; it is never
/// derived from the presence of a message. Serialize-only: verdicts are
/// built through the constructors, never parsed back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Verdict {
    healthy: bool,
    message: Option<String>,
    source: String,
}

impl Verdict {
    pub fn healthy(source: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: None,
            source: source.into(),
        }
    }

    pub fn healthy_with_message(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            healthy: true,
            message: Some(message.into()),
            source: source.into(),
        }
    }

    pub fn unhealthy(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            source: source.into(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn status(&self) -> &'static str {
        if self.healthy {
            "WORKING"
        } else {
            "NOT WORKING"
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.status(), message),
            None => write!(f, "{}", self.status()),
        }
    }
}
