//! Error types for the scoring client.

use std::time::Duration;

use thiserror::Error;

/// Result type for scoring operations.
pub type ScorerResult<T> = Result<T, ScorerError>;

/// Errors that can occur while launching or talking to the scorer.
#[derive(Debug, Error)]
pub enum ScorerError {
    /// The listening endpoint could not be opened (usually: port in use).
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The scorer program could not be started.
    #[error("cannot spawn scorer '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// No connection arrived before the deadline.
    #[error("scorer did not connect within {timeout:?}")]
    AcceptTimeout { timeout: Duration },

    /// The subprocess exited before connecting.
    #[error("scorer exited before connecting")]
    ScorerExited,

    /// No reply line arrived before the read timeout.
    #[error("scorer did not reply within {timeout:?}")]
    Timeout { timeout: Duration },

    /// The connection was closed or was never established.
    #[error("scorer connection closed")]
    Disconnected,

    /// A reply field is not a number.
    #[error("malformed score field: '{field}'")]
    Malformed { field: String },

    /// The reply carries a different number of scores than the request.
    #[error("expected {expected} scores, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    /// The scorer kept failing after the allowed number of relaunches.
    #[error("scorer failed after {attempts} restarts: {source}")]
    RetriesExhausted {
        attempts: usize,
        #[source]
        source: Box<ScorerError>,
    },

    /// Another holder of a shared scorer panicked mid-exchange.
    #[error("shared scorer lock poisoned")]
    Poisoned,

    /// Invalid configuration file or override.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error on the scoring channel.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScorerError {
    /// Whether relaunching the subprocess may clear the failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AcceptTimeout { .. }
                | Self::ScorerExited
                | Self::Timeout { .. }
                | Self::Disconnected
                | Self::Malformed { .. }
                | Self::CountMismatch { .. }
                | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classes() {
        assert!(ScorerError::Disconnected.is_recoverable());
        assert!(ScorerError::Timeout {
            timeout: Duration::from_secs(1)
        }
        .is_recoverable());
        assert!(!ScorerError::Config("bad".into()).is_recoverable());
        assert!(!ScorerError::RetriesExhausted {
            attempts: 3,
            source: Box::new(ScorerError::Disconnected),
        }
        .is_recoverable());
    }
}
