//! Error types for calfeed.

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by calfeed operations.
#[derive(Error, Debug)]
pub enum CalfeedError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Listener '{listener}' failed: {source}")]
    Listener {
        listener: String,
        #[source]
        source: ListenerError,
    },

    #[error("Dispatch timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CalfeedError {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CalfeedError::InvalidInput(_))
    }

    /// The whole dispatch, or one listener in it, ran out of time.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            CalfeedError::Timeout(_)
                | CalfeedError::Listener {
                    source: ListenerError::Timeout(_),
                    ..
                }
        )
    }
}

/// Error a listener returns to abort its contribution to a query.
#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("{0}")]
    Failed(String),

    #[error("timed out after {}", humantime::format_duration(*.0))]
    Timeout(Duration),

    #[error(transparent)]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl ListenerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        ListenerError::Failed(msg.into())
    }
}

/// Result type alias for calfeed operations.
pub type CalfeedResult<T> = Result<T, CalfeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_second_timeouts_keep_their_precision() {
        let err = CalfeedError::Timeout(Duration::from_millis(250));
        assert_eq!(err.to_string(), "Dispatch timed out after 250ms");
        assert!(err.is_timeout());

        let err = CalfeedError::Listener {
            listener: "slow".into(),
            source: ListenerError::Timeout(Duration::from_millis(1500)),
        };
        assert_eq!(err.to_string(), "Listener 'slow' failed: timed out after 1s 500ms");
        assert!(err.is_timeout());
    }
}
