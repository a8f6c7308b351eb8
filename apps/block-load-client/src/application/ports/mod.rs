//! Port Interfaces
//!
//! Defines the interfaces (ports) for external systems following
//! the Hexagonal Architecture pattern.
//!
//! ## Driven Ports (Outbound)
//!
//! - `ProfileStreamPort`: opens a block load profile stream against the
//!   remote processor.

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::profile::{ProfileRecord, ProfileRequest};

/// Lazy, finite, non-restartable sequence of records. Normal completion is
/// the end of the stream; an `Err` item is terminal.
pub type ProfileStream = BoxStream<'static, Result<ProfileRecord, ClientError>>;

/// Errors surfaced by a profile stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// Endpoint unreachable, or the call was rejected before the response
    /// stream opened.
    #[error("transport error: {message}")]
    Transport {
        /// Failure description.
        message: String,
    },
    /// The response stream ended with an error.
    #[error("stream error: {message}")]
    Stream {
        /// Failure description.
        message: String,
    },
    /// The client could not be configured (for example an unparseable
    /// endpoint address).
    #[error("invalid client configuration: {message}")]
    Configuration {
        /// Failure description.
        message: String,
    },
}

impl ClientError {
    /// Short label for logs and metrics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::Stream { .. } => "stream",
            Self::Configuration { .. } => "configuration",
        }
    }
}

/// Opens server-streaming block load profile calls.
///
/// Implementations open exactly one remote call per invocation, never retry,
/// and never buffer records beyond what the transport requires.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileStreamPort: Send + Sync {
    /// Open a stream for `request`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call cannot be established.
    async fn open(&self, request: ProfileRequest) -> Result<ProfileStream, ClientError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_labels() {
        let transport = ClientError::Transport {
            message: "connection refused".to_string(),
        };
        let stream = ClientError::Stream {
            message: "meter timeout".to_string(),
        };
        let config = ClientError::Configuration {
            message: "bad uri".to_string(),
        };

        assert_eq!(transport.kind(), "transport");
        assert_eq!(stream.kind(), "stream");
        assert_eq!(config.kind(), "configuration");
        assert_eq!(transport.to_string(), "transport error: connection refused");
    }
}
