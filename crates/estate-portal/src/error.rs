use std::fmt;

use crate::config::ConfigError;
use crate::http::TransportError;
use crate::socket::FeedError;
use crate::storage::{PreferenceError, ReadStateError};
use crate::telemetry::TelemetryError;

/// Failures that escape the hook boundary: setup, local storage and the live feed.
#[derive(Debug)]
pub enum PortalError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Transport(TransportError),
    ReadState(ReadStateError),
    Preferences(PreferenceError),
    Feed(FeedError),
    /// A hook resolved to `None`; its toast already told the user why.
    Unavailable(&'static str),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Config(err) => write!(f, "configuration error: {}", err),
            PortalError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            PortalError::Io(err) => write!(f, "io error: {}", err),
            PortalError::Transport(err) => write!(f, "transport error: {}", err),
            PortalError::ReadState(err) => write!(f, "notification state error: {}", err),
            PortalError::Preferences(err) => write!(f, "preferences error: {}", err),
            PortalError::Feed(err) => write!(f, "notification feed error: {}", err),
            PortalError::Unavailable(what) => write!(f, "{} could not be loaded", what),
        }
    }
}

impl std::error::Error for PortalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PortalError::Config(err) => Some(err),
            PortalError::Telemetry(err) => Some(err),
            PortalError::Io(err) => Some(err),
            PortalError::Transport(err) => Some(err),
            PortalError::ReadState(err) => Some(err),
            PortalError::Preferences(err) => Some(err),
            PortalError::Feed(err) => Some(err),
            PortalError::Unavailable(_) => None,
        }
    }
}

impl From<ConfigError> for PortalError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for PortalError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for PortalError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<TransportError> for PortalError {
    fn from(value: TransportError) -> Self {
        Self::Transport(value)
    }
}

impl From<ReadStateError> for PortalError {
    fn from(value: ReadStateError) -> Self {
        Self::ReadState(value)
    }
}

impl From<PreferenceError> for PortalError {
    fn from(value: PreferenceError) -> Self {
        Self::Preferences(value)
    }
}

impl From<FeedError> for PortalError {
    fn from(value: FeedError) -> Self {
        Self::Feed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn wraps_sources_with_context() {
        let err = PortalError::from(TransportError::Timeout);
        assert_eq!(
            err.to_string(),
            "transport error: the server took too long to respond"
        );
        assert!(err.source().is_some());

        let missing = PortalError::Unavailable("estate");
        assert_eq!(missing.to_string(), "estate could not be loaded");
        assert!(missing.source().is_none());
    }
}
