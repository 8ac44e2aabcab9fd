//! Error types for the SensorThings client and reconciliation engine.

use crate::entity::EntityType;
use thiserror::Error;

pub type StaClientResult<T> = Result<T, StaClientError>;

/// A reference field whose value could not be found on the remote system.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct UnresolvedReference {
    /// Field on the record holding the reference (e.g. "Sensor").
    pub field: String,
    /// Entity type the reference points at.
    pub target: EntityType,
    /// The name or identifier that was looked up.
    pub name_or_id: String,
}

impl std::fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} '{}'",
            self.field,
            self.target.collection(),
            self.name_or_id
        )
    }
}

#[derive(Debug, Error)]
pub enum StaClientError {
    /// The API root could not be queried or returned an unusable payload.
    #[error("Endpoint discovery failed: {0}")]
    EndpointDiscovery(String),

    #[error("{name_or_id} of type {resource} not found")]
    NotFound {
        resource: EntityType,
        name_or_id: String,
    },

    /// Reference resolution hit a `NotFound` for one of the record's fields.
    #[error("Unresolved reference {0}")]
    UnresolvedReference(UnresolvedReference),

    #[error("Server rejected request (status {status}): {message}")]
    RemoteRejection { status: u16, message: String },

    #[error("This item does not belong to this API instance (own URL: {own_url}, item URL: {item_url})")]
    CrossInstanceUpdate { own_url: String, item_url: String },

    /// The server did not advertise a collection for this entity type.
    #[error("No endpoint available for {0}")]
    MissingEndpoint(EntityType),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl StaClientError {
    /// Whether this error means "the referenced entity does not exist (yet)".
    ///
    /// These are recovered locally by deferral and never treated as hard failures.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StaClientError::NotFound { .. } | StaClientError::UnresolvedReference(_)
        )
    }
}

impl From<reqwest::Error> for StaClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            StaClientError::Transport(format!("request timed out: {e}"))
        } else if e.is_decode() {
            StaClientError::Parse(e.to_string())
        } else {
            StaClientError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for StaClientError {
    fn from(e: serde_json::Error) -> Self {
        StaClientError::Parse(e.to_string())
    }
}

impl From<serde_yaml::Error> for StaClientError {
    fn from(e: serde_yaml::Error) -> Self {
        let location = e
            .location()
            .map(|loc| format!(" at line {}, column {}", loc.line(), loc.column()))
            .unwrap_or_default();
        StaClientError::InvalidDocument(format!("invalid YAML{location}: {e}"))
    }
}

impl From<std::io::Error> for StaClientError {
    fn from(e: std::io::Error) -> Self {
        StaClientError::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StaClientError::NotFound {
            resource: EntityType::Sensor,
            name_or_id: "DHT22".to_string(),
        };
        assert_eq!(err.to_string(), "DHT22 of type Sensors not found");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_unresolved_reference_is_not_found() {
        let err = StaClientError::UnresolvedReference(UnresolvedReference {
            field: "Thing".to_string(),
            target: EntityType::Thing,
            name_or_id: "weather-station".to_string(),
        });
        assert!(err.is_not_found());
        assert!(err.to_string().contains("Thing -> Things 'weather-station'"));
    }

    #[test]
    fn test_remote_rejection_is_not_not_found() {
        let err = StaClientError::RemoteRejection {
            status: 400,
            message: "bad".to_string(),
        };
        assert!(!err.is_not_found());
    }
}
