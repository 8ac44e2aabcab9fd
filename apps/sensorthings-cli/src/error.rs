//! CLI error types and exit codes

use sensorthings_client::StaClientError;
use thiserror::Error;

/// Exit codes for the CLI
/// - 0: Success
/// - 1: General or configuration error
/// - 3: Network error
/// - 4: Validation error, failed or unresolved records
/// - 5: Server error
pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Connection failed: {0}\n\nTroubleshooting:\n  - Check that the SensorThings server is running\n  - Verify the destination URL (-d/--destination)")]
    ConnectionFailed(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Reconciliation incomplete: {0}")]
    Incomplete(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Network(_) | CliError::ConnectionFailed(_) => 3,
            CliError::Validation(_) | CliError::Incomplete(_) | CliError::NotFound(_) => 4,
            CliError::Server(_) => 5,
            CliError::Api { status, .. } => {
                if *status >= 500 {
                    5
                } else {
                    4
                }
            }
            CliError::Config(_) | CliError::Io(_) | CliError::Interrupted => 1,
        }
    }

    /// Print the error to stderr with appropriate formatting
    pub fn print(&self) {
        let use_color = std::env::var("NO_COLOR").is_err();

        if use_color {
            eprintln!("\x1b[31mError:\x1b[0m {}", self);
        } else {
            eprintln!("Error: {}", self);
        }

        if let Some(suggestion) = self.suggestion() {
            if use_color {
                eprintln!("\n\x1b[33mSuggestion:\x1b[0m {}", suggestion);
            } else {
                eprintln!("\nSuggestion: {}", suggestion);
            }
        }
    }

    fn suggestion(&self) -> Option<&'static str> {
        match self {
            CliError::Incomplete(_) => Some(
                "Check that every referenced Thing, Sensor and ObservedProperty is declared \
                 in one of the documents or already exists on the server.",
            ),
            CliError::ConnectionFailed(_) => Some("Check your network connection and try again."),
            _ => None,
        }
    }
}

impl From<StaClientError> for CliError {
    fn from(e: StaClientError) -> Self {
        match e {
            StaClientError::EndpointDiscovery(message) => CliError::ConnectionFailed(message),
            StaClientError::Transport(message) => CliError::Network(message),
            StaClientError::RemoteRejection { status, message } => {
                if status >= 500 {
                    CliError::Server(message)
                } else {
                    CliError::Api { status, message }
                }
            }
            e @ (StaClientError::NotFound { .. } | StaClientError::UnresolvedReference(_)) => {
                CliError::NotFound(e.to_string())
            }
            e @ (StaClientError::MissingEndpoint(_) | StaClientError::Parse(_)) => {
                CliError::Server(e.to_string())
            }
            e @ (StaClientError::CrossInstanceUpdate { .. } | StaClientError::InvalidDocument(_)) => {
                CliError::Validation(e.to_string())
            }
            StaClientError::InvalidConfig(message) => CliError::Config(message),
            StaClientError::Io(message) => CliError::Io(message),
        }
    }
}

impl From<reqwest::Error> for CliError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            CliError::ConnectionFailed(e.to_string())
        } else if e.is_timeout() {
            CliError::Network("Request timed out".to_string())
        } else {
            CliError::Network(e.to_string())
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Config(format!("JSON error: {}", e))
    }
}

impl From<serde_yaml::Error> for CliError {
    fn from(e: serde_yaml::Error) -> Self {
        CliError::Validation(format!("YAML error: {}", e))
    }
}
