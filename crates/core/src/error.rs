//! Error types for probe and session operations.

use thiserror::Error;
use thirtyfour::error::WebDriverError;

/// Result type alias for gridprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by sessions, probes, and the secret-store client.
///
/// Only [`Error::Config`] indicates caller misuse and is meant to reach the
/// caller as a hard failure. The environmental variants exist so session
/// internals can hand probes a classified failure; probes fold them into
/// boolean outcomes instead of propagating.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller misconfiguration (empty vault name, unrecognized browser kind, ...).
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation attempted on a handle whose connection was never established.
    #[error("session is not connected")]
    NotConnected,

    /// Navigation request failed (timeout or driver-level error).
    #[error("navigation failed: {url}")]
    Navigation {
        url: String,
        #[source]
        source: WebDriverError,
    },

    /// No element matched the locator.
    #[error("element not found: {locator}")]
    ElementNotFound { locator: String },

    /// Bounded explicit wait elapsed without the condition holding.
    #[error("timeout after {seconds}s waiting for: {condition}")]
    Wait { seconds: u64, condition: String },

    /// Interaction with a located element failed (send-keys or click).
    #[error("element interaction failed: {locator}")]
    Interaction {
        locator: String,
        #[source]
        source: WebDriverError,
    },

    /// Secret-store request failed at the transport level.
    #[error("secret store request failed: {context}")]
    VaultRequest {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// Secret store answered with a non-success status.
    #[error("secret store returned status {status}: {context}")]
    VaultStatus { context: String, status: u16 },

    /// Requested secret does not exist in the vault.
    #[error("secret '{name}' not found")]
    SecretNotFound { name: String },

    /// Raw WebDriver error.
    #[error(transparent)]
    WebDriver(#[from] WebDriverError),

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns true if this error classifies as a missing element.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::ElementNotFound { .. })
    }

    /// Returns true if this error classifies as an elapsed wait.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Wait { .. })
    }
}
