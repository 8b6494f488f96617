//! opsconsole HTTP Client
//!
//! A type-safe client for the console backend: command history and
//! submission, process status and control, and the live log tail.
//!
//! # Example
//!
//! ```no_run
//! use opsconsole_client::ConsoleClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ConsoleClient::new("http://localhost:5001");
//!
//!     for status in client.list_statuses().await? {
//!         println!("{}: {}", status.process_name, status.health());
//!     }
//!     Ok(())
//! }
//! ```

mod commands;
mod deploy;
pub mod error;
pub mod poller;
pub mod session;
pub mod tail;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use poller::{StatusFeed, StatusPoller, StatusSource};
pub use session::{CommandSink, FormSession};
pub use tail::{TailEvent, TailHandle, TailStream};

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

/// Path of the log tail WebSocket endpoint
pub const TAIL_PATH: &str = "/ws/tail";

/// HTTP client for the console backend API
///
/// Methods are grouped by endpoint family:
/// - Commands (history, schema, lookup, submission)
/// - Deploy (process statuses, lifecycle actions)
/// - Log tail (WebSocket URL derivation)
#[derive(Debug, Clone)]
pub struct ConsoleClient {
    /// Base URL of the backend (e.g., "http://localhost:5001")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl ConsoleClient {
    /// Create a new console client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the backend (e.g., "http://localhost:5001")
    ///
    /// # Example
    /// ```
    /// use opsconsole_client::ConsoleClient;
    ///
    /// let client = ConsoleClient::new("http://localhost:5001");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new console client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use opsconsole_client::ConsoleClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(10))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ConsoleClient::with_client("http://localhost:5001", http_client);
    /// ```
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// WebSocket URL of the log tail, derived from the base URL
    ///
    /// `http` maps to `ws` and `https` to `wss`; any path on the base URL
    /// is replaced.
    pub fn tail_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid base URL: {}", e)))?;

        let scheme = match url.scheme() {
            "http" | "ws" => "ws",
            "https" | "wss" => "wss",
            other => {
                return Err(ClientError::InvalidRequest(format!(
                    "Cannot derive a WebSocket URL from scheme '{}'",
                    other
                )));
            }
        };
        url.set_scheme(scheme).map_err(|_| {
            ClientError::InvalidRequest(format!("Cannot switch scheme to '{}'", scheme))
        })?;
        url.set_path(TAIL_PATH);
        url.set_query(None);

        Ok(url.to_string())
    }

    /// Build an API URL from path segments, percent-encoding each one
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidRequest(format!("Invalid base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidRequest(format!("Base URL cannot have a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    /// Open the log tail stream at the derived URL
    pub async fn open_tail(&self) -> Result<TailHandle> {
        TailStream::open(&self.tail_url()?).await
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// This method checks the status code and returns an appropriate error if
    /// the request failed, or deserializes the response body if successful.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ConsoleClient::new("http://localhost:5001");
        assert_eq!(client.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ConsoleClient::new("http://localhost:5001/");
        assert_eq!(client.base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_tail_url_derivation() {
        let client = ConsoleClient::new("http://localhost:5001");
        assert_eq!(client.tail_url().unwrap(), "ws://localhost:5001/ws/tail");

        let client = ConsoleClient::new("https://ops.example.com/console/");
        assert_eq!(client.tail_url().unwrap(), "wss://ops.example.com/ws/tail");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = ConsoleClient::new("http://localhost:5001");
        assert_eq!(
            client.endpoint(&["api", "commands", "a b/c?d"]).unwrap().as_str(),
            "http://localhost:5001/api/commands/a%20b%2Fc%3Fd"
        );
        assert_eq!(
            client
                .endpoint(&["api", "deploy", "pinger", "restart"])
                .unwrap()
                .as_str(),
            "http://localhost:5001/api/deploy/pinger/restart"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ConsoleClient::new("https://ops.example.com/console/");
        assert_eq!(
            client.endpoint(&["api", "deploy"]).unwrap().as_str(),
            "https://ops.example.com/console/api/deploy"
        );

        let client = ConsoleClient::new("not a url");
        assert!(matches!(
            client.endpoint(&["api"]),
            Err(ClientError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_tail_url_rejects_other_schemes() {
        let client = ConsoleClient::new("ftp://localhost");
        assert!(matches!(
            client.tail_url(),
            Err(ClientError::InvalidRequest(_))
        ));

        let client = ConsoleClient::new("not a url");
        assert!(client.tail_url().is_err());
    }
}
