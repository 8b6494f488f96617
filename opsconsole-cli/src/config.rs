//! Configuration module
//!
//! Handles CLI configuration: where the backend lives and how often views
//! refresh.

use anyhow::Result;
use opsconsole_client::ConsoleClient;
use std::time::Duration;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the backend HTTP API
    pub base_url: String,

    /// Explicit log tail WebSocket URL; derived from `base_url` when unset
    pub tail_url: Option<String>,

    /// Status refresh cadence in watch mode
    pub poll_interval: Duration,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            anyhow::bail!("base URL cannot be empty");
        }

        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            anyhow::bail!("base URL must start with http:// or https://");
        }

        if let Some(tail_url) = &self.tail_url {
            if !tail_url.starts_with("ws://") && !tail_url.starts_with("wss://") {
                anyhow::bail!("tail URL must start with ws:// or wss://");
            }
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        Ok(())
    }

    pub fn client(&self) -> ConsoleClient {
        ConsoleClient::new(&self.base_url)
    }

    /// The tail endpoint to connect to
    pub fn tail_endpoint(&self, client: &ConsoleClient) -> Result<String> {
        match &self.tail_url {
            Some(url) => Ok(url.clone()),
            None => Ok(client.tail_url()?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            base_url: "http://localhost:5001".to_string(),
            tail_url: None,
            poll_interval: Duration::from_millis(1000),
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.base_url = String::new();
        assert!(config.validate().is_err());

        config.base_url = "localhost:5001".to_string();
        assert!(config.validate().is_err());

        config.base_url = "https://ops.example.com".to_string();
        assert!(config.validate().is_ok());

        config.tail_url = Some("http://ops.example.com/ws/tail".to_string());
        assert!(config.validate().is_err());

        config.tail_url = Some("wss://ops.example.com/ws/tail".to_string());
        assert!(config.validate().is_ok());

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tail_endpoint() {
        let mut config = config();
        let client = config.client();
        assert_eq!(
            config.tail_endpoint(&client).unwrap(),
            "ws://localhost:5001/ws/tail"
        );

        config.tail_url = Some("ws://logs.internal:9000/ws/tail".to_string());
        assert_eq!(
            config.tail_endpoint(&client).unwrap(),
            "ws://logs.internal:9000/ws/tail"
        );
    }
}
