//! Process status domain model
//!
//! Represents the heartbeat/restart state of a supervised process as
//! reported by the backend, and the health classification derived from it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Heartbeats older than this mark a process as down
pub const HEARTBEAT_THRESHOLD_SECS: i64 = 10;

/// Processes started more recently than this are still restarting
pub const RESTARTING_THRESHOLD_SECS: i64 = 30;

/// Heartbeat ages beyond this are displayed as "60+"
pub const HEARTBEAT_DISPLAY_CAP_SECS: i64 = 60;

/// Last known state of a supervised process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessStatus {
    pub process_name: String,

    /// Seconds since the last heartbeat
    #[serde(rename = "last_heartbeat_ago")]
    pub last_heartbeat_ago_secs: i64,

    /// Seconds since the process last started
    #[serde(rename = "last_started_ago")]
    pub last_started_ago_secs: i64,

    #[serde(default)]
    pub git_sha: String,

    pub last_started_at: DateTime<Utc>,

    pub last_heartbeat_at: DateTime<Utc>,

    /// Whether the backend has a deploy target for this process, i.e. it can
    /// be stopped, restarted or updated remotely
    #[serde(default)]
    pub target_configured: bool,
}

impl ProcessStatus {
    pub fn health(&self) -> ProcessHealth {
        ProcessHealth::derive(self)
    }

    /// Heartbeat time with a capped "seconds ago" suffix
    pub fn heartbeat_display(&self) -> String {
        let at = self.last_heartbeat_at.format("%Y-%m-%d %H:%M:%S");
        if self.last_heartbeat_ago_secs > HEARTBEAT_DISPLAY_CAP_SECS {
            format!("{} ({}+ seconds ago)", at, HEARTBEAT_DISPLAY_CAP_SECS)
        } else {
            format!("{} ({} seconds ago)", at, self.last_heartbeat_ago_secs)
        }
    }

    /// Whether control actions may be issued for this process
    pub fn actions_enabled(&self) -> bool {
        self.target_configured
    }
}

/// Health classification of a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProcessHealth {
    Up,
    Restarting,
    Down,
}

impl ProcessHealth {
    /// Classify a status: stale heartbeat wins over a recent start
    pub fn derive(status: &ProcessStatus) -> Self {
        if status.last_heartbeat_ago_secs > HEARTBEAT_THRESHOLD_SECS {
            ProcessHealth::Down
        } else if status.last_started_ago_secs < RESTARTING_THRESHOLD_SECS {
            ProcessHealth::Restarting
        } else {
            ProcessHealth::Up
        }
    }
}

impl std::fmt::Display for ProcessHealth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessHealth::Up => write!(f, "Up"),
            ProcessHealth::Restarting => write!(f, "Restarting"),
            ProcessHealth::Down => write!(f, "Down"),
        }
    }
}

/// Remote lifecycle action on a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessAction {
    Start,
    Stop,
    Restart,
    Update,
}

impl ProcessAction {
    /// Actions offered next to each process in the status table
    pub const TABLE_ACTIONS: [ProcessAction; 3] = [
        ProcessAction::Stop,
        ProcessAction::Restart,
        ProcessAction::Update,
    ];

    /// Path segment used by the deploy API
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessAction::Start => "start",
            ProcessAction::Stop => "stop",
            ProcessAction::Restart => "restart",
            ProcessAction::Update => "update",
        }
    }
}

impl std::fmt::Display for ProcessAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProcessAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "start" => Ok(ProcessAction::Start),
            "stop" => Ok(ProcessAction::Stop),
            "restart" => Ok(ProcessAction::Restart),
            "update" => Ok(ProcessAction::Update),
            other => Err(format!("unknown process action '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(heartbeat_ago: i64, started_ago: i64) -> ProcessStatus {
        ProcessStatus {
            process_name: "pinger".to_string(),
            last_heartbeat_ago_secs: heartbeat_ago,
            last_started_ago_secs: started_ago,
            git_sha: "abc123".to_string(),
            last_started_at: DateTime::from_timestamp(1_600_000_000, 0).unwrap(),
            last_heartbeat_at: DateTime::from_timestamp(1_600_000_100, 0).unwrap(),
            target_configured: false,
        }
    }

    #[test]
    fn test_health_derivation() {
        assert_eq!(status(11, 5).health(), ProcessHealth::Down);
        assert_eq!(status(11, 500).health(), ProcessHealth::Down);
        assert_eq!(status(5, 20).health(), ProcessHealth::Restarting);
        assert_eq!(status(5, 40).health(), ProcessHealth::Up);
    }

    #[test]
    fn test_health_thresholds_are_exclusive() {
        assert_eq!(status(10, 30).health(), ProcessHealth::Up);
        assert_eq!(status(10, 29).health(), ProcessHealth::Restarting);
    }

    #[test]
    fn test_heartbeat_display_caps_at_sixty() {
        assert_eq!(
            status(60, 100).heartbeat_display(),
            "2020-09-13 12:28:20 (60 seconds ago)"
        );
        assert_eq!(
            status(61, 100).heartbeat_display(),
            "2020-09-13 12:28:20 (60+ seconds ago)"
        );
    }

    #[test]
    fn test_deserialize_backend_status() {
        let json = r#"{
            "process_name": "ponger",
            "last_started_at": "2020-09-13T12:26:40+00:00",
            "last_started_ago": 45,
            "last_heartbeat_at": "2020-09-13T12:28:20+00:00",
            "last_heartbeat_ago": 2,
            "git_sha": "deadbeef",
            "target_configured": true
        }"#;

        let status: ProcessStatus = serde_json::from_str(json).unwrap();
        assert_eq!(status.last_heartbeat_ago_secs, 2);
        assert!(status.actions_enabled());
        assert_eq!(status.health(), ProcessHealth::Up);
    }

    #[test]
    fn test_actions_disabled_without_target() {
        assert!(!status(1, 100).actions_enabled());
    }

    #[test]
    fn test_action_parsing() {
        assert_eq!("Restart".parse::<ProcessAction>(), Ok(ProcessAction::Restart));
        assert!("explode".parse::<ProcessAction>().is_err());
        assert_eq!(ProcessAction::Update.to_string(), "update");
    }
}
