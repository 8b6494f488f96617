//! Deploy DTOs
//!
//! Envelopes for the process status and lifecycle endpoints.

use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::status::ProcessStatus;

/// Response of `GET /api/deploy`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusesResponse {
    #[serde(default)]
    pub statuses: Vec<ProcessStatus>,
}

/// Output of a lifecycle action
///
/// Accepts both `{stdout, stderr}` and `{success, outs, errs}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlOutcome {
    #[serde(default)]
    pub success: Option<bool>,

    #[serde(default, alias = "outs", deserialize_with = "null_as_empty")]
    pub stdout: String,

    #[serde(default, alias = "errs", deserialize_with = "null_as_empty")]
    pub stderr: String,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
