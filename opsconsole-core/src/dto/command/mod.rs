//! Command DTOs
//!
//! Request and response envelopes for the command endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::command::{Command, CommandType, FieldValue};

/// Response of `GET /api/commands`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListCommandsResponse {
    #[serde(default)]
    pub commands: Vec<Command>,
}

/// Response of `GET /api/command-types`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandTypesResponse {
    #[serde(default)]
    pub command_types: Vec<CommandType>,
}

/// Response of `GET /api/commands/{key}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandResponse {
    pub command: Command,
}

/// Body of `POST /api/commands`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitCommand {
    #[serde(rename = "type")]
    pub command_type: String,

    pub field_descriptions: Vec<SubmittedField>,
}

/// One `{id, val}` pair of a submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmittedField {
    pub id: String,

    #[serde(rename = "val")]
    pub value: FieldValue,
}

/// Acknowledgement returned after a submission
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitAck {
    #[serde(default)]
    pub command: Option<AckedCommand>,
}

/// The stored command as echoed back by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AckedCommand {
    #[serde(default)]
    pub key: String,

    #[serde(default)]
    pub timestamp_ms: i64,

    #[serde(rename = "type", default)]
    pub command_type: String,
}
