//! Command form sessions
//!
//! Ties a [`CommandForm`] to the backend: loads the schema (and optionally
//! a recorded command to resend), then submits a tab and tracks the submit
//! control's state across the request.

use async_trait::async_trait;
use opsconsole_core::dto::command::{SubmitAck, SubmitCommand};
use opsconsole_core::form::{CommandForm, FormError};
use tracing::{error, info};

use crate::ConsoleClient;
use crate::error::Result;

/// Destination for submitted commands
#[async_trait]
pub trait CommandSink: Send + Sync {
    async fn submit(&self, command: &SubmitCommand) -> Result<SubmitAck>;
}

#[async_trait]
impl CommandSink for ConsoleClient {
    async fn submit(&self, command: &SubmitCommand) -> Result<SubmitAck> {
        self.submit_command(command).await
    }
}

/// A form being filled in by an operator
pub struct FormSession {
    form: CommandForm,
}

impl FormSession {
    pub fn new(form: CommandForm) -> Self {
        Self { form }
    }

    /// Fetch the schema (and the command for `key`, if any) and render the form
    pub async fn load(client: &ConsoleClient, key: Option<&str>) -> Result<Self> {
        let (schema, existing) = client.fetch_schema(key).await?;
        Ok(Self::new(CommandForm::render(&schema, existing.as_ref())))
    }

    pub fn form(&self) -> &CommandForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut CommandForm {
        &mut self.form
    }

    /// Submit the tab for `command_type`
    ///
    /// The tab's submit control is disabled for the duration of the request
    /// and stays disabled after a success. On failure it is re-enabled and
    /// the error is returned.
    pub async fn submit(&mut self, command_type: &str, sink: &dyn CommandSink) -> Result<SubmitAck> {
        let tab = self
            .form
            .tab_mut(command_type)
            .ok_or_else(|| FormError::UnknownCommandType(command_type.to_string()))?;

        let body = tab.begin_submit()?;
        let result = sink.submit(&body).await;

        match &result {
            Ok(ack) => info!(
                command_type,
                key = ack.command.as_ref().map(|c| c.key.as_str()).unwrap_or(""),
                "Command submitted"
            ),
            Err(e) => error!(command_type, "Failed to submit command: {}", e),
        }

        tab.finish_submit(result.is_ok());
        result
    }
}
