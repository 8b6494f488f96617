//! Command-related API endpoints

use crate::ConsoleClient;
use crate::error::Result;
use opsconsole_core::domain::command::{Command, CommandType};
use opsconsole_core::dto::command::{
    CommandResponse, CommandTypesResponse, ListCommandsResponse, SubmitAck, SubmitCommand,
};
use tracing::debug;

impl ConsoleClient {
    // =============================================================================
    // Command History
    // =============================================================================

    /// List recorded commands, most recent first
    ///
    /// # Arguments
    /// * `offset` - Number of commands to skip
    /// * `num` - Maximum number of commands to return
    pub async fn list_commands(&self, offset: u32, num: u32) -> Result<Vec<Command>> {
        let url = self.endpoint(&["api", "commands"])?;
        let response = self
            .client
            .get(url)
            .query(&[("offset", offset), ("num", num)])
            .send()
            .await?;

        let body: ListCommandsResponse = self.handle_response(response).await?;
        Ok(body.commands)
    }

    /// Get a recorded command by its key
    ///
    /// # Arguments
    /// * `key` - The backend-assigned command key
    pub async fn get_command(&self, key: &str) -> Result<Command> {
        let url = self.endpoint(&["api", "commands", key])?;
        let response = self.client.get(url).send().await?;

        let body: CommandResponse = self.handle_response(response).await?;
        Ok(body.command)
    }

    // =============================================================================
    // Command Schema & Submission
    // =============================================================================

    /// List the command types the backend accepts
    pub async fn list_command_types(&self) -> Result<Vec<CommandType>> {
        let url = self.endpoint(&["api", "command-types"])?;
        let response = self.client.get(url).send().await?;

        let body: CommandTypesResponse = self.handle_response(response).await?;
        Ok(body.command_types)
    }

    /// Fetch the schema, and the command identified by `key` if given
    ///
    /// Both requests run concurrently; the call fails if either fails.
    ///
    /// # Example
    /// ```no_run
    /// # use opsconsole_client::ConsoleClient;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = ConsoleClient::new("http://localhost:5001");
    /// let (types, existing) = client.fetch_schema(Some("1600000000000-0")).await?;
    /// assert!(existing.is_some());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch_schema(
        &self,
        key: Option<&str>,
    ) -> Result<(Vec<CommandType>, Option<Command>)> {
        match key {
            Some(key) => {
                let (types, command) =
                    tokio::try_join!(self.list_command_types(), self.get_command(key))?;
                Ok((types, Some(command)))
            }
            None => Ok((self.list_command_types().await?, None)),
        }
    }

    /// Submit a command built from a form
    pub async fn submit_command(&self, command: &SubmitCommand) -> Result<SubmitAck> {
        let url = self.endpoint(&["api", "commands"])?;
        debug!(
            command_type = %command.command_type,
            fields = command.field_descriptions.len(),
            "Submitting command"
        );
        let response = self.client.post(url).json(command).send().await?;

        self.handle_response(response).await
    }
}
