//! Deploy-related API endpoints

use crate::ConsoleClient;
use crate::error::Result;
use opsconsole_core::domain::status::{ProcessAction, ProcessStatus};
use opsconsole_core::dto::status::{ControlOutcome, StatusesResponse};

impl ConsoleClient {
    // =============================================================================
    // Process Status & Lifecycle
    // =============================================================================

    /// List the last known status of every supervised process
    pub async fn list_statuses(&self) -> Result<Vec<ProcessStatus>> {
        let url = self.endpoint(&["api", "deploy"])?;
        let response = self.client.get(url).send().await?;

        let body: StatusesResponse = self.handle_response(response).await?;
        Ok(body.statuses)
    }

    /// Run a lifecycle action on a process
    ///
    /// # Arguments
    /// * `process_name` - Name of the deploy target
    /// * `action` - The action to run
    ///
    /// # Returns
    /// Captured output of the action
    pub async fn control_process(
        &self,
        process_name: &str,
        action: ProcessAction,
    ) -> Result<ControlOutcome> {
        let url = self.endpoint(&["api", "deploy", process_name, action.as_str()])?;
        let response = self.client.post(url).send().await?;

        self.handle_response(response).await
    }
}
