//! HTTP portal backend
//!
//! Talks to the portal REST API. Records travel in the domain's own JSON
//! shape, so responses (including rows still carrying the legacy
//! `completed` flag) deserialize straight into [`Task`] and [`Milestone`].
//!
//! Endpoints:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | fetch tasks | `GET projects/{id}/tasks` |
//! | fetch milestones | `GET projects/{id}/milestones` |
//! | create task | `POST projects/{id}/tasks` |
//! | update task | `PATCH tasks/{id}` |
//! | delete task | `DELETE tasks/{id}` |
//! | create milestone | `POST projects/{id}/milestones` |
//! | update milestone | `PATCH milestones/{id}` |
//! | delete milestone | `DELETE milestones/{id}` |

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;

use crate::domain::{
    Milestone, MilestoneDraft, MilestoneId, MilestonePatch, ProjectId, Task, TaskDraft, TaskId,
    TaskPatch,
};

use super::PortalError;

/// Portal backend over the REST API
#[derive(Debug, Clone)]
pub struct HttpPortal {
    client: Client,
    base_url: String,
}

impl HttpPortal {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, PortalError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, PortalError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response.text().await.unwrap_or_default();
        Err(PortalError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, PortalError> {
        let response = self.send(request).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_empty(&self, request: RequestBuilder) -> Result<(), PortalError> {
        let response = self.send(request).await?;
        let _ = response.bytes().await;
        Ok(())
    }

    pub async fn fetch_tasks(&self, project: &ProjectId) -> Result<Vec<Task>, PortalError> {
        let url = self.endpoint(&format!("projects/{project}/tasks"));
        self.get_json(self.client.get(url)).await
    }

    pub async fn fetch_milestones(
        &self,
        project: &ProjectId,
    ) -> Result<Vec<Milestone>, PortalError> {
        let url = self.endpoint(&format!("projects/{project}/milestones"));
        self.get_json(self.client.get(url)).await
    }

    pub async fn create_task(
        &self,
        project: &ProjectId,
        draft: &TaskDraft,
    ) -> Result<Task, PortalError> {
        let url = self.endpoint(&format!("projects/{project}/tasks"));
        self.get_json(self.client.post(url).json(draft)).await
    }

    pub async fn update_task(&self, id: &TaskId, patch: &TaskPatch) -> Result<(), PortalError> {
        let url = self.endpoint(&format!("tasks/{id}"));
        self.send_empty(self.client.patch(url).json(patch)).await
    }

    pub async fn delete_task(&self, id: &TaskId) -> Result<(), PortalError> {
        let url = self.endpoint(&format!("tasks/{id}"));
        self.send_empty(self.client.delete(url)).await
    }

    pub async fn create_milestone(
        &self,
        project: &ProjectId,
        draft: &MilestoneDraft,
    ) -> Result<Milestone, PortalError> {
        let url = self.endpoint(&format!("projects/{project}/milestones"));
        self.get_json(self.client.post(url).json(draft)).await
    }

    pub async fn update_milestone(
        &self,
        id: &MilestoneId,
        patch: &MilestonePatch,
    ) -> Result<(), PortalError> {
        let url = self.endpoint(&format!("milestones/{id}"));
        self.send_empty(self.client.patch(url).json(patch)).await
    }

    pub async fn delete_milestone(&self, id: &MilestoneId) -> Result<(), PortalError> {
        let url = self.endpoint(&format!("milestones/{id}"));
        self.send_empty(self.client.delete(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_double_slashes() {
        let portal = HttpPortal::new("https://portal.example.com/api/", Duration::from_secs(5))
            .unwrap();

        assert_eq!(
            portal.endpoint("/projects/p1/tasks"),
            "https://portal.example.com/api/projects/p1/tasks"
        );
        assert_eq!(
            portal.endpoint("tasks/t-1234567"),
            "https://portal.example.com/api/tasks/t-1234567"
        );
    }
}
