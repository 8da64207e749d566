//! Typed client for the task API.

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use super::transport::{HttpTransport, TransportError, TransportRequest, TransportResponse};
use crate::http::dto::{
    DataResponse, ErrorBody, HealthResponse, MessageResponse, SchemaResponse, TaskListResponse,
    TaskRequest, TaskResponse,
};
use crate::task::domain::{OwnerKey, TaskId};

/// Errors surfaced by [`TaskApiClient`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Server error text, with details appended after ` - `.
        message: String,
    },

    /// No response was received.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request body could not be encoded.
    #[error("could not encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// A success response did not have the expected shape.
    #[error("could not decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ClientError {
    /// Returns the HTTP status for status errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Encode(_) | Self::Decode(_) => None,
        }
    }

    fn from_response(response: &TransportResponse) -> Self {
        let message = match serde_json::from_str::<ErrorBody>(&response.body) {
            Ok(ErrorBody {
                error,
                details: Some(details),
            }) => format!("{error} - {details}"),
            Ok(ErrorBody {
                error,
                details: None,
            }) => error,
            Err(_) => format!("HTTP {}", response.status.as_u16()),
        };
        Self::Status {
            status: response.status,
            message,
        }
    }
}

/// Result type for client calls.
pub type ClientResult<T> = Result<T, ClientError>;

/// Task API client over an injectable transport.
#[derive(Debug, Clone)]
pub struct TaskApiClient<T> {
    transport: T,
}

impl<T> TaskApiClient<T>
where
    T: HttpTransport,
{
    /// Creates a client sending through `transport`.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// Calls `GET /health`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-2xx status.
    pub async fn health(&self) -> ClientResult<HealthResponse> {
        self.call(TransportRequest::new(Method::GET, ["health"]))
            .await
    }

    /// Calls `GET /debug/schema`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-2xx status.
    pub async fn schema(&self) -> ClientResult<SchemaResponse> {
        self.call(TransportRequest::new(Method::GET, ["debug", "schema"]))
            .await
    }

    /// Lists the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or non-2xx status.
    pub async fn list_tasks(&self, owner: &OwnerKey) -> ClientResult<Vec<TaskResponse>> {
        let response: TaskListResponse = self
            .call(TransportRequest::new(Method::GET, owner_segments(owner)))
            .await?;
        Ok(response.data)
    }

    /// Fetches one of the owner's tasks.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with 404 when the task is not the
    /// owner's.
    pub async fn get_task(&self, owner: &OwnerKey, id: TaskId) -> ClientResult<TaskResponse> {
        self.call(TransportRequest::new(Method::GET, task_segments(owner, id)))
            .await
    }

    /// Creates a task for the owner.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with 400 for invalid fields.
    pub async fn create_task(
        &self,
        owner: &OwnerKey,
        request: &TaskRequest,
    ) -> ClientResult<TaskResponse> {
        let body = serde_json::to_value(request).map_err(ClientError::Encode)?;
        let response: DataResponse<TaskResponse> = self
            .call(TransportRequest::new(Method::POST, owner_segments(owner)).with_body(body))
            .await?;
        Ok(response.data)
    }

    /// Replaces a task's fields.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with 404 when the task is not the
    /// owner's.
    pub async fn update_task(
        &self,
        owner: &OwnerKey,
        id: TaskId,
        request: &TaskRequest,
    ) -> ClientResult<String> {
        let body = serde_json::to_value(request).map_err(ClientError::Encode)?;
        let response: MessageResponse = self
            .call(TransportRequest::new(Method::PUT, task_segments(owner, id)).with_body(body))
            .await?;
        Ok(response.message)
    }

    /// Deletes a task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with 404 when the task is not the
    /// owner's.
    pub async fn delete_task(&self, owner: &OwnerKey, id: TaskId) -> ClientResult<String> {
        let response: MessageResponse = self
            .call(TransportRequest::new(
                Method::DELETE,
                task_segments(owner, id),
            ))
            .await?;
        Ok(response.message)
    }

    /// Flips a task between completed and pending.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Status`] with 404 when the task is not the
    /// owner's.
    pub async fn toggle_task(&self, owner: &OwnerKey, id: TaskId) -> ClientResult<TaskResponse> {
        let mut segments = task_segments(owner, id);
        segments.push("toggle".to_owned());
        let response: DataResponse<TaskResponse> = self
            .call(TransportRequest::new(Method::POST, segments))
            .await?;
        Ok(response.data)
    }

    async fn call<R>(&self, request: TransportRequest) -> ClientResult<R>
    where
        R: DeserializeOwned,
    {
        let response = self.transport.send(request).await?;
        if !response.status.is_success() {
            let err = ClientError::from_response(&response);
            tracing::warn!(status = response.status.as_u16(), error = %err, "task api call failed");
            return Err(err);
        }
        serde_json::from_str(&response.body).map_err(ClientError::Decode)
    }
}

fn owner_segments(owner: &OwnerKey) -> Vec<String> {
    vec![
        "items".to_owned(),
        "user".to_owned(),
        owner.as_str().to_owned(),
    ]
}

fn task_segments(owner: &OwnerKey, id: TaskId) -> Vec<String> {
    let mut segments = owner_segments(owner);
    segments.push(id.to_string());
    segments
}
