//! HTTP handlers for the task API.

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    http::StatusCode,
};

use super::{
    dto::{
        DataResponse, EndpointDescription, HealthResponse, IndexResponse, MessageResponse,
        SchemaResponse, TaskListResponse, TaskRequest, TaskResponse,
    },
    error::ApiErrorResponse,
};
use crate::task::{domain::TaskId, ports::TaskRepository, services::TaskService};

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Task operations.
    pub tasks: TaskService<dyn TaskRepository>,
}

impl AppState {
    /// Creates state around the given service.
    #[must_use]
    pub const fn new(tasks: TaskService<dyn TaskRepository>) -> Self {
        Self { tasks }
    }
}

type OwnerPath = Result<Path<String>, PathRejection>;
type OwnerTaskPath = Result<Path<(String, i64)>, PathRejection>;
type TaskBody = Result<Json<TaskRequest>, JsonRejection>;

const ENDPOINTS: [(&str, &str); 9] = [
    ("GET /health", "Liveness check"),
    ("GET /debug/schema", "Task table diagnostic"),
    ("GET /items/user/{owner}", "List the owner's tasks"),
    ("POST /items/user/{owner}", "Create a task for the owner"),
    ("GET /items/user/{owner}/{id}", "Fetch one of the owner's tasks"),
    ("PUT /items/user/{owner}/{id}", "Replace a task's fields"),
    ("DELETE /items/user/{owner}/{id}", "Delete a task"),
    (
        "POST /items/user/{owner}/{id}/toggle",
        "Flip a task between completed and pending",
    ),
    ("GET /", "This index"),
];

/// `GET /`
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Welcome to the taskdesk API".to_owned(),
        endpoints: ENDPOINTS
            .iter()
            .map(|&(route, description)| EndpointDescription {
                route: route.to_owned(),
                description: description.to_owned(),
            })
            .collect(),
    })
}

/// `GET /health`
#[expect(clippy::unused_async, reason = "axum handlers are async functions")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
    })
}

/// `GET /debug/schema`
///
/// Reports the table columns even when no layout is recognized.
///
/// # Errors
///
/// Returns a 500 response when introspection fails.
pub async fn debug_schema(
    State(state): State<AppState>,
) -> Result<Json<SchemaResponse>, ApiErrorResponse> {
    let report = state.tasks.inspect_schema().await?;
    Ok(Json(SchemaResponse::from(report)))
}

/// `GET /items/user/{owner}`
///
/// # Errors
///
/// Returns 400 for a blank owner and 500 for configuration or store
/// failures.
pub async fn list_tasks(
    State(state): State<AppState>,
    owner: OwnerPath,
) -> Result<Json<TaskListResponse>, ApiErrorResponse> {
    let Path(owner) = owner?;
    let tasks = state.tasks.list(&owner).await?;
    let data: Vec<TaskResponse> = tasks.iter().map(TaskResponse::from).collect();

    Ok(Json(TaskListResponse {
        message: "success".to_owned(),
        count: data.len(),
        data,
        owner,
    }))
}

/// `GET /items/user/{owner}/{id}`
///
/// # Errors
///
/// Returns 404 when the task is missing or belongs to someone else.
pub async fn get_task(
    State(state): State<AppState>,
    path: OwnerTaskPath,
) -> Result<Json<TaskResponse>, ApiErrorResponse> {
    let Path((owner, id)) = path?;
    let task = state.tasks.get(&owner, TaskId::new(id)).await?;
    Ok(Json(TaskResponse::from(&task)))
}

/// `POST /items/user/{owner}`
///
/// # Errors
///
/// Returns 400 for malformed JSON or invalid fields.
pub async fn create_task(
    State(state): State<AppState>,
    owner: OwnerPath,
    body: TaskBody,
) -> Result<(StatusCode, Json<DataResponse<TaskResponse>>), ApiErrorResponse> {
    let Path(owner) = owner?;
    let Json(request) = body?;
    let task = state.tasks.create(&owner, request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new("Task created", TaskResponse::from(&task))),
    ))
}

/// `PUT /items/user/{owner}/{id}`
///
/// # Errors
///
/// Returns 400 for invalid input and 404 when the task is not the owner's.
pub async fn update_task(
    State(state): State<AppState>,
    path: OwnerTaskPath,
    body: TaskBody,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    let Path((owner, id)) = path?;
    let Json(request) = body?;
    state
        .tasks
        .update(&owner, TaskId::new(id), request.into())
        .await?;
    Ok(Json(MessageResponse::new("Task updated")))
}

/// `DELETE /items/user/{owner}/{id}`
///
/// # Errors
///
/// Returns 404 when the task is not the owner's.
pub async fn delete_task(
    State(state): State<AppState>,
    path: OwnerTaskPath,
) -> Result<Json<MessageResponse>, ApiErrorResponse> {
    let Path((owner, id)) = path?;
    state.tasks.delete(&owner, TaskId::new(id)).await?;
    Ok(Json(MessageResponse::new("Task deleted")))
}

/// `POST /items/user/{owner}/{id}/toggle`
///
/// # Errors
///
/// Returns 404 when the task is not the owner's.
pub async fn toggle_task(
    State(state): State<AppState>,
    path: OwnerTaskPath,
) -> Result<Json<DataResponse<TaskResponse>>, ApiErrorResponse> {
    let Path((owner, id)) = path?;
    let task = state.tasks.toggle_status(&owner, TaskId::new(id)).await?;
    Ok(Json(DataResponse::new(
        "Task status toggled",
        TaskResponse::from(&task),
    )))
}
