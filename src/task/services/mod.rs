//! Application services for owner-scoped task management.

mod service;

pub use service::{TaskService, TaskServiceError, TaskServiceResult};
