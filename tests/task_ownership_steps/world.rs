//! Shared world state for owner-scoped task BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use taskdesk::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::TaskRecord,
    services::{TaskService, TaskServiceError},
};

/// Service type used by the BDD world.
pub type TestTaskService = TaskService<InMemoryTaskRepository>;

/// Scenario world for ownership behaviour tests.
pub struct OwnershipWorld {
    pub service: TestTaskService,
    pub last_task: Option<TaskRecord>,
    pub last_listing: Option<Vec<TaskRecord>>,
    pub last_error: Option<TaskServiceError>,
}

impl OwnershipWorld {
    /// Creates a world over an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            service: TaskService::new(Arc::new(InMemoryTaskRepository::new())),
            last_task: None,
            last_listing: None,
            last_error: None,
        }
    }

    /// Records the outcome of a service call.
    pub fn record(&mut self, result: Result<Option<TaskRecord>, TaskServiceError>) {
        match result {
            Ok(Some(task)) => {
                self.last_task = Some(task);
                self.last_error = None;
            }
            Ok(None) => self.last_error = None,
            Err(err) => self.last_error = Some(err),
        }
    }

    /// Returns the task the scenario is working on.
    pub fn current_task(&self) -> Result<&TaskRecord, eyre::Report> {
        self.last_task
            .as_ref()
            .ok_or_else(|| eyre::eyre!("missing task in scenario world"))
    }
}

impl Default for OwnershipWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> OwnershipWorld {
    OwnershipWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
