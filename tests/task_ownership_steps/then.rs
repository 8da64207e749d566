//! Then steps for owner-scoped task scenarios.

use super::world::{OwnershipWorld, run_async};
use rstest_bdd_macros::then;
use taskdesk::task::{
    domain::{TaskDomainError, TaskPriority, TaskStatus},
    services::TaskServiceError,
};

#[then(r#"the task count for "{owner}" is {count:usize}"#)]
fn task_count_is(
    world: &mut OwnershipWorld,
    owner: String,
    count: usize,
) -> Result<(), eyre::Report> {
    let tasks = run_async(world.service.list(&owner))
        .map_err(|err| eyre::eyre!("listing failed: {err}"))?;
    if tasks.len() != count {
        return Err(eyre::eyre!(
            "expected {count} task(s) for {owner}, found {}",
            tasks.len()
        ));
    }
    world.last_listing = Some(tasks);
    Ok(())
}

#[then(r#"the task is titled "{title}" with priority "{priority}" and status "{status}""#)]
fn task_has_fields(
    world: &OwnershipWorld,
    title: String,
    priority: String,
    status: String,
) -> Result<(), eyre::Report> {
    let expected_priority = TaskPriority::try_from(priority.as_str())
        .map_err(|err| eyre::eyre!("invalid expected priority in scenario: {err}"))?;
    let expected_status = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    let task = world
        .last_listing
        .as_ref()
        .and_then(|tasks| tasks.first())
        .ok_or_else(|| eyre::eyre!("missing listed task"))?;

    if task.title().as_str() != title
        || task.priority() != expected_priority
        || task.status() != expected_status
    {
        return Err(eyre::eyre!("unexpected task fields: {task:?}"));
    }
    Ok(())
}

#[then("the listing is empty")]
fn listing_is_empty(world: &OwnershipWorld) -> Result<(), eyre::Report> {
    let tasks = world
        .last_listing
        .as_ref()
        .ok_or_else(|| eyre::eyre!("missing listing"))?;
    if !tasks.is_empty() {
        return Err(eyre::eyre!("expected no tasks, found {tasks:?}"));
    }
    Ok(())
}

#[then("the request fails with a validation error")]
fn fails_with_validation_error(world: &OwnershipWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(TaskServiceError::Validation(TaskDomainError::EmptyTitle)) => Ok(()),
        other => Err(eyre::eyre!("expected EmptyTitle validation error, got {other:?}")),
    }
}

#[then("the request fails because the task was not found")]
fn fails_with_not_found(world: &OwnershipWorld) -> Result<(), eyre::Report> {
    match &world.last_error {
        Some(TaskServiceError::NotFound(_)) => Ok(()),
        other => Err(eyre::eyre!("expected NotFound error, got {other:?}")),
    }
}

#[then(r#""{owner}" still has a task titled "{title}""#)]
fn owner_still_has_task(
    world: &OwnershipWorld,
    owner: String,
    title: String,
) -> Result<(), eyre::Report> {
    let task = world.current_task()?;
    let stored = run_async(world.service.get(&owner, task.id()))
        .map_err(|err| eyre::eyre!("task should still exist: {err}"))?;
    if stored.title().as_str() != title {
        return Err(eyre::eyre!(
            "expected title {title}, found {}",
            stored.title().as_str()
        ));
    }
    Ok(())
}

#[then(r#"the task status is "{status}""#)]
fn task_status_is(world: &OwnershipWorld, status: String) -> Result<(), eyre::Report> {
    let expected = TaskStatus::try_from(status.as_str())
        .map_err(|err| eyre::eyre!("invalid expected status in scenario: {err}"))?;
    if let Some(err) = &world.last_error {
        return Err(eyre::eyre!("last call failed: {err}"));
    }
    let task = world.current_task()?;
    if task.status() != expected {
        return Err(eyre::eyre!(
            "expected status {}, found {}",
            expected.as_str(),
            task.status().as_str()
        ));
    }
    Ok(())
}
