//! Given steps for owner-scoped task scenarios.

use super::world::{OwnershipWorld, run_async};
use eyre::WrapErr;
use rstest_bdd_macros::given;
use taskdesk::task::domain::TaskDraft;

#[given(r#""{owner}" has a task titled "{title}""#)]
fn owner_has_task(
    world: &mut OwnershipWorld,
    owner: String,
    title: String,
) -> Result<(), eyre::Report> {
    let created = run_async(world.service.create(&owner, TaskDraft::new(title)))
        .wrap_err("create task in scenario setup")?;
    world.last_task = Some(created);
    Ok(())
}
