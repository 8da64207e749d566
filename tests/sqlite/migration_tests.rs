//! Schema bootstrap and legacy upgrade tests.

use super::helpers::{TestDatabase, fields, owner, runtime};
use rstest::rstest;
use taskdesk::task::{
    adapters::sqlite::{LayoutPolicy, bootstrap_schema, table_columns},
    domain::SchemaLayout,
    ports::TaskRepository,
};
use tokio::runtime::Runtime;

#[rstest]
fn bootstrap_creates_the_current_layout_once(runtime: Runtime) {
    let database = TestDatabase::empty();
    let repository = database.repository(LayoutPolicy::DetectOnce);

    runtime.block_on(async {
        assert!(repository.bootstrap_schema().await.expect("bootstrap"));
        assert!(!repository.bootstrap_schema().await.expect("second bootstrap"));
        assert_eq!(
            repository.resolve_layout().await.expect("resolve"),
            SchemaLayout::Current
        );
    });
}

#[rstest]
fn bootstrap_leaves_an_existing_legacy_table_alone() {
    let database = TestDatabase::legacy();
    let mut connection = database.pool().get().expect("connection");

    let created = bootstrap_schema(&mut connection).expect("bootstrap");
    let columns = table_columns(&mut connection, "items").expect("columns");

    assert!(!created);
    assert!(columns.iter().any(|column| column == "Responsable"));
    assert!(!columns.iter().any(|column| column == "UserId"));
}

#[rstest]
fn upgrade_moves_legacy_rows_to_the_current_layout(runtime: Runtime) {
    let database = TestDatabase::legacy();
    let repository = database.repository(LayoutPolicy::DetectOnce);
    let alice = owner("acct-alice");

    runtime.block_on(async {
        let created = repository
            .create_for_owner(&alice, &fields("Carried over", Some("2025-04-01")))
            .await
            .expect("create in legacy layout");

        assert!(repository.upgrade_legacy_layout().await.expect("upgrade"));
        assert_eq!(
            repository.resolve_layout().await.expect("resolve"),
            SchemaLayout::Current
        );

        let fetched = repository
            .get_for_owner(&alice, created.id())
            .await
            .expect("row survives the upgrade");
        assert_eq!(fetched, created);

        let (user_id, user_email) = database.current_owner_columns(created.id().value());
        assert_eq!(user_id, "acct-alice");
        assert_eq!(user_email.as_deref(), Some("acct-alice"));
    });
}

#[rstest]
#[case::current("current")]
#[case::both_owner_columns("transitional")]
fn upgrade_skips_tables_that_already_have_user_id(runtime: Runtime, #[case] layout: &str) {
    let database = TestDatabase::with_layout(layout);
    let repository = database.repository(LayoutPolicy::DetectOnce);

    let upgraded = runtime
        .block_on(repository.upgrade_legacy_layout())
        .expect("upgrade");

    assert!(!upgraded);
}
