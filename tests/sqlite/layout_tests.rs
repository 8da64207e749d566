//! Layout detection and strategy tests.

use super::helpers::{TestDatabase, fields, owner, runtime};
use rstest::rstest;
use std::sync::Arc;
use taskdesk::task::{
    adapters::sqlite::{
        DetectOnce, LayoutPolicy, SqliteTaskRepository, UPGRADE_LEGACY_LAYOUT_SQL, detect_layout,
    },
    domain::{SchemaLayout, TaskId},
    ports::{TaskRepository, TaskRepositoryError},
};
use tokio::runtime::Runtime;

#[rstest]
#[case::legacy("legacy", SchemaLayout::Legacy)]
#[case::current("current", SchemaLayout::Current)]
#[case::both_owner_columns("transitional", SchemaLayout::Legacy)]
fn detects_layout_from_live_columns(#[case] layout: &str, #[case] expected: SchemaLayout) {
    let database = TestDatabase::with_layout(layout);
    let mut connection = database.pool().get().expect("connection");

    let detected = detect_layout(&mut connection).expect("layout should be recognized");

    assert_eq!(detected, expected);
}

#[rstest]
fn unrecognized_table_fails_every_operation(runtime: Runtime) {
    let database = TestDatabase::with_layout("unrecognized");
    let repository = database.repository(LayoutPolicy::DetectEveryCall);
    let alice = owner("acct-alice");
    let id = TaskId::new(1);

    runtime.block_on(async {
        let outcomes = [
            repository.list_for_owner(&alice).await.map(|_| ()),
            repository.get_for_owner(&alice, id).await.map(|_| ()),
            repository
                .create_for_owner(&alice, &fields("Nope", None))
                .await
                .map(|_| ()),
            repository
                .update_for_owner(&alice, id, &fields("Nope", None))
                .await,
            repository.delete_for_owner(&alice, id).await,
        ];

        for outcome in outcomes {
            match outcome {
                Err(TaskRepositoryError::UnrecognizedSchema(schema)) => {
                    assert_eq!(schema.columns(), ["ItemId", "Titre", "Statut", "Owner"]);
                }
                other => panic!("expected unrecognized schema, got {other:?}"),
            }
        }
    });
    assert_eq!(database.row_count(), 0);
}

#[rstest]
fn missing_table_is_unrecognized_with_no_columns(runtime: Runtime) {
    let database = TestDatabase::empty();
    let repository = database.repository(LayoutPolicy::DetectOnce);

    let result = runtime.block_on(repository.resolve_layout());

    match result {
        Err(TaskRepositoryError::UnrecognizedSchema(schema)) => {
            assert!(schema.columns().is_empty());
        }
        other => panic!("expected unrecognized schema, got {other:?}"),
    }
}

#[rstest]
fn detect_once_recovers_after_an_out_of_band_upgrade(runtime: Runtime) {
    let database = TestDatabase::legacy();
    let strategy = Arc::new(DetectOnce::new());
    let repository = SqliteTaskRepository::new(database.pool(), strategy.clone());
    let alice = owner("acct-alice");

    runtime.block_on(async {
        repository
            .create_for_owner(&alice, &fields("Survives the upgrade", None))
            .await
            .expect("create on legacy table");
        assert_eq!(strategy.cached(), Some(SchemaLayout::Legacy));

        database.execute(UPGRADE_LEGACY_LAYOUT_SQL);

        let stale = repository.list_for_owner(&alice).await;
        assert!(matches!(stale, Err(TaskRepositoryError::Persistence(_))));
        assert_eq!(strategy.cached(), None);

        let tasks = repository
            .list_for_owner(&alice)
            .await
            .expect("list after the failed statement");
        let titles: Vec<&str> = tasks.iter().map(|task| task.title().as_str()).collect();
        assert_eq!(titles, ["Survives the upgrade"]);
        assert_eq!(strategy.cached(), Some(SchemaLayout::Current));
    });
}

#[rstest]
fn detect_once_keeps_its_answer_until_invalidated(runtime: Runtime) {
    let database = TestDatabase::legacy();
    let strategy = Arc::new(DetectOnce::new());
    let repository = SqliteTaskRepository::new(database.pool(), strategy.clone());

    runtime.block_on(async {
        assert_eq!(
            repository.resolve_layout().await.expect("resolve"),
            SchemaLayout::Legacy
        );

        database.execute("ALTER TABLE items RENAME COLUMN Responsable TO UserId;");
        assert_eq!(
            repository.resolve_layout().await.expect("cached resolve"),
            SchemaLayout::Legacy
        );

        repository.invalidate_layout();
        assert_eq!(strategy.cached(), None);
        assert_eq!(
            repository.resolve_layout().await.expect("resolve"),
            SchemaLayout::Current
        );
    });
}

#[rstest]
fn unreadable_rows_do_not_clear_the_cached_layout(runtime: Runtime) {
    let database = TestDatabase::legacy();
    database.execute(
        "INSERT INTO items (Titre, Statut, Priorite, Responsable)
         VALUES ('   ', 'pending', 'medium', 'acct-alice');",
    );
    let strategy = Arc::new(DetectOnce::new());
    let repository = SqliteTaskRepository::new(database.pool(), strategy.clone());

    runtime.block_on(async {
        let result = repository
            .get_for_owner(&owner("acct-alice"), TaskId::new(1))
            .await;
        assert!(matches!(result, Err(TaskRepositoryError::Persistence(_))));
    });

    assert_eq!(strategy.cached(), Some(SchemaLayout::Legacy));
}

#[rstest]
fn detect_once_does_not_remember_an_unrecognized_table(runtime: Runtime) {
    let database = TestDatabase::with_layout("unrecognized");
    let strategy = Arc::new(DetectOnce::new());
    let repository = SqliteTaskRepository::new(database.pool(), strategy.clone());

    runtime.block_on(async {
        assert!(matches!(
            repository.resolve_layout().await,
            Err(TaskRepositoryError::UnrecognizedSchema(_))
        ));
        assert_eq!(strategy.cached(), None);

        database.execute("ALTER TABLE items ADD COLUMN UserId TEXT;");

        assert_eq!(
            repository.resolve_layout().await.expect("resolve"),
            SchemaLayout::Current
        );
        assert_eq!(strategy.cached(), Some(SchemaLayout::Current));
    });
}

#[rstest]
fn detect_every_call_follows_schema_changes(runtime: Runtime) {
    let database = TestDatabase::legacy();
    let repository = database.repository(LayoutPolicy::DetectEveryCall);
    let alice = owner("acct-alice");

    runtime.block_on(async {
        repository
            .create_for_owner(&alice, &fields("Before", None))
            .await
            .expect("create in legacy layout");

        database.execute("ALTER TABLE items RENAME COLUMN Responsable TO UserId;");
        database.execute("ALTER TABLE items ADD COLUMN UserEmail TEXT;");

        repository
            .create_for_owner(&alice, &fields("After", None))
            .await
            .expect("create in current layout");
        let titles: Vec<String> = repository
            .list_for_owner(&alice)
            .await
            .expect("list")
            .iter()
            .map(|task| task.title().as_str().to_owned())
            .collect();

        assert_eq!(titles, ["Before", "After"]);
    });
}

#[rstest]
fn pinned_layout_skips_detection(runtime: Runtime) {
    let database = TestDatabase::with_layout("transitional");
    let repository = database.repository(LayoutPolicy::Pinned(SchemaLayout::Current));
    let alice = owner("acct-alice");

    runtime.block_on(async {
        assert_eq!(
            repository.resolve_layout().await.expect("resolve"),
            SchemaLayout::Current
        );
        let created = repository
            .create_for_owner(&alice, &fields("Pinned", None))
            .await
            .expect("create");

        let (user_id, _) = database.current_owner_columns(created.id().value());
        assert_eq!(user_id, "acct-alice");
    });
}

#[rstest]
fn inspect_schema_reports_columns_for_any_table(
    runtime: Runtime,
    #[values("legacy", "current", "transitional", "unrecognized")] layout: &str,
) {
    let database = TestDatabase::with_layout(layout);
    let repository = database.repository(LayoutPolicy::DetectOnce);

    let report = runtime
        .block_on(repository.inspect_schema())
        .expect("inspection never needs a recognized layout");

    assert!(report.has_column("Titre"));
    assert_eq!(
        report.has_column("Responsable"),
        matches!(layout, "legacy" | "transitional")
    );
    assert_eq!(
        report.has_column("UserId"),
        matches!(layout, "current" | "transitional")
    );
    assert_eq!(report.layout.is_some(), layout != "unrecognized");
}
