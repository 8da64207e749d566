//! `SQLite` repository implementation for owner-scoped task storage.

use super::{
    detector::{self, LayoutPolicy, LayoutStrategy},
    migrations,
    models::{FieldValues, NewCurrentTaskRow, NewLegacyTaskRow, TaskRow, row_to_task},
    schema::{current_items, legacy_items},
};
use crate::task::{
    domain::{OwnerKey, SchemaLayout, SchemaReport, TaskFields, TaskId, TaskRecord},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::sql_types::{Nullable, Text};
use diesel::sqlite::SqliteConnection;
use std::sync::Arc;
use std::time::Duration;

/// `SQLite` connection pool type used by task adapters.
pub type TaskSqlitePool = Pool<ConnectionManager<SqliteConnection>>;

/// How long a connection waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, connection: &mut SqliteConnection) -> Result<(), diesel::r2d2::Error> {
        connection
            .batch_execute(&format!(
                "PRAGMA busy_timeout = {};",
                self.busy_timeout.as_millis()
            ))
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// Builds a connection pool for the database at `database_url`.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the pool cannot open
/// its initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> TaskRepositoryResult<TaskSqlitePool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: BUSY_TIMEOUT,
        }))
        .build(manager)
        .map_err(TaskRepositoryError::persistence)
}

const LEGACY_COLUMNS: (
    legacy_items::item_id,
    legacy_items::title,
    legacy_items::description,
    legacy_items::status,
    legacy_items::due_date,
    legacy_items::priority,
    legacy_items::owner,
) = (
    legacy_items::item_id,
    legacy_items::title,
    legacy_items::description,
    legacy_items::status,
    legacy_items::due_date,
    legacy_items::priority,
    legacy_items::owner,
);

const CURRENT_COLUMNS: (
    current_items::item_id,
    current_items::title,
    current_items::description,
    current_items::status,
    current_items::due_date,
    current_items::priority,
    current_items::owner,
) = (
    current_items::item_id,
    current_items::title,
    current_items::description,
    current_items::status,
    current_items::due_date,
    current_items::priority,
    current_items::owner,
);

/// `SQLite`-backed task repository tolerant of both table layouts.
#[derive(Debug, Clone)]
pub struct SqliteTaskRepository {
    pool: TaskSqlitePool,
    layout: Arc<dyn LayoutStrategy>,
}

impl SqliteTaskRepository {
    /// Creates a repository using the given layout strategy.
    #[must_use]
    pub fn new(pool: TaskSqlitePool, layout: Arc<dyn LayoutStrategy>) -> Self {
        Self { pool, layout }
    }

    /// Creates a repository using the strategy named by `policy`.
    #[must_use]
    pub fn with_policy(pool: TaskSqlitePool, policy: LayoutPolicy) -> Self {
        Self::new(pool, policy.into_strategy())
    }

    /// Resolves the layout once, ahead of the first request.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::UnrecognizedSchema`] when the table has
    /// neither owner column.
    pub async fn resolve_layout(&self) -> TaskRepositoryResult<SchemaLayout> {
        self.run_with_layout(|_, layout| Ok(layout)).await
    }

    /// Forgets the cached layout, if the strategy keeps one.
    pub fn invalidate_layout(&self) {
        self.layout.invalidate();
    }

    /// Creates the task table in the current layout if it does not exist.
    ///
    /// Returns whether the table was created.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError::Persistence`] when the statements fail.
    pub async fn bootstrap_schema(&self) -> TaskRepositoryResult<bool> {
        let created = self.run_blocking(migrations::bootstrap_schema).await?;
        if created {
            self.invalidate_layout();
        }
        Ok(created)
    }

    /// Moves a legacy table onto the current layout.
    ///
    /// Returns whether the table was changed.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError`] when introspection or the migration
    /// fails.
    pub async fn upgrade_legacy_layout(&self) -> TaskRepositoryResult<bool> {
        let upgraded = self.run_blocking(migrations::upgrade_legacy_layout).await?;
        if upgraded {
            self.invalidate_layout();
        }
        Ok(upgraded)
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut SqliteConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }

    async fn run_with_layout<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut SqliteConnection, SchemaLayout) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let strategy = Arc::clone(&self.layout);
        self.run_blocking(move |connection| {
            let layout = strategy.resolve(connection).inspect_err(|err| {
                if let TaskRepositoryError::UnrecognizedSchema(schema) = err {
                    tracing::error!(
                        columns = %schema.columns_list(),
                        "task table has no recognized owner column"
                    );
                }
            })?;
            f(connection, layout).inspect_err(|err| {
                if is_statement_failure(err) {
                    tracing::warn!(%layout, error = %err, "statement failed, re-detecting layout");
                    strategy.invalidate();
                }
            })
        })
        .await
    }
}

/// Whether the database rejected a statement, which may mean the table
/// changed shape under a cached layout.
fn is_statement_failure(err: &TaskRepositoryError) -> bool {
    let TaskRepositoryError::Persistence(source) = err else {
        return false;
    };
    matches!(
        source.downcast_ref::<diesel::result::Error>(),
        Some(diesel::result::Error::DatabaseError(..))
    )
}

#[async_trait]
impl TaskRepository for SqliteTaskRepository {
    async fn list_for_owner(&self, owner: &OwnerKey) -> TaskRepositoryResult<Vec<TaskRecord>> {
        let owner = owner.clone();
        self.run_with_layout(move |connection, layout| {
            tracing::debug!(%layout, %owner, "listing tasks");
            let rows = load_owned_rows(connection, layout, &owner)
                .map_err(TaskRepositoryError::persistence)?;
            Ok(rows
                .into_iter()
                .filter_map(|row| {
                    let item_id = row.item_id;
                    row_to_task(row)
                        .inspect_err(|err| {
                            tracing::warn!(
                                item_id,
                                %owner,
                                error = %err,
                                "skipping unreadable task row"
                            );
                        })
                        .ok()
                })
                .collect())
        })
        .await
    }

    async fn get_for_owner(
        &self,
        owner: &OwnerKey,
        id: TaskId,
    ) -> TaskRepositoryResult<TaskRecord> {
        let owner = owner.clone();
        self.run_with_layout(move |connection, layout| {
            find_owned_row(connection, layout, &owner, id)
                .map_err(TaskRepositoryError::persistence)?
                .map(row_to_task)
                .transpose()?
                .ok_or(TaskRepositoryError::NotFound(id))
        })
        .await
    }

    async fn create_for_owner(
        &self,
        owner: &OwnerKey,
        fields: &TaskFields,
    ) -> TaskRepositoryResult<TaskRecord> {
        let owner = owner.clone();
        let fields = fields.clone();
        self.run_with_layout(move |connection, layout| {
            let values = FieldValues::from(&fields);
            let id = insert_row(connection, layout, &owner, values)
                .map_err(TaskRepositoryError::persistence)?;
            tracing::debug!(%layout, %owner, task_id = id, "created task");
            Ok(TaskRecord::new(TaskId::new(id), owner, fields))
        })
        .await
    }

    async fn update_for_owner(
        &self,
        owner: &OwnerKey,
        id: TaskId,
        fields: &TaskFields,
    ) -> TaskRepositoryResult<()> {
        let owner = owner.clone();
        let values = FieldValues::from(fields);
        self.run_with_layout(move |connection, layout| {
            let affected = update_owned_row(connection, layout, &owner, id, &values)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_for_owner(&self, owner: &OwnerKey, id: TaskId) -> TaskRepositoryResult<()> {
        let owner = owner.clone();
        self.run_with_layout(move |connection, layout| {
            let affected = delete_owned_row(connection, layout, &owner, id)
                .map_err(TaskRepositoryError::persistence)?;
            if affected == 0 {
                return Err(TaskRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn inspect_schema(&self) -> TaskRepositoryResult<SchemaReport> {
        self.run_blocking(detector::inspect_table).await
    }
}

define_sql_function! {
    /// SQL `NULLIF`, so blank due dates sort with missing ones.
    fn nullif(value: Nullable<Text>, blank: Text) -> Nullable<Text>;
}

fn load_owned_rows(
    connection: &mut SqliteConnection,
    layout: SchemaLayout,
    owner: &OwnerKey,
) -> QueryResult<Vec<TaskRow>> {
    match layout {
        SchemaLayout::Legacy => legacy_items::table
            .filter(legacy_items::owner.eq(owner.as_str()))
            .order((
                nullif(legacy_items::due_date, "").is_null().asc(),
                nullif(legacy_items::due_date, "").asc(),
                legacy_items::item_id.asc(),
            ))
            .select(LEGACY_COLUMNS)
            .load::<TaskRow>(connection),
        SchemaLayout::Current => current_items::table
            .filter(current_items::owner.eq(owner.as_str()))
            .order((
                nullif(current_items::due_date, "").is_null().asc(),
                nullif(current_items::due_date, "").asc(),
                current_items::item_id.asc(),
            ))
            .select(CURRENT_COLUMNS)
            .load::<TaskRow>(connection),
    }
}

fn find_owned_row(
    connection: &mut SqliteConnection,
    layout: SchemaLayout,
    owner: &OwnerKey,
    id: TaskId,
) -> QueryResult<Option<TaskRow>> {
    match layout {
        SchemaLayout::Legacy => legacy_items::table
            .filter(legacy_items::item_id.eq(id.value()))
            .filter(legacy_items::owner.eq(owner.as_str()))
            .select(LEGACY_COLUMNS)
            .first::<TaskRow>(connection)
            .optional(),
        SchemaLayout::Current => current_items::table
            .filter(current_items::item_id.eq(id.value()))
            .filter(current_items::owner.eq(owner.as_str()))
            .select(CURRENT_COLUMNS)
            .first::<TaskRow>(connection)
            .optional(),
    }
}

fn insert_row(
    connection: &mut SqliteConnection,
    layout: SchemaLayout,
    owner: &OwnerKey,
    values: FieldValues,
) -> QueryResult<i64> {
    match layout {
        SchemaLayout::Legacy => diesel::insert_into(legacy_items::table)
            .values(&NewLegacyTaskRow::new(owner, values))
            .returning(legacy_items::item_id)
            .get_result(connection),
        SchemaLayout::Current => diesel::insert_into(current_items::table)
            .values(&NewCurrentTaskRow::new(owner, values))
            .returning(current_items::item_id)
            .get_result(connection),
    }
}

fn update_owned_row(
    connection: &mut SqliteConnection,
    layout: SchemaLayout,
    owner: &OwnerKey,
    id: TaskId,
    values: &FieldValues,
) -> QueryResult<usize> {
    match layout {
        SchemaLayout::Legacy => diesel::update(
            legacy_items::table
                .filter(legacy_items::item_id.eq(id.value()))
                .filter(legacy_items::owner.eq(owner.as_str())),
        )
        .set((
            legacy_items::title.eq(&values.title),
            legacy_items::description.eq(&values.description),
            legacy_items::status.eq(&values.status),
            legacy_items::due_date.eq(&values.due_date),
            legacy_items::priority.eq(&values.priority),
        ))
        .execute(connection),
        SchemaLayout::Current => diesel::update(
            current_items::table
                .filter(current_items::item_id.eq(id.value()))
                .filter(current_items::owner.eq(owner.as_str())),
        )
        .set((
            current_items::title.eq(&values.title),
            current_items::description.eq(&values.description),
            current_items::status.eq(&values.status),
            current_items::due_date.eq(&values.due_date),
            current_items::priority.eq(&values.priority),
        ))
        .execute(connection),
    }
}

fn delete_owned_row(
    connection: &mut SqliteConnection,
    layout: SchemaLayout,
    owner: &OwnerKey,
    id: TaskId,
) -> QueryResult<usize> {
    match layout {
        SchemaLayout::Legacy => diesel::delete(
            legacy_items::table
                .filter(legacy_items::item_id.eq(id.value()))
                .filter(legacy_items::owner.eq(owner.as_str())),
        )
        .execute(connection),
        SchemaLayout::Current => diesel::delete(
            current_items::table
                .filter(current_items::item_id.eq(id.value()))
                .filter(current_items::owner.eq(owner.as_str())),
        )
        .execute(connection),
    }
}
