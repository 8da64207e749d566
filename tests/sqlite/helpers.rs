//! Shared test helpers for `SQLite` repository integration tests.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Nullable, Text};
use rstest::fixture;
use taskdesk::task::{
    adapters::sqlite::{
        CREATE_CURRENT_LAYOUT_SQL, CREATE_LEGACY_LAYOUT_SQL, LayoutPolicy, SqliteTaskRepository,
        TaskSqlitePool, build_pool,
    },
    domain::{OwnerKey, TaskDraft, TaskFields},
};
use tempfile::TempDir;
use tokio::runtime::Runtime;

/// Task table with both owner columns, as seen halfway through a migration.
pub const CREATE_TRANSITIONAL_LAYOUT_SQL: &str = "
CREATE TABLE items (
    ItemId INTEGER PRIMARY KEY AUTOINCREMENT,
    Titre TEXT NOT NULL,
    Description TEXT DEFAULT '',
    Statut TEXT NOT NULL DEFAULT 'pending',
    DateLimite TEXT,
    Priorite TEXT NOT NULL DEFAULT 'medium',
    Responsable TEXT,
    UserId TEXT,
    UserEmail TEXT
);";

/// Task table without any recognized owner column.
pub const CREATE_UNRECOGNIZED_LAYOUT_SQL: &str = "
CREATE TABLE items (
    ItemId INTEGER PRIMARY KEY AUTOINCREMENT,
    Titre TEXT NOT NULL,
    Statut TEXT NOT NULL DEFAULT 'pending',
    Owner TEXT
);";

/// Provides a tokio runtime for async operations in tests.
#[fixture]
pub fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("tokio runtime")
}

/// Temporary on-disk database removed when dropped.
pub struct TestDatabase {
    _dir: TempDir,
    pool: TaskSqlitePool,
}

impl TestDatabase {
    /// Creates a database without any tables.
    pub fn empty() -> Self {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("tasks.db");
        let url = path.to_str().expect("utf-8 temp path").to_owned();
        let pool = build_pool(&url, 4).expect("sqlite pool");
        Self { _dir: dir, pool }
    }

    /// Creates a database and runs `sql` against it.
    pub fn with_sql(sql: &str) -> Self {
        let database = Self::empty();
        database.execute(sql);
        database
    }

    /// Creates a database holding a legacy-layout task table.
    pub fn legacy() -> Self {
        Self::with_sql(CREATE_LEGACY_LAYOUT_SQL)
    }

    /// Creates a database holding a current-layout task table.
    pub fn current() -> Self {
        Self::with_sql(CREATE_CURRENT_LAYOUT_SQL)
    }

    /// Creates a database holding a task table of the given layout name.
    pub fn with_layout(layout: &str) -> Self {
        match layout {
            "legacy" => Self::legacy(),
            "current" => Self::current(),
            "transitional" => Self::with_sql(CREATE_TRANSITIONAL_LAYOUT_SQL),
            "unrecognized" => Self::with_sql(CREATE_UNRECOGNIZED_LAYOUT_SQL),
            other => panic!("unknown test layout {other}"),
        }
    }

    /// Returns the connection pool.
    pub fn pool(&self) -> TaskSqlitePool {
        self.pool.clone()
    }

    /// Builds a repository using `policy`.
    pub fn repository(&self, policy: LayoutPolicy) -> SqliteTaskRepository {
        SqliteTaskRepository::with_policy(self.pool(), policy)
    }

    /// Runs raw SQL statements.
    pub fn execute(&self, sql: &str) {
        let mut connection = self.pool.get().expect("pooled connection");
        connection.batch_execute(sql).expect("sql statements");
    }

    /// Reads both current-layout owner columns of a row.
    pub fn current_owner_columns(&self, item_id: i64) -> (String, Option<String>) {
        let mut connection = self.pool.get().expect("pooled connection");
        let row = diesel::sql_query(
            "SELECT UserId AS user_id, UserEmail AS user_email FROM items WHERE ItemId = ?",
        )
        .bind::<BigInt, _>(item_id)
        .get_result::<CurrentOwnerRow>(&mut connection)
        .expect("owner columns");
        (row.user_id, row.user_email)
    }

    /// Counts all rows of the task table, regardless of owner.
    pub fn row_count(&self) -> i64 {
        let mut connection = self.pool.get().expect("pooled connection");
        diesel::sql_query("SELECT COUNT(*) AS total FROM items")
            .get_result::<RowCount>(&mut connection)
            .expect("row count")
            .total
    }
}

#[derive(QueryableByName)]
struct CurrentOwnerRow {
    #[diesel(sql_type = Text)]
    user_id: String,
    #[diesel(sql_type = Nullable<Text>)]
    user_email: Option<String>,
}

#[derive(QueryableByName)]
struct RowCount {
    #[diesel(sql_type = BigInt)]
    total: i64,
}

/// Builds an owner key.
pub fn owner(raw: &str) -> OwnerKey {
    OwnerKey::new(raw).expect("valid owner key")
}

/// Builds validated fields from a title and optional due date.
pub fn fields(title: &str, due_date: Option<&str>) -> TaskFields {
    let mut draft = TaskDraft::new(title);
    if let Some(due_date) = due_date {
        draft = draft.with_due_date(due_date);
    }
    TaskFields::from_draft(draft).expect("valid draft")
}
