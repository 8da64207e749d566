//! `SQLite` adapter for task persistence.
//!
//! The adapter serves one table whose owner column moved between releases.
//! Every statement is written for the layout chosen by a [`LayoutStrategy`].

mod detector;
mod migrations;
mod models;
mod repository;
mod schema;

pub use detector::{
    DetectEveryCall, DetectOnce, LayoutPolicy, LayoutStrategy, ParseLayoutPolicyError,
    PinnedLayout, TASK_TABLE, detect_layout, inspect_table, table_columns,
};
pub use migrations::{
    CREATE_CURRENT_LAYOUT_SQL, CREATE_LEGACY_LAYOUT_SQL, UPGRADE_LEGACY_LAYOUT_SQL,
    bootstrap_schema, upgrade_legacy_layout,
};
pub use repository::{SqliteTaskRepository, TaskSqlitePool, build_pool};
