//! Schema bootstrap and the legacy-to-current upgrade.
//!
//! The statements are the same files kept under `migrations/`, so a
//! database managed with the diesel CLI and one bootstrapped at startup end
//! up with identical tables.

use super::detector::{TASK_TABLE, table_columns};
use crate::task::{
    domain::SchemaLayout,
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use diesel::connection::SimpleConnection;
use diesel::sqlite::SqliteConnection;

/// Creates the task table in the legacy layout.
pub const CREATE_LEGACY_LAYOUT_SQL: &str =
    include_str!("../../../../migrations/2024-03-01-000000_create_items_legacy/up.sql");

/// Creates the task table in the current layout.
pub const CREATE_CURRENT_LAYOUT_SQL: &str =
    include_str!("../../../../migrations/2024-09-15-000000_create_items/up.sql");

/// Renames the legacy owner column and fills the email column.
pub const UPGRADE_LEGACY_LAYOUT_SQL: &str =
    include_str!("../../../../migrations/2024-09-15-000001_move_owner_to_user_id/up.sql");

/// Creates the task table in the current layout when it is missing.
///
/// Returns `true` when the table was created. An existing table is left
/// untouched whatever its layout.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when a statement fails.
pub fn bootstrap_schema(connection: &mut SqliteConnection) -> TaskRepositoryResult<bool> {
    if !table_columns(connection, TASK_TABLE)?.is_empty() {
        return Ok(false);
    }

    connection
        .batch_execute(CREATE_CURRENT_LAYOUT_SQL)
        .map_err(TaskRepositoryError::persistence)?;
    tracing::info!(table = TASK_TABLE, "created task table");
    Ok(true)
}

/// Upgrades a legacy table to the current layout in one transaction.
///
/// Returns `true` when the table changed. Tables already on the current
/// layout, or holding both owner columns, are left alone.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::UnrecognizedSchema`] when the table has no
/// owner column, or [`TaskRepositoryError::Persistence`] when a statement
/// fails.
pub fn upgrade_legacy_layout(connection: &mut SqliteConnection) -> TaskRepositoryResult<bool> {
    let columns = table_columns(connection, TASK_TABLE)?;
    if SchemaLayout::from_columns(&columns)? == SchemaLayout::Current {
        return Ok(false);
    }
    let has_current_owner = columns
        .iter()
        .any(|column| column.eq_ignore_ascii_case(SchemaLayout::CURRENT_OWNER_COLUMN));
    if has_current_owner {
        tracing::warn!(
            columns = %columns.join(", "),
            "task table holds both owner columns; skipping upgrade"
        );
        return Ok(false);
    }

    connection
        .immediate_transaction(|conn| conn.batch_execute(UPGRADE_LEGACY_LAYOUT_SQL))
        .map_err(TaskRepositoryError::persistence)?;
    tracing::info!(table = TASK_TABLE, "upgraded task table to the current layout");
    Ok(true)
}
