//! Task table introspection and layout selection strategies.

use crate::task::{
    domain::{SchemaLayout, SchemaReport},
    ports::{TaskRepositoryError, TaskRepositoryResult},
};
use diesel::prelude::*;
use diesel::sql_types::Text;
use diesel::sqlite::SqliteConnection;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Name of the SQL table holding task rows.
pub const TASK_TABLE: &str = "items";

#[derive(Debug, QueryableByName)]
struct ColumnInfo {
    #[diesel(sql_type = Text)]
    name: String,
}

/// Lists the columns of `table` in declaration order.
///
/// A missing table yields an empty list.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when the pragma query fails.
pub fn table_columns(
    connection: &mut SqliteConnection,
    table: &str,
) -> TaskRepositoryResult<Vec<String>> {
    let columns = diesel::sql_query("SELECT name FROM pragma_table_info(?) ORDER BY cid")
        .bind::<Text, _>(table)
        .load::<ColumnInfo>(connection)
        .map_err(TaskRepositoryError::persistence)?;
    Ok(columns.into_iter().map(|column| column.name).collect())
}

/// Detects the layout of the task table.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::UnrecognizedSchema`] when neither owner
/// column exists, or [`TaskRepositoryError::Persistence`] when introspection
/// fails.
pub fn detect_layout(connection: &mut SqliteConnection) -> TaskRepositoryResult<SchemaLayout> {
    let columns = table_columns(connection, TASK_TABLE)?;
    Ok(SchemaLayout::from_columns(&columns)?)
}

/// Builds a diagnostic report of the task table.
///
/// # Errors
///
/// Returns [`TaskRepositoryError::Persistence`] when introspection fails.
pub fn inspect_table(connection: &mut SqliteConnection) -> TaskRepositoryResult<SchemaReport> {
    table_columns(connection, TASK_TABLE).map(SchemaReport::from_columns)
}

/// Decides which layout the repository writes SQL for.
pub trait LayoutStrategy: Send + Sync + fmt::Debug {
    /// Returns the layout to use for the next statement.
    ///
    /// # Errors
    ///
    /// Returns [`TaskRepositoryError`] when the layout cannot be determined.
    fn resolve(&self, connection: &mut SqliteConnection) -> TaskRepositoryResult<SchemaLayout>;

    /// Drops any remembered layout so the next call looks again.
    fn invalidate(&self) {}
}

/// Detects once and reuses the answer until invalidated.
///
/// Unrecognized layouts are not remembered, so a fixed table is picked up
/// on the next call.
#[derive(Debug, Default)]
pub struct DetectOnce {
    cached: RwLock<Option<SchemaLayout>>,
}

impl DetectOnce {
    /// Creates a strategy with nothing cached.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached layout, if detection already succeeded.
    #[must_use]
    pub fn cached(&self) -> Option<SchemaLayout> {
        self.cached.read().ok().and_then(|guard| *guard)
    }
}

impl LayoutStrategy for DetectOnce {
    fn resolve(&self, connection: &mut SqliteConnection) -> TaskRepositoryResult<SchemaLayout> {
        if let Some(layout) = self.cached() {
            return Ok(layout);
        }

        let layout = detect_layout(connection)?;
        // A racing detector computes the same value, so last write is fine.
        if let Ok(mut guard) = self.cached.write() {
            *guard = Some(layout);
        }
        tracing::debug!(%layout, "cached task table layout");
        Ok(layout)
    }

    fn invalidate(&self) {
        if let Ok(mut guard) = self.cached.write() {
            *guard = None;
        }
    }
}

/// Introspects the table before every statement.
#[derive(Debug, Default, Clone, Copy)]
pub struct DetectEveryCall;

impl LayoutStrategy for DetectEveryCall {
    fn resolve(&self, connection: &mut SqliteConnection) -> TaskRepositoryResult<SchemaLayout> {
        detect_layout(connection)
    }
}

/// Uses an operator-configured layout without introspection.
#[derive(Debug, Clone, Copy)]
pub struct PinnedLayout(pub SchemaLayout);

impl LayoutStrategy for PinnedLayout {
    fn resolve(&self, _connection: &mut SqliteConnection) -> TaskRepositoryResult<SchemaLayout> {
        Ok(self.0)
    }
}

/// Configurable choice of [`LayoutStrategy`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LayoutPolicy {
    /// Detect on first use and cache the result.
    #[default]
    DetectOnce,
    /// Detect before every statement.
    DetectEveryCall,
    /// Never detect; always use the given layout.
    Pinned(SchemaLayout),
}

impl LayoutPolicy {
    /// Builds the strategy this policy names.
    #[must_use]
    pub fn into_strategy(self) -> Arc<dyn LayoutStrategy> {
        match self {
            Self::DetectOnce => Arc::new(DetectOnce::new()),
            Self::DetectEveryCall => Arc::new(DetectEveryCall),
            Self::Pinned(layout) => Arc::new(PinnedLayout(layout)),
        }
    }
}

/// Error returned for an unknown layout policy name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown layout policy '{0}', expected detect_once, detect_every_call, legacy or current")]
pub struct ParseLayoutPolicyError(pub String);

impl FromStr for LayoutPolicy {
    type Err = ParseLayoutPolicyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "detect_once" | "detect" => Ok(Self::DetectOnce),
            "detect_every_call" | "always_detect" => Ok(Self::DetectEveryCall),
            "legacy" => Ok(Self::Pinned(SchemaLayout::Legacy)),
            "current" => Ok(Self::Pinned(SchemaLayout::Current)),
            _ => Err(ParseLayoutPolicyError(value.to_owned())),
        }
    }
}
