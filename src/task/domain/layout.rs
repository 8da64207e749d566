//! Historical column layouts of the task table.
//!
//! The table has carried ownership in two different columns over its life.
//! The layout is never stored; it is derived from the live column set.

use std::fmt;
use thiserror::Error;

/// Owner column layout in effect for the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaLayout {
    /// Ownership lives in the `Responsable` column.
    Legacy,
    /// Ownership lives in `UserId`, mirrored into `UserEmail` on insert.
    Current,
}

impl SchemaLayout {
    /// Owner column of the legacy layout.
    pub const LEGACY_OWNER_COLUMN: &'static str = "Responsable";
    /// Owner column of the current layout.
    pub const CURRENT_OWNER_COLUMN: &'static str = "UserId";
    /// Companion column the current layout fills with the owner key.
    pub const CURRENT_OWNER_EMAIL_COLUMN: &'static str = "UserEmail";

    /// Decides the layout from the table's column names.
    ///
    /// When both owner columns exist the table is mid-migration and the
    /// legacy column wins, so readers keep seeing the rows they wrote.
    ///
    /// # Errors
    ///
    /// Returns [`UnrecognizedSchema`] carrying the available column names
    /// when neither owner column is present.
    pub fn from_columns<S: AsRef<str>>(columns: &[S]) -> Result<Self, UnrecognizedSchema> {
        let has = |wanted: &str| {
            columns
                .iter()
                .any(|column| column.as_ref().eq_ignore_ascii_case(wanted))
        };

        if has(Self::LEGACY_OWNER_COLUMN) {
            Ok(Self::Legacy)
        } else if has(Self::CURRENT_OWNER_COLUMN) {
            Ok(Self::Current)
        } else {
            Err(UnrecognizedSchema::new(
                columns.iter().map(|column| column.as_ref().to_owned()),
            ))
        }
    }

    /// Returns the name of the column holding the owner key.
    #[must_use]
    pub const fn owner_column(self) -> &'static str {
        match self {
            Self::Legacy => Self::LEGACY_OWNER_COLUMN,
            Self::Current => Self::CURRENT_OWNER_COLUMN,
        }
    }

    /// Returns a short label for logs and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Current => "current",
        }
    }
}

impl fmt::Display for SchemaLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The task table exposes neither recognized owner column.
///
/// This needs operator intervention; retrying without a schema change
/// returns the same error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unrecognized task table layout; available columns: {}", .columns.join(", "))]
pub struct UnrecognizedSchema {
    columns: Vec<String>,
}

impl UnrecognizedSchema {
    /// Records the columns that were found instead.
    #[must_use]
    pub fn new(columns: impl IntoIterator<Item = String>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    /// Returns the columns present on the table.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the columns as a comma-separated list.
    #[must_use]
    pub fn columns_list(&self) -> String {
        self.columns.join(", ")
    }
}

/// Diagnostic snapshot of the task table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaReport {
    /// Layout derived from the columns, if recognized.
    pub layout: Option<SchemaLayout>,
    /// Column names in table order.
    pub columns: Vec<String>,
}

impl SchemaReport {
    /// Builds a report from the live column names.
    #[must_use]
    pub fn from_columns(columns: Vec<String>) -> Self {
        let layout = SchemaLayout::from_columns(&columns).ok();
        Self { layout, columns }
    }

    /// Returns whether a column with the given name exists.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.columns
            .iter()
            .any(|column| column.eq_ignore_ascii_case(name))
    }
}
