//! Task record and its mutable fields.

use super::{
    OwnerKey, ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError, TaskId, TaskTitle,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Date format used for due dates on the wire and in storage.
pub(crate) const DUE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Task progress status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Work has not started.
    #[default]
    Pending,
    /// Work is underway.
    InProgress,
    /// Work is finished.
    Completed,
}

impl TaskStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
        }
    }

    /// Returns the status a completion toggle moves to.
    ///
    /// Completed tasks reopen as pending; any other status completes.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Completed => Self::Pending,
            Self::Pending | Self::InProgress => Self::Completed,
        }
    }
}

impl TryFrom<&str> for TaskStatus {
    type Error = ParseTaskStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            _ => Err(ParseTaskStatusError(value.to_owned())),
        }
    }
}

/// Task urgency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    /// Can wait.
    Low,
    /// Normal urgency.
    #[default]
    Medium,
    /// Should be handled soon.
    High,
    /// Needs immediate attention.
    Urgent,
}

impl TaskPriority {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = ParseTaskPriorityError;

    /// Parses a priority, also accepting the French values written by the
    /// first client release.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "low" | "basse" => Ok(Self::Low),
            "medium" | "moyenne" => Ok(Self::Medium),
            "high" | "haute" => Ok(Self::High),
            "urgent" | "urgente" => Ok(Self::Urgent),
            _ => Err(ParseTaskPriorityError(value.to_owned())),
        }
    }
}

/// Unvalidated task input as received from a caller.
///
/// Optional values left unset fall back to the task defaults when the draft
/// is validated by [`TaskFields::from_draft`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    due_date: Option<String>,
}

impl TaskDraft {
    /// Creates a draft with the required title.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the raw status value.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    /// Sets the raw priority value.
    #[must_use]
    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    /// Sets the raw due date (`YYYY-MM-DD`, empty for none).
    #[must_use]
    pub fn with_due_date(mut self, due_date: impl Into<String>) -> Self {
        self.due_date = Some(due_date.into());
        self
    }
}

/// Validated mutable fields of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFields {
    title: TaskTitle,
    description: String,
    status: TaskStatus,
    due_date: Option<NaiveDate>,
    priority: TaskPriority,
}

impl TaskFields {
    /// Creates fields with the given title and default values elsewhere.
    #[must_use]
    pub fn new(title: TaskTitle) -> Self {
        Self {
            title,
            description: String::new(),
            status: TaskStatus::default(),
            due_date: None,
            priority: TaskPriority::default(),
        }
    }

    /// Validates a caller-supplied draft.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError`] when the title is blank or the status,
    /// priority or due date cannot be parsed.
    pub fn from_draft(draft: TaskDraft) -> Result<Self, TaskDomainError> {
        let TaskDraft {
            title,
            description,
            status,
            priority,
            due_date,
        } = draft;

        let status = status
            .as_deref()
            .map(TaskStatus::try_from)
            .transpose()?
            .unwrap_or_default();
        let priority = priority
            .as_deref()
            .map(TaskPriority::try_from)
            .transpose()?
            .unwrap_or_default();
        let due_date = match due_date {
            Some(raw) => parse_due_date(&raw)?,
            None => None,
        };

        Ok(Self {
            title: TaskTitle::new(title)?,
            description: description.unwrap_or_default(),
            status,
            due_date,
            priority,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the status.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Sets or clears the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.due_date = due_date;
        self
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        &self.title
    }

    /// Returns the description, possibly empty.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.priority
    }
}

/// Parses a `YYYY-MM-DD` due date; blank input means no due date.
pub(crate) fn parse_due_date(raw: &str) -> Result<Option<NaiveDate>, TaskDomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveDate::parse_from_str(trimmed, DUE_DATE_FORMAT)
        .map(Some)
        .map_err(|_| TaskDomainError::InvalidDueDate(raw.to_owned()))
}

/// A persisted task owned by a single principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    id: TaskId,
    owner: OwnerKey,
    fields: TaskFields,
}

impl TaskRecord {
    /// Assembles a record from its persisted parts.
    #[must_use]
    pub const fn new(id: TaskId, owner: OwnerKey, fields: TaskFields) -> Self {
        Self { id, owner, fields }
    }

    /// Returns the record with its mutable fields replaced.
    ///
    /// The identifier and owner are preserved.
    #[must_use]
    pub fn with_fields(self, fields: TaskFields) -> Self {
        Self { fields, ..self }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the owning principal.
    #[must_use]
    pub const fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    /// Returns the mutable fields.
    #[must_use]
    pub const fn fields(&self) -> &TaskFields {
        &self.fields
    }

    /// Returns the title.
    #[must_use]
    pub const fn title(&self) -> &TaskTitle {
        self.fields.title()
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.fields.description()
    }

    /// Returns the status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.fields.status()
    }

    /// Returns the due date, if any.
    #[must_use]
    pub const fn due_date(&self) -> Option<NaiveDate> {
        self.fields.due_date()
    }

    /// Returns the priority.
    #[must_use]
    pub const fn priority(&self) -> TaskPriority {
        self.fields.priority()
    }
}
