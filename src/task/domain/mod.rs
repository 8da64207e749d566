//! Domain model for owner-scoped task tracking.
//!
//! Tasks belong to exactly one owner, identified by the stable principal id
//! issued by the external identity provider. The domain also names the two
//! historical table layouts the persistence adapters have to tolerate.

mod error;
mod ids;
mod layout;
mod task;

pub use error::{ParseTaskPriorityError, ParseTaskStatusError, TaskDomainError};
pub use ids::{OwnerKey, TaskId, TaskTitle};
pub use layout::{SchemaLayout, SchemaReport, UnrecognizedSchema};
pub use task::{TaskDraft, TaskFields, TaskPriority, TaskRecord, TaskStatus};
pub(crate) use task::{DUE_DATE_FORMAT, parse_due_date};
