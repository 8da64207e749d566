//! Adapter implementations for task persistence.

pub mod memory;
pub mod sqlite;
