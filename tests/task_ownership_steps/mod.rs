//! Step definitions for owner-scoped task scenarios.

pub mod given;
pub mod then;
pub mod world;
