//! taskdesk: a multi-user task tracker.
//!
//! Each user manages a personal list of tasks through a small HTTP API. Rows
//! are scoped to the owner's stable principal id, and the persistence layer
//! tolerates the two column layouts the task table has had over its life.
//!
//! # Architecture
//!
//! The task module follows hexagonal architecture principles:
//!
//! - **Domain**: task values, validation and the table layouts
//! - **Ports**: the owner-scoped repository contract
//! - **Adapters**: `SQLite` (diesel) and in-memory repositories
//! - **Services**: validation and error shaping for callers
//!
//! # Modules
//!
//! - [`task`]: domain, ports, adapters and services
//! - [`http`]: axum router and JSON bodies
//! - [`client`]: typed API client and identity session
//! - [`config`]: environment configuration
//! - [`telemetry`]: tracing setup

pub mod client;
pub mod config;
pub mod http;
pub mod task;
pub mod telemetry;
