//! Dynamic SQLite provisioning: create, populate and query databases by name.
//!
//! # Intention
//!
//! - Map logical database names to single-file SQLite stores under one root.
//! - Run every statement through one executor that returns a uniform result.
//! - Offer a fixed keyword heuristic that turns a prompt into a SELECT.
//!
//! # Architectural Boundaries
//!
//! - Operations never return `Err` to callers; failures are data.
//! - Each call opens and closes its own connection. No pooling, no caching.
//! - Transport lives in [`server`]; everything below it is synchronous.

pub mod config;
pub mod error;
pub mod operations;
pub mod paths;
pub mod server;
pub mod service;
pub mod sqlite;
pub mod translate;

pub use config::StoreConfig;
pub use error::StoreError;
pub use operations::{DatabaseManager, Response};
pub use service::{Service, SqliteDynamicService};
pub use sqlite::{ColumnSpec, QueryResult, Record, Value};
