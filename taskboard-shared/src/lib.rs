//! # Taskboard Shared Library
//!
//! Domain types, SQL queries, repositories and authentication primitives used
//! by the Taskboard API server.
//!
//! ## Module Organization
//!
//! - `db`: connection pool and schema initialization
//! - `models`: users and tasks together with their SQL queries
//! - `repository`: the `TaskStore` / `UserStore` capabilities and their
//!   PostgreSQL implementations
//! - `auth`: password hashing and JWT tokens
//! - `error`: the domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
