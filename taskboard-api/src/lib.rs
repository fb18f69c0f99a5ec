//! # Taskboard API Server Library
//!
//! HTTP surface of the task board: users register and log in, tasks are
//! created, searched and viewed as a per-user dashboard.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: CORS policy
//! - `routes`: API route handlers
//! - `shutdown`: graceful shutdown signal

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod shutdown;
