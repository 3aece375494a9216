//! Adapters layer - Implementations of the ports.
//!
//! Each submodule adapts an external technology to a port defined in
//! `crate::ports`:
//!
//! - `events` - In-process event bus
//! - `http` - Axum HTTP API
//! - `memory` - In-memory repositories for tests and local development
//! - `postgres` - PostgreSQL persistence via sqlx
//! - `square` - Square payment provider integration

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod square;
