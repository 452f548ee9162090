//! Back Office Service Library
//!
//! Multi-tenant back office core: tenant bootstrap and sessions, user,
//! product and team management, and meeting scheduling.
//!
//! # Modules
//!
//! - `clock` - Injectable time source
//! - `config` - Service configuration
//! - `crypto` - Password hashing
//! - `errors` - Error types
//! - `handlers` - HTTP request handlers
//! - `middleware` - Authentication and role gate, HTTP metrics
//! - `models` - Data models
//! - `observability` - Log field hashing and metrics
//! - `repositories` - Store trait, Postgres and in-memory implementations
//! - `routes` - Router and application state
//! - `services` - Business logic layer

pub mod clock;
pub mod config;
pub mod crypto;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod observability;
pub mod repositories;
pub mod routes;
pub mod services;
