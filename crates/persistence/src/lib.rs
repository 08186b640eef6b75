//! Persistence layer for the wedding invitation backend.
//!
//! This crate contains:
//! - Database connection management
//! - Entity definitions (database row mappings)
//! - Repository implementations
//! - Query metrics
//!
//! SQL migrations live in `src/migrations` and are embedded by the api binary.

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
