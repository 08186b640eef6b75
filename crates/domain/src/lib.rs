//! Domain layer for the wedding invitation backend.
//!
//! This crate contains:
//! - Domain models (Account, Intro, Guest, sections, albums, landing aggregate)
//! - Request payloads with their validation rules
//! - Pure business logic: access resolution, authorization decisions and
//!   album ordering

pub mod models;
pub mod services;
