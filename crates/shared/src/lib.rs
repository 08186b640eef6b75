//! Shared utilities and common types for the wedding invitation backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Hashing helpers for session fingerprints
//! - JWT issuance and validation carrying account role claims
//! - Password hashing with Argon2id
//! - Subdomain and field validation rules
//! - Page/size pagination math

pub mod crypto;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
