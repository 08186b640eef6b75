//! Domain services for the wedding invitation builder.
//!
//! Pure business rules with no I/O: request classification, authorization
//! decisions and album ordering.

pub mod access;
pub mod authorization;
pub mod ordering;

pub use access::{classify, AccessRequest, AccessRoute, ResolverSettings};
pub use authorization::{authorize, AccessDecision, Caller, DenyReason, RequiredRole};
pub use ordering::{plan_reorder, OrderingError, Placement};
