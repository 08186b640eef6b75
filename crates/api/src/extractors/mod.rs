//! Custom Axum extractors.

pub mod intro_scope;
pub mod tenant_host;
pub mod user_auth;

pub use tenant_host::{TenantHost, SUBDOMAIN_HEADER};
pub use user_auth::OptionalUserAuth;

pub use crate::middleware::authorization::IntroScope;
pub use crate::middleware::user_auth::UserAuth;
