//! Application services used by the route handlers.

pub mod accounts;
pub mod admin_bootstrap;
pub mod auth;
pub mod landing;
pub mod tenant;

pub use auth::{AuthError, AuthService};
pub use landing::LandingService;
