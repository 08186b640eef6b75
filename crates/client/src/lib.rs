//! Typed HTTP client for the wedding invitation API.
//!
//! Keeps the signed-in [`Session`] and refreshes it on demand. When several
//! requests hit an expired access token at once, a single refresh call is
//! made and every caller shares its outcome.

pub mod client;
pub mod error;
pub mod refresh;
pub mod session;

pub use client::{ApiClient, HttpRefresher};
pub use error::{ClientError, RefreshError};
pub use refresh::{RefreshCoordinator, Refreshed, TokenRefresher};
pub use session::{Session, SessionHandle};
