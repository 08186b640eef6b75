//! HTTP route handlers.

pub mod accounts;
pub mod albums;
pub mod auth;
pub mod guests;
pub mod health;
pub mod images;
pub mod intros;
pub mod landing;
pub mod me;
pub mod resolve;
pub mod sections;
