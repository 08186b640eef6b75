//! Domain models for the wedding invitation builder.

pub mod account;
pub mod album;
pub mod guest;
pub mod intro;
pub mod landing;
pub mod section;
pub mod session_image;

pub use account::{Account, AccountRole};
pub use album::{AlbumImage, AlbumSession, AlbumSessionWithImages};
pub use guest::{Guest, GuestStats, PublicGuest};
pub use intro::Intro;
pub use landing::LandingPage;
pub use section::SectionKind;
pub use session_image::SessionImage;
