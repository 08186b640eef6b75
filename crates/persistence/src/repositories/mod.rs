//! Repository implementations for database operations.

pub mod account;
pub mod album;
pub mod guest;
pub mod intro;
pub mod section;
pub mod session_image;

pub use account::{AccountChanges, AccountRepository, NewAccount};
pub use album::{AlbumError, AlbumRepository};
pub use guest::{DeleteGuestOutcome, GuestChanges, GuestRepository};
pub use intro::{CreateIntroOutcome, IntroRepository};
pub use section::SectionRepository;
pub use session_image::{DeleteImageOutcome, SessionImageRepository};
