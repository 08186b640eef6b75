//! Database entity definitions.
//!
//! Entities are direct mappings to database rows. `*Row` types are query
//! results that join in data from other tables.

pub mod account;
pub mod album;
pub mod guest;
pub mod intro;
pub mod section;
pub mod session_image;

pub use account::{AccountEntity, AccountRoleDb, AccountSessionEntity};
pub use album::{AlbumImageRow, AlbumSessionEntity};
pub use guest::{GuestConfirmationRow, GuestEntity, GuestStatsRow};
pub use intro::IntroEntity;
pub use section::{
    DateOfOrganizationEntity, FamilySectionRow, FooterSectionRow, HeaderSectionRow,
    InviteSectionRow,
};
pub use session_image::SessionImageEntity;
