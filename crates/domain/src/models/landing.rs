//! Landing page aggregate served to guests and previewed by owners.

use serde::{Deserialize, Serialize};

use super::album::AlbumSessionWithImages;
use super::guest::PublicGuest;
use super::intro::Intro;
use super::section::{DateOfOrganization, FamilySection, FooterSection, HeaderSection, InviteSection};

/// Everything needed to render one invitation page.
///
/// `guest` is present only when the request identified a guest; anonymous
/// subdomain visitors get the page without personalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LandingPage {
    pub intro: Intro,
    pub guest: Option<PublicGuest>,
    pub date_of_organization: Option<DateOfOrganization>,
    pub header_section: Option<HeaderSection>,
    pub family_section: Option<FamilySection>,
    pub invite_section: Option<InviteSection>,
    pub album_sessions: Vec<AlbumSessionWithImages>,
    pub footer_section: Option<FooterSection>,
}

impl LandingPage {
    pub fn with_guest(mut self, guest: Option<PublicGuest>) -> Self {
        self.guest = guest;
        self
    }
}
