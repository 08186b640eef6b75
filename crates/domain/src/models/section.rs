//! Invitation page sections.
//!
//! Each section is optional and stored at most once per intro. Image fields
//! hold the id of a session image of the same intro; reads also carry the
//! resolved URL so the page can render without a second lookup.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Section names as they appear in routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKind {
    Header,
    Family,
    Invite,
    Footer,
    Date,
}

impl SectionKind {
    pub const ALL: [SectionKind; 5] = [
        SectionKind::Header,
        SectionKind::Family,
        SectionKind::Invite,
        SectionKind::Footer,
        SectionKind::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Header => "header",
            SectionKind::Family => "family",
            SectionKind::Invite => "invite",
            SectionKind::Footer => "footer",
            SectionKind::Date => "date",
        }
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "header" => Ok(SectionKind::Header),
            "family" => Ok(SectionKind::Family),
            "invite" => Ok(SectionKind::Invite),
            "footer" => Ok(SectionKind::Footer),
            "date" => Ok(SectionKind::Date),
            _ => Err(format!("Unknown section: {}", s)),
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct HeaderSection {
    pub intro_id: Uuid,
    pub session_image_id: Option<Uuid>,
    pub session_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FamilySection {
    pub intro_id: Uuid,
    pub groom_father_name: Option<String>,
    pub groom_mother_name: Option<String>,
    pub groom_address: Option<String>,
    pub bride_father_name: Option<String>,
    pub bride_mother_name: Option<String>,
    pub bride_address: Option<String>,
    pub session_image_id: Option<Uuid>,
    pub session_image_url: Option<String>,
    pub groom_image_id: Option<Uuid>,
    pub groom_image_url: Option<String>,
    pub bride_image_id: Option<Uuid>,
    pub bride_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct InviteSection {
    pub intro_id: Uuid,
    pub left_image_id: Option<Uuid>,
    pub left_image_url: Option<String>,
    pub center_image_id: Option<Uuid>,
    pub center_image_url: Option<String>,
    pub right_image_id: Option<Uuid>,
    pub right_image_url: Option<String>,
    pub greeting_text: Option<String>,
    pub attendance_request_text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FooterSection {
    pub intro_id: Uuid,
    pub thank_you_text: Option<String>,
    pub closing_message: Option<String>,
    pub session_image_id: Option<Uuid>,
    pub session_image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DateOfOrganization {
    pub intro_id: Uuid,
    pub lunar_day: Option<String>,
    pub calendar_day: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub venue_address: Option<String>,
    pub map_iframe: Option<String>,
}

/// Default copy used when an intro is provisioned.
pub const DEFAULT_GREETING_TEXT: &str =
    "Trân trọng kính mời bạn đến dự buổi tiệc chung vui cùng gia đình chúng tôi";
pub const DEFAULT_ATTENDANCE_REQUEST_TEXT: &str =
    "Sự hiện diện của bạn là niềm vinh hạnh cho gia đình chúng tôi";
pub const DEFAULT_THANK_YOU_TEXT: &str = "Xin chân thành cảm ơn!";
pub const DEFAULT_CLOSING_MESSAGE: &str = "Rất mong được đón tiếp quý khách";

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertHeaderRequest {
    pub session_image_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertFamilyRequest {
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub groom_father_name: Option<String>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub groom_mother_name: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub groom_address: Option<String>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub bride_father_name: Option<String>,
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub bride_mother_name: Option<String>,
    #[validate(length(max = 500, message = "Address must be at most 500 characters"))]
    pub bride_address: Option<String>,
    pub session_image_id: Option<Uuid>,
    pub groom_image_id: Option<Uuid>,
    pub bride_image_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertInviteRequest {
    pub left_image_id: Option<Uuid>,
    pub center_image_id: Option<Uuid>,
    pub right_image_id: Option<Uuid>,
    #[validate(length(max = 1000, message = "Greeting must be at most 1000 characters"))]
    pub greeting_text: Option<String>,
    #[validate(length(max = 1000, message = "Attendance text must be at most 1000 characters"))]
    pub attendance_request_text: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertFooterRequest {
    #[validate(length(max = 1000, message = "Thank-you text must be at most 1000 characters"))]
    pub thank_you_text: Option<String>,
    #[validate(length(max = 2000, message = "Closing message must be at most 2000 characters"))]
    pub closing_message: Option<String>,
    pub session_image_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpsertDateRequest {
    #[validate(length(max = 255, message = "Lunar day must be at most 255 characters"))]
    pub lunar_day: Option<String>,
    pub calendar_day: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    #[validate(length(max = 500, message = "Venue address must be at most 500 characters"))]
    pub venue_address: Option<String>,
    #[validate(length(max = 5000, message = "Map embed must be at most 5000 characters"))]
    pub map_iframe: Option<String>,
}

/// Every image id a section write refers to, for same-intro checks.
pub trait ImageReferences {
    fn image_ids(&self) -> Vec<Uuid>;
}

impl ImageReferences for UpsertHeaderRequest {
    fn image_ids(&self) -> Vec<Uuid> {
        self.session_image_id.into_iter().collect()
    }
}

impl ImageReferences for UpsertFamilyRequest {
    fn image_ids(&self) -> Vec<Uuid> {
        [self.session_image_id, self.groom_image_id, self.bride_image_id]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl ImageReferences for UpsertInviteRequest {
    fn image_ids(&self) -> Vec<Uuid> {
        [self.left_image_id, self.center_image_id, self.right_image_id]
            .into_iter()
            .flatten()
            .collect()
    }
}

impl ImageReferences for UpsertFooterRequest {
    fn image_ids(&self) -> Vec<Uuid> {
        self.session_image_id.into_iter().collect()
    }
}

impl ImageReferences for UpsertDateRequest {
    fn image_ids(&self) -> Vec<Uuid> {
        Vec::new()
    }
}
