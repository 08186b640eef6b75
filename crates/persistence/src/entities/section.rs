//! Section rows, read together with the URLs of the images they reference.

use chrono::{NaiveDate, NaiveTime};
use domain::models::section::{
    DateOfOrganization, FamilySection, FooterSection, HeaderSection, InviteSection,
};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct HeaderSectionRow {
    pub intro_id: Uuid,
    pub session_image_id: Option<Uuid>,
    pub session_image_url: Option<String>,
}

impl From<HeaderSectionRow> for HeaderSection {
    fn from(row: HeaderSectionRow) -> Self {
        Self {
            intro_id: row.intro_id,
            session_image_id: row.session_image_id,
            session_image_url: row.session_image_url,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FamilySectionRow {
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

impl From<FamilySectionRow> for FamilySection {
    fn from(row: FamilySectionRow) -> Self {
        Self {
            intro_id: row.intro_id,
            groom_father_name: row.groom_father_name,
            groom_mother_name: row.groom_mother_name,
            groom_address: row.groom_address,
            bride_father_name: row.bride_father_name,
            bride_mother_name: row.bride_mother_name,
            bride_address: row.bride_address,
            session_image_id: row.session_image_id,
            session_image_url: row.session_image_url,
            groom_image_id: row.groom_image_id,
            groom_image_url: row.groom_image_url,
            bride_image_id: row.bride_image_id,
            bride_image_url: row.bride_image_url,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct InviteSectionRow {
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

impl From<InviteSectionRow> for InviteSection {
    fn from(row: InviteSectionRow) -> Self {
        Self {
            intro_id: row.intro_id,
            left_image_id: row.left_image_id,
            left_image_url: row.left_image_url,
            center_image_id: row.center_image_id,
            center_image_url: row.center_image_url,
            right_image_id: row.right_image_id,
            right_image_url: row.right_image_url,
            greeting_text: row.greeting_text,
            attendance_request_text: row.attendance_request_text,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct FooterSectionRow {
    pub intro_id: Uuid,
    pub thank_you_text: Option<String>,
    pub closing_message: Option<String>,
    pub session_image_id: Option<Uuid>,
    pub session_image_url: Option<String>,
}

impl From<FooterSectionRow> for FooterSection {
    fn from(row: FooterSectionRow) -> Self {
        Self {
            intro_id: row.intro_id,
            thank_you_text: row.thank_you_text,
            closing_message: row.closing_message,
            session_image_id: row.session_image_id,
            session_image_url: row.session_image_url,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DateOfOrganizationEntity {
    pub intro_id: Uuid,
    pub lunar_day: Option<String>,
    pub calendar_day: Option<NaiveDate>,
    pub event_time: Option<NaiveTime>,
    pub venue_address: Option<String>,
    pub map_iframe: Option<String>,
}

impl From<DateOfOrganizationEntity> for DateOfOrganization {
    fn from(entity: DateOfOrganizationEntity) -> Self {
        Self {
            intro_id: entity.intro_id,
            lunar_day: entity.lunar_day,
            calendar_day: entity.calendar_day,
            event_time: entity.event_time,
            venue_address: entity.venue_address,
            map_iframe: entity.map_iframe,
        }
    }
}
