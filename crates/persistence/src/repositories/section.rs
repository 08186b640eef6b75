//! Section repository: one optional row per intro for each page section.
//!
//! Upserts replace the whole section. Reads resolve image ids to URLs.

use domain::models::section::{
    UpsertDateRequest, UpsertFamilyRequest, UpsertFooterRequest, UpsertHeaderRequest,
    UpsertInviteRequest,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::{
    DateOfOrganizationEntity, FamilySectionRow, FooterSectionRow, HeaderSectionRow,
    InviteSectionRow,
};
use crate::metrics::QueryTimer;

#[derive(Clone)]
pub struct SectionRepository {
    pool: PgPool,
}

impl SectionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Header

    pub async fn find_header(&self, intro_id: Uuid) -> Result<Option<HeaderSectionRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_header_section");
        let result = sqlx::query_as::<_, HeaderSectionRow>(
            r#"
            SELECT h.intro_id, h.session_image_id, si.url AS session_image_url
            FROM header_sections h
            LEFT JOIN session_images si ON si.id = h.session_image_id
            WHERE h.intro_id = $1
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn upsert_header(
        &self,
        intro_id: Uuid,
        section: &UpsertHeaderRequest,
    ) -> Result<HeaderSectionRow, sqlx::Error> {
        let timer = QueryTimer::new("upsert_header_section");
        let result = sqlx::query_as::<_, HeaderSectionRow>(
            r#"
            WITH up AS (
                INSERT INTO header_sections (intro_id, session_image_id)
                VALUES ($1, $2)
                ON CONFLICT (intro_id) DO UPDATE
                SET session_image_id = EXCLUDED.session_image_id, updated_at = NOW()
                RETURNING intro_id, session_image_id
            )
            SELECT up.intro_id, up.session_image_id, si.url AS session_image_url
            FROM up
            LEFT JOIN session_images si ON si.id = up.session_image_id
            "#,
        )
        .bind(intro_id)
        .bind(section.session_image_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_header(&self, intro_id: Uuid) -> Result<bool, sqlx::Error> {
        self.delete_from("header_sections", "delete_header_section", intro_id)
            .await
    }

    // Family

    pub async fn find_family(&self, intro_id: Uuid) -> Result<Option<FamilySectionRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_family_section");
        let result = sqlx::query_as::<_, FamilySectionRow>(
            r#"
            SELECT f.intro_id, f.groom_father_name, f.groom_mother_name, f.groom_address,
                   f.bride_father_name, f.bride_mother_name, f.bride_address,
                   f.session_image_id, si.url AS session_image_url,
                   f.groom_image_id, gi.url AS groom_image_url,
                   f.bride_image_id, bi.url AS bride_image_url
            FROM family_sections f
            LEFT JOIN session_images si ON si.id = f.session_image_id
            LEFT JOIN session_images gi ON gi.id = f.groom_image_id
            LEFT JOIN session_images bi ON bi.id = f.bride_image_id
            WHERE f.intro_id = $1
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn upsert_family(
        &self,
        intro_id: Uuid,
        section: &UpsertFamilyRequest,
    ) -> Result<FamilySectionRow, sqlx::Error> {
        let timer = QueryTimer::new("upsert_family_section");
        let result = sqlx::query_as::<_, FamilySectionRow>(
            r#"
            WITH up AS (
                INSERT INTO family_sections (
                    intro_id, groom_father_name, groom_mother_name, groom_address,
                    bride_father_name, bride_mother_name, bride_address,
                    session_image_id, groom_image_id, bride_image_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                ON CONFLICT (intro_id) DO UPDATE
                SET groom_father_name = EXCLUDED.groom_father_name,
                    groom_mother_name = EXCLUDED.groom_mother_name,
                    groom_address = EXCLUDED.groom_address,
                    bride_father_name = EXCLUDED.bride_father_name,
                    bride_mother_name = EXCLUDED.bride_mother_name,
                    bride_address = EXCLUDED.bride_address,
                    session_image_id = EXCLUDED.session_image_id,
                    groom_image_id = EXCLUDED.groom_image_id,
                    bride_image_id = EXCLUDED.bride_image_id,
                    updated_at = NOW()
                RETURNING *
            )
            SELECT up.intro_id, up.groom_father_name, up.groom_mother_name, up.groom_address,
                   up.bride_father_name, up.bride_mother_name, up.bride_address,
                   up.session_image_id, si.url AS session_image_url,
                   up.groom_image_id, gi.url AS groom_image_url,
                   up.bride_image_id, bi.url AS bride_image_url
            FROM up
            LEFT JOIN session_images si ON si.id = up.session_image_id
            LEFT JOIN session_images gi ON gi.id = up.groom_image_id
            LEFT JOIN session_images bi ON bi.id = up.bride_image_id
            "#,
        )
        .bind(intro_id)
        .bind(section.groom_father_name.as_deref())
        .bind(section.groom_mother_name.as_deref())
        .bind(section.groom_address.as_deref())
        .bind(section.bride_father_name.as_deref())
        .bind(section.bride_mother_name.as_deref())
        .bind(section.bride_address.as_deref())
        .bind(section.session_image_id)
        .bind(section.groom_image_id)
        .bind(section.bride_image_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_family(&self, intro_id: Uuid) -> Result<bool, sqlx::Error> {
        self.delete_from("family_sections", "delete_family_section", intro_id)
            .await
    }

    // Invite

    pub async fn find_invite(&self, intro_id: Uuid) -> Result<Option<InviteSectionRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_invite_section");
        let result = sqlx::query_as::<_, InviteSectionRow>(
            r#"
            SELECT v.intro_id,
                   v.left_image_id, li.url AS left_image_url,
                   v.center_image_id, ci.url AS center_image_url,
                   v.right_image_id, ri.url AS right_image_url,
                   v.greeting_text, v.attendance_request_text
            FROM invite_sections v
            LEFT JOIN session_images li ON li.id = v.left_image_id
            LEFT JOIN session_images ci ON ci.id = v.center_image_id
            LEFT JOIN session_images ri ON ri.id = v.right_image_id
            WHERE v.intro_id = $1
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn upsert_invite(
        &self,
        intro_id: Uuid,
        section: &UpsertInviteRequest,
    ) -> Result<InviteSectionRow, sqlx::Error> {
        let timer = QueryTimer::new("upsert_invite_section");
        let result = sqlx::query_as::<_, InviteSectionRow>(
            r#"
            WITH up AS (
                INSERT INTO invite_sections (
                    intro_id, left_image_id, center_image_id, right_image_id,
                    greeting_text, attendance_request_text
                )
                VALUES ($1, $2, $3, $4, $5, $6)
                ON CONFLICT (intro_id) DO UPDATE
                SET left_image_id = EXCLUDED.left_image_id,
                    center_image_id = EXCLUDED.center_image_id,
                    right_image_id = EXCLUDED.right_image_id,
                    greeting_text = EXCLUDED.greeting_text,
                    attendance_request_text = EXCLUDED.attendance_request_text,
                    updated_at = NOW()
                RETURNING *
            )
            SELECT up.intro_id,
                   up.left_image_id, li.url AS left_image_url,
                   up.center_image_id, ci.url AS center_image_url,
                   up.right_image_id, ri.url AS right_image_url,
                   up.greeting_text, up.attendance_request_text
            FROM up
            LEFT JOIN session_images li ON li.id = up.left_image_id
            LEFT JOIN session_images ci ON ci.id = up.center_image_id
            LEFT JOIN session_images ri ON ri.id = up.right_image_id
            "#,
        )
        .bind(intro_id)
        .bind(section.left_image_id)
        .bind(section.center_image_id)
        .bind(section.right_image_id)
        .bind(section.greeting_text.as_deref())
        .bind(section.attendance_request_text.as_deref())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_invite(&self, intro_id: Uuid) -> Result<bool, sqlx::Error> {
        self.delete_from("invite_sections", "delete_invite_section", intro_id)
            .await
    }

    // Footer

    pub async fn find_footer(&self, intro_id: Uuid) -> Result<Option<FooterSectionRow>, sqlx::Error> {
        let timer = QueryTimer::new("find_footer_section");
        let result = sqlx::query_as::<_, FooterSectionRow>(
            r#"
            SELECT f.intro_id, f.thank_you_text, f.closing_message,
                   f.session_image_id, si.url AS session_image_url
            FROM footer_sections f
            LEFT JOIN session_images si ON si.id = f.session_image_id
            WHERE f.intro_id = $1
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn upsert_footer(
        &self,
        intro_id: Uuid,
        section: &UpsertFooterRequest,
    ) -> Result<FooterSectionRow, sqlx::Error> {
        let timer = QueryTimer::new("upsert_footer_section");
        let result = sqlx::query_as::<_, FooterSectionRow>(
            r#"
            WITH up AS (
                INSERT INTO footer_sections (intro_id, thank_you_text, closing_message, session_image_id)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (intro_id) DO UPDATE
                SET thank_you_text = EXCLUDED.thank_you_text,
                    closing_message = EXCLUDED.closing_message,
                    session_image_id = EXCLUDED.session_image_id,
                    updated_at = NOW()
                RETURNING *
            )
            SELECT up.intro_id, up.thank_you_text, up.closing_message,
                   up.session_image_id, si.url AS session_image_url
            FROM up
            LEFT JOIN session_images si ON si.id = up.session_image_id
            "#,
        )
        .bind(intro_id)
        .bind(section.thank_you_text.as_deref())
        .bind(section.closing_message.as_deref())
        .bind(section.session_image_id)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_footer(&self, intro_id: Uuid) -> Result<bool, sqlx::Error> {
        self.delete_from("footer_sections", "delete_footer_section", intro_id)
            .await
    }

    // Date of organization

    pub async fn find_date(
        &self,
        intro_id: Uuid,
    ) -> Result<Option<DateOfOrganizationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_date_of_organization");
        let result = sqlx::query_as::<_, DateOfOrganizationEntity>(
            r#"
            SELECT intro_id, lunar_day, calendar_day, event_time, venue_address, map_iframe
            FROM date_of_organizations
            WHERE intro_id = $1
            "#,
        )
        .bind(intro_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn upsert_date(
        &self,
        intro_id: Uuid,
        section: &UpsertDateRequest,
    ) -> Result<DateOfOrganizationEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_date_of_organization");
        let result = sqlx::query_as::<_, DateOfOrganizationEntity>(
            r#"
            INSERT INTO date_of_organizations (
                intro_id, lunar_day, calendar_day, event_time, venue_address, map_iframe
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (intro_id) DO UPDATE
            SET lunar_day = EXCLUDED.lunar_day,
                calendar_day = EXCLUDED.calendar_day,
                event_time = EXCLUDED.event_time,
                venue_address = EXCLUDED.venue_address,
                map_iframe = EXCLUDED.map_iframe,
                updated_at = NOW()
            RETURNING intro_id, lunar_day, calendar_day, event_time, venue_address, map_iframe
            "#,
        )
        .bind(intro_id)
        .bind(section.lunar_day.as_deref())
        .bind(section.calendar_day)
        .bind(section.event_time)
        .bind(section.venue_address.as_deref())
        .bind(section.map_iframe.as_deref())
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }

    pub async fn delete_date(&self, intro_id: Uuid) -> Result<bool, sqlx::Error> {
        self.delete_from("date_of_organizations", "delete_date_of_organization", intro_id)
            .await
    }

    /// `table` is always one of the fixed section table names above.
    async fn delete_from(
        &self,
        table: &'static str,
        query_name: &'static str,
        intro_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new(query_name);
        let sql = format!("DELETE FROM {} WHERE intro_id = $1", table);
        let result = sqlx::query(&sql).bind(intro_id).execute(&self.pool).await?;
        timer.record();
        Ok(result.rows_affected() > 0)
    }
}
