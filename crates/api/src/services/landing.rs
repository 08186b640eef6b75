//! Public landing pages: tenant and guest lookups behind a resolved route,
//! the page aggregate, and attendance confirmation.
//!
//! Every miss on this surface, whatever the cause, is reported with the same
//! "Invitation not found" message.

use domain::models::guest::ConfirmationOutcome;
use domain::models::{AlbumSessionWithImages, Guest, Intro, LandingPage, PublicGuest};
use domain::services::access::AccessRoute;
use persistence::entities::{AlbumImageRow, AlbumSessionEntity};
use persistence::repositories::{AlbumRepository, GuestRepository, IntroRepository, SectionRepository};
use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::ApiError;
use crate::middleware::metrics::record_guest_confirmation;

/// A public route after its tenant and guest were looked up.
#[derive(Debug, Clone)]
pub struct ResolvedInvitation {
    pub intro: Intro,
    pub guest: Option<Guest>,
}

pub struct LandingService {
    pool: PgPool,
}

impl LandingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Intro of the subdomain, and the guest when one is named.
    ///
    /// A guest that belongs to another intro is reported as missing.
    pub async fn resolve_by_subdomain(
        &self,
        subdomain: &str,
        guest_id: Option<Uuid>,
    ) -> Result<ResolvedInvitation, ApiError> {
        let intro = IntroRepository::new(self.pool.clone())
            .find_by_subdomain(subdomain)
            .await?
            .ok_or_else(ApiError::invitation_not_found)?;

        let guest = match guest_id {
            Some(guest_id) => Some(
                GuestRepository::new(self.pool.clone())
                    .find_in_intro(guest_id, intro.id)
                    .await?
                    .ok_or_else(|| {
                        tracing::debug!(%guest_id, %subdomain, "Guest not in subdomain's intro");
                        ApiError::invitation_not_found()
                    })?
                    .into(),
            ),
            None => None,
        };

        Ok(ResolvedInvitation {
            intro: intro.into(),
            guest,
        })
    }

    /// Guest named by a base-domain link, and its intro.
    pub async fn resolve_by_guest(&self, guest_id: Uuid) -> Result<ResolvedInvitation, ApiError> {
        let guest = GuestRepository::new(self.pool.clone())
            .find_by_id(guest_id)
            .await?
            .ok_or_else(ApiError::invitation_not_found)?;

        let intro = IntroRepository::new(self.pool.clone())
            .find_public(guest.intro_id)
            .await?
            .ok_or_else(ApiError::invitation_not_found)?;

        Ok(ResolvedInvitation {
            intro: intro.into(),
            guest: Some(guest.into()),
        })
    }

    /// Looks up a classified public route.
    pub async fn resolve(&self, route: &AccessRoute) -> Result<ResolvedInvitation, ApiError> {
        match route {
            AccessRoute::PublicBySubdomain {
                subdomain,
                guest_id,
            } => self.resolve_by_subdomain(subdomain, *guest_id).await,
            AccessRoute::PublicByGuestLegacy { guest_id } => self.resolve_by_guest(*guest_id).await,
            AccessRoute::AdminSession | AccessRoute::NotFound => {
                Err(ApiError::invitation_not_found())
            }
        }
    }

    /// Landing aggregate of a resolved invitation.
    pub async fn page(&self, resolved: ResolvedInvitation) -> Result<LandingPage, ApiError> {
        let guest = resolved.guest.as_ref().map(PublicGuest::from);
        Ok(self.aggregate(resolved.intro).await?.with_guest(guest))
    }

    /// Owner preview: the aggregate merged with the intro's seed guest.
    pub async fn preview(&self, intro_id: Uuid) -> Result<LandingPage, ApiError> {
        let intro = IntroRepository::new(self.pool.clone())
            .find_by_id(intro_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Intro not found".to_string()))?;

        let seed = GuestRepository::new(self.pool.clone())
            .find_seed(intro_id)
            .await?
            .map(Guest::from);

        Ok(self
            .aggregate(intro.into())
            .await?
            .with_guest(seed.as_ref().map(PublicGuest::from)))
    }

    /// Confirms attendance of the invitation's guest.
    pub async fn confirm(&self, resolved: &ResolvedInvitation) -> Result<ConfirmationOutcome, ApiError> {
        let guest = resolved
            .guest
            .as_ref()
            .ok_or_else(ApiError::invitation_not_found)?;

        let row = GuestRepository::new(self.pool.clone())
            .confirm(guest.id, Some(resolved.intro.id))
            .await?
            .ok_or_else(ApiError::invitation_not_found)?;

        record_guest_confirmation(row.already_confirmed);
        tracing::info!(
            guest_id = %guest.id,
            intro_id = %resolved.intro.id,
            already_confirmed = row.already_confirmed,
            "Guest attendance confirmed"
        );

        let mut confirmed = Guest::from(row.guest);
        confirmed.confirmed = true;
        Ok(ConfirmationOutcome {
            already_confirmed: row.already_confirmed,
            guest: PublicGuest::from(&confirmed),
        })
    }

    /// Everything a landing page shows for an intro, without guest fields.
    pub async fn aggregate(&self, intro: Intro) -> Result<LandingPage, sqlx::Error> {
        let sections = SectionRepository::new(self.pool.clone());
        let albums = AlbumRepository::new(self.pool.clone());

        let (date, header, family, invite, footer, sessions, images) = tokio::try_join!(
            sections.find_date(intro.id),
            sections.find_header(intro.id),
            sections.find_family(intro.id),
            sections.find_invite(intro.id),
            sections.find_footer(intro.id),
            albums.list_sessions(intro.id),
            albums.list_images_for_intro(intro.id),
        )?;

        Ok(LandingPage {
            date_of_organization: date.map(Into::into),
            header_section: header.map(Into::into),
            family_section: family.map(Into::into),
            invite_section: invite.map(Into::into),
            footer_section: footer.map(Into::into),
            album_sessions: group_albums(sessions, images),
            guest: None,
            intro,
        })
    }
}

/// Attaches images to their sessions. Both inputs arrive sorted by order.
pub fn group_albums(
    sessions: Vec<AlbumSessionEntity>,
    images: Vec<AlbumImageRow>,
) -> Vec<AlbumSessionWithImages> {
    let mut by_session: HashMap<Uuid, Vec<AlbumImageRow>> = HashMap::new();
    for image in images {
        by_session.entry(image.album_session_id).or_default().push(image);
    }

    sessions
        .into_iter()
        .map(|session| {
            let mut images = by_session.remove(&session.id).unwrap_or_default();
            images.sort_by_key(|i| (i.order, i.id));
            AlbumSessionWithImages {
                session: session.into(),
                images: images.into_iter().map(Into::into).collect(),
            }
        })
        .collect()
}
