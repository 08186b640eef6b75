use async_trait::async_trait;
use domain::models::account::{LoginRequest, RefreshRequest, SetSubdomainRequest, SubdomainResponse};
use domain::models::guest::{ConfirmationOutcome, CreateGuestRequest, GuestListItem, GuestStats};
use domain::models::intro::CreateIntroRequest;
use domain::models::{Account, Intro, LandingPage};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use shared::pagination::Page;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{ClientError, ErrorBody, RefreshError};
use crate::refresh::{RefreshCoordinator, TokenRefresher};
use crate::session::{Session, SessionHandle};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Login and refresh responses carry the session next to the account.
#[derive(Debug, Deserialize)]
struct SignedIn {
    #[serde(flatten)]
    session: Session,
    account: Account,
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

async fn api_error(response: Response) -> ClientError {
    let status = response.status().as_u16();
    match response.json::<ErrorBody>().await {
        Ok(body) => ClientError::Api {
            status,
            error: body.error,
            message: body.message,
        },
        Err(_) => ClientError::Api {
            status,
            error: "unknown".to_string(),
            message: format!("HTTP {}", status),
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    if !response.status().is_success() {
        return Err(api_error(response).await);
    }
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Refreshes sessions through `POST /api/v1/auth/refresh`.
pub struct HttpRefresher {
    http: reqwest::Client,
    base_url: String,
}

impl HttpRefresher {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<Session, RefreshError> {
        let response = self
            .http
            .post(endpoint(&self.base_url, "/api/v1/auth/refresh"))
            .json(&RefreshRequest {
                refresh_token: refresh_token.to_string(),
            })
            .send()
            .await
            .map_err(|e| RefreshError::Transport(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<SignedIn>()
                .await
                .map(|signed_in| signed_in.session)
                .map_err(|e| RefreshError::Transport(e.to_string())),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(RefreshError::Rejected),
            status => Err(RefreshError::Transport(format!("HTTP {}", status))),
        }
    }
}

/// Client for the account and guest-facing API.
///
/// Clones share the session, so a refresh made by one clone is seen by all.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionHandle,
    refresh: Arc<RefreshCoordinator>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let base_url = base_url.into();
        let refresher = Arc::new(HttpRefresher::new(http.clone(), base_url.clone()));
        Ok(Self::with_refresher(http, base_url, refresher))
    }

    pub fn with_refresher(
        http: reqwest::Client,
        base_url: impl Into<String>,
        refresher: Arc<dyn TokenRefresher>,
    ) -> Self {
        let session = SessionHandle::new();
        Self {
            http,
            base_url: base_url.into(),
            refresh: Arc::new(RefreshCoordinator::new(session.clone(), refresher)),
            session,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, endpoint(&self.base_url, path))
    }

    /// Sends a request with the current access token. A 401 triggers one
    /// shared refresh and one retry; a second 401 ends the session.
    async fn authorized<F>(&self, build: F) -> Result<Response, ClientError>
    where
        F: Fn() -> RequestBuilder,
    {
        let (session, generation) = self.session.current().ok_or(ClientError::NotSignedIn)?;

        let response = build().bearer_auth(&session.access_token).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::debug!("Access token rejected, refreshing session");
        let (refreshed, refreshed_generation) = self.refresh.refresh(generation).await?;

        let response = build().bearer_auth(&refreshed.access_token).send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            // A clone may have signed in again meanwhile; that session stays.
            if self.session.clear_if(refreshed_generation) {
                tracing::info!("Refreshed session rejected; signing out");
            }
            return Err(ClientError::SessionExpired);
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.authorized(|| self.request(Method::GET, path)).await?;
        decode(response).await
    }

    /// Signs in and stores the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Account, ClientError> {
        let response = self
            .request(Method::POST, "/api/v1/auth/login")
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;

        let signed_in: SignedIn = decode(response).await?;
        self.session.replace(signed_in.session);
        Ok(signed_in.account)
    }

    /// Revokes the refresh token and forgets the session. Signing out locally
    /// succeeds even when the server cannot be reached.
    pub async fn logout(&self) -> Result<(), ClientError> {
        let Some((session, _)) = self.session.current() else {
            return Ok(());
        };
        self.session.clear();

        let response = self
            .request(Method::POST, "/api/v1/auth/logout")
            .json(&RefreshRequest {
                refresh_token: session.refresh_token,
            })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }

    pub async fn me(&self) -> Result<Account, ClientError> {
        self.get_json("/api/v1/auth/me").await
    }

    pub async fn subdomain(&self) -> Result<SubdomainResponse, ClientError> {
        self.get_json("/api/v1/me/subdomain").await
    }

    /// Claims, changes or (with `None`) clears the account subdomain.
    pub async fn set_subdomain(&self, subdomain: Option<&str>) -> Result<SubdomainResponse, ClientError> {
        let body = SetSubdomainRequest {
            subdomain: subdomain.map(str::to_string),
        };
        let response = self
            .authorized(|| self.request(Method::PUT, "/api/v1/me/subdomain").json(&body))
            .await?;
        decode(response).await
    }

    pub async fn list_intros(&self) -> Result<Vec<Intro>, ClientError> {
        self.get_json("/api/v1/intros").await
    }

    pub async fn create_intro(&self, request: &CreateIntroRequest) -> Result<Intro, ClientError> {
        let response = self
            .authorized(|| self.request(Method::POST, "/api/v1/intros").json(request))
            .await?;
        decode(response).await
    }

    pub async fn list_guests(
        &self,
        intro_id: Uuid,
        page: u32,
        page_size: u32,
    ) -> Result<Page<GuestListItem>, ClientError> {
        let path = format!("/api/v1/intros/{}/guests", intro_id);
        let query = [("page", page), ("page_size", page_size)];
        let response = self
            .authorized(|| self.request(Method::GET, &path).query(&query))
            .await?;
        decode(response).await
    }

    pub async fn create_guest(
        &self,
        intro_id: Uuid,
        request: &CreateGuestRequest,
    ) -> Result<GuestListItem, ClientError> {
        let path = format!("/api/v1/intros/{}/guests", intro_id);
        let response = self
            .authorized(|| self.request(Method::POST, &path).json(request))
            .await?;
        decode(response).await
    }

    pub async fn intro_stats(&self, intro_id: Uuid) -> Result<GuestStats, ClientError> {
        self.get_json(&format!("/api/v1/intros/{}/stats", intro_id))
            .await
    }

    /// Landing page of a public link. No session needed.
    pub async fn public_landing(&self, guest_id: &str) -> Result<LandingPage, ClientError> {
        let response = self
            .request(Method::GET, &format!("/api/v1/landing/public/{}", guest_id))
            .send()
            .await?;
        decode(response).await
    }

    /// Guest confirmation through a public link. Repeating it is harmless.
    pub async fn public_confirm(&self, guest_id: &str) -> Result<ConfirmationOutcome, ClientError> {
        let response = self
            .request(
                Method::POST,
                &format!("/api/v1/landing/public/{}/confirm", guest_id),
            )
            .send()
            .await?;
        decode(response).await
    }
}
