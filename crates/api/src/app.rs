use axum::{
    http::{request::Parts, HeaderValue},
    middleware,
    routing::{get, post, put},
    Router,
};
use domain::services::access::ResolverSettings;
use shared::jwt::{JwtConfig, JwtError};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_administrator,
    require_intro_access, require_user_auth, security_headers_middleware, trace_id,
    RateLimiterState,
};
use crate::routes::{
    accounts, albums, auth, guests, health, images, intros, landing, me, resolve, sections,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub jwt: Arc<JwtConfig>,
    pub resolver: Arc<ResolverSettings>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

pub fn create_app(config: Config, pool: PgPool) -> Result<Router, JwtError> {
    let config = Arc::new(config);
    let jwt = Arc::new(config.jwt.to_jwt_config()?);
    let resolver = Arc::new(ResolverSettings::new(
        &config.tenancy.base_domain,
        &config.tenancy.admin_paths,
    ));

    // Rate limiting is off when rate_limit_per_minute is 0
    let rate_limiter = if config.security.rate_limit_per_minute > 0 {
        Some(Arc::new(RateLimiterState::new(
            config.security.rate_limit_per_minute,
            config.security.trusted_proxies.clone(),
        )))
    } else {
        None
    };

    let state = AppState {
        pool,
        config: config.clone(),
        jwt,
        resolver,
        rate_limiter,
    };

    let allowed = config.security.cors_origins.clone();
    let base_domain = config.tenancy.base_domain.clone();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _: &Parts| {
                origin
                    .to_str()
                    .map(|o| origin_allowed(o, &allowed, &base_domain))
                    .unwrap_or(false)
            },
        ))
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout));

    // Guest-facing routes; the guest id is the credential, so these are rate limited
    let landing_routes = Router::new()
        .route("/api/v1/resolve", get(resolve::resolve))
        .route(
            "/api/v1/landing/by-subdomain",
            get(landing::subdomain_landing),
        )
        .route(
            "/api/v1/landing/by-subdomain/:guest_id",
            get(landing::subdomain_guest_landing),
        )
        .route(
            "/api/v1/landing/by-subdomain/:guest_id/confirm",
            post(landing::subdomain_confirm),
        )
        .route(
            "/api/v1/landing/public/:guest_id",
            get(landing::public_landing),
        )
        .route(
            "/api/v1/landing/public/:guest_id/confirm",
            post(landing::public_confirm),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Routes that need a signed-in account but no particular resource
    let account_routes = Router::new()
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/me/password", put(auth::change_password))
        .route(
            "/api/v1/me/subdomain",
            get(me::get_subdomain).put(me::set_subdomain),
        )
        .route(
            "/api/v1/intros",
            get(intros::list_intros).post(intros::create_intro),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Everything under one intro. Ownership is checked after authentication
    // (the last route_layer added runs first).
    let intro_routes = Router::new()
        .route(
            "/api/v1/intros/:intro_id",
            get(intros::get_intro)
                .put(intros::update_intro)
                .delete(intros::delete_intro),
        )
        .route("/api/v1/intros/:intro_id/preview", get(intros::preview_intro))
        .route("/api/v1/intros/:intro_id/stats", get(intros::intro_stats))
        .route(
            "/api/v1/intros/:intro_id/guests",
            get(guests::list_guests).post(guests::create_guest),
        )
        .route(
            "/api/v1/intros/:intro_id/guests/:guest_id",
            get(guests::get_guest)
                .put(guests::update_guest)
                .delete(guests::delete_guest),
        )
        .route(
            "/api/v1/intros/:intro_id/sections/:kind",
            get(sections::get_section)
                .put(sections::upsert_section)
                .delete(sections::delete_section),
        )
        .route(
            "/api/v1/intros/:intro_id/images",
            get(images::list_images).post(images::create_image),
        )
        .route(
            "/api/v1/intros/:intro_id/images/:image_id",
            axum::routing::delete(images::delete_image),
        )
        .route(
            "/api/v1/intros/:intro_id/albums",
            get(albums::list_albums).post(albums::create_album),
        )
        .route(
            "/api/v1/intros/:intro_id/albums/:album_id",
            get(albums::get_album)
                .put(albums::update_album)
                .delete(albums::delete_album),
        )
        .route(
            "/api/v1/intros/:intro_id/albums/:album_id/order",
            put(albums::reorder_album_images),
        )
        .route(
            "/api/v1/intros/:intro_id/albums/:album_id/images",
            post(albums::add_album_image),
        )
        .route(
            "/api/v1/intros/:intro_id/albums/:album_id/images/:image_id",
            axum::routing::delete(albums::remove_album_image),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_intro_access,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Account administration
    let admin_routes = Router::new()
        .route(
            "/api/v1/admin/accounts",
            get(accounts::list_accounts).post(accounts::create_account),
        )
        .route(
            "/api/v1/admin/accounts/:account_id",
            get(accounts::get_account)
                .put(accounts::update_account)
                .delete(accounts::delete_account),
        )
        .route_layer(middleware::from_fn(require_administrator))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_user_auth,
        ));

    // Merge all routes
    Ok(Router::new()
        .merge(public_routes)
        .merge(landing_routes)
        .merge(account_routes)
        .merge(intro_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state))
}

/// Whether a browser origin may call the API: configured origins, the base
/// domain and its subdomains over http or https, and localhost.
pub fn origin_allowed(origin: &str, configured: &[String], base_domain: &str) -> bool {
    if configured
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(origin))
    {
        return true;
    }

    let Some(host) = origin
        .strip_prefix("https://")
        .or_else(|| origin.strip_prefix("http://"))
    else {
        return false;
    };
    let host = host.split(':').next().unwrap_or(host).to_ascii_lowercase();
    let base = base_domain
        .split(':')
        .next()
        .unwrap_or(base_domain)
        .trim_end_matches('.')
        .to_ascii_lowercase();

    host == "localhost"
        || host == "127.0.0.1"
        || (!base.is_empty() && (host == base || host.ends_with(&format!(".{}", base))))
}
