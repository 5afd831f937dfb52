//! # bayfront: Storefront Layer for the Bayfront Template Marketplace
//!
//! `bayfront` is the web tier of a website-template marketplace. It sits
//! between the storefront SPA and a hosted backend-as-a-service (auth,
//! relational storage, serverless checkout function) and owns everything the
//! hosted backend doesn't: serving the SPA and its marketing artifacts,
//! caching remote reads, enforcing the listing review workflow, and brokering
//! checkout and chat-assistant calls.
//!
//! ## Overview
//!
//! The hosted backend is the sole source of truth for all persisted data
//! (listings, ideas, concepts, profiles). This tier keeps only transient,
//! invalidatable copies of remote result sets in an explicit query cache, so
//! the marketplace stays fast without this process ever owning state that
//! could diverge. Writes always go to the backend first; cache invalidation
//! strictly follows write acknowledgment.
//!
//! Two invariants that no client-side code could enforce live here, behind
//! the trust boundary:
//!
//! - a submission's initial review status is derived from the *verified* role
//!   of the submitter ([`moderation::initial_review`]); the API offers no way
//!   for a client to supply a status or approval timestamp, and
//! - admin review transitions are validated against an explicit transition
//!   table before any write is issued ([`moderation::ReviewStatus`]).
//!
//! ### Request Flow
//!
//! Page navigations (`GET /marketplace`, `/blog/...`) are served from the
//! embedded SPA bundle with an index-html fallback for client-side routes.
//! A middleware records each page visit in a short per-session route history
//! and warms the marketplace listing query when that history says the visitor
//! is heading there ([`prefetch`]).
//!
//! API requests (`/api/v1/*`) pass through optional token verification (the
//! hosted auth service signs the tokens; this tier verifies them with the
//! shared secret), reach a handler, and go through the [`catalog::Catalog`]
//! service, which composes the per-collection repositories ([`store`]) with
//! the query cache ([`cache`]). Reads are cached under structural query keys;
//! mutations write remotely and then invalidate every key whose result set
//! could contain the affected entity.
//!
//! ## Core Components
//!
//! The **API layer** ([`api`]) exposes the storefront REST surface: template
//! browsing and management, the admin review queue with quick actions, ideas
//! and concepts, profiles, checkout, the assistant relay, blog content, the
//! consent endpoints, and public runtime config.
//!
//! The **store layer** ([`store`]) speaks the hosted data service's
//! PostgREST-style REST dialect through a typed client and per-collection
//! repositories.
//!
//! The **query cache** ([`cache`]) is an injectable service keyed by
//! structural query keys, with per-entry staleness, idle-time garbage
//! collection and single-flight deduplication of concurrent fetches.
//!
//! **Background services** run alongside the HTTP server: a cache sweeper
//! that evicts idle entries on an interval. All background work is tied to a
//! cancellation token for graceful shutdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use bayfront::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = bayfront::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     bayfront::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config)?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod assistant;
pub mod auth;
pub mod cache;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod content;
pub mod errors;
pub mod moderation;
mod openapi;
pub mod prefetch;
pub mod sitemap;
mod static_assets;
pub mod store;
pub mod telemetry;
mod types;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    response::Redirect,
    routing::{delete, get, post},
    Json, Router,
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, info, instrument, Level};
use utoipa::OpenApi;

use crate::assistant::AssistantClient;
use crate::catalog::Catalog;
use crate::checkout::CheckoutProvider;
use crate::config::CorsOrigin;
use crate::openapi::ApiDoc;
use crate::prefetch::RouteHistory;
use crate::store::DataClient;

pub use config::Config;
pub use errors::{Error, Result};
pub use types::{abbrev_uuid, ConceptId, IdeaId, ListingId, UserId};

/// Application state shared across all request handlers.
///
/// Everything in here is cheap to clone: the catalog and cache share their
/// internals through `Arc`s, and the checkout provider is a shared trait
/// object.
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub catalog: Catalog,
    pub route_history: RouteHistory,
    pub checkout: Arc<dyn CheckoutProvider>,
    pub assistant: AssistantClient,
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let mut origins = Vec::new();
    for origin in &config.auth.cors.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(config.auth.cors.allow_credentials);

    if let Some(max_age) = config.auth.cors.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// - the storefront API under `/api/v1`
/// - generated artifacts (`/sitemap.xml`, `/robots.txt`)
/// - OpenAPI document and health probe
/// - embedded SPA serving with client-route fallback
/// - route-history tracking middleware, CORS, optional Prometheus metrics,
///   and request tracing
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    use api::handlers;

    let api_routes = Router::new()
        .route("/config", get(handlers::config::get_config))
        // Marketplace listings
        .route(
            "/templates",
            get(handlers::listings::list_templates).post(handlers::listings::create_template),
        )
        .route(
            "/templates/{id}",
            get(handlers::listings::get_template)
                .patch(handlers::listings::update_template)
                .delete(handlers::listings::delete_template),
        )
        .route("/templates/{id}/downloads", post(handlers::listings::record_download))
        // Review workflow quick actions (admin only)
        .route("/templates/{id}/approve", post(handlers::listings::approve_template))
        .route("/templates/{id}/reject", post(handlers::listings::reject_template))
        .route("/templates/{id}/feature", post(handlers::listings::feature_template))
        .route("/templates/{id}/unfeature", post(handlers::listings::unfeature_template))
        .route("/templates/{id}/archive", post(handlers::listings::archive_template))
        .route("/review/queue", get(handlers::listings::review_queue))
        // Community submissions
        .route("/ideas", get(handlers::ideas::list_ideas).post(handlers::ideas::create_idea))
        .route("/ideas/{id}", delete(handlers::ideas::delete_idea))
        .route(
            "/concepts",
            get(handlers::concepts::list_concepts).post(handlers::concepts::create_concept),
        )
        .route("/concepts/{id}", delete(handlers::concepts::delete_concept))
        // Profiles
        .route(
            "/profiles/me",
            get(handlers::profiles::get_my_profile).patch(handlers::profiles::update_my_profile),
        )
        .route("/profiles/{id}", get(handlers::profiles::get_profile))
        // Purchasing and assistant
        .route("/checkout", post(handlers::checkout::create_checkout))
        .route("/assistant/chat", post(handlers::assistant::chat))
        // Cache warming intent
        .route("/prefetch", post(handlers::prefetch::prefetch))
        // Cookie consent
        .route("/consent", get(handlers::consent::get_consent).put(handlers::consent::put_consent))
        // Blog
        .route("/posts", get(handlers::posts::list_posts))
        .route("/posts/{slug}", get(handlers::posts::get_post))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/sitemap.xml", get(handlers::sitemap::sitemap_xml))
        .route("/robots.txt", get(handlers::sitemap::robots_txt))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .route("/docs", get(|| async { Redirect::temporary("/api-docs/openapi.json") }))
        .with_state(state.clone())
        .nest("/api/v1", api_routes)
        .fallback(get(handlers::static_assets::serve_embedded_asset));

    // Route-history tracking + marketplace warming for page navigations
    let router = router.layer(from_fn_with_state(state.clone(), prefetch::track_routes));

    // CORS from config
    let mut router = router.layer(create_cors_layer(&state.config)?);

    // Prometheus metrics if enabled
    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    // Tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Container for background services and their lifecycle management.
///
/// Currently one task lives here: the query-cache sweeper. Tasks hang off a
/// cancellation token with a drop guard, so dropping the container also stops
/// them.
pub struct BackgroundServices {
    background_tasks: Vec<tokio::task::JoinHandle<()>>,
    shutdown_token: tokio_util::sync::CancellationToken,
    // Pub so that we can disarm it if we want to
    pub drop_guard: Option<tokio_util::sync::DropGuard>,
}

impl BackgroundServices {
    /// Gracefully shutdown all background tasks
    pub async fn shutdown(self) {
        self.shutdown_token.cancel();
        for handle in self.background_tasks {
            let _ = handle.await;
        }
    }
}

/// Setup background services (cache sweeper)
fn setup_background_services(state: &AppState, shutdown_token: tokio_util::sync::CancellationToken) -> BackgroundServices {
    let drop_guard = shutdown_token.clone().drop_guard();
    let mut background_tasks = Vec::new();

    let sweeper_cache = state.catalog.cache().clone();
    let sweep_interval = state.config.cache.sweep_interval;
    let sweeper_shutdown = shutdown_token.clone();
    let handle = tokio::spawn(async move {
        info!("Starting query cache sweeper (interval: {:?})", sweep_interval);
        sweeper_cache.run_sweeper(sweep_interval, sweeper_shutdown).await;
    });
    background_tasks.push(handle);

    BackgroundServices {
        background_tasks,
        shutdown_token,
        drop_guard: Some(drop_guard),
    }
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] builds the remote store client, cache,
///    providers and router, and starts background services
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and handles
///    requests until the shutdown future resolves
/// 3. **Shutdown**: background tasks are stopped and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
    bg_services: BackgroundServices,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting storefront layer with configuration: {:#?}", config);

        let client = DataClient::new(&config.backend)?;
        let cache = cache::QueryCache::new(&config.cache);
        let catalog = Catalog::new(client, cache);
        let checkout_provider: Arc<dyn CheckoutProvider> = Arc::from(checkout::create_provider(&config.checkout, &config.backend)?);
        let assistant_client = AssistantClient::new(config.assistant.clone())?;

        let state = AppState::builder()
            .config(config.clone())
            .catalog(catalog)
            .route_history(RouteHistory::in_memory())
            .checkout(checkout_provider)
            .assistant(assistant_client)
            .build();

        let shutdown_token = tokio_util::sync::CancellationToken::new();
        let bg_services = setup_background_services(&state, shutdown_token);

        let router = build_router(state)?;

        Ok(Self {
            router,
            config,
            bg_services,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> (axum_test::TestServer, BackgroundServices) {
        let server = axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server");
        (server, self.bg_services)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Storefront layer listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        // Shutdown background services and wait for tasks to complete
        self.bg_services.shutdown().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::auth::session::mint_test_token;
    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const JWT_SECRET: &str = "test-jwt-secret";

    fn test_config(backend: &MockServer) -> Config {
        Config {
            backend: crate::config::BackendConfig {
                url: url::Url::parse(&format!("{}/rest/v1/", backend.uri())).unwrap(),
                service_key: "service-key".to_string(),
                request_timeout: std::time::Duration::from_secs(2),
            },
            auth: crate::config::AuthConfig {
                jwt_secret: Some(JWT_SECRET.to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    async fn test_server(backend: &MockServer) -> (axum_test::TestServer, BackgroundServices) {
        Application::new(test_config(backend)).expect("application builds").into_test_server()
    }

    fn listing_json(id: Uuid, user_id: Uuid, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "title": "Portfolio",
            "description": "A portfolio template",
            "category": "portfolio",
            "tags": ["minimal"],
            "price_cents": 2900,
            "preview_image_url": null,
            "demo_url": null,
            "status": status,
            "featured": status == "featured",
            "views": 12,
            "downloads": 3,
            "rating_avg": 4.5,
            "rating_count": 2,
            "created_at": "2026-01-04T10:00:00Z",
            "updated_at": "2026-01-04T10:00:00Z",
            "approved_at": null,
            "featured_at": null,
            "profile": { "display_name": "Dana", "avatar_url": null }
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_healthz() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        assert_eq!(response.text(), "OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_browse_templates_maps_records_to_responses() {
        let backend = MockServer::start().await;
        let id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/rest/v1/websites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(id, Uuid::new_v4(), "approved")])))
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;
        let response = server.get("/api/v1/templates").await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        assert_eq!(body[0]["id"], json!(id));
        assert_eq!(body[0]["seller"]["display_name"], json!("Dana"));
    }

    #[test_log::test(tokio::test)]
    async fn test_include_all_is_admin_only() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        // Anonymous
        let response = server.get("/api/v1/templates?include_all=true").await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Standard user
        let token = mint_test_token(Uuid::new_v4(), "user@example.com", None, JWT_SECRET);
        let response = server
            .get("/api/v1/templates?include_all=true")
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[test_log::test(tokio::test)]
    async fn test_mine_requires_auth() {
        let backend = MockServer::start().await;
        let user_id = Uuid::new_v4();
        Mock::given(method("GET"))
            .and(path("/rest/v1/websites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(Uuid::new_v4(), user_id, "pending")])))
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;

        let response = server.get("/api/v1/templates?mine=true").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let token = mint_test_token(user_id, "maker@example.com", None, JWT_SECRET);
        let response = server
            .get("/api/v1/templates?mine=true")
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body[0]["status"], json!("pending"));
    }

    #[test_log::test(tokio::test)]
    async fn test_submission_requires_auth_and_queues_for_review() {
        let backend = MockServer::start().await;
        let user_id = Uuid::new_v4();
        let listing_id = Uuid::new_v4();

        Mock::given(method("POST"))
            .and(path("/rest/v1/websites"))
            .and(body_partial_json(json!({"status": "pending", "user_id": user_id})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([listing_json(listing_id, user_id, "pending")])))
            .expect(1)
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;
        let create = json!({
            "title": "Portfolio",
            "description": "A portfolio template",
            "category": "portfolio",
            "price_cents": 2900,
            "preview_image_url": null,
            "demo_url": null
        });

        // Unauthenticated: rejected before any store call
        let response = server.post("/api/v1/templates").json(&create).await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        // Authenticated standard user: created as pending
        let token = mint_test_token(user_id, "maker@example.com", None, JWT_SECRET);
        let response = server
            .post("/api/v1/templates")
            .add_header("authorization", format!("Bearer {token}"))
            .json(&create)
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], json!("pending"));
    }

    #[test_log::test(tokio::test)]
    async fn test_review_actions_are_admin_gated() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;
        let id = Uuid::new_v4();

        let token = mint_test_token(Uuid::new_v4(), "user@example.com", None, JWT_SECRET);
        let response = server
            .post(&format!("/api/v1/templates/{id}/approve"))
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        response.assert_status(StatusCode::FORBIDDEN);
    }

    #[test_log::test(tokio::test)]
    async fn test_admin_approves_pending_listing() {
        let backend = MockServer::start().await;
        let id = Uuid::new_v4();
        let owner = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/websites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(id, owner, "pending")])))
            .mount(&backend)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/websites"))
            .and(body_partial_json(json!({"status": "approved"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(id, owner, "approved")])))
            .expect(1)
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;
        let token = mint_test_token(Uuid::new_v4(), "ops@example.com", Some("admin"), JWT_SECRET);
        let response = server
            .post(&format!("/api/v1/templates/{id}/approve"))
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], json!("approved"));
    }

    #[test_log::test(tokio::test)]
    async fn test_invalid_review_transition_is_a_conflict() {
        let backend = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/websites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(id, Uuid::new_v4(), "rejected")])))
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;
        let token = mint_test_token(Uuid::new_v4(), "ops@example.com", Some("admin"), JWT_SECRET);
        let response = server
            .post(&format!("/api/v1/templates/{id}/feature"))
            .add_header("authorization", format!("Bearer {token}"))
            .await;
        response.assert_status(StatusCode::CONFLICT);
        let body: serde_json::Value = response.json();
        assert_eq!(body["from"], json!("rejected"));
        assert_eq!(body["to"], json!("featured"));
    }

    #[test_log::test(tokio::test)]
    async fn test_checkout_returns_redirect_url_for_purchasable_listing() {
        let backend = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/websites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(id, Uuid::new_v4(), "approved")])))
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;
        let token = mint_test_token(Uuid::new_v4(), "buyer@example.com", None, JWT_SECRET);
        let response = server
            .post("/api/v1/checkout")
            .add_header("authorization", format!("Bearer {token}"))
            .json(&json!({"productId": id, "currency": "USD"}))
            .await;
        response.assert_status_ok();

        let body: serde_json::Value = response.json();
        let url = body["url"].as_str().expect("redirect url");
        assert!(url.contains("dummy_session"), "dummy provider url: {url}");
        assert!(url.contains("currency=usd"));
    }

    #[test_log::test(tokio::test)]
    async fn test_checkout_refuses_pending_listings() {
        let backend = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/websites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([listing_json(id, Uuid::new_v4(), "pending")])))
            .mount(&backend)
            .await;

        let (server, _bg) = test_server(&backend).await;
        let token = mint_test_token(Uuid::new_v4(), "buyer@example.com", None, JWT_SECRET);
        let response = server
            .post("/api/v1/checkout")
            .add_header("authorization", format!("Bearer {token}"))
            .json(&json!({"product_id": id}))
            .await;
        response.assert_status(StatusCode::CONFLICT);
    }

    #[test_log::test(tokio::test)]
    async fn test_consent_round_trip() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        // No choice persisted yet: the banner shows
        let response = server.get("/api/v1/consent").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["choice"], json!(null));

        // Persist a choice
        let response = server.put("/api/v1/consent").json(&json!({"choice": "declined"})).await;
        response.assert_status_ok();
        let set_cookie = response
            .headers()
            .get("set-cookie")
            .and_then(|v| v.to_str().ok())
            .expect("consent cookie set")
            .to_string();
        assert!(set_cookie.contains("bf_cookie_consent=declined"));
        assert!(set_cookie.contains("Max-Age=31536000"));

        // Subsequent loads see the choice and suppress the banner
        let cookie_pair = set_cookie.split(';').next().unwrap().to_string();
        let response = server.get("/api/v1/consent").add_header("cookie", cookie_pair).await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["choice"], json!("declined"));
    }

    #[test_log::test(tokio::test)]
    async fn test_sitemap_covers_static_routes_and_blog_posts() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        let response = server.get("/sitemap.xml").await;
        response.assert_status_ok();
        assert_eq!(
            response.headers().get("content-type").map(|v| v.to_str().unwrap()),
            Some("application/xml")
        );

        let xml = response.text();
        let expected = crate::sitemap::STATIC_ROUTES.len() + crate::content::blog_slugs().len();
        assert_eq!(xml.matches("<url>").count(), expected);
        assert!(xml.contains("/blog/launch-checklist</loc>"));
    }

    #[test_log::test(tokio::test)]
    async fn test_assistant_disabled_by_default() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        let response = server
            .post("/api/v1/assistant/chat")
            .json(&json!({"messages": [{"role": "user", "content": "hi"}]}))
            .await;
        response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test_log::test(tokio::test)]
    async fn test_page_visits_mint_a_session_cookie() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        let response = server.get("/pricing").await;
        response.assert_status_ok();
        let set_cookie = response.headers().get("set-cookie").and_then(|v| v.to_str().ok()).unwrap_or("");
        assert!(set_cookie.contains("bf_session="), "session cookie expected, got: {set_cookie}");

        // API calls are not page visits and must not mint sessions
        let response = server.get("/api/v1/consent").await;
        assert!(response.headers().get("set-cookie").is_none());
    }

    #[test_log::test(tokio::test)]
    async fn test_blog_endpoints_serve_embedded_content() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        let response = server.get("/api/v1/posts").await;
        response.assert_status_ok();
        let posts: serde_json::Value = response.json();
        assert!(posts.as_array().map(|a| !a.is_empty()).unwrap_or(false));

        let response = server.get("/api/v1/posts/launch-checklist").await;
        response.assert_status_ok();
        let post: serde_json::Value = response.json();
        assert_eq!(post["title"], json!("The ten-minute launch checklist"));

        let response = server.get("/api/v1/posts/not-a-post").await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_public_config_is_served() {
        let backend = MockServer::start().await;
        let (server, _bg) = test_server(&backend).await;

        let response = server.get("/api/v1/config").await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body["site_name"], json!("Bayfront"));
        assert_eq!(body["assistant_enabled"], json!(false));
    }
}
