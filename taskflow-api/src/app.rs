/// Application state and router builder
///
/// # Router layout
///
/// ```text
/// /
/// ├── /health                        # health check (public)
/// └── /api/
///     ├── /auth/                     # public
///     │   ├── POST /signup
///     │   ├── POST /login
///     │   └── POST /refresh          # authenticated by the refresh cookie
///     └── /tasks/                    # behind the auth gate
///         ├── POST   /
///         ├── GET    /
///         ├── GET    /:id
///         ├── PUT    /:id
///         ├── DELETE /:id
///         └── GET    /analytics/dashboard
/// ```
///
/// Middleware, outermost first: security headers, CORS, request tracing;
/// the auth gate applies only to the task routes.

use crate::{config::Config, middleware::security::security_headers, routes};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskflow_shared::auth::middleware::{auth_gate, AuthError};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned per request by Axum's `State` extractor; the config sits behind
/// an `Arc` so the clone is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Access-token signing key
    pub fn access_secret(&self) -> &str {
        &self.config.jwt.access_secret
    }

    /// Refresh-token signing key
    pub fn refresh_secret(&self) -> &str {
        &self.config.jwt.refresh_secret
    }
}

/// Builds the complete router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route(
            "/analytics/dashboard",
            get(routes::tasks::dashboard_analytics),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(middleware::from_fn_with_state(state.clone(), access_gate));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    let cors = build_cors(&state.config.api.cors_origins);

    Router::new()
        .route("/health", get(routes::health::health_check))
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

/// Auth gate wired to the configured access secret
async fn access_gate(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    auth_gate(state.access_secret().to_string(), req, next).await
}

/// CORS for the browser client
///
/// The client sends the access token in a header but receives the refresh
/// token in a cookie, so credentials must be allowed; `*` therefore
/// reflects the request origin rather than sending a literal wildcard,
/// which browsers reject alongside credentials.
fn build_cors(origins: &[String]) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    } else {
        let origins: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    }
}
