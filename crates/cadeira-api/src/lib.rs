//! cadeira-api — REST API for the cadeiras catalog.
//!
//! Provides axum route handlers for listing, reading, creating, updating
//! and deleting cadeiras, plus a plain-text liveness route at `/`.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | GET | `/` | Liveness text |
//! | GET | `/api/cadeiras` | List all cadeiras, ascending id |
//! | POST | `/api/cadeiras` | Create a cadeira (201) |
//! | GET | `/api/cadeiras/:id` | Get one cadeira |
//! | PUT | `/api/cadeiras/:id` | Overwrite a cadeira |
//! | DELETE | `/api/cadeiras/:id` | Delete a cadeira (204) |
//!
//! Every error body is `{"message": "..."}`.

pub mod error;
pub mod handlers;
pub mod payload;

use axum::Router;
use axum::extract::Request;
use axum::http::{Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use cadeira_store::CadeiraStore;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: CadeiraStore,
}

/// Router-level switches.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Answer CORS preflights and allow any origin.
    pub cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { cors: true }
    }
}

/// Build the complete router (liveness + `/api` routes + middleware).
pub fn build_router(store: CadeiraStore, config: &ApiConfig) -> Router {
    let api_routes = Router::new()
        .route(
            "/cadeiras",
            get(handlers::list_cadeiras).post(handlers::create_cadeira),
        )
        .route(
            "/cadeiras/{id}",
            get(handlers::get_cadeira)
                .put(handlers::update_cadeira)
                .delete(handlers::delete_cadeira),
        )
        .with_state(ApiState { store });

    let mut router = Router::new()
        .route("/", get(handlers::liveness))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http());

    if config.cors {
        router = router
            .layer(CorsLayer::permissive())
            .layer(middleware::from_fn(preflight_no_content));
    }

    router
}

/// Answer CORS preflights with 204 instead of the layer's 200.
async fn preflight_no_content(req: Request, next: Next) -> Response {
    let preflight = req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
    let mut resp = next.run(req).await;
    if preflight && resp.status() == StatusCode::OK {
        *resp.status_mut() = StatusCode::NO_CONTENT;
    }
    resp
}
