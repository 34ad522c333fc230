//! # Satchel API
//!
//! The HTTP and WebSocket surface of the satchel exchange: bearer-token
//! sessions over the REST routes, multipart upload into the document
//! store, and the `/ws` delivery endpoint.
//!
//! ## Overview
//!
//! The crate is a thin binding layer. Every route resolves its session,
//! then calls one [`ExchangeService`] operation; all domain rules live
//! behind that call. Admin routes additionally require an elevated role,
//! enforced by the [`extract::Elevated`] extractor before the handler
//! body runs.
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//!
//! use satchel::store::MemoryStore;
//! use satchel::{ExchangeService, ServiceConfig};
//! use satchel_api::{AppState, SessionManager};
//!
//! let service = ExchangeService::new(MemoryStore::new(), ServiceConfig::default());
//! let state = AppState {
//!     service: Arc::new(service),
//!     sessions: Arc::new(SessionManager::new()),
//!     upload_dir: std::env::temp_dir(),
//! };
//! let app = satchel_api::router(state);
//! # let _ = app;
//! ```

pub mod admin;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod session;
pub mod upload;
pub mod ws;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{DefaultBodyLimit, FromRef};
use axum::routing::{get, post, put};
use axum::Router;
use satchel::store::Store;
use satchel::ExchangeService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use config::{ApiConfig, ConfigError};
pub use error::{ApiError, Result};
pub use session::{Session, SessionManager};

/// Cap on request bodies, sized for media uploads.
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Shared state behind every handler.
pub struct AppState<S: Store> {
    /// The exchange service all routes delegate to.
    pub service: Arc<ExchangeService<S>>,
    /// Live bearer sessions.
    pub sessions: Arc<SessionManager>,
    /// Where uploaded bytes land.
    pub upload_dir: PathBuf,
}

impl<S: Store> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            sessions: Arc::clone(&self.sessions),
            upload_dir: self.upload_dir.clone(),
        }
    }
}

impl<S: Store> FromRef<AppState<S>> for Arc<SessionManager> {
    fn from_ref(state: &AppState<S>) -> Self {
        Arc::clone(&state.sessions)
    }
}

/// Build the full route tree over the given state.
pub fn router<S: Store + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/api/login", post(routes::login::<S>))
        .route("/api/me", get(routes::me::<S>))
        .route(
            "/api/contacts",
            get(routes::contacts::<S>).post(routes::connect::<S>),
        )
        .route("/api/documents", get(routes::documents::<S>))
        .route("/api/upload", post(upload::upload::<S>))
        .route(
            "/api/admin/users",
            get(admin::list_users::<S>).post(admin::create_user::<S>),
        )
        .route(
            "/api/admin/users/:id",
            put(admin::update_user::<S>).delete(admin::delete_user::<S>),
        )
        .route("/api/admin/documents", get(admin::list_documents::<S>))
        .route(
            "/api/admin/permissions/:user_id",
            get(admin::user_grants::<S>),
        )
        .route("/api/admin/permissions", post(admin::set_grant::<S>))
        .route("/ws", get(ws::upgrade::<S>))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

// The legacy deployment ran fully open CORS; clients are expected to sit
// behind the same reverse proxy in production.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
}
