pub mod auth;
pub mod config;
pub mod doc;
pub mod dtos;
pub mod error;
pub mod realtime;
pub mod routes;
pub mod state;
pub mod uploads;
pub mod utils;

use crate::{doc::ApiDoc, routes::health::health, state::SharedState};
use axum::{Router, extract::DefaultBodyLimit, routing::get};
use tower::ServiceBuilder;
use tower_http::{compression::CompressionLayer, services::ServeDir};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Builds the full application router around shared state
pub fn app(state: SharedState) -> Router {
    let uploads = ServeDir::new(state.uploads.root());

    Router::new()
        .route("/health", get(health))
        .nest("/api", routes::router())
        .nest_service(uploads::PUBLIC_PREFIX, uploads)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(CompressionLayer::new())
                .layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .with_state(state)
}
