use crate::{
    auth::AuthUser, dtos::dashboard::DashboardResponse, error::ApiResult, state::SharedState,
};
use axum::{Json, Router, extract::State, routing::get};
use database::services::dashboard::DashboardService;

pub fn router() -> Router<SharedState> {
    Router::new().route("/", get(dashboard))
}

/// Figures for the caller's role
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "Role-specific dashboard", body = DashboardResponse)
    ),
    security(("jwt" = [])),
    tag = "Dashboard"
)]
pub async fn dashboard(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<DashboardResponse>> {
    let dashboard = DashboardService::for_user(&state.db, &actor).await?;
    Ok(Json(dashboard.into()))
}
