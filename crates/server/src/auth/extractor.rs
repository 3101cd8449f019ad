use crate::{
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use database::{entities::users, services::user::UserService};

/// The signed-in user behind a bearer token
#[derive(Debug, Clone)]
pub struct AuthUser(pub users::Model);

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(ApiError::unauthorized)?;

        authenticate(state, token.trim()).await.map(AuthUser)
    }
}

/// Resolves a token to an active user
pub async fn authenticate(state: &SharedState, token: &str) -> ApiResult<users::Model> {
    let claims = state
        .jwt
        .decode(token)
        .map_err(|_| ApiError::unauthorized())?;
    let user_id = claims.user_id().ok_or_else(ApiError::unauthorized)?;

    let user = UserService::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".into()))?;
    if !user.status.is_active() {
        return Err(ApiError::forbidden("Account is inactive"));
    }

    Ok(user)
}
