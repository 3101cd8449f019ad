use crate::{
    auth::{
        AuthUser,
        password::{hash_password, validate_new_password, verify_password},
    },
    dtos::{
        MessageResponse,
        auth::{
            ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse,
            ResetPasswordRequest,
        },
        user::UserResponse,
    },
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use chrono::{Duration, Utc};
use database::services::user::UserService;
use log::{info, warn};
use rand::{Rng, distributions::Alphanumeric};

const RESET_TOKEN_LEN: usize = 40;
const RESET_TOKEN_TTL_HOURS: i64 = 1;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/login", post(login))
        .route("/me", get(me))
        .route("/change-password", put(change_password))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
}

/// Exchanges email and password for a bearer token
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = LoginResponse),
        (status = 401, description = "Invalid email or password"),
        (status = 403, description = "Account is inactive")
    ),
    tag = "Authentication"
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(body): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let invalid = || ApiError::Unauthorized("Invalid email or password".into());

    let user = UserService::find_by_email(&state.db, &body.email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&body.password, &user.password_hash) {
        warn!("Failed sign-in for {}", user.email);
        return Err(invalid());
    }
    if !user.status.is_active() {
        return Err(ApiError::forbidden("Account is inactive"));
    }

    let token = state
        .jwt
        .issue(user.id, user.role)
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    info!("User {} signed in", user.id);
    Ok(Json(LoginResponse {
        token,
        user: user.into(),
    }))
}

/// The signed-in user's profile
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized - invalid or missing JWT")
    ),
    security(("jwt" = [])),
    tag = "Authentication"
)]
pub async fn me(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(user.into())
}

#[utoipa::path(
    put,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "New password too short"),
        (status = 401, description = "Current password is wrong")
    ),
    security(("jwt" = [])),
    tag = "Authentication"
)]
pub async fn change_password(
    State(state): State<SharedState>,
    AuthUser(user): AuthUser,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if !verify_password(&body.current_password, &user.password_hash) {
        return Err(ApiError::Unauthorized(
            "Current password is incorrect".into(),
        ));
    }
    validate_new_password(&body.new_password)?;

    UserService::set_password(&state.db, user.id, hash_password(&body.new_password)?).await?;
    Ok(Json(MessageResponse::new("Password updated")))
}

/// Issues a one hour reset token; the reply never reveals whether the email exists
#[utoipa::path(
    post,
    path = "/api/auth/forgot-password",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Reset instructions sent if the account exists", body = MessageResponse)
    ),
    tag = "Authentication"
)]
pub async fn forgot_password(
    State(state): State<SharedState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    if let Some(user) = UserService::find_by_email(&state.db, &body.email).await? {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(RESET_TOKEN_LEN)
            .map(char::from)
            .collect();
        let expires_at = (Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS)).naive_utc();
        UserService::set_reset_token(&state.db, user.id, token.clone(), expires_at).await?;

        // no mail delivery, the token is only logged
        match &state.config.mail.from {
            Some(from) => info!(
                "Password reset token for {} (from {from}): {token}",
                user.email
            ),
            None => info!("Password reset token for {}: {token}", user.email),
        }
    }

    Ok(Json(MessageResponse::new(
        "If the email is registered, a reset link has been sent",
    )))
}

#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password reset", body = MessageResponse),
        (status = 400, description = "Invalid or expired token")
    ),
    tag = "Authentication"
)]
pub async fn reset_password(
    State(state): State<SharedState>,
    Json(body): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    validate_new_password(&body.new_password)?;

    let user = UserService::find_by_reset_token(&state.db, body.token.trim())
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired reset token"))?;
    UserService::set_password(&state.db, user.id, hash_password(&body.new_password)?).await?;

    info!("Password reset for user {}", user.id);
    Ok(Json(MessageResponse::new("Password has been reset")))
}
