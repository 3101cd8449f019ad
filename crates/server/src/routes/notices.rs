use crate::{
    auth::{AuthUser, policy::require_role},
    dtos::{
        MessageResponse,
        notice::{NoticeResponse, UpdateNoticeRequest},
    },
    error::{ApiError, ApiResult},
    realtime::events,
    state::SharedState,
    uploads::UploadForm,
};
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{NaiveDateTime, Utc};
use database::{
    entities::{notices, users},
    services::notice::{NewNotice, NoticeService, is_visible},
};
use log::{info, warn};
use models::{priority::Priority, role::Role};
use uuid::Uuid;

const CATEGORY: &str = "notices";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_notices).post(create_notice))
        .route(
            "/{id}",
            get(get_notice).put(update_notice).delete(delete_notice),
        )
}

fn require_author_or_admin(actor: &users::Model, notice: &notices::Model) -> ApiResult<()> {
    if actor.role == Role::Admin || notice.author_id == actor.id {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Only the author or an admin can change this notice",
        ))
    }
}

/// Reads the text fields of a notice form, applying the author's department rules
fn new_notice(form: &UploadForm, actor: &users::Model) -> ApiResult<NewNotice> {
    let department_id = match actor.role {
        Role::Admin => form.parse::<Uuid>("departmentId")?,
        _ => {
            let requested = form.parse::<Uuid>("departmentId")?;
            if requested.is_some() && requested != actor.department_id {
                return Err(ApiError::forbidden(
                    "Notices can only target your own department",
                ));
            }
            actor.department_id
        }
    };

    Ok(NewNotice {
        title: form.require("title")?,
        content: form.require("content")?,
        category: form.text("category"),
        priority: form.parse::<Priority>("priority")?.unwrap_or_default(),
        target_roles: form.list::<Role>("targetRoles")?,
        department_id,
        class_id: form.parse::<Uuid>("classId")?,
        attachments: form.files.clone(),
        expires_at: form.parse::<NaiveDateTime>("expiresAt")?,
    })
}

/// Pushes a new notice to each connected member of its audience
async fn broadcast_notice(state: &SharedState, notice: &notices::Model, response: &NoticeResponse) {
    match NoticeService::audience(&state.db, notice).await {
        Ok(audience) => state
            .hub
            .emit_to_users(audience, events::NOTICE_NEW, response),
        Err(e) => warn!("Could not resolve the audience of notice {}: {e}", notice.id),
    }
}

/// Publish a notice with optional attachments
#[utoipa::path(
    post,
    path = "/api/notices",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields: title, content, category, priority, targetRoles (comma separated), departmentId, classId, expiresAt; any number of file parts"
    ),
    responses(
        (status = 201, description = "Notice published", body = NoticeResponse),
        (status = 400, description = "Missing title or content"),
        (status = 403, description = "Students cannot publish, staff only for their department")
    ),
    security(("jwt" = [])),
    tag = "Notices"
)]
pub async fn create_notice(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<NoticeResponse>)> {
    require_role(&actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;

    let form = UploadForm::read(multipart, &state.uploads, CATEGORY).await?;
    let created = match new_notice(&form, &actor) {
        Ok(new) => NoticeService::create(&state.db, new, actor.id)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(e),
    };
    let notice = match created {
        Ok(notice) => notice,
        Err(e) => {
            for file in &form.files {
                state.uploads.remove(file).await;
            }
            return Err(e);
        }
    };

    let response = NoticeResponse::from(notice.clone());
    broadcast_notice(&state, &notice, &response).await;
    Ok((StatusCode::CREATED, Json(response)))
}

/// Live notices addressed to the caller
#[utoipa::path(
    get,
    path = "/api/notices",
    responses(
        (status = 200, description = "Visible notices, newest first", body = Vec<NoticeResponse>)
    ),
    security(("jwt" = [])),
    tag = "Notices"
)]
pub async fn list_notices(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<NoticeResponse>>> {
    let notices = NoticeService::visible_to(&state.db, &actor).await?;
    Ok(Json(notices.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice found", body = NoticeResponse),
        (status = 404, description = "Notice not found or not addressed to the caller")
    ),
    security(("jwt" = [])),
    tag = "Notices"
)]
pub async fn get_notice(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<NoticeResponse>> {
    let notice = NoticeService::get(&state.db, id).await?;
    if !is_visible(&notice, &actor, Utc::now().naive_utc()) {
        return Err(ApiError::NotFound("Notice not found".into()));
    }
    Ok(Json(notice.into()))
}

#[utoipa::path(
    put,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    request_body = UpdateNoticeRequest,
    responses(
        (status = 200, description = "Notice updated", body = NoticeResponse),
        (status = 403, description = "Author or admin only"),
        (status = 404, description = "Notice not found")
    ),
    security(("jwt" = [])),
    tag = "Notices"
)]
pub async fn update_notice(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateNoticeRequest>,
) -> ApiResult<Json<NoticeResponse>> {
    let notice = NoticeService::get(&state.db, id).await?;
    require_author_or_admin(&actor, &notice)?;

    let notice = NoticeService::update(&state.db, id, body.into()).await?;
    Ok(Json(notice.into()))
}

/// Deletes a notice and its attachment files
#[utoipa::path(
    delete,
    path = "/api/notices/{id}",
    params(("id" = Uuid, Path, description = "Notice ID")),
    responses(
        (status = 200, description = "Notice deleted", body = MessageResponse),
        (status = 403, description = "Author or admin only"),
        (status = 404, description = "Notice not found")
    ),
    security(("jwt" = [])),
    tag = "Notices"
)]
pub async fn delete_notice(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let notice = NoticeService::get(&state.db, id).await?;
    require_author_or_admin(&actor, &notice)?;

    let deleted = NoticeService::delete(&state.db, id).await?;
    for file in &deleted.attachments.0 {
        state.uploads.remove(file).await;
    }

    info!("Notice {id} deleted by {}", actor.id);
    Ok(Json(MessageResponse::new("Notice deleted")))
}
