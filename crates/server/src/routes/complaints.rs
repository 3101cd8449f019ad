use crate::{
    auth::{
        AuthUser,
        policy::{require_department_access, require_manager},
    },
    dtos::{
        MessageResponse,
        complaint::{
            AssignComplaintRequest, ComplaintDetailResponse, ComplaintQueryParams,
            ComplaintResponse, UpdateComplaintStatusRequest,
        },
    },
    error::{ApiError, ApiResult},
    state::SharedState,
    uploads::UploadForm,
};
use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, patch, put},
};
use database::{
    entities::{complaints, users},
    services::{
        complaint::{ComplaintScope, ComplaintService, NewComplaint},
        user::UserService,
    },
};
use log::info;
use models::{complaint::ComplaintStatus, priority::Priority, role::Role};
use uuid::Uuid;

const CATEGORY: &str = "complaints";

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_complaints).post(create_complaint))
        .route("/{id}", get(get_complaint).delete(delete_complaint))
        .route("/{id}/status", patch(update_status))
        .route("/{id}/assign", put(assign_complaint))
}

fn scope_for(actor: &users::Model) -> ComplaintScope {
    match (actor.role, actor.department_id) {
        (Role::Admin, _) => ComplaintScope::All,
        (Role::DepartmentAdmin, Some(department_id)) => ComplaintScope::Department(department_id),
        _ => ComplaintScope::Involving(actor.id),
    }
}

fn require_can_view(actor: &users::Model, complaint: &complaints::Model) -> ApiResult<()> {
    let allowed = match scope_for(actor) {
        ComplaintScope::All => true,
        ComplaintScope::Department(department_id) => {
            complaint.department_id == Some(department_id)
        }
        ComplaintScope::Involving(user_id) => {
            complaint.raised_by == user_id || complaint.assigned_to == Some(user_id)
        }
    };
    if allowed {
        Ok(())
    } else {
        Err(ApiError::forbidden("Not allowed to access this complaint"))
    }
}

/// Managers act on complaints of their department
fn require_handler(actor: &users::Model, complaint: &complaints::Model) -> ApiResult<()> {
    require_manager(actor)?;
    match complaint.department_id {
        Some(department_id) => require_department_access(actor, department_id),
        None if actor.role == Role::Admin => Ok(()),
        None => Err(ApiError::forbidden("Only admins handle this complaint")),
    }
}

fn new_complaint(form: &UploadForm) -> ApiResult<NewComplaint> {
    Ok(NewComplaint {
        title: form.require("title")?,
        description: form.require("description")?,
        category: form.text("category"),
        priority: form.parse::<Priority>("priority")?.unwrap_or_default(),
        attachments: form.files.clone(),
    })
}

/// Raise a complaint with optional attachments
#[utoipa::path(
    post,
    path = "/api/complaints",
    request_body(
        content_type = "multipart/form-data",
        description = "Fields: title, description, category, priority; any number of file parts"
    ),
    responses(
        (status = 201, description = "Complaint raised", body = ComplaintDetailResponse),
        (status = 400, description = "Missing title or description")
    ),
    security(("jwt" = [])),
    tag = "Complaints"
)]
pub async fn create_complaint(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<ComplaintDetailResponse>)> {
    let form = UploadForm::read(multipart, &state.uploads, CATEGORY).await?;

    let created = match new_complaint(&form) {
        Ok(new) => ComplaintService::create(&state.db, new, &actor)
            .await
            .map_err(ApiError::from),
        Err(e) => Err(e),
    };

    match created {
        Ok(detail) => Ok((StatusCode::CREATED, Json(detail.into()))),
        Err(e) => {
            for file in &form.files {
                state.uploads.remove(file).await;
            }
            Err(e)
        }
    }
}

/// Admins see all, department admins their department, everyone else their own
#[utoipa::path(
    get,
    path = "/api/complaints",
    params(ComplaintQueryParams),
    responses(
        (status = 200, description = "Complaints, newest first", body = Vec<ComplaintResponse>)
    ),
    security(("jwt" = [])),
    tag = "Complaints"
)]
pub async fn list_complaints(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ComplaintQueryParams>,
) -> ApiResult<Json<Vec<ComplaintResponse>>> {
    let complaints = ComplaintService::list(&state.db, scope_for(&actor), params.status).await?;
    Ok(Json(complaints.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint with its history", body = ComplaintDetailResponse),
        (status = 403, description = "Not allowed to access this complaint"),
        (status = 404, description = "Complaint not found")
    ),
    security(("jwt" = [])),
    tag = "Complaints"
)]
pub async fn get_complaint(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ComplaintDetailResponse>> {
    let detail = ComplaintService::get(&state.db, id).await?;
    require_can_view(&actor, &detail.complaint)?;
    Ok(Json(detail.into()))
}

/// Moves a complaint through its lifecycle
#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/status",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = UpdateComplaintStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = ComplaintDetailResponse),
        (status = 400, description = "Transition not allowed"),
        (status = 403, description = "Managers of the department only"),
        (status = 404, description = "Complaint not found")
    ),
    security(("jwt" = [])),
    tag = "Complaints"
)]
pub async fn update_status(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateComplaintStatusRequest>,
) -> ApiResult<Json<ComplaintDetailResponse>> {
    let current = ComplaintService::get(&state.db, id).await?;
    require_handler(&actor, &current.complaint)?;

    let detail = ComplaintService::update_status(&state.db, id, body.into(), actor.id).await?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    put,
    path = "/api/complaints/{id}/assign",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    request_body = AssignComplaintRequest,
    responses(
        (status = 200, description = "Complaint assigned", body = ComplaintDetailResponse),
        (status = 400, description = "Assignee cannot handle complaints, or complaint closed"),
        (status = 403, description = "Managers of the department only"),
        (status = 404, description = "Complaint or assignee not found")
    ),
    security(("jwt" = [])),
    tag = "Complaints"
)]
pub async fn assign_complaint(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignComplaintRequest>,
) -> ApiResult<Json<ComplaintDetailResponse>> {
    let current = ComplaintService::get(&state.db, id).await?;
    require_handler(&actor, &current.complaint)?;
    if actor.role == Role::DepartmentAdmin {
        let assignee = UserService::get(&state.db, body.assignee_id).await?;
        if assignee.department_id != actor.department_id {
            return Err(ApiError::forbidden(
                "Complaints can only be assigned within your department",
            ));
        }
    }

    let detail = ComplaintService::assign(&state.db, id, body.assignee_id, actor.id).await?;
    Ok(Json(detail.into()))
}

/// Owners may withdraw a pending complaint, admins may delete any
#[utoipa::path(
    delete,
    path = "/api/complaints/{id}",
    params(("id" = Uuid, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint deleted", body = MessageResponse),
        (status = 403, description = "Only the owner while pending, or an admin"),
        (status = 404, description = "Complaint not found")
    ),
    security(("jwt" = [])),
    tag = "Complaints"
)]
pub async fn delete_complaint(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let current = ComplaintService::get(&state.db, id).await?;
    let complaint = &current.complaint;
    let owner_withdrawing =
        complaint.raised_by == actor.id && complaint.status == ComplaintStatus::Pending;
    if actor.role != Role::Admin && !owner_withdrawing {
        return Err(ApiError::forbidden(
            "Only the owner of a pending complaint or an admin can delete it",
        ));
    }

    let deleted = ComplaintService::delete(&state.db, id).await?;
    for file in &deleted.attachments.0 {
        state.uploads.remove(file).await;
    }

    info!("Complaint {id} deleted by {}", actor.id);
    Ok(Json(MessageResponse::new("Complaint deleted")))
}
