use crate::{
    auth::{
        AuthUser,
        policy::{department_scope, require_department_access, require_manager},
    },
    dtos::{
        MessageResponse,
        subject::{
            AddFacultyRequest, CreateSubjectRequest, SubjectDetailResponse, SubjectQueryParams,
            SubjectResponse, UpdateSubjectRequest,
        },
    },
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use database::{
    entities::users,
    services::subject::{NewSubject, SubjectChanges, SubjectFilter, SubjectService},
};
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_subjects).post(create_subject))
        .route(
            "/{id}",
            get(get_subject).put(update_subject).delete(delete_subject),
        )
        .route("/{id}/faculty", post(add_faculty))
        .route("/{id}/faculty/{faculty_id}", delete(remove_faculty))
}

async fn require_subject_manager(
    state: &SharedState,
    actor: &users::Model,
    id: Uuid,
) -> ApiResult<()> {
    require_manager(actor)?;
    let subject = SubjectService::get(&state.db, id).await?;
    require_department_access(actor, subject.department_id)
}

#[utoipa::path(
    post,
    path = "/api/subjects",
    request_body = CreateSubjectRequest,
    responses(
        (status = 201, description = "Subject created", body = SubjectResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Managers of the department only"),
        (status = 409, description = "Subject code already exists")
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn create_subject(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateSubjectRequest>,
) -> ApiResult<(StatusCode, Json<SubjectResponse>)> {
    require_manager(&actor)?;
    let department_id = body
        .department_id
        .or(actor.department_id)
        .ok_or_else(|| ApiError::bad_request("departmentId is required"))?;
    require_department_access(&actor, department_id)?;

    let subject = SubjectService::create(
        &state.db,
        NewSubject {
            name: body.name,
            code: body.code,
            credits: body.credits,
            semester: body.semester,
            department_id,
            description: body.description,
            faculty_ids: body.faculty_ids,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(subject.into())))
}

#[utoipa::path(
    get,
    path = "/api/subjects",
    params(SubjectQueryParams),
    responses(
        (status = 200, description = "Subjects matching the filters", body = Vec<SubjectResponse>)
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn list_subjects(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<SubjectQueryParams>,
) -> ApiResult<Json<Vec<SubjectResponse>>> {
    let filter = SubjectFilter {
        department_id: department_scope(&actor).or(params.department_id),
        semester: params.semester,
    };
    let subjects = SubjectService::list(&state.db, filter).await?;
    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

/// A subject with its faculty and the classes it is taught in
#[utoipa::path(
    get,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject found", body = SubjectDetailResponse),
        (status = 404, description = "Subject not found")
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn get_subject(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SubjectDetailResponse>> {
    let detail = SubjectService::detail(&state.db, id).await?;
    require_department_access(&actor, detail.subject.department_id)?;
    Ok(Json(detail.into()))
}

#[utoipa::path(
    put,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    request_body = UpdateSubjectRequest,
    responses(
        (status = 200, description = "Subject updated", body = SubjectResponse),
        (status = 404, description = "Subject not found"),
        (status = 409, description = "Subject code already exists")
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn update_subject(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateSubjectRequest>,
) -> ApiResult<Json<SubjectResponse>> {
    require_subject_manager(&state, &actor, id).await?;

    let subject = SubjectService::update(
        &state.db,
        id,
        SubjectChanges {
            name: body.name,
            code: body.code,
            credits: body.credits,
            semester: body.semester,
            description: body.description,
        },
    )
    .await?;
    Ok(Json(subject.into()))
}

#[utoipa::path(
    delete,
    path = "/api/subjects/{id}",
    params(("id" = Uuid, Path, description = "Subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = MessageResponse),
        (status = 404, description = "Subject not found")
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn delete_subject(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_subject_manager(&state, &actor, id).await?;
    SubjectService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Subject deleted")))
}

#[utoipa::path(
    post,
    path = "/api/subjects/{id}/faculty",
    params(("id" = Uuid, Path, description = "Subject ID")),
    request_body = AddFacultyRequest,
    responses(
        (status = 200, description = "Faculty added", body = SubjectDetailResponse),
        (status = 400, description = "Not a faculty member of the department"),
        (status = 404, description = "Subject or faculty not found")
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn add_faculty(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddFacultyRequest>,
) -> ApiResult<Json<SubjectDetailResponse>> {
    require_subject_manager(&state, &actor, id).await?;
    let detail = SubjectService::add_faculty(&state.db, id, body.faculty_id).await?;
    Ok(Json(detail.into()))
}

/// Removes a teacher, also clearing them from class assignments of the subject
#[utoipa::path(
    delete,
    path = "/api/subjects/{id}/faculty/{faculty_id}",
    params(
        ("id" = Uuid, Path, description = "Subject ID"),
        ("faculty_id" = Uuid, Path, description = "Faculty user ID")
    ),
    responses(
        (status = 200, description = "Faculty removed", body = SubjectDetailResponse),
        (status = 404, description = "Subject not found")
    ),
    security(("jwt" = [])),
    tag = "Subjects"
)]
pub async fn remove_faculty(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((id, faculty_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<SubjectDetailResponse>> {
    require_subject_manager(&state, &actor, id).await?;
    SubjectService::remove_faculty(&state.db, id, faculty_id).await?;

    let detail = SubjectService::detail(&state.db, id).await?;
    Ok(Json(detail.into()))
}
