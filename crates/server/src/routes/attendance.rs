use crate::{
    auth::{
        AuthUser,
        policy::{require_department_access, require_role},
    },
    dtos::attendance::{
        AttendanceQueryParams, AttendanceResponse, MarkAttendanceRequest,
        StudentAttendanceResponse, UpdateAttendanceRequest,
    },
    error::{ApiError, ApiResult},
    routes::users::require_can_view,
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
};
use database::{
    entities::users,
    services::{
        attendance::{AttendanceService, NewAttendance},
        class::ClassService,
        user::UserService,
    },
};
use models::role::Role;
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(mark_attendance))
        .route("/{id}", put(update_attendance))
        .route("/class/{class_id}", get(class_attendance))
        .route("/student/{student_id}", get(student_attendance))
}

/// Admins, the department's admin, or the faculty teaching the subject to the class
async fn require_can_mark(
    state: &SharedState,
    actor: &users::Model,
    class_id: Uuid,
    subject_id: Uuid,
) -> ApiResult<()> {
    require_role(actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;
    let class = ClassService::get(&state.db, class_id).await?;
    require_department_access(actor, class.department_id)?;

    if actor.role == Role::Faculty
        && !ClassService::teaches(&state.db, class_id, subject_id, actor.id).await?
    {
        return Err(ApiError::forbidden(
            "You are not assigned to teach this subject to this class",
        ));
    }
    Ok(())
}

/// Records attendance for one period
#[utoipa::path(
    post,
    path = "/api/attendance",
    request_body = MarkAttendanceRequest,
    responses(
        (status = 201, description = "Attendance recorded", body = AttendanceResponse),
        (status = 400, description = "Student not in class or subject not assigned"),
        (status = 403, description = "Not allowed to mark this class"),
        (status = 409, description = "Attendance already marked for this period")
    ),
    security(("jwt" = [])),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<MarkAttendanceRequest>,
) -> ApiResult<(StatusCode, Json<AttendanceResponse>)> {
    require_can_mark(&state, &actor, body.class_id, body.subject_id).await?;

    let session = AttendanceService::mark(
        &state.db,
        NewAttendance {
            class_id: body.class_id,
            subject_id: body.subject_id,
            date: body.date,
            period: body.period,
            records: body.records.into_iter().map(Into::into).collect(),
        },
        Some(actor.id),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Replaces the records of a session
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(("id" = Uuid, Path, description = "Attendance session ID")),
    request_body = UpdateAttendanceRequest,
    responses(
        (status = 200, description = "Attendance updated", body = AttendanceResponse),
        (status = 400, description = "Student not in class"),
        (status = 404, description = "Attendance not found")
    ),
    security(("jwt" = [])),
    tag = "Attendance"
)]
pub async fn update_attendance(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateAttendanceRequest>,
) -> ApiResult<Json<AttendanceResponse>> {
    let existing = AttendanceService::get(&state.db, id).await?;
    require_can_mark(
        &state,
        &actor,
        existing.attendance.class_id,
        existing.attendance.subject_id,
    )
    .await?;

    let records = body.records.into_iter().map(Into::into).collect();
    let session = AttendanceService::update(&state.db, id, records).await?;
    Ok(Json(session.into()))
}

#[utoipa::path(
    get,
    path = "/api/attendance/class/{class_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        AttendanceQueryParams
    ),
    responses(
        (status = 200, description = "Sessions, newest first", body = Vec<AttendanceResponse>),
        (status = 403, description = "Staff of the department only"),
        (status = 404, description = "Class not found")
    ),
    security(("jwt" = [])),
    tag = "Attendance"
)]
pub async fn class_attendance(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(class_id): Path<Uuid>,
    Query(params): Query<AttendanceQueryParams>,
) -> ApiResult<Json<Vec<AttendanceResponse>>> {
    require_role(&actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;
    let class = ClassService::get(&state.db, class_id).await?;
    require_department_access(&actor, class.department_id)?;

    let sessions = AttendanceService::for_class(&state.db, class_id, params.into()).await?;
    Ok(Json(sessions.into_iter().map(Into::into).collect()))
}

/// Per-subject and overall attendance of a student
#[utoipa::path(
    get,
    path = "/api/attendance/student/{student_id}",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Attendance summary", body = StudentAttendanceResponse),
        (status = 403, description = "Students may only view their own attendance"),
        (status = 404, description = "Student not found")
    ),
    security(("jwt" = [])),
    tag = "Attendance"
)]
pub async fn student_attendance(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(student_id): Path<Uuid>,
) -> ApiResult<Json<StudentAttendanceResponse>> {
    let student = UserService::get(&state.db, student_id).await?;
    require_can_view(&actor, &student)?;

    let summary = AttendanceService::student_summary(&state.db, student_id).await?;
    Ok(Json(summary.into()))
}
