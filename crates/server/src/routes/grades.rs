use crate::{
    auth::{
        AuthUser,
        policy::{require_department_access, require_manager, require_role},
    },
    dtos::grade::{
        BulkGradeRequest, GradeQueryParams, GradeRequest, GradeResponse, GradeSummaryResponse,
        ReleaseGradesRequest, ReleaseGradesResponse, StudentGradeResponse, SubjectGradeResponse,
    },
    error::{ApiError, ApiResult},
    routes::users::require_can_view,
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use database::{
    entities::users,
    services::{
        class::ClassService, grade::GradeService, subject::SubjectService, user::UserService,
    },
};
use models::role::Role;
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", post(save_grade))
        .route("/bulk", post(save_grades))
        .route("/release", post(release_grades))
        .route("/student/{student_id}", get(student_grades))
        .route("/student/{student_id}/summary", get(student_summary))
        .route("/class/{class_id}/subject/{subject_id}", get(class_subject_grades))
}

/// Managers of the subject's department, or faculty teaching it to the student's class
async fn require_can_grade(
    state: &SharedState,
    actor: &users::Model,
    request: &GradeRequest,
) -> ApiResult<()> {
    require_role(actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;
    let subject = SubjectService::get(&state.db, request.subject_id).await?;
    require_department_access(actor, subject.department_id)?;

    if actor.role == Role::Faculty {
        let student = UserService::get(&state.db, request.student_id).await?;
        let teaches = match student.class_id {
            Some(class_id) => {
                ClassService::teaches(&state.db, class_id, subject.id, actor.id).await?
            }
            None => false,
        };
        if !teaches {
            return Err(ApiError::forbidden(
                "You do not teach this subject to the student's class",
            ));
        }
    }
    Ok(())
}

/// Students only ever see released grades
fn released_only(viewer: &users::Model) -> bool {
    viewer.role == Role::Student
}

/// Inserts or updates one student's marks
#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = GradeRequest,
    responses(
        (status = 200, description = "Grade saved", body = GradeResponse),
        (status = 400, description = "Marks out of range"),
        (status = 403, description = "Not allowed to grade this subject")
    ),
    security(("jwt" = [])),
    tag = "Grades"
)]
pub async fn save_grade(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<GradeRequest>,
) -> ApiResult<Json<GradeResponse>> {
    require_can_grade(&state, &actor, &body).await?;
    let grade = GradeService::upsert(&state.db, body.into(), Some(actor.id)).await?;
    Ok(Json(grade.into()))
}

/// Saves a batch of grades, all or nothing
#[utoipa::path(
    post,
    path = "/api/grades/bulk",
    request_body = BulkGradeRequest,
    responses(
        (status = 200, description = "Grades saved", body = Vec<GradeResponse>),
        (status = 400, description = "Some marks are out of range"),
        (status = 403, description = "Not allowed to grade one of the subjects")
    ),
    security(("jwt" = [])),
    tag = "Grades"
)]
pub async fn save_grades(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<BulkGradeRequest>,
) -> ApiResult<Json<Vec<GradeResponse>>> {
    for request in &body.grades {
        require_can_grade(&state, &actor, request).await?;
    }

    let inputs = body.grades.into_iter().map(Into::into).collect();
    let grades = GradeService::bulk_upsert(&state.db, inputs, Some(actor.id)).await?;
    Ok(Json(grades.into_iter().map(Into::into).collect()))
}

/// Publishes a class's grades for a semester and recomputes SGPA and CGPA
#[utoipa::path(
    post,
    path = "/api/grades/release",
    request_body = ReleaseGradesRequest,
    responses(
        (status = 200, description = "Grades released", body = ReleaseGradesResponse),
        (status = 403, description = "Managers of the department only"),
        (status = 404, description = "Class not found")
    ),
    security(("jwt" = [])),
    tag = "Grades"
)]
pub async fn release_grades(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<ReleaseGradesRequest>,
) -> ApiResult<Json<ReleaseGradesResponse>> {
    require_manager(&actor)?;
    let class = ClassService::get(&state.db, body.class_id).await?;
    require_department_access(&actor, class.department_id)?;

    let outcome = GradeService::release(&state.db, body.class_id, body.semester).await?;
    Ok(Json(outcome.into()))
}

#[utoipa::path(
    get,
    path = "/api/grades/student/{student_id}",
    params(
        ("student_id" = Uuid, Path, description = "Student ID"),
        GradeQueryParams
    ),
    responses(
        (status = 200, description = "Grades with their subjects", body = Vec<SubjectGradeResponse>),
        (status = 403, description = "Not allowed to view this student"),
        (status = 404, description = "Student not found")
    ),
    security(("jwt" = [])),
    tag = "Grades"
)]
pub async fn student_grades(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(student_id): Path<Uuid>,
    Query(params): Query<GradeQueryParams>,
) -> ApiResult<Json<Vec<SubjectGradeResponse>>> {
    let student = UserService::get(&state.db, student_id).await?;
    require_can_view(&actor, &student)?;

    let grades =
        GradeService::for_student(&state.db, student_id, params.semester, released_only(&actor))
            .await?;
    Ok(Json(grades.into_iter().map(Into::into).collect()))
}

/// Semester records and CGPA
#[utoipa::path(
    get,
    path = "/api/grades/student/{student_id}/summary",
    params(("student_id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Semester summary", body = GradeSummaryResponse),
        (status = 403, description = "Not allowed to view this student"),
        (status = 404, description = "Student not found")
    ),
    security(("jwt" = [])),
    tag = "Grades"
)]
pub async fn student_summary(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(student_id): Path<Uuid>,
) -> ApiResult<Json<GradeSummaryResponse>> {
    let student = UserService::get(&state.db, student_id).await?;
    require_can_view(&actor, &student)?;

    let summary = GradeService::summary(&state.db, student_id, released_only(&actor)).await?;
    Ok(Json(summary.into()))
}

#[utoipa::path(
    get,
    path = "/api/grades/class/{class_id}/subject/{subject_id}",
    params(
        ("class_id" = Uuid, Path, description = "Class ID"),
        ("subject_id" = Uuid, Path, description = "Subject ID")
    ),
    responses(
        (status = 200, description = "Grades of the class, by roll number", body = Vec<StudentGradeResponse>),
        (status = 403, description = "Not allowed to view this class"),
        (status = 404, description = "Class not found")
    ),
    security(("jwt" = [])),
    tag = "Grades"
)]
pub async fn class_subject_grades(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((class_id, subject_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Vec<StudentGradeResponse>>> {
    require_role(&actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;
    let class = ClassService::get(&state.db, class_id).await?;
    require_department_access(&actor, class.department_id)?;
    if actor.role == Role::Faculty
        && !ClassService::teaches(&state.db, class_id, subject_id, actor.id).await?
    {
        return Err(ApiError::forbidden(
            "You are not assigned to teach this subject to this class",
        ));
    }

    let grades = GradeService::for_class_subject(&state.db, class_id, subject_id).await?;
    Ok(Json(grades.into_iter().map(Into::into).collect()))
}
