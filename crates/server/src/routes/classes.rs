use crate::{
    auth::{
        AuthUser,
        policy::{department_scope, require_department_access, require_manager},
    },
    dtos::{
        MessageResponse,
        class::{
            AddStudentsRequest, AssignSubjectRequest, ClassDetailResponse, ClassQueryParams,
            ClassResponse, ClassSubjectResponse, ClassTeacherRequest, CreateClassRequest,
            UpdateClassRequest,
        },
    },
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use database::{
    entities::{classes, users},
    services::class::{ClassChanges, ClassFilter, ClassService, NewClass},
};
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_classes).post(create_class))
        .route(
            "/{id}",
            get(get_class).put(update_class).delete(delete_class),
        )
        .route("/{id}/students", post(add_students))
        .route("/{id}/students/{student_id}", delete(remove_student))
        .route("/{id}/class-teacher", put(set_class_teacher))
        .route("/{id}/subjects", post(assign_subject))
        .route("/{id}/subjects/{subject_id}", delete(unassign_subject))
}

/// Loads a class the caller may manage
async fn managed_class(
    state: &SharedState,
    actor: &users::Model,
    id: Uuid,
) -> ApiResult<classes::Model> {
    require_manager(actor)?;
    let class = ClassService::get(&state.db, id).await?;
    require_department_access(actor, class.department_id)?;
    Ok(class)
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassRequest,
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Managers of the department only"),
        (status = 409, description = "Section already exists for the semester")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn create_class(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateClassRequest>,
) -> ApiResult<(StatusCode, Json<ClassResponse>)> {
    require_manager(&actor)?;
    let department_id = body
        .department_id
        .or(actor.department_id)
        .ok_or_else(|| ApiError::bad_request("departmentId is required"))?;
    require_department_access(&actor, department_id)?;

    let class = ClassService::create(
        &state.db,
        NewClass {
            name: body.name,
            section: body.section,
            department_id,
            semester: body.semester,
            academic_year: body.academic_year,
            capacity: body.capacity,
            class_teacher_id: body.class_teacher_id,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(class.into())))
}

/// Classes, confined to the caller's department unless admin
#[utoipa::path(
    get,
    path = "/api/classes",
    params(ClassQueryParams),
    responses(
        (status = 200, description = "Classes matching the filters", body = Vec<ClassResponse>)
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn list_classes(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<ClassQueryParams>,
) -> ApiResult<Json<Vec<ClassResponse>>> {
    let filter = ClassFilter {
        department_id: department_scope(&actor).or(params.department_id),
        semester: params.semester,
    };
    let classes = ClassService::list(&state.db, filter).await?;
    Ok(Json(classes.into_iter().map(Into::into).collect()))
}

/// A class with its roster and subject assignments
#[utoipa::path(
    get,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class found", body = ClassDetailResponse),
        (status = 403, description = "Outside the caller's department"),
        (status = 404, description = "Class not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn get_class(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ClassDetailResponse>> {
    let class = ClassService::get(&state.db, id).await?;
    require_department_access(&actor, class.department_id)?;

    let students = ClassService::roster(&state.db, id).await?;
    let subjects = ClassService::subjects(&state.db, id).await?;

    Ok(Json(ClassDetailResponse {
        class: class.into(),
        students: students.into_iter().map(Into::into).collect(),
        subjects: subjects.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = UpdateClassRequest,
    responses(
        (status = 200, description = "Class updated", body = ClassResponse),
        (status = 400, description = "Capacity below current strength"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Section already exists for the semester")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn update_class(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateClassRequest>,
) -> ApiResult<Json<ClassResponse>> {
    managed_class(&state, &actor, id).await?;

    let class = ClassService::update(
        &state.db,
        id,
        ClassChanges {
            name: body.name,
            section: body.section,
            semester: body.semester,
            academic_year: body.academic_year,
            capacity: body.capacity,
        },
    )
    .await?;
    Ok(Json(class.into()))
}

/// Deletes a class, unassigning its students
#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(("id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class deleted", body = MessageResponse),
        (status = 404, description = "Class not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn delete_class(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    managed_class(&state, &actor, id).await?;
    ClassService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Class deleted")))
}

/// Enrols students, moving them out of any previous class
#[utoipa::path(
    post,
    path = "/api/classes/{id}/students",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = AddStudentsRequest,
    responses(
        (status = 200, description = "Students enrolled", body = ClassResponse),
        (status = 400, description = "Not students of the department, or class full"),
        (status = 404, description = "Class or student not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn add_students(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AddStudentsRequest>,
) -> ApiResult<Json<ClassResponse>> {
    managed_class(&state, &actor, id).await?;
    let class = ClassService::add_students(&state.db, id, body.student_ids).await?;
    Ok(Json(class.into()))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}/students/{student_id}",
    params(
        ("id" = Uuid, Path, description = "Class ID"),
        ("student_id" = Uuid, Path, description = "Student ID")
    ),
    responses(
        (status = 200, description = "Student removed", body = ClassResponse),
        (status = 400, description = "Student is not in this class"),
        (status = 404, description = "Class or student not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn remove_student(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((id, student_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<ClassResponse>> {
    managed_class(&state, &actor, id).await?;
    let class = ClassService::remove_student(&state.db, id, student_id).await?;
    Ok(Json(class.into()))
}

/// Sets or clears the class teacher
#[utoipa::path(
    put,
    path = "/api/classes/{id}/class-teacher",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = ClassTeacherRequest,
    responses(
        (status = 200, description = "Class teacher updated", body = ClassResponse),
        (status = 400, description = "Not a faculty member of the department"),
        (status = 404, description = "Class or faculty not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn set_class_teacher(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<ClassTeacherRequest>,
) -> ApiResult<Json<ClassResponse>> {
    managed_class(&state, &actor, id).await?;
    let class = ClassService::set_class_teacher(&state.db, id, body.faculty_id).await?;
    Ok(Json(class.into()))
}

/// Assigns a subject, optionally with its teacher
#[utoipa::path(
    post,
    path = "/api/classes/{id}/subjects",
    params(("id" = Uuid, Path, description = "Class ID")),
    request_body = AssignSubjectRequest,
    responses(
        (status = 200, description = "Subjects now assigned to the class", body = Vec<ClassSubjectResponse>),
        (status = 400, description = "Subject or faculty outside the department"),
        (status = 404, description = "Class, subject or faculty not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn assign_subject(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<AssignSubjectRequest>,
) -> ApiResult<Json<Vec<ClassSubjectResponse>>> {
    managed_class(&state, &actor, id).await?;
    ClassService::assign_subject(&state.db, id, body.subject_id, body.faculty_id).await?;

    let subjects = ClassService::subjects(&state.db, id).await?;
    Ok(Json(subjects.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}/subjects/{subject_id}",
    params(
        ("id" = Uuid, Path, description = "Class ID"),
        ("subject_id" = Uuid, Path, description = "Subject ID")
    ),
    responses(
        (status = 200, description = "Subject unassigned", body = MessageResponse),
        (status = 404, description = "Class or assignment not found")
    ),
    security(("jwt" = [])),
    tag = "Classes"
)]
pub async fn unassign_subject(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((id, subject_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<MessageResponse>> {
    managed_class(&state, &actor, id).await?;
    ClassService::unassign_subject(&state.db, id, subject_id).await?;
    Ok(Json(MessageResponse::new("Subject removed from class")))
}
