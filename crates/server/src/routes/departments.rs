use crate::{
    auth::{AuthUser, policy::require_role},
    dtos::{
        MessageResponse,
        department::{
            CreateDepartmentRequest, DepartmentDetailResponse, DepartmentResponse,
            UpdateDepartmentRequest,
        },
    },
    error::ApiResult,
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use database::services::department::{DepartmentChanges, DepartmentService, NewDepartment};
use models::role::Role;
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_departments).post(create_department))
        .route(
            "/{id}",
            get(get_department)
                .put(update_department)
                .delete(delete_department),
        )
}

#[utoipa::path(
    post,
    path = "/api/departments",
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = DepartmentResponse),
        (status = 403, description = "Admins only"),
        (status = 409, description = "Name or code already in use")
    ),
    security(("jwt" = [])),
    tag = "Departments"
)]
pub async fn create_department(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateDepartmentRequest>,
) -> ApiResult<(StatusCode, Json<DepartmentResponse>)> {
    require_role(&actor, &[Role::Admin])?;

    let department = DepartmentService::create(
        &state.db,
        NewDepartment {
            name: body.name,
            code: body.code,
            description: body.description,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(department.into())))
}

#[utoipa::path(
    get,
    path = "/api/departments",
    responses(
        (status = 200, description = "All departments", body = Vec<DepartmentResponse>)
    ),
    security(("jwt" = [])),
    tag = "Departments"
)]
pub async fn list_departments(
    State(state): State<SharedState>,
    AuthUser(_actor): AuthUser,
) -> ApiResult<Json<Vec<DepartmentResponse>>> {
    let departments = DepartmentService::list(&state.db).await?;
    Ok(Json(departments.into_iter().map(Into::into).collect()))
}

/// A department with head counts
#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = DepartmentDetailResponse),
        (status = 404, description = "Department not found")
    ),
    security(("jwt" = [])),
    tag = "Departments"
)]
pub async fn get_department(
    State(state): State<SharedState>,
    AuthUser(_actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DepartmentDetailResponse>> {
    let department = DepartmentService::get(&state.db, id).await?;
    let counts = DepartmentService::counts(&state.db, id).await?;

    Ok(Json(DepartmentDetailResponse {
        department: department.into(),
        counts: counts.into(),
    }))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = DepartmentResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Name or code already in use")
    ),
    security(("jwt" = [])),
    tag = "Departments"
)]
pub async fn update_department(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateDepartmentRequest>,
) -> ApiResult<Json<DepartmentResponse>> {
    require_role(&actor, &[Role::Admin])?;

    let department = DepartmentService::update(
        &state.db,
        id,
        DepartmentChanges {
            name: body.name,
            code: body.code,
            description: body.description,
        },
    )
    .await?;
    Ok(Json(department.into()))
}

/// Refused while classes or department admins still point at the department
#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    params(("id" = Uuid, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted", body = MessageResponse),
        (status = 400, description = "Department still has classes or admins"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Department not found")
    ),
    security(("jwt" = [])),
    tag = "Departments"
)]
pub async fn delete_department(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&actor, &[Role::Admin])?;

    DepartmentService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Department deleted")))
}
