use crate::{
    auth::{
        AuthUser,
        password::{hash_password, validate_new_password},
        policy::require_role,
    },
    dtos::{
        MessageResponse, class::ClassResponse, department::CreateDepartmentAdminRequest,
        user::UserResponse,
    },
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use database::{
    entities::users,
    services::{
        class::{ClassFilter, ClassService},
        user::{NewUser, UserFilter, UserService},
    },
};
use models::role::Role;
use uuid::Uuid;

const PAGE_SIZE: u64 = 100;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_department_admins).post(create_department_admin))
        .route("/{id}", delete(delete_department_admin))
        .route("/faculty", get(department_faculty))
        .route("/students", get(department_students))
        .route("/classes", get(department_classes))
}

fn own_department(actor: &users::Model) -> ApiResult<Uuid> {
    require_role(actor, &[Role::DepartmentAdmin, Role::Admin])?;
    actor
        .department_id
        .ok_or_else(|| ApiError::bad_request("You are not assigned to a department"))
}

async fn list_by_role(
    state: &SharedState,
    role: Role,
    department_id: Option<Uuid>,
) -> ApiResult<Vec<UserResponse>> {
    let filter = UserFilter {
        role: Some(role),
        department_id,
        ..Default::default()
    };
    let mut all = Vec::new();
    for page in 1.. {
        let (users, total) = UserService::list(&state.db, filter.clone(), page, PAGE_SIZE).await?;
        let done = users.is_empty() || page * PAGE_SIZE >= total;
        all.extend(users.into_iter().map(UserResponse::from));
        if done {
            break;
        }
    }
    Ok(all)
}

/// Create an administrator for one department
#[utoipa::path(
    post,
    path = "/api/department-admin",
    request_body = CreateDepartmentAdminRequest,
    responses(
        (status = 201, description = "Department admin created", body = UserResponse),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Department not found"),
        (status = 409, description = "Email already in use")
    ),
    security(("jwt" = [])),
    tag = "Department Admin"
)]
pub async fn create_department_admin(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateDepartmentAdminRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    require_role(&actor, &[Role::Admin])?;
    validate_new_password(&body.password)?;

    let user = UserService::create(
        &state.db,
        NewUser {
            name: body.name,
            email: body.email,
            password_hash: hash_password(&body.password)?,
            role: Role::DepartmentAdmin,
            department_id: Some(body.department_id),
            semester: None,
            roll_number: None,
            phone: body.phone,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[utoipa::path(
    get,
    path = "/api/department-admin",
    responses(
        (status = 200, description = "Every department admin", body = Vec<UserResponse>),
        (status = 403, description = "Admins only")
    ),
    security(("jwt" = [])),
    tag = "Department Admin"
)]
pub async fn list_department_admins(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    require_role(&actor, &[Role::Admin])?;
    Ok(Json(list_by_role(&state, Role::DepartmentAdmin, None).await?))
}

#[utoipa::path(
    delete,
    path = "/api/department-admin/{id}",
    params(("id" = Uuid, Path, description = "Department admin user ID")),
    responses(
        (status = 200, description = "Department admin removed", body = MessageResponse),
        (status = 400, description = "User is not a department admin"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Department Admin"
)]
pub async fn delete_department_admin(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&actor, &[Role::Admin])?;

    let target = UserService::get(&state.db, id).await?;
    if target.role != Role::DepartmentAdmin {
        return Err(ApiError::bad_request("User is not a department admin"));
    }
    UserService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Department admin removed")))
}

/// Faculty of the caller's department
#[utoipa::path(
    get,
    path = "/api/department-admin/faculty",
    responses(
        (status = 200, description = "Faculty members", body = Vec<UserResponse>),
        (status = 403, description = "Department admins only")
    ),
    security(("jwt" = [])),
    tag = "Department Admin"
)]
pub async fn department_faculty(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let department_id = own_department(&actor)?;
    Ok(Json(
        list_by_role(&state, Role::Faculty, Some(department_id)).await?,
    ))
}

/// Students of the caller's department
#[utoipa::path(
    get,
    path = "/api/department-admin/students",
    responses(
        (status = 200, description = "Students", body = Vec<UserResponse>),
        (status = 403, description = "Department admins only")
    ),
    security(("jwt" = [])),
    tag = "Department Admin"
)]
pub async fn department_students(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<UserResponse>>> {
    let department_id = own_department(&actor)?;
    Ok(Json(
        list_by_role(&state, Role::Student, Some(department_id)).await?,
    ))
}

/// Classes of the caller's department
#[utoipa::path(
    get,
    path = "/api/department-admin/classes",
    responses(
        (status = 200, description = "Classes", body = Vec<ClassResponse>),
        (status = 403, description = "Department admins only")
    ),
    security(("jwt" = [])),
    tag = "Department Admin"
)]
pub async fn department_classes(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
) -> ApiResult<Json<Vec<ClassResponse>>> {
    let department_id = own_department(&actor)?;
    let classes = ClassService::list(
        &state.db,
        ClassFilter {
            department_id: Some(department_id),
            semester: None,
        },
    )
    .await?;
    Ok(Json(classes.into_iter().map(Into::into).collect()))
}
