use crate::{
    auth::{
        AuthUser,
        password::{hash_password, validate_new_password},
        policy::{department_scope, require_can_manage, require_department_access, require_role},
    },
    dtos::{
        MessageResponse, PaginationMeta,
        user::{
            CreateUserRequest, PaginatedUsersResponse, UpdateStatusRequest, UpdateUserRequest,
            UserQueryParams, UserResponse,
        },
    },
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use database::{
    entities::users,
    services::user::{NewUser, UserChanges, UserFilter, UserService},
};
use log::info;
use models::role::Role;
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{id}", get(get_user).put(update_user).delete(delete_user))
        .route("/{id}/status", patch(update_status))
}

/// Students see themselves, staff see their department, admins everyone
pub(crate) fn require_can_view(viewer: &users::Model, target: &users::Model) -> ApiResult<()> {
    if viewer.id == target.id || viewer.role == Role::Admin {
        return Ok(());
    }
    if viewer.role == Role::Student {
        return Err(ApiError::forbidden("Students may only view their own profile"));
    }
    match target.department_id {
        Some(department_id) => require_department_access(viewer, department_id),
        None => Err(ApiError::forbidden("Access limited to your own department")),
    }
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid input"),
        (status = 403, description = "Not allowed to create this role"),
        (status = 409, description = "Email or roll number already in use")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Json(body): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let department_id = match actor.role {
        Role::DepartmentAdmin => body.department_id.or(actor.department_id),
        _ => body.department_id,
    };
    require_can_manage(&actor, body.role, department_id)?;
    validate_new_password(&body.password)?;
    if body.class_id.is_some() && body.role != Role::Student {
        return Err(ApiError::bad_request("Only students can be placed in a class"));
    }

    let new = NewUser {
        name: body.name,
        email: body.email,
        password_hash: hash_password(&body.password)?,
        role: body.role,
        department_id,
        semester: body.semester,
        roll_number: body.roll_number,
        phone: body.phone,
    };
    // enrolment goes through the roster so the class strength stays exact
    let user = match body.class_id {
        Some(class_id) => UserService::create_in_class(&state.db, new, class_id).await?,
        None => UserService::create(&state.db, new).await?,
    };
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// List users, paginated
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQueryParams),
    responses(
        (status = 200, description = "Users matching the filters", body = PaginatedUsersResponse),
        (status = 403, description = "Students cannot list users")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Query(params): Query<UserQueryParams>,
) -> ApiResult<Json<PaginatedUsersResponse>> {
    require_role(&actor, &[Role::Admin, Role::DepartmentAdmin, Role::Faculty])?;

    let filter = UserFilter {
        role: params.role,
        department_id: department_scope(&actor).or(params.department_id),
        class_id: params.class_id,
        status: params.status,
        search: params.search,
    };
    let (users, total_items) =
        UserService::list(&state.db, filter, params.page, params.per_page).await?;

    Ok(Json(PaginatedUsersResponse {
        users: users.into_iter().map(Into::into).collect(),
        pagination: PaginationMeta::new(params.page, params.per_page, total_items),
    }))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Outside the caller's reach"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UserResponse>> {
    let user = UserService::get(&state.db, id).await?;
    require_can_view(&actor, &user)?;
    Ok(Json(user.into()))
}

/// Update a profile; role, department, semester and roll number need a manager
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Not allowed to change these fields"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email or roll number already in use")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let target = UserService::get(&state.db, id).await?;

    if actor.id != target.id || body.touches_managed_fields() {
        require_can_manage(&actor, target.role, target.department_id)?;
    }
    if body.role.is_some() || body.department_id.is_some() {
        require_can_manage(
            &actor,
            body.role.unwrap_or(target.role),
            body.department_id.or(target.department_id),
        )?;
    }

    let user = UserService::update(
        &state.db,
        id,
        UserChanges {
            name: body.name,
            email: body.email,
            phone: body.phone,
            semester: body.semester,
            roll_number: body.roll_number,
            role: body.role,
            department_id: body.department_id,
        },
    )
    .await?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Cannot delete yourself"),
        (status = 403, description = "Not allowed to delete this user"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    if actor.id == id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }
    let target = UserService::get(&state.db, id).await?;
    require_can_manage(&actor, target.role, target.department_id)?;

    UserService::delete(&state.db, id).await?;
    info!("User {id} deleted by {}", actor.id);
    Ok(Json(MessageResponse::new("User deleted")))
}

/// Activate or deactivate an account
#[utoipa::path(
    patch,
    path = "/api/users/{id}/status",
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status changed", body = UserResponse),
        (status = 403, description = "Not allowed to manage this user"),
        (status = 404, description = "User not found")
    ),
    security(("jwt" = [])),
    tag = "Users"
)]
pub async fn update_status(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> ApiResult<Json<UserResponse>> {
    if actor.id == id {
        return Err(ApiError::bad_request("You cannot change your own status"));
    }
    let target = UserService::get(&state.db, id).await?;
    require_can_manage(&actor, target.role, target.department_id)?;

    let user = UserService::set_status(&state.db, id, body.status).await?;
    Ok(Json(user.into()))
}
