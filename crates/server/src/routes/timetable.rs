use crate::{
    auth::{
        AuthUser,
        policy::{require_department_access, require_manager},
    },
    dtos::{
        MessageResponse,
        timetable::{
            FacultyPeriodResponse, GenerateTimetableRequest, PeriodResponse, TimetableResponse,
            UpdatePeriodRequest,
        },
    },
    error::{ApiError, ApiResult},
    state::SharedState,
};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
};
use database::{
    entities::users,
    services::{class::ClassService, timetable::TimetableService, user::UserService},
};
use models::role::Role;
use rand::{SeedableRng, rngs::StdRng};
use uuid::Uuid;

pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/generate/{class_id}", post(generate_timetable))
        .route("/class/{class_id}", get(class_timetable))
        .route("/faculty/{faculty_id}", get(faculty_timetable))
        .route("/{id}/periods/{period_id}", put(update_period))
        .route("/{id}", delete(delete_timetable))
}

async fn require_timetable_manager(
    state: &SharedState,
    actor: &users::Model,
    timetable_id: Uuid,
) -> ApiResult<()> {
    require_manager(actor)?;
    let timetable = TimetableService::get(&state.db, timetable_id).await?;
    let class = ClassService::get(&state.db, timetable.class_id).await?;
    require_department_access(actor, class.department_id)
}

/// Generates a fresh week for the class, replacing any existing timetable
#[utoipa::path(
    post,
    path = "/api/timetable/generate/{class_id}",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    request_body(content = GenerateTimetableRequest, description = "Optional days, slot template and rooms"),
    responses(
        (status = 201, description = "Timetable generated", body = TimetableResponse),
        (status = 400, description = "Invalid template or no subjects assigned"),
        (status = 403, description = "Managers of the department only"),
        (status = 404, description = "Class not found")
    ),
    security(("jwt" = [])),
    tag = "Timetable"
)]
pub async fn generate_timetable(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(class_id): Path<Uuid>,
    body: Option<Json<GenerateTimetableRequest>>,
) -> ApiResult<(StatusCode, Json<TimetableResponse>)> {
    require_manager(&actor)?;
    let class = ClassService::get(&state.db, class_id).await?;
    require_department_access(&actor, class.department_id)?;

    let options = body.map(|Json(b)| b).unwrap_or_default().into();
    let mut rng = StdRng::from_entropy();
    let timetable =
        TimetableService::generate(&state.db, class_id, options, Some(actor.id), &mut rng).await?;

    Ok((StatusCode::CREATED, Json(timetable.into())))
}

/// The class week grouped by day
#[utoipa::path(
    get,
    path = "/api/timetable/class/{class_id}",
    params(("class_id" = Uuid, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Class timetable", body = TimetableResponse),
        (status = 404, description = "Class or timetable not found")
    ),
    security(("jwt" = [])),
    tag = "Timetable"
)]
pub async fn class_timetable(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(class_id): Path<Uuid>,
) -> ApiResult<Json<TimetableResponse>> {
    let class = ClassService::get(&state.db, class_id).await?;
    require_department_access(&actor, class.department_id)?;

    let timetable = TimetableService::for_class(&state.db, class_id).await?;
    Ok(Json(timetable.into()))
}

/// Every period a faculty member teaches, across classes
#[utoipa::path(
    get,
    path = "/api/timetable/faculty/{faculty_id}",
    params(("faculty_id" = Uuid, Path, description = "Faculty user ID")),
    responses(
        (status = 200, description = "Faculty periods", body = Vec<FacultyPeriodResponse>),
        (status = 403, description = "Not allowed to view this schedule"),
        (status = 404, description = "Faculty not found")
    ),
    security(("jwt" = [])),
    tag = "Timetable"
)]
pub async fn faculty_timetable(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(faculty_id): Path<Uuid>,
) -> ApiResult<Json<Vec<FacultyPeriodResponse>>> {
    if actor.id != faculty_id {
        let faculty = UserService::get(&state.db, faculty_id).await?;
        if faculty.role != Role::Faculty {
            return Err(ApiError::bad_request("User is not a faculty member"));
        }
        if let Some(department_id) = faculty.department_id {
            require_department_access(&actor, department_id)?;
        }
    }

    let periods = TimetableService::for_faculty(&state.db, faculty_id).await?;
    Ok(Json(periods.into_iter().map(Into::into).collect()))
}

/// Manual correction of a single period
#[utoipa::path(
    put,
    path = "/api/timetable/{id}/periods/{period_id}",
    params(
        ("id" = Uuid, Path, description = "Timetable ID"),
        ("period_id" = Uuid, Path, description = "Period ID")
    ),
    request_body = UpdatePeriodRequest,
    responses(
        (status = 200, description = "Period updated", body = PeriodResponse),
        (status = 400, description = "Invalid times or subject"),
        (status = 404, description = "Timetable or period not found")
    ),
    security(("jwt" = [])),
    tag = "Timetable"
)]
pub async fn update_period(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path((id, period_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<UpdatePeriodRequest>,
) -> ApiResult<Json<PeriodResponse>> {
    require_timetable_manager(&state, &actor, id).await?;
    let period = TimetableService::update_period(&state.db, id, period_id, body.into()).await?;
    Ok(Json(period.into()))
}

#[utoipa::path(
    delete,
    path = "/api/timetable/{id}",
    params(("id" = Uuid, Path, description = "Timetable ID")),
    responses(
        (status = 200, description = "Timetable deleted", body = MessageResponse),
        (status = 404, description = "Timetable not found")
    ),
    security(("jwt" = [])),
    tag = "Timetable"
)]
pub async fn delete_timetable(
    State(state): State<SharedState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    require_timetable_manager(&state, &actor, id).await?;
    TimetableService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Timetable deleted")))
}
