use super::{PaginationMeta, default_page, default_per_page};
use chrono::NaiveDateTime;
use database::entities::users;
use models::role::{Role, UserStatus};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "student")]
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    pub semester: Option<i32>,
    pub roll_number: Option<String>,
    pub phone: Option<String>,
    #[schema(value_type = String, example = "active")]
    pub status: UserStatus,
    pub is_class_teacher: bool,
    pub cgpa: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<users::Model> for UserResponse {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            department_id: u.department_id,
            class_id: u.class_id,
            semester: u.semester,
            roll_number: u.roll_number,
            phone: u.phone,
            status: u.status,
            is_class_teacher: u.is_class_teacher,
            cgpa: u.cgpa,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Short form embedded in other resources
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = String)]
    pub role: Role,
    pub roll_number: Option<String>,
}

impl From<users::Model> for UserSummary {
    fn from(u: users::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role,
            roll_number: u.roll_number,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[schema(value_type = String, example = "faculty")]
    pub role: Role,
    pub department_id: Option<Uuid>,
    /// Students only, enrols them in the class
    pub class_id: Option<Uuid>,
    pub semester: Option<i32>,
    pub roll_number: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub semester: Option<i32>,
    pub roll_number: Option<String>,
    #[schema(value_type = Option<String>)]
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
}

impl UpdateUserRequest {
    /// Fields only a manager may change
    pub fn touches_managed_fields(&self) -> bool {
        self.role.is_some()
            || self.department_id.is_some()
            || self.semester.is_some()
            || self.roll_number.is_some()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    #[schema(value_type = String, example = "inactive")]
    pub status: UserStatus,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct UserQueryParams {
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_per_page")]
    pub per_page: u64,

    #[param(value_type = Option<String>)]
    pub role: Option<Role>,
    pub department_id: Option<Uuid>,
    pub class_id: Option<Uuid>,
    #[param(value_type = Option<String>)]
    pub status: Option<UserStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedUsersResponse {
    pub users: Vec<UserResponse>,
    pub pagination: PaginationMeta,
}
