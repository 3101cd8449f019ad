use chrono::NaiveDateTime;
use database::{entities::departments, services::department::DepartmentCounts};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<departments::Model> for DepartmentResponse {
    fn from(d: departments::Model) -> Self {
        Self {
            id: d.id,
            name: d.name,
            code: d.code,
            description: d.description,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentCountsResponse {
    pub admins: u64,
    pub faculty: u64,
    pub students: u64,
    pub classes: u64,
    pub subjects: u64,
}

impl From<DepartmentCounts> for DepartmentCountsResponse {
    fn from(c: DepartmentCounts) -> Self {
        Self {
            admins: c.admins,
            faculty: c.faculty,
            students: c.students,
            classes: c.classes,
            subjects: c.subjects,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DepartmentDetailResponse {
    pub department: DepartmentResponse,
    pub counts: DepartmentCountsResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDepartmentRequest {
    pub name: String,
    pub code: String,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDepartmentRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentAdminRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub department_id: Uuid,
    pub phone: Option<String>,
}
