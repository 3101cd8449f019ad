use super::{class::ClassResponse, user::UserSummary};
use chrono::NaiveDateTime;
use database::{entities::subjects, services::subject::SubjectDetail};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectResponse {
    pub id: Uuid,
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub semester: i32,
    pub department_id: Uuid,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<subjects::Model> for SubjectResponse {
    fn from(s: subjects::Model) -> Self {
        Self {
            id: s.id,
            name: s.name,
            code: s.code,
            credits: s.credits,
            semester: s.semester,
            department_id: s.department_id,
            description: s.description,
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectDetailResponse {
    pub subject: SubjectResponse,
    pub faculty: Vec<UserSummary>,
    pub classes: Vec<ClassResponse>,
}

impl From<SubjectDetail> for SubjectDetailResponse {
    fn from(d: SubjectDetail) -> Self {
        Self {
            subject: d.subject.into(),
            faculty: d.faculty.into_iter().map(Into::into).collect(),
            classes: d.classes.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
    pub code: String,
    pub credits: i32,
    pub semester: i32,
    /// Defaults to the caller's department
    pub department_id: Option<Uuid>,
    pub description: Option<String>,
    #[serde(default)]
    pub faculty_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSubjectRequest {
    pub name: Option<String>,
    pub code: Option<String>,
    pub credits: Option<i32>,
    pub semester: Option<i32>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct SubjectQueryParams {
    pub department_id: Option<Uuid>,
    pub semester: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddFacultyRequest {
    pub faculty_id: Uuid,
}
