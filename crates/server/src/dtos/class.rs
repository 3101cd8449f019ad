use super::{subject::SubjectResponse, user::UserSummary};
use chrono::NaiveDateTime;
use database::{entities::classes, services::class::ClassSubject};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassResponse {
    pub id: Uuid,
    pub name: String,
    pub section: String,
    pub department_id: Uuid,
    pub semester: i32,
    pub academic_year: String,
    pub class_teacher_id: Option<Uuid>,
    pub capacity: i32,
    pub current_strength: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<classes::Model> for ClassResponse {
    fn from(c: classes::Model) -> Self {
        Self {
            id: c.id,
            name: c.name,
            section: c.section,
            department_id: c.department_id,
            semester: c.semester,
            academic_year: c.academic_year,
            class_teacher_id: c.class_teacher_id,
            capacity: c.capacity,
            current_strength: c.current_strength,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassSubjectResponse {
    pub subject: SubjectResponse,
    pub faculty: Option<UserSummary>,
}

impl From<ClassSubject> for ClassSubjectResponse {
    fn from(cs: ClassSubject) -> Self {
        Self {
            subject: cs.subject.into(),
            faculty: cs.faculty.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClassDetailResponse {
    pub class: ClassResponse,
    pub students: Vec<UserSummary>,
    pub subjects: Vec<ClassSubjectResponse>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClassRequest {
    pub name: String,
    pub section: String,
    /// Defaults to the caller's department
    pub department_id: Option<Uuid>,
    pub semester: i32,
    pub academic_year: String,
    pub capacity: i32,
    pub class_teacher_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClassRequest {
    pub name: Option<String>,
    pub section: Option<String>,
    pub semester: Option<i32>,
    pub academic_year: Option<String>,
    pub capacity: Option<i32>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ClassQueryParams {
    pub department_id: Option<Uuid>,
    pub semester: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentsRequest {
    pub student_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassTeacherRequest {
    /// `null` clears the class teacher
    pub faculty_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignSubjectRequest {
    pub subject_id: Uuid,
    pub faculty_id: Option<Uuid>,
}
