use super::{subject::SubjectResponse, user::UserSummary};
use chrono::NaiveDateTime;
use database::{
    entities::{grades, semester_records},
    services::grade::{GradeInput, GradeSummary, ReleaseOutcome, StudentGrade, SubjectGrade},
};
use models::grading::MarkSheet;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeRequest {
    pub student_id: Uuid,
    pub subject_id: Uuid,
    /// Defaults to the subject's semester
    pub semester: Option<i32>,
    #[schema(example = "2024-2025")]
    pub academic_year: String,
    pub mid1: Option<f64>,
    pub mid2: Option<f64>,
    pub external: Option<f64>,
}

impl From<GradeRequest> for GradeInput {
    fn from(r: GradeRequest) -> Self {
        Self {
            student_id: r.student_id,
            subject_id: r.subject_id,
            semester: r.semester,
            academic_year: r.academic_year,
            marks: MarkSheet::new(r.mid1, r.mid2, r.external),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkGradeRequest {
    pub grades: Vec<GradeRequest>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct GradeQueryParams {
    pub semester: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseGradesRequest {
    pub class_id: Uuid,
    pub semester: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ReleaseGradesResponse {
    pub students: usize,
    pub grades: u64,
}

impl From<ReleaseOutcome> for ReleaseGradesResponse {
    fn from(o: ReleaseOutcome) -> Self {
        Self {
            students: o.students,
            grades: o.grades,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GradeResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub subject_id: Uuid,
    pub class_id: Option<Uuid>,
    pub semester: i32,
    pub academic_year: String,
    pub mid1: Option<f64>,
    pub mid2: Option<f64>,
    pub external: Option<f64>,
    pub internal_marks: f64,
    pub total_marks: f64,
    pub grade: String,
    pub grade_points: f64,
    pub credits: i32,
    pub is_released: bool,
    pub updated_at: NaiveDateTime,
}

impl From<grades::Model> for GradeResponse {
    fn from(g: grades::Model) -> Self {
        Self {
            id: g.id,
            student_id: g.student_id,
            subject_id: g.subject_id,
            class_id: g.class_id,
            semester: g.semester,
            academic_year: g.academic_year,
            mid1: g.mid1,
            mid2: g.mid2,
            external: g.external,
            internal_marks: g.internal_marks,
            total_marks: g.total_marks,
            grade: g.grade,
            grade_points: g.grade_points,
            credits: g.credits,
            is_released: g.is_released,
            updated_at: g.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectGradeResponse {
    pub grade: GradeResponse,
    pub subject: SubjectResponse,
}

impl From<SubjectGrade> for SubjectGradeResponse {
    fn from(sg: SubjectGrade) -> Self {
        Self {
            grade: sg.grade.into(),
            subject: sg.subject.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentGradeResponse {
    pub grade: GradeResponse,
    pub student: UserSummary,
}

impl From<StudentGrade> for StudentGradeResponse {
    fn from(sg: StudentGrade) -> Self {
        Self {
            grade: sg.grade.into(),
            student: sg.student.into(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SemesterRecordResponse {
    pub semester: i32,
    pub sgpa: f64,
    pub total_credits: i32,
    pub is_completed: bool,
    pub is_released: bool,
}

impl From<semester_records::Model> for SemesterRecordResponse {
    fn from(r: semester_records::Model) -> Self {
        Self {
            semester: r.semester,
            sgpa: r.sgpa,
            total_credits: r.total_credits,
            is_completed: r.is_completed,
            is_released: r.is_released,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GradeSummaryResponse {
    pub semesters: Vec<SemesterRecordResponse>,
    pub cgpa: Option<f64>,
}

impl From<GradeSummary> for GradeSummaryResponse {
    fn from(s: GradeSummary) -> Self {
        Self {
            semesters: s.semesters.into_iter().map(Into::into).collect(),
            cgpa: s.cgpa,
        }
    }
}
