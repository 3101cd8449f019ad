use super::subject::SubjectResponse;
use chrono::{NaiveDate, NaiveDateTime};
use database::services::attendance::{
    AttendanceFilter, AttendanceSession, StudentAttendance, StudentMark,
};
use models::attendance::{AttendanceStatus, AttendanceSummary};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceMark {
    pub student_id: Uuid,
    #[schema(value_type = String, example = "present")]
    pub status: AttendanceStatus,
}

impl From<AttendanceMark> for StudentMark {
    fn from(m: AttendanceMark) -> Self {
        Self {
            student_id: m.student_id,
            status: m.status,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkAttendanceRequest {
    pub class_id: Uuid,
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub period: i32,
    pub records: Vec<AttendanceMark>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateAttendanceRequest {
    pub records: Vec<AttendanceMark>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceQueryParams {
    pub subject_id: Option<Uuid>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl From<AttendanceQueryParams> for AttendanceFilter {
    fn from(q: AttendanceQueryParams) -> Self {
        Self {
            subject_id: q.subject_id,
            from: q.from,
            to: q.to,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecordResponse {
    pub student_id: Uuid,
    #[schema(value_type = String)]
    pub status: AttendanceStatus,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceResponse {
    pub id: Uuid,
    pub class_id: Uuid,
    pub subject_id: Uuid,
    pub date: NaiveDate,
    pub period: i32,
    pub marked_by: Option<Uuid>,
    pub updated_at: NaiveDateTime,
    pub records: Vec<AttendanceRecordResponse>,
}

impl From<AttendanceSession> for AttendanceResponse {
    fn from(s: AttendanceSession) -> Self {
        let a = s.attendance;
        Self {
            id: a.id,
            class_id: a.class_id,
            subject_id: a.subject_id,
            date: a.date,
            period: a.period,
            marked_by: a.marked_by,
            updated_at: a.updated_at,
            records: s
                .records
                .into_iter()
                .map(|r| AttendanceRecordResponse {
                    student_id: r.student_id,
                    status: r.status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceSummaryResponse {
    pub total: u32,
    pub present: u32,
    pub absent: u32,
    pub percentage: f64,
}

impl From<AttendanceSummary> for AttendanceSummaryResponse {
    fn from(s: AttendanceSummary) -> Self {
        Self {
            total: s.total,
            present: s.present,
            absent: s.absent,
            percentage: s.percentage,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectAttendanceResponse {
    pub subject: SubjectResponse,
    pub summary: AttendanceSummaryResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StudentAttendanceResponse {
    pub subjects: Vec<SubjectAttendanceResponse>,
    pub overall: AttendanceSummaryResponse,
}

impl From<StudentAttendance> for StudentAttendanceResponse {
    fn from(s: StudentAttendance) -> Self {
        Self {
            subjects: s
                .subjects
                .into_iter()
                .map(|sa| SubjectAttendanceResponse {
                    subject: sa.subject.into(),
                    summary: sa.summary.into(),
                })
                .collect(),
            overall: s.overall.into(),
        }
    }
}
