use super::{
    attendance::AttendanceSummaryResponse,
    class::ClassResponse,
    department::{DepartmentCountsResponse, DepartmentResponse},
    notice::NoticeResponse,
    subject::SubjectResponse,
    timetable::FacultyPeriodResponse,
};
use database::services::dashboard::{
    AdminDashboard, Dashboard, DepartmentDashboard, FacultyDashboard, StudentDashboard,
};
use models::role::Role;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardResponse {
    pub departments: u64,
    pub department_admins: u64,
    pub faculty: u64,
    pub students: u64,
    pub classes: u64,
    pub subjects: u64,
    pub open_complaints: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentDashboardResponse {
    pub department: DepartmentResponse,
    pub counts: DepartmentCountsResponse,
    pub open_complaints: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacultyDashboardResponse {
    pub classes: Vec<ClassResponse>,
    pub subjects: Vec<SubjectResponse>,
    pub today: Vec<FacultyPeriodResponse>,
    pub unread_messages: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDashboardResponse {
    pub class: Option<ClassResponse>,
    pub attendance: AttendanceSummaryResponse,
    pub latest_sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub notices: Vec<NoticeResponse>,
    pub unread_messages: u64,
}

/// Exactly one section is filled, matching `role`
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[schema(value_type = String)]
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin: Option<AdminDashboardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<DepartmentDashboardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub faculty: Option<FacultyDashboardResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub student: Option<StudentDashboardResponse>,
}

impl DashboardResponse {
    fn empty(role: Role) -> Self {
        Self {
            role,
            admin: None,
            department: None,
            faculty: None,
            student: None,
        }
    }
}

impl From<Dashboard> for DashboardResponse {
    fn from(dashboard: Dashboard) -> Self {
        match dashboard {
            Dashboard::Admin(AdminDashboard {
                departments,
                department_admins,
                faculty,
                students,
                classes,
                subjects,
                open_complaints,
            }) => Self {
                admin: Some(AdminDashboardResponse {
                    departments,
                    department_admins,
                    faculty,
                    students,
                    classes,
                    subjects,
                    open_complaints,
                }),
                ..Self::empty(Role::Admin)
            },
            Dashboard::DepartmentAdmin(DepartmentDashboard {
                department,
                counts,
                open_complaints,
            }) => Self {
                department: Some(DepartmentDashboardResponse {
                    department: department.into(),
                    counts: counts.into(),
                    open_complaints,
                }),
                ..Self::empty(Role::DepartmentAdmin)
            },
            Dashboard::Faculty(FacultyDashboard {
                classes,
                subjects,
                today,
                unread_messages,
            }) => Self {
                faculty: Some(FacultyDashboardResponse {
                    classes: classes.into_iter().map(Into::into).collect(),
                    subjects: subjects.into_iter().map(Into::into).collect(),
                    today: today.into_iter().map(Into::into).collect(),
                    unread_messages,
                }),
                ..Self::empty(Role::Faculty)
            },
            Dashboard::Student(StudentDashboard {
                class,
                attendance,
                latest_sgpa,
                cgpa,
                notices,
                unread_messages,
            }) => Self {
                student: Some(StudentDashboardResponse {
                    class: class.map(Into::into),
                    attendance: attendance.into(),
                    latest_sgpa,
                    cgpa,
                    notices: notices.into_iter().map(Into::into).collect(),
                    unread_messages,
                }),
                ..Self::empty(Role::Student)
            },
        }
    }
}
