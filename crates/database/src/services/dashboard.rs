use crate::{
    entities::{classes, complaints, departments, notices, semester_records, subjects, users},
    error::{ServiceError, ServiceResult},
    services::{
        attendance::AttendanceService,
        chat::ChatService,
        class::ClassService,
        department::{DepartmentCounts, DepartmentService},
        notice::NoticeService,
        subject::SubjectService,
        timetable::{FacultyPeriod, TimetableService},
        user::UserService,
    },
};
use chrono::{Datelike, Utc};
use models::{
    attendance::AttendanceSummary,
    complaint::ComplaintStatus,
    role::Role,
    timetable::Weekday,
};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use uuid::Uuid;

/// Notices shown on a student's dashboard
const RECENT_NOTICES: usize = 5;

#[derive(Debug, Clone)]
pub struct AdminDashboard {
    pub departments: u64,
    pub department_admins: u64,
    pub faculty: u64,
    pub students: u64,
    pub classes: u64,
    pub subjects: u64,
    pub open_complaints: u64,
}

#[derive(Debug, Clone)]
pub struct DepartmentDashboard {
    pub department: departments::Model,
    pub counts: DepartmentCounts,
    pub open_complaints: u64,
}

#[derive(Debug, Clone)]
pub struct FacultyDashboard {
    pub classes: Vec<classes::Model>,
    pub subjects: Vec<subjects::Model>,
    pub today: Vec<FacultyPeriod>,
    pub unread_messages: u64,
}

#[derive(Debug, Clone)]
pub struct StudentDashboard {
    pub class: Option<classes::Model>,
    pub attendance: AttendanceSummary,
    pub latest_sgpa: Option<f64>,
    pub cgpa: Option<f64>,
    pub notices: Vec<notices::Model>,
    pub unread_messages: u64,
}

#[derive(Debug, Clone)]
pub enum Dashboard {
    Admin(AdminDashboard),
    DepartmentAdmin(DepartmentDashboard),
    Faculty(FacultyDashboard),
    Student(StudentDashboard),
}

pub struct DashboardService;

impl DashboardService {
    pub async fn for_user(db: &DatabaseConnection, user: &users::Model) -> ServiceResult<Dashboard> {
        Ok(match user.role {
            Role::Admin => Dashboard::Admin(Self::admin(db).await?),
            Role::DepartmentAdmin => {
                let department_id = user
                    .department_id
                    .ok_or(ServiceError::NotFound("Department"))?;
                Dashboard::DepartmentAdmin(Self::department(db, department_id).await?)
            }
            Role::Faculty => Dashboard::Faculty(Self::faculty(db, user.id).await?),
            Role::Student => Dashboard::Student(Self::student(db, user).await?),
        })
    }

    async fn admin(db: &DatabaseConnection) -> ServiceResult<AdminDashboard> {
        Ok(AdminDashboard {
            departments: departments::Entity::find().count(db).await?,
            department_admins: UserService::count(db, Some(Role::DepartmentAdmin), None).await?,
            faculty: UserService::count(db, Some(Role::Faculty), None).await?,
            students: UserService::count(db, Some(Role::Student), None).await?,
            classes: classes::Entity::find().count(db).await?,
            subjects: subjects::Entity::find().count(db).await?,
            open_complaints: Self::open_complaints(db, None).await?,
        })
    }

    async fn department(
        db: &DatabaseConnection,
        department_id: Uuid,
    ) -> ServiceResult<DepartmentDashboard> {
        Ok(DepartmentDashboard {
            department: DepartmentService::get(db, department_id).await?,
            counts: DepartmentService::counts(db, department_id).await?,
            open_complaints: Self::open_complaints(db, Some(department_id)).await?,
        })
    }

    async fn faculty(db: &DatabaseConnection, faculty_id: Uuid) -> ServiceResult<FacultyDashboard> {
        let today = Weekday::from_chrono(Utc::now().weekday());
        let schedule = TimetableService::for_faculty(db, faculty_id).await?;

        Ok(FacultyDashboard {
            classes: ClassService::for_faculty(db, faculty_id).await?,
            subjects: SubjectService::for_faculty(db, faculty_id).await?,
            today: schedule
                .into_iter()
                .filter(|p| Some(p.period.day) == today)
                .collect(),
            unread_messages: ChatService::total_unread(db, faculty_id).await?,
        })
    }

    async fn student(
        db: &DatabaseConnection,
        student: &users::Model,
    ) -> ServiceResult<StudentDashboard> {
        let class = match student.class_id {
            Some(class_id) => classes::Entity::find_by_id(class_id).one(db).await?,
            None => None,
        };
        let latest = semester_records::Entity::find()
            .filter(semester_records::Column::UserId.eq(student.id))
            .filter(semester_records::Column::IsReleased.eq(true))
            .order_by_desc(semester_records::Column::Semester)
            .one(db)
            .await?;
        let mut notices = NoticeService::visible_to(db, student).await?;
        notices.truncate(RECENT_NOTICES);

        Ok(StudentDashboard {
            class,
            attendance: AttendanceService::student_summary(db, student.id)
                .await?
                .overall,
            latest_sgpa: latest.map(|r| r.sgpa),
            cgpa: student.cgpa,
            notices,
            unread_messages: ChatService::total_unread(db, student.id).await?,
        })
    }

    async fn open_complaints(
        db: &DatabaseConnection,
        department_id: Option<Uuid>,
    ) -> ServiceResult<u64> {
        let mut query = complaints::Entity::find().filter(
            complaints::Column::Status.is_in([ComplaintStatus::Pending, ComplaintStatus::InProgress]),
        );
        if let Some(department_id) = department_id {
            query = query.filter(complaints::Column::DepartmentId.eq(department_id));
        }
        Ok(query.count(db).await?)
    }
}
