use sea_orm_migration::prelude::*;

use crate::m20250901_create_activity_tables::{
    Attendance, AttendanceRecords, ChatMessages, ChatParticipants, Grades,
};
use crate::m20250901_create_campus_tables::{
    ClassSubjects, Classes, SemesterRecords, SubjectFaculty, TimetablePeriods, Users,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Roll numbers are optional but unique when present
        manager
            .create_index(
                Index::create()
                    .name("idx_users_roll_number")
                    .table(Users::Table)
                    .col(Users::RollNumber)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index on users for department/class rosters
        manager
            .create_index(
                Index::create()
                    .name("idx_users_department_role")
                    .table(Users::Table)
                    .col(Users::DepartmentId)
                    .col(Users::Role)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_class_id")
                    .table(Users::Table)
                    .col(Users::ClassId)
                    .to_owned(),
            )
            .await?;

        // A section exists once per department and semester
        manager
            .create_index(
                Index::create()
                    .name("idx_classes_department_semester_section")
                    .table(Classes::Table)
                    .col(Classes::DepartmentId)
                    .col(Classes::Semester)
                    .col(Classes::Section)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_class_subjects_class_subject")
                    .table(ClassSubjects::Table)
                    .col(ClassSubjects::ClassId)
                    .col(ClassSubjects::SubjectId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_subject_faculty_pair")
                    .table(SubjectFaculty::Table)
                    .col(SubjectFaculty::SubjectId)
                    .col(SubjectFaculty::FacultyId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_semester_records_user_semester")
                    .table(SemesterRecords::Table)
                    .col(SemesterRecords::UserId)
                    .col(SemesterRecords::Semester)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Faculty schedules are looked up across every timetable
        manager
            .create_index(
                Index::create()
                    .name("idx_timetable_periods_faculty_id")
                    .table(TimetablePeriods::Table)
                    .col(TimetablePeriods::FacultyId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_session")
                    .table(Attendance::Table)
                    .col(Attendance::ClassId)
                    .col(Attendance::SubjectId)
                    .col(Attendance::Date)
                    .col(Attendance::Period)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_attendance_records_student_id")
                    .table(AttendanceRecords::Table)
                    .col(AttendanceRecords::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_grades_student_subject_term")
                    .table(Grades::Table)
                    .col(Grades::StudentId)
                    .col(Grades::SubjectId)
                    .col(Grades::Semester)
                    .col(Grades::AcademicYear)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_participants_chat_user")
                    .table(ChatParticipants::Table)
                    .col(ChatParticipants::ChatId)
                    .col(ChatParticipants::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_chat_messages_chat_created")
                    .table(ChatMessages::Table)
                    .col(ChatMessages::ChatId)
                    .col(ChatMessages::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let indexes = [
            ("idx_chat_messages_chat_created", ChatMessages::Table.into_iden()),
            ("idx_chat_participants_chat_user", ChatParticipants::Table.into_iden()),
            ("idx_grades_student_subject_term", Grades::Table.into_iden()),
            (
                "idx_attendance_records_student_id",
                AttendanceRecords::Table.into_iden(),
            ),
            ("idx_attendance_session", Attendance::Table.into_iden()),
            (
                "idx_timetable_periods_faculty_id",
                TimetablePeriods::Table.into_iden(),
            ),
            (
                "idx_semester_records_user_semester",
                SemesterRecords::Table.into_iden(),
            ),
            ("idx_subject_faculty_pair", SubjectFaculty::Table.into_iden()),
            (
                "idx_class_subjects_class_subject",
                ClassSubjects::Table.into_iden(),
            ),
            (
                "idx_classes_department_semester_section",
                Classes::Table.into_iden(),
            ),
            ("idx_users_class_id", Users::Table.into_iden()),
            ("idx_users_department_role", Users::Table.into_iden()),
            ("idx_users_roll_number", Users::Table.into_iden()),
        ];

        for (name, table) in indexes {
            manager
                .drop_index(Index::drop().name(name).table(table).to_owned())
                .await?;
        }

        Ok(())
    }
}
